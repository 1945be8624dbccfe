use serialport::{SerialPortInfo, SerialPortType};

/// Manufacturer string the rig firmware reports in its USB descriptor.
pub const MANUFACTURER: &str = "Devils Prosthetics";

/// Serial-number token, compared ignoring case.
pub const SERIAL_TOKEN: &str = "DEVIL";

/// Metadata for one enumerable serial device. Produced fresh on every
/// enumeration; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub path: String,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
}

impl From<&SerialPortInfo> for DeviceDescriptor {
    fn from(info: &SerialPortInfo) -> Self {
        let (manufacturer, serial_number) = match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                (usb.manufacturer.clone(), usb.serial_number.clone())
            }
            _ => (None, None),
        };

        Self {
            path: info.port_name.clone(),
            manufacturer,
            serial_number,
        }
    }
}

/// Host operating-system family, used only as matcher context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// Pick the rig out of the attached serial devices.
///
/// A candidate matches when its manufacturer equals [`MANUFACTURER`] or its
/// serial number equals [`SERIAL_TOKEN`] ignoring case. Either signal alone
/// is enough; an unrelated device that happens to share one of them would
/// also match.
///
/// On macOS every physical device is listed under both a `tty` and a `cu`
/// name; only the `cu` name opens cleanly, so `tty` paths are skipped there.
///
/// First match in enumeration order wins. No match is a normal outcome, not
/// an error: the rig may simply not be plugged in.
pub fn select_target_device(
    candidates: &[DeviceDescriptor],
    platform: Platform,
) -> Option<&DeviceDescriptor> {
    candidates.iter().find(|device| {
        if platform == Platform::MacOs && device.path.contains("tty") {
            return false;
        }

        matches_identity(device)
    })
}

fn matches_identity(device: &DeviceDescriptor) -> bool {
    let manufacturer_match = device.manufacturer.as_deref() == Some(MANUFACTURER);
    let serial_match = device
        .serial_number
        .as_ref()
        .is_some_and(|serial| serial.to_uppercase() == SERIAL_TOKEN);

    manufacturer_match || serial_match
}
