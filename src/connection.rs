use std::io::Write;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::command::Command;
use crate::discovery::{select_target_device, Platform};
use crate::servo::{ServoId, ServoState};
use crate::transport::{SerialTransport, TransportError};
use crate::BAUD_RATE;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Write to {path} failed: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The single open serial link and the path it was opened from.
struct ActiveConnection {
    handle: Box<dyn Write + Send>,
    path: String,
}

/// Knobs for how the link is established.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub baud_rate: u32,
    /// `None` keeps the transport's default open/write timeout. The firmware
    /// answers promptly, but a wedged USB CDC endpoint can stall a write.
    pub open_timeout: Option<Duration>,
    pub platform: Platform,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            open_timeout: None,
            platform: Platform::current(),
        }
    }
}

/// Owns the lifecycle of the one serial connection to the rig.
///
/// All methods take `&self`: the active connection sits behind a mutex, and
/// a second lock serialises whole reconnect sequences, so concurrent callers
/// never end up with two open handles. A send that lands mid-reconnect sees
/// no connection and is dropped, per the fire-and-forget contract.
pub struct ConnectionManager<T> {
    transport: T,
    config: ConnectionConfig,
    active: Mutex<Option<ActiveConnection>>,
    reconnect_lock: Mutex<()>,
    state: Mutex<ServoState>,
}

impl<T: SerialTransport> ConnectionManager<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ConnectionConfig::default())
    }

    pub fn with_config(transport: T, config: ConnectionConfig) -> Self {
        Self {
            transport,
            config,
            active: Mutex::new(None),
            reconnect_lock: Mutex::new(()),
            state: Mutex::new(ServoState::default()),
        }
    }

    /// Tear down any existing link and connect to the rig if it is attached.
    ///
    /// Returns the path connected to, or `None` when no attached device
    /// matches — an expected outcome (rig not plugged in yet), not an error.
    /// Idempotent and safe to call from several threads at once: a second
    /// call waits for the first instead of opening a second handle.
    pub fn reconnect(&self) -> Result<Option<String>, LinkError> {
        let _serialised = self.reconnect_lock.lock();

        // Drop our own handle first, then let the transport sweep up
        // anything a previous failed attempt left open.
        self.active.lock().take();
        self.transport.close_all();

        let devices = self.transport.available_devices()?;
        let Some(device) = select_target_device(&devices, self.config.platform) else {
            debug!(
                candidates = devices.len(),
                "no matching serial device found"
            );
            return Ok(None);
        };

        info!(path = %device.path, "connecting to rig");
        let handle =
            self.transport
                .open(&device.path, self.config.baud_rate, self.config.open_timeout)?;

        *self.active.lock() = Some(ActiveConnection {
            handle,
            path: device.path.clone(),
        });

        Ok(Some(device.path.clone()))
    }

    /// Request a servo move. Fire and forget: with no active connection the
    /// command is dropped and `Ok` returned, with no queueing or retry.
    ///
    /// A write failure surfaces but does not clear the connection, so sends
    /// against an unplugged device keep failing until an explicit
    /// [`reconnect`](Self::reconnect). The displayed angle is recorded
    /// either way, matching what the sliders show.
    pub fn send(&self, servo: ServoId, degrees: f32) -> Result<(), LinkError> {
        let command = Command::new(servo, degrees);
        self.state.lock().set(servo, command.rounded_degrees());

        let mut active = self.active.lock();
        let Some(connection) = active.as_mut() else {
            debug!(%servo, "no active connection, command dropped");
            return Ok(());
        };

        connection
            .handle
            .write_all(&command.encode())
            .map_err(|source| LinkError::Write {
                path: connection.path.clone(),
                source,
            })
    }

    pub fn is_connected(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Path of the open link, if any.
    pub fn connected_path(&self) -> Option<String> {
        self.active.lock().as_ref().map(|connection| connection.path.clone())
    }

    /// Last requested angle for one servo, for display.
    pub fn angle(&self, servo: ServoId) -> i32 {
        self.state.lock().get(servo)
    }

    /// Snapshot of all three display angles.
    pub fn angles(&self) -> ServoState {
        *self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::discovery::{DeviceDescriptor, MANUFACTURER};
    use crate::transport::fake::FakeTransport;

    fn rig_descriptor(path: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            path: path.to_string(),
            manufacturer: Some(MANUFACTURER.to_string()),
            serial_number: Some("DEVIL".to_string()),
        }
    }

    fn manager_with_rig() -> ConnectionManager<FakeTransport> {
        let transport = FakeTransport {
            devices: vec![rig_descriptor("/dev/ttyACM0")],
            ..FakeTransport::default()
        };
        ConnectionManager::new(transport)
    }

    #[test]
    fn reconnect_opens_the_matched_device() {
        let manager = manager_with_rig();

        let path = manager.reconnect().unwrap();

        assert_eq!(path.as_deref(), Some("/dev/ttyACM0"));
        assert!(manager.is_connected());
        assert_eq!(manager.connected_path().as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(manager.transport.close_alls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reconnect_with_no_match_is_not_an_error() {
        let transport = FakeTransport {
            devices: vec![DeviceDescriptor {
                path: "/dev/ttyACM0".to_string(),
                manufacturer: Some("Acme Corp".to_string()),
                serial_number: None,
            }],
            ..FakeTransport::default()
        };
        let manager = ConnectionManager::new(transport);

        assert!(manager.reconnect().unwrap().is_none());
        assert!(!manager.is_connected());
    }

    #[test]
    fn reconnect_surfaces_enumeration_failure() {
        let transport = FakeTransport {
            fail_enumeration: true,
            ..FakeTransport::default()
        };
        let manager = ConnectionManager::new(transport);

        let error = manager.reconnect().unwrap_err();
        assert!(matches!(
            error,
            LinkError::Transport(TransportError::Enumerate(_))
        ));
        assert!(!manager.is_connected());
    }

    #[test]
    fn reconnect_surfaces_open_failure_and_stays_disconnected() {
        let transport = FakeTransport {
            devices: vec![rig_descriptor("/dev/ttyACM0")],
            fail_open: true,
            ..FakeTransport::default()
        };
        let manager = ConnectionManager::new(transport);

        let error = manager.reconnect().unwrap_err();
        assert!(matches!(
            error,
            LinkError::Transport(TransportError::Open { .. })
        ));
        assert!(!manager.is_connected());
    }

    #[test]
    fn send_writes_the_wire_bytes() {
        let manager = manager_with_rig();
        manager.reconnect().unwrap();

        manager.send(ServoId::Thumb, 50.0).unwrap();
        manager.send(ServoId::Fingers, 0.0).unwrap();

        let written = manager.transport.written.lock().clone();
        assert_eq!(written, b"thumb 50fingers 0");
    }

    #[test]
    fn send_without_connection_is_a_silent_no_op() {
        let manager = manager_with_rig();

        manager.send(ServoId::Arm, 90.0).unwrap();

        assert!(manager.transport.written.lock().is_empty());
        // The display state still tracks the request.
        assert_eq!(manager.angle(ServoId::Arm), 90);
    }

    #[test]
    fn send_records_the_rounded_display_angle() {
        let manager = manager_with_rig();
        manager.reconnect().unwrap();

        manager.send(ServoId::Thumb, 89.6).unwrap();

        assert_eq!(manager.angle(ServoId::Thumb), 90);
        assert_eq!(manager.angles().thumb, 90);
    }

    #[test]
    fn write_failure_surfaces_but_keeps_the_connection() {
        let transport = FakeTransport {
            devices: vec![rig_descriptor("/dev/ttyACM0")],
            fail_writes: true,
            ..FakeTransport::default()
        };
        let manager = ConnectionManager::new(transport);
        manager.reconnect().unwrap();

        let error = manager.send(ServoId::Arm, 90.0).unwrap_err();
        assert!(matches!(error, LinkError::Write { .. }));

        // Not invalidated: an explicit reconnect is required to recover.
        assert!(manager.is_connected());
        assert!(manager.send(ServoId::Arm, 91.0).is_err());
    }

    #[test]
    fn repeated_reconnect_replaces_the_old_handle() {
        let manager = manager_with_rig();

        manager.reconnect().unwrap();
        manager.reconnect().unwrap();

        assert_eq!(manager.transport.opens.load(Ordering::SeqCst), 2);
        assert_eq!(manager.transport.live_handles.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_reconnects_leave_exactly_one_open_handle() {
        let manager = manager_with_rig();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| manager.reconnect().unwrap());
            }
        });

        assert!(manager.is_connected());
        assert_eq!(manager.transport.live_handles.load(Ordering::SeqCst), 1);
    }
}
