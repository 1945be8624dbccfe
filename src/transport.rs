use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;

use crate::discovery::DeviceDescriptor;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Device enumeration failed: {0}")]
    Enumerate(#[source] serialport::Error),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
}

/// The serial layer the connection manager drives. A trait so tests can
/// swap a scripted fake in for real hardware.
pub trait SerialTransport: Send + Sync {
    /// Fresh descriptors for every attached serial device; may be empty.
    fn available_devices(&self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Best-effort close of every connection the transport knows about.
    /// Idempotent; safe to call with nothing open.
    fn close_all(&self);

    /// Open `path` for writing at `baud`. A `timeout` of `None` keeps the
    /// transport default.
    fn open(
        &self,
        path: &str,
        baud: u32,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn Write + Send>, TransportError>;
}

/// `serialport`-backed transport.
#[derive(Debug, Default)]
pub struct NativeTransport;

impl SerialTransport for NativeTransport {
    fn available_devices(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;

        Ok(ports.iter().map(DeviceDescriptor::from).collect())
    }

    fn close_all(&self) {
        // serialport keeps no process-global handle registry. The one handle
        // this process holds is the manager's own, already dropped before
        // this is called; a dropped port is a closed port.
    }

    fn open(
        &self,
        path: &str,
        baud: u32,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn Write + Send>, TransportError> {
        let mut builder = serialport::new(path, baud);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let port: Box<dyn SerialPort> = builder.open().map_err(|source| TransportError::Open {
            path: path.to_string(),
            source,
        })?;

        Ok(Box::new(port))
    }
}
