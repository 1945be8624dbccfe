pub mod command;
pub mod connection;
pub mod discovery;
pub mod servo;
pub mod transport;

/// Line speed the rig firmware listens at.
pub const BAUD_RATE: u32 = 115_200;
