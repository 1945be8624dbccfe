/// Sweep the thumb servo from 0 to 180 degrees and back, forever.
///
use std::{thread::sleep, time::Duration};

use devils_serial_servo::connection::ConnectionManager;
use devils_serial_servo::servo::ServoId;
use devils_serial_servo::transport::NativeTransport;

fn main() {
    tracing_subscriber::fmt::init();

    let manager = ConnectionManager::new(NativeTransport);

    let path = manager
        .reconnect()
        .expect("Serial transport must be usable.")
        .expect("The rig must be plugged in.");
    println!("Connected to {path}");

    loop {
        for degrees in (0..=180).chain((0..=180).rev()) {
            manager
                .send(ServoId::Thumb, degrees as f32)
                .expect("Serial write must succeed.");
            sleep(Duration::from_millis(15));
        }
    }
}
