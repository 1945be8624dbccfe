/// Drive the rig interactively: type `<servo> <degrees>` lines, or `r` to
/// reconnect after replugging the device.
///
use std::io::{stdin, stdout, Write};

use devils_serial_servo::connection::ConnectionManager;
use devils_serial_servo::servo::ServoId;
use devils_serial_servo::transport::NativeTransport;

fn main() {
    tracing_subscriber::fmt::init();

    let manager = ConnectionManager::new(NativeTransport);

    report(manager.reconnect());

    loop {
        print!("> ");
        let _ = stdout().flush();
        let mut input = String::new();
        stdin()
            .read_line(&mut input)
            .expect("stdin read_line must work.");
        let input = input.trim();

        if input == "r" {
            report(manager.reconnect());
            continue;
        }

        let mut parts = input.split_whitespace();
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            println!("Usage: <thumb|arm|fingers> <degrees>, or `r` to reconnect.");
            continue;
        };
        let Ok(servo) = ServoId::try_from(name) else {
            println!("Invalid: unknown servo `{name}`.");
            continue;
        };
        let Ok(degrees) = value.parse::<f32>() else {
            println!("Invalid: degrees must be a number.");
            continue;
        };

        if let Err(e) = manager.send(servo, degrees) {
            println!("Send failed: {e}. Try `r` to reconnect.");
        }
    }
}

fn report(result: Result<Option<String>, devils_serial_servo::connection::LinkError>) {
    match result {
        Ok(Some(path)) => println!("Connected to {path}"),
        Ok(None) => println!("Rig not found. Plug it in and press `r`."),
        Err(e) => println!("Reconnect failed: {e}"),
    }
}
