use bgbeacon::bgapi::transport::DEFAULT_READ_TIMEOUT;
use bgbeacon::{BeaconParameters, RadioController, SerialTransport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyACM0".to_string());

    // Open the dongle's serial port
    let transport = match SerialTransport::open(&port, 115200, DEFAULT_READ_TIMEOUT) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Failed to open {}: {}", port, e);
            eprintln!("This might be because:");
            eprintln!("1. No BLED112 dongle is plugged in");
            eprintln!("2. Another process holds the port");
            eprintln!("3. You don't have permission to access the device");
            return Err(e.into());
        }
    };

    let uuid = hex::decode("E2C56DB5DFFB48D2B060D0F5A71096E0")?;
    let params = BeaconParameters::builder(uuid).major(1).minor(1).build()?;

    let mut radio = RadioController::new(transport);
    radio.start(&params)?;
    println!("Started advertising");

    // Wait for user input to stop advertising
    println!("Press Enter to stop advertising...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    radio.stop()?;
    println!("Stopped advertising");

    Ok(())
}
