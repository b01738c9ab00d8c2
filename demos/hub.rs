//! Demo: open a Tiger hub, home all axes, and move to an absolute position.

use asitiger::OpenSerialOptions;
use simple_logger::SimpleLogger;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Enable logging
	SimpleLogger::new().init().unwrap();

	// Open the hub with a shorter timeout and home all axes.
	let mut hub = OpenSerialOptions::new()
		.timeout(Some(Duration::from_secs(2)))
		.poll_interval(Duration::from_millis(250))
		.open_hub("/dev/ttyUSB1")?;
	hub.home()?;
	hub.wait_until_idle(None)?;

	hub.move_absolute([("X", 10.0), ("Y", 20.0)])?;
	hub.wait_until_idle(None)?;
	Ok(())
}
