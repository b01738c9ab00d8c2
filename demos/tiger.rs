//! Demo: open a Tiger controller and exercise basic axis commands.

use asitiger::{secure::SecurePosition, status::AxisState, Controller};
use simple_logger::SimpleLogger;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Enable logging
	SimpleLogger::new().init().unwrap();

	// Open the port and list the installed axes.
	let mut tiger = Controller::open("/dev/ttyUSB0")?;
	for axis in tiger.axes(None)? {
		println!(
			"{}: {:?} on card {} (0x{})",
			axis.label, axis.axis_type, axis.address, axis.address_hex
		);
	}

	// Lock the plate, then move the XY stage and wait for it with a slower poll.
	tiger.set_plate_lock(SecurePosition::Locked, None)?;
	tiger.move_absolute([("X", 1000.0), ("Y", 2000.0)])?;
	{
		let mut tiger = tiger.poll_interval_guard(Duration::from_millis(50));
		tiger.wait_until_idle(None)?;
	}

	// Nudge X without a native relative move and report where we ended up.
	tiger.move_relative_emulated([("X", -12.5)])?;
	tiger.wait_until_idle(None)?;
	let position = tiger.position(&["X", "Y"])?;
	for (axis, value) in position.iter() {
		println!("{axis} = {value}");
	}

	// Detailed status for X, coarse status for Y.
	for state in tiger.rdstat(&["X", "Y?"])? {
		match state {
			AxisState::Detailed(status) => println!("{status:?}"),
			AxisState::Coarse(status) => println!("{status:?}"),
		}
	}
	tiger.disconnect();
	Ok(())
}
