//! Options for opening a session over a serial port.

use crate::{
	backend::{Backend, Serial},
	controller::Controller,
	error::Error,
	hub::Hub,
};
use serialport as sp;
use std::time::Duration;

/// Options for configuring and opening a serial port.
///
/// ## Example
///
/// ```rust
/// # use asitiger::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tiger = OpenSerialOptions::new()
///     .timeout(Some(Duration::from_secs(2)))
///     .poll_interval(Duration::from_millis(50))
///     .open("/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenSerialOptions {
	/// The custom baud rate
	baud_rate: u32,
	/// The custom timeout
	timeout: Option<Duration>,
	/// The custom poll interval, if any
	poll_interval: Option<Duration>,
}

impl OpenSerialOptions {
	/// The default baud rate of a Tiger controller: 115,200.
	pub const DEFAULT_BAUD_RATE: u32 = 115_200;
	/// The default read timeout: 10 seconds.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

	/// Create a blank set of options ready for configuration.
	///
	/// The default baud rate and read timeout are 115,200 and 10 seconds,
	/// respectively. The poll interval defaults to the session's own default.
	///
	/// Equivalent to [`default`](OpenSerialOptions::default).
	pub fn new() -> Self {
		OpenSerialOptions {
			baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
			timeout: Some(OpenSerialOptions::DEFAULT_TIMEOUT),
			poll_interval: None,
		}
	}

	/// Set a custom baud rate.
	///
	/// The default is 115,200.
	pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
		self.baud_rate = baud_rate;
		self
	}

	/// Set a custom read timeout.
	///
	/// If duration is `None`, reads will block indefinitely. The default is 10 seconds.
	pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
		self.timeout = duration;
		self
	}

	/// Set the interval between status polls in `wait_until_idle`.
	///
	/// The default is [`Controller::DEFAULT_POLL_INTERVAL`] for a controller
	/// and [`Hub::DEFAULT_POLL_INTERVAL`] for a hub.
	pub fn poll_interval(&mut self, interval: Duration) -> &mut Self {
		self.poll_interval = Some(interval);
		self
	}

	/// Open a [`Serial`] port configured for Tiger devices at the specified path.
	fn open_serial_port(&self, path: &str) -> Result<Serial, Error> {
		log::debug!("connecting to {path} at {} baud", self.baud_rate);
		// The baud rate passed to `new` is ignored on some platforms, so it is
		// also set with `baud_rate` below.
		sp::new(path, OpenSerialOptions::DEFAULT_BAUD_RATE)
			.data_bits(sp::DataBits::Eight)
			.parity(sp::Parity::None)
			.flow_control(sp::FlowControl::None)
			.stop_bits(sp::StopBits::One)
			// serialport has no infinite timeout; the largest duration is close enough.
			.timeout(self.timeout.unwrap_or(Duration::MAX))
			.baud_rate(self.baud_rate)
			.open_native()
			.map(Serial)
			.map_err(Into::into)
	}

	/// Open a controller at the specified path with the custom options.
	pub fn open(&self, path: &str) -> Result<Controller<Serial>, Error> {
		let backend = self.open_serial_port(path)?;
		Ok(self.controller(backend))
	}

	/// Open a controller at the specified path with the custom options.
	///
	/// The type of the underlying backend is erased via dynamic dispatch,
	/// which does have runtime overhead. [`OpenSerialOptions::open`] should
	/// generally be used instead, except when the type of the underlying
	/// backend may not be known at compile time.
	pub fn open_dyn(&self, path: &str) -> Result<Controller<Box<dyn Backend>>, Error> {
		let backend: Box<dyn Backend> = Box::new(self.open_serial_port(path)?);
		Ok(self.controller(backend))
	}

	/// Open a hub at the specified path with the custom options.
	pub fn open_hub(&self, path: &str) -> Result<Hub<Serial>, Error> {
		let mut hub = Hub::from_backend(self.open_serial_port(path)?);
		if let Some(interval) = self.poll_interval {
			hub.set_poll_interval(interval);
		}
		Ok(hub)
	}

	fn controller<B: Backend>(&self, backend: B) -> Controller<B> {
		let mut controller = Controller::from_backend(backend);
		if let Some(interval) = self.poll_interval {
			controller.set_poll_interval(interval);
		}
		controller
	}
}

impl Default for OpenSerialOptions {
	fn default() -> Self {
		OpenSerialOptions::new()
	}
}
