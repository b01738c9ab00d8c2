//! A session with an ASI Tiger controller.
//!
//! Open a serial port with [`Controller::open`] or [`OpenSerialOptions`],
//! then call one method per protocol command:
//!
//! ```rust
//! # use asitiger::Controller;
//! # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tiger = Controller::open("/dev/ttyUSB0")?;
//! for axis in tiger.axes(None)? {
//!     println!("{} is a {:?} on card {}", axis.label, axis.axis_type, axis.address);
//! }
//! tiger.move_absolute([("X", 1000.0), ("Y", -250.0)])?;
//! tiger.wait_until_idle(None)?;
//! # Ok(())
//! # }
//! ```
//!
//! Every method sends a single command and reads a single reply, so a
//! session must not be shared between threads without external locking.

mod options;
#[cfg(test)]
mod test;

pub use options::OpenSerialOptions;

use crate::{
	axis::Axis,
	backend::{Backend, Serial},
	check::check_response,
	command::{CommandBuilder, Coordinates, Value, Verb},
	connection::Connection,
	error::{Error, MalformedReplyError},
	guard::{PollIntervalGuard, Session, TimeoutGuard},
	response::{parse_fields_as, parse_where},
	secure::resolve_value,
	status::{statuses_for_rdstat, AxisState, Status},
};
use std::{collections::BTreeMap, io, time::Duration};

/// A session with an ASI Tiger controller.
pub struct Controller<B> {
	/// The transport
	connection: Connection<B>,
	/// The interval between status polls in `wait_until_idle`
	poll_interval: Duration,
}

impl<B: Backend> std::fmt::Debug for Controller<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Controller")
			.field("name", &self.connection.name())
			.field("poll_interval", &self.poll_interval)
			.finish_non_exhaustive()
	}
}

impl Controller<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Alternatively, use [`Controller::open_serial_options`] to customize how the port is opened.
	///
	/// ## Example
	///
	/// ```rust
	/// # use asitiger::Controller;
	/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut tiger = Controller::open("/dev/ttyUSB0")?;
	/// // Or equivalently
	/// let mut tiger = Controller::open_serial_options().open("/dev/ttyUSB0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open(path: &str) -> Result<Controller<Serial>, Error> {
		OpenSerialOptions::new().open(path)
	}

	/// Get an [`OpenSerialOptions`] to customize how a serial port is opened.
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::default()
	}
}

impl<B: Backend> Controller<B> {
	/// The default interval between status polls: 10 ms.
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

	/// Create a session over any [`Backend`].
	pub fn from_backend(backend: B) -> Self {
		Controller {
			connection: Connection::from_backend(backend),
			poll_interval: Self::DEFAULT_POLL_INTERVAL,
		}
	}

	/// Send a command and read its reply.
	///
	/// The reply is returned as is, with surrounding whitespace removed.
	///
	/// ## Errors
	///
	/// A reply carrying the `:N-<code>` error sentinel is returned as the
	/// matching [`CommandError`](crate::error::CommandError) variant. The
	/// session remains usable afterwards.
	pub fn send_command<C: AsRef<str>>(&mut self, command: C) -> Result<String, Error> {
		let command = command.as_ref();
		self.connection.send_command(command)?;
		let response = self.connection.read_response()?;
		check_response(command, &response)?;
		Ok(response)
	}

	fn send(&mut self, command: &CommandBuilder) -> Result<String, Error> {
		self.send_command(command.to_string())
	}

	/// Get the build report of the current card, or of the card at `card_address`.
	///
	/// The report is split into its lines.
	pub fn build(&mut self, card_address: Option<u32>) -> Result<Vec<String>, Error> {
		let response = self.send(
			&CommandBuilder::new(Verb::Build)
				.args(["X"])
				.card_address(card_address),
		)?;
		Ok(response.split('\r').map(str::to_string).collect())
	}

	/// Get the axes installed in the current card, or the card at `card_address`.
	pub fn axes(&mut self, card_address: Option<u32>) -> Result<Vec<Axis>, Error> {
		let build = self.build(card_address)?;
		Ok(Axis::from_build(&build)?)
	}

	/// Stop all motion.
	pub fn halt(&mut self) -> Result<(), Error> {
		self.send(&CommandBuilder::new(Verb::Halt)).map(drop)
	}

	/// Redefine the current position of the given axes.
	pub fn here<C: Into<Coordinates>>(&mut self, coordinates: C) -> Result<String, Error> {
		self.send(&CommandBuilder::new(Verb::Here).coordinates(coordinates))
	}

	/// Move the given axes to their home positions.
	pub fn home<A: AsRef<str>>(&mut self, axes: &[A]) -> Result<String, Error> {
		self.send(&CommandBuilder::new(Verb::Home).args(axes))
	}

	/// Set LED brightnesses, on the current card or the card at `card_address`.
	pub fn led<C: Into<Coordinates>>(
		&mut self,
		brightnesses: C,
		card_address: Option<u32>,
	) -> Result<(), Error> {
		self.send(
			&CommandBuilder::new(Verb::Led)
				.coordinates(brightnesses)
				.card_address(card_address),
		)
		.map(drop)
	}

	/// Enable (`+`) or disable (`-`) motor control of the given axes.
	pub fn motor_control<C: Into<Coordinates>>(&mut self, states: C) -> Result<(), Error> {
		self.send(
			&CommandBuilder::new(Verb::MotorControl)
				.coordinates(states)
				.flags(&["+", "-"]),
		)
		.map(drop)
	}

	/// Enable motor control of the given axes.
	pub fn enable_axes<A: AsRef<str>>(&mut self, axes: &[A]) -> Result<(), Error> {
		self.motor_control(axes.iter().map(|axis| (axis.as_ref(), "+")).collect::<Coordinates>())
	}

	/// Disable motor control of the given axes.
	pub fn disable_axes<A: AsRef<str>>(&mut self, axes: &[A]) -> Result<(), Error> {
		self.motor_control(axes.iter().map(|axis| (axis.as_ref(), "-")).collect::<Coordinates>())
	}

	/// Move the given axes to absolute positions.
	pub fn move_absolute<C: Into<Coordinates>>(&mut self, coordinates: C) -> Result<String, Error> {
		self.send(&CommandBuilder::new(Verb::Move).coordinates(coordinates))
	}

	/// Move the given axes by the given offsets, using the controller's
	/// relative move command.
	pub fn move_relative<C: Into<Coordinates>>(&mut self, offsets: C) -> Result<String, Error> {
		self.send(&CommandBuilder::new(Verb::MoveRelative).coordinates(offsets))
	}

	/// Move the given axes by the given offsets, by reading their current
	/// positions and then issuing an absolute move.
	///
	/// This costs two round trips and is not atomic: an axis that moves
	/// between the two commands ends up relative to where it was read.
	///
	/// ## Errors
	///
	/// An offset or position that is not numeric is a [`MalformedReplyError`].
	pub fn move_relative_emulated<C: Into<Coordinates>>(
		&mut self,
		offsets: C,
	) -> Result<String, Error> {
		let offsets = offsets.into();
		let axes: Vec<&str> = offsets.axes().collect();
		let current = self.position(&axes)?;
		let mut target = Coordinates::new();
		for (axis, offset) in offsets.iter() {
			let position = current.get(axis).and_then(Value::as_f64);
			match (position, offset.as_f64()) {
				(Some(position), Some(offset)) => {
					target.insert(axis, position + offset);
				}
				_ => {
					return Err(MalformedReplyError::new(
						format!("cannot offset `{axis}` by `{offset}`"),
						format!("{current:?}"),
					)
					.into());
				}
			}
		}
		self.move_absolute(target)
	}

	/// Read the status of the given axes.
	///
	/// Axes suffixed with `?` (e.g. `Y?`) report a coarse status, the others
	/// a detailed status byte.
	pub fn rdstat<A: AsRef<str>>(&mut self, axes: &[A]) -> Result<Vec<AxisState>, Error> {
		let response = self.send(&CommandBuilder::new(Verb::Rdstat).args(axes))?;
		Ok(statuses_for_rdstat(&response)?)
	}

	/// Drive secure outputs, on the current card or the card at `card_address`.
	pub fn secure<C: Into<Coordinates>>(
		&mut self,
		settings: C,
		card_address: Option<u32>,
	) -> Result<(), Error> {
		self.send(
			&CommandBuilder::new(Verb::Secure)
				.coordinates(settings)
				.card_address(card_address),
		)
		.map(drop)
	}

	/// Lock or unlock the plate lock.
	///
	/// `position` is either a [`SecurePosition`](crate::secure::SecurePosition)
	/// or a raw value, which is sent as is.
	pub fn set_plate_lock<V: Into<Value>>(
		&mut self,
		position: V,
		card_address: Option<u32>,
	) -> Result<(), Error> {
		self.secure([("X", resolve_value(position))], card_address)
	}

	/// Set the home position of the given axes. A value of `+` uses the
	/// current position.
	pub fn set_home<C: Into<Coordinates>>(&mut self, axes: C) -> Result<String, Error> {
		self.send(
			&CommandBuilder::new(Verb::SetHome)
				.coordinates(axes)
				.flags(&["+"]),
		)
	}

	/// Set speeds, or query them with a value of `?`.
	///
	/// The speeds reported in the reply are returned.
	pub fn speed<C: Into<Coordinates>>(&mut self, axes: C) -> Result<BTreeMap<String, f64>, Error> {
		let response = self.send(
			&CommandBuilder::new(Verb::Speed)
				.coordinates(axes)
				.flags(&["?"]),
		)?;
		Ok(parse_fields_as(&response)?)
	}

	/// Get whether any axis is moving.
	pub fn status(&mut self) -> Result<Status, Error> {
		let response = self.send(&CommandBuilder::new(Verb::Status))?;
		Ok(Status::from_reply(&response)?)
	}

	/// Whether any axis is moving.
	pub fn is_busy(&mut self) -> Result<bool, Error> {
		Ok(self.status()? == Status::Busy)
	}

	/// Poll the status until the controller is idle.
	///
	/// Polls every `poll_interval`, or the session's
	/// [`poll_interval`](Controller::poll_interval) if it is `None` or zero.
	pub fn wait_until_idle(&mut self, poll_interval: Option<Duration>) -> Result<(), Error> {
		let interval = poll_interval
			.filter(|interval| !interval.is_zero())
			.unwrap_or(self.poll_interval);
		while self.is_busy()? {
			log::trace!("{} busy, polling again in {interval:?}", self.connection.name());
			std::thread::sleep(interval);
		}
		Ok(())
	}

	/// Get the positions of the given axes.
	pub fn position<A: AsRef<str>>(&mut self, axes: &[A]) -> Result<Coordinates, Error> {
		let response = self.send(&CommandBuilder::new(Verb::Where).args(axes))?;
		Ok(parse_where(axes, &response)?)
	}

	/// Get the cards installed in the controller, one per line.
	pub fn who(&mut self) -> Result<Vec<String>, Error> {
		let response = self.send(&CommandBuilder::new(Verb::Who))?;
		Ok(response.split('\r').map(str::to_string).collect())
	}

	/// Set the default interval between status polls.
	pub fn set_poll_interval(&mut self, interval: Duration) {
		self.poll_interval = interval;
	}

	/// Get the default interval between status polls.
	pub fn poll_interval(&self) -> Duration {
		self.poll_interval
	}

	/// Change the poll interval until the returned guard is dropped.
	///
	/// ```rust
	/// # use asitiger::{backend::Backend, Controller};
	/// # use std::time::Duration;
	/// # fn wrapper<B: Backend>(mut tiger: Controller<B>) -> Result<(), asitiger::error::Error> {
	/// {
	///     let mut tiger = tiger.poll_interval_guard(Duration::from_millis(500));
	///     tiger.home(&["X", "Y"])?;
	///     tiger.wait_until_idle(None)?;
	/// }
	/// // The original interval is restored here.
	/// # Ok(())
	/// # }
	/// ```
	pub fn poll_interval_guard(&mut self, interval: Duration) -> PollIntervalGuard<'_, B, Self> {
		PollIntervalGuard::new(self, interval)
	}

	/// Change the read timeout until the returned guard is dropped.
	///
	/// If the original timeout cannot be restored, the next operation on the
	/// session returns that error.
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B, Self>, io::Error> {
		TimeoutGuard::new(self, timeout)
	}

	/// Set the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		self.connection.set_read_timeout(timeout)
	}

	/// Get the read timeout.
	pub fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		self.connection.read_timeout()
	}

	/// The name of the underlying backend.
	pub fn name(&self) -> String {
		self.connection.name()
	}

	/// Get a reference to the underlying backend.
	pub fn backend(&self) -> &B {
		self.connection.backend()
	}

	/// Get a mutable reference to the underlying backend.
	pub fn backend_mut(&mut self) -> &mut B {
		self.connection.backend_mut()
	}

	/// Consume the session and return the underlying backend.
	pub fn into_backend(self) -> B {
		self.connection.disconnect()
	}

	/// Close the session.
	///
	/// For a [`Serial`] backend, the port is closed.
	pub fn disconnect(self) {
		drop(self.connection.disconnect());
	}
}

impl<B: Backend> Session<B> for Controller<B> {
	fn connection_mut(&mut self) -> &mut Connection<B> {
		&mut self.connection
	}
	fn poll_interval_mut(&mut self) -> &mut Duration {
		&mut self.poll_interval
	}
}
