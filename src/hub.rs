//! A session with an ASI Tiger hub.
//!
//! The hub speaks a reduced version of the controller protocol. It reports
//! failure with a bare `:N` reply instead of an error code, and only a few
//! commands are supported.

use crate::{
	backend::{Backend, Serial},
	command::{CommandBuilder, Coordinates, Verb},
	connection::Connection,
	controller::OpenSerialOptions,
	error::{Error, HubCommandFailedError},
	guard::{PollIntervalGuard, Session, TimeoutGuard},
};
use std::{io, time::Duration};

/// The prefix of a reply reporting that the hub rejected a command.
pub const FAILURE_PREFIX: &str = ":N";

/// A session with an ASI Tiger hub.
pub struct Hub<B> {
	connection: Connection<B>,
	poll_interval: Duration,
}

impl<B: Backend> std::fmt::Debug for Hub<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Hub")
			.field("name", &self.connection.name())
			.field("poll_interval", &self.poll_interval)
			.finish_non_exhaustive()
	}
}

impl Hub<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Use [`OpenSerialOptions::open_hub`] to customize how the port is opened.
	pub fn open(path: &str) -> Result<Hub<Serial>, Error> {
		OpenSerialOptions::new().open_hub(path)
	}
}

impl<B: Backend> Hub<B> {
	/// The default interval between status polls: 100 ms.
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

	/// Create a session over any [`Backend`].
	pub fn from_backend(backend: B) -> Self {
		Hub {
			connection: Connection::from_backend(backend),
			poll_interval: Self::DEFAULT_POLL_INTERVAL,
		}
	}

	/// Send a command and read its reply.
	///
	/// ## Errors
	///
	/// A reply starting with `:N` is a [`HubCommandFailedError`].
	pub fn send_command<C: AsRef<str>>(&mut self, command: C) -> Result<String, Error> {
		let command = command.as_ref();
		self.connection.send_command(command)?;
		let response = self.connection.read_response()?;
		if response.starts_with(FAILURE_PREFIX) {
			return Err(HubCommandFailedError::new(command, response).into());
		}
		Ok(response)
	}

	/// Whether the hub reports that it is busy (a `/` reply of exactly `B`).
	pub fn is_busy(&mut self) -> Result<bool, Error> {
		Ok(self.send_command(Verb::Status)? == "B")
	}

	/// Poll the status until the hub is idle.
	///
	/// Polls every `poll_interval`, or the session's
	/// [`poll_interval`](Hub::poll_interval) if it is `None` or zero.
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

	/// Home all axes.
	pub fn home(&mut self) -> Result<String, Error> {
		self.send_command(Verb::Home)
	}

	/// Move axes to absolute positions.
	pub fn move_absolute<C: Into<Coordinates>>(&mut self, coordinates: C) -> Result<String, Error> {
		let command = CommandBuilder::new(Verb::Move).coordinates(coordinates);
		self.send_command(command.to_string())
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
	pub fn poll_interval_guard(&mut self, interval: Duration) -> PollIntervalGuard<'_, B, Self> {
		PollIntervalGuard::new(self, interval)
	}

	/// Change the read timeout until the returned guard is dropped.
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B, Self>, io::Error> {
		TimeoutGuard::new(self, timeout)
	}

	/// Set the read timeout.
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
	pub fn disconnect(self) {
		drop(self.connection.disconnect());
	}
}

impl<B: Backend> Session<B> for Hub<B> {
	fn connection_mut(&mut self) -> &mut Connection<B> {
		&mut self.connection
	}
	fn poll_interval_mut(&mut self) -> &mut Duration {
		&mut self.poll_interval
	}
}
