//! The line-oriented transport shared by the controller and hub sessions.

use crate::{
	backend::{Backend, UNKNOWN_BACKEND_NAME},
	error::{Error, NonAsciiReplyError, ReplyMissingEndError},
};
use std::{io, time::Duration};

/// The byte that terminates every command.
pub const CARRIAGE_RETURN: u8 = b'\r';
/// The byte that terminates every reply.
pub const LINE_FEED: u8 = b'\n';

/// A connection to a Tiger device over some [`Backend`].
///
/// The connection knows nothing about the content of commands or replies. It
/// frames outgoing commands with a carriage return and reads incoming replies
/// up to a line feed.
pub struct Connection<B> {
	/// The underlying backend
	backend: B,
	/// If populated, the error that has "poisoned" the connection. It MUST be
	/// reported before the connection is used again.
	///
	/// A guard that fails to restore a setting in its `Drop` implementation
	/// cannot return the error, so it stores it here instead.
	poison: Option<io::Error>,
}

impl<B: Backend> std::fmt::Debug for Connection<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("name", &self.backend.name())
			.finish_non_exhaustive()
	}
}

impl<B: Backend> Connection<B> {
	/// Create a connection over the given backend.
	pub fn from_backend(backend: B) -> Self {
		Connection {
			backend,
			poison: None,
		}
	}

	/// The backend's name, or a placeholder if it has none.
	pub fn name(&self) -> String {
		self.backend
			.name()
			.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string())
	}

	/// Check if the connection is poisoned and report the error if it is.
	fn check_poisoned(&mut self) -> Result<(), io::Error> {
		if let Some(poison) = self.poison.take() {
			Err(poison)
		} else {
			Ok(())
		}
	}

	/// Poison the connection so that the next operation reports `error`.
	pub(crate) fn poison(&mut self, error: io::Error) {
		self.poison = Some(error);
	}

	/// Clear the backend's input and output buffers and then write `bytes`.
	///
	/// Anything the device sent before this call is discarded, so the next
	/// read returns the device's reply to these bytes.
	pub fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.check_poisoned()?;
		self.backend.clear_buffers()?;
		log::debug!(
			"{} TX:   {}",
			self.name(),
			String::from_utf8_lossy(bytes).trim_end()
		);
		self.backend.write_all(bytes)?;
		self.backend.flush()?;
		Ok(())
	}

	/// Send `command` terminated with a carriage return.
	pub fn send_command(&mut self, command: &str) -> Result<(), Error> {
		let mut bytes = Vec::with_capacity(command.len() + 1);
		bytes.extend_from_slice(command.as_bytes());
		bytes.push(CARRIAGE_RETURN);
		self.send(&bytes)
	}

	/// Read one reply.
	///
	/// Blocks until a line feed is read or the backend's read timeout elapses.
	/// A timeout before any byte arrives is an I/O error; a timeout or end of
	/// stream part way through a reply is a [`ReplyMissingEndError`].
	///
	/// The reply is returned with surrounding whitespace removed. Multi-line
	/// replies keep their internal carriage returns.
	pub fn read_response(&mut self) -> Result<String, Error> {
		self.check_poisoned()?;
		let mut buf = Vec::with_capacity(64);
		for byte in io::Read::bytes(&mut self.backend) {
			let byte = match byte {
				Ok(byte) => byte,
				// The device stopped mid-reply.
				Err(e) if e.kind() == io::ErrorKind::TimedOut && !buf.is_empty() => break,
				Err(e) => return Err(e.into()),
			};
			buf.push(byte);
			if byte == LINE_FEED {
				break;
			}
		}
		log::debug!(
			"{} RECV: {}",
			self.name(),
			String::from_utf8_lossy(&buf).trim_end()
		);
		if buf.last() != Some(&LINE_FEED) {
			return Err(ReplyMissingEndError::new(buf).into());
		}
		if !buf.is_ascii() {
			return Err(NonAsciiReplyError::new(buf).into());
		}
		let reply: String = buf.iter().copied().map(char::from).collect();
		Ok(reply.trim().to_string())
	}

	/// Set the read timeout.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		self.check_poisoned()?;
		self.backend.set_read_timeout(timeout)
	}

	/// Get the read timeout.
	pub fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		self.backend.read_timeout()
	}

	/// Get a reference to the backend.
	pub fn backend(&self) -> &B {
		&self.backend
	}

	/// Get a mutable reference to the backend.
	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	/// Release the connection, returning the backend.
	///
	/// Dropping the returned [`Serial`](crate::backend::Serial) backend closes the port.
	pub fn disconnect(self) -> B {
		log::debug!("{} disconnected", self.name());
		self.backend
	}
}
