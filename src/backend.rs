//! Types that can exchange (read/write) bytes with a Tiger controller or hub.
//!
//! The [`Backend`] trait represents all such types.

#[cfg(any(test, feature = "mock"))]
use std::collections::VecDeque;
use std::io;
#[cfg(test)]
use std::io::Read as _;
use std::time::Duration;

use serialport as sp;

#[cfg(windows)]
use sp::COMPort as ExternSerial;
use sp::SerialPort;
#[cfg(unix)]
use sp::TTYPort as ExternSerial;

/// The placeholder name for a backend that doesn't have a name.
pub(crate) const UNKNOWN_BACKEND_NAME: &str = "<unknown backend>";

/// Types that allow reading and writing bytes with a connected device.
pub trait Backend: io::Read + io::Write + private::Sealed {
	/// Set the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error>;

	/// Get the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error>;

	/// Discard any bytes waiting to be read and any bytes not yet transmitted.
	fn clear_buffers(&mut self) -> Result<(), io::Error>;

	/// Get the "name" of the backend.
	///
	/// This can be in any format, but should uniquely identify the backend
	/// instance.
	fn name(&self) -> Option<String>;
}

impl<C: Backend + ?Sized> Backend for Box<C> {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		(**self).set_read_timeout(timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		(**self).read_timeout()
	}
	fn clear_buffers(&mut self) -> Result<(), io::Error> {
		(**self).clear_buffers()
	}
	fn name(&self) -> Option<String> {
		(**self).name()
	}
}

impl<C: Backend + ?Sized> Backend for &mut C {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		(**self).set_read_timeout(timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		(**self).read_timeout()
	}
	fn clear_buffers(&mut self) -> Result<(), io::Error> {
		(**self).clear_buffers()
	}
	fn name(&self) -> Option<String> {
		(**self).name()
	}
}

/// A platform agnostic serial port backend.
//
// `serialport` exposes `COMPort` on windows and `TTYPort` on unix. Only one of
// them exists on any given platform, so wrap whichever it is in a newtype
// rather than making every session generic over the port type or boxing it.
#[derive(Debug)]
pub struct Serial(pub(crate) ExternSerial);

impl io::Read for Serial {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.0.read(buf)
	}
}

impl io::Write for Serial {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.write(buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.0.flush()
	}
}

impl Backend for Serial {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		// serialport has no infinite timeout; the largest duration is close enough.
		Ok(self.0.set_timeout(timeout.unwrap_or(Duration::MAX))?)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		Ok(Some(self.0.timeout()))
	}
	fn clear_buffers(&mut self) -> Result<(), io::Error> {
		Ok(self.0.clear(sp::ClearBuffer::All)?)
	}
	fn name(&self) -> Option<String> {
		self.0.name()
	}
}

/// A mock backend for use in testing.
///
/// It behaves like a controller that answers each command with the next
/// queued reply:
///   * Replies queued with [`push_reply`](Mock::push_reply) become readable
///     once a command (any write containing a `\r`) has been written.
///   * Bytes queued with [`push_stale`](Mock::push_stale) are readable
///     immediately and are discarded by [`Backend::clear_buffers`].
///   * Everything written is recorded and available via [`written`](Mock::written).
///   * Specific errors can be inserted for calls to `read`, `write`, `flush`,
///     `clear_buffers`, and `set_read_timeout`.
///   * Reading with no data available returns a [`TimedOut`](io::ErrorKind::TimedOut) error.
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(all(doc, feature = "doc_cfg"), doc(cfg(feature = "mock")))]
#[derive(Debug)]
pub struct Mock {
	/// The buffer data is read from
	buffer: io::Cursor<Vec<u8>>,
	/// Replies waiting for a command to be written
	replies: VecDeque<Vec<u8>>,
	/// Everything written so far
	written: Vec<u8>,
	/// The number of times `clear_buffers` succeeded
	clear_count: usize,
	/// The error to surface on the next read, if any. It is only surfaced once.
	read_error: Option<io::Error>,
	/// The error to surface on the next write, if any. It is only surfaced once.
	write_error: Option<io::Error>,
	/// The error to surface on the next flush, if any. It is only surfaced once.
	flush_error: Option<io::Error>,
	/// The error to surface on the next clear_buffers, if any. It is only surfaced once.
	clear_error: Option<io::Error>,
	/// The error to surface on the next set_read_timeout, if any. It is only surfaced once.
	set_read_timeout_error: Option<io::Error>,
	/// The read timeout, which is otherwise ignored.
	read_timeout: Option<Duration>,
}

#[cfg(any(test, feature = "mock"))]
impl Mock {
	/// Create a new Mock backend.
	pub fn new() -> Self {
		Mock {
			buffer: io::Cursor::new(Vec::new()),
			replies: VecDeque::new(),
			written: Vec::new(),
			clear_count: 0,
			read_error: None,
			write_error: None,
			flush_error: None,
			clear_error: None,
			set_read_timeout_error: None,
			read_timeout: Some(Duration::from_secs(10)),
		}
	}
	/// Queue the reply to the next unanswered command.
	///
	/// The data is not validated in any way, so it should normally end in
	/// `\r\n` like a real reply.
	pub fn push_reply<T: AsRef<[u8]>>(&mut self, bytes: T) {
		self.replies.push_back(bytes.as_ref().to_vec());
	}
	/// Append data to the read buffer right away, as if the device had sent
	/// it unprompted.
	pub fn push_stale<T: AsRef<[u8]>>(&mut self, bytes: T) {
		self.buffer.get_mut().extend_from_slice(bytes.as_ref());
	}
	/// Clear the read buffer and any queued replies.
	pub fn clear(&mut self) {
		self.discard_readable();
		self.replies.clear();
	}
	/// All bytes written so far.
	pub fn written(&self) -> &[u8] {
		&self.written
	}
	/// Take all bytes written so far, leaving the record empty.
	pub fn take_written(&mut self) -> Vec<u8> {
		std::mem::take(&mut self.written)
	}
	/// The number of times the buffers have been cleared.
	pub fn clear_count(&self) -> usize {
		self.clear_count
	}
	/// Whether the mock has any data available or not
	pub fn is_empty(&self) -> bool {
		usize::try_from(self.buffer.position()).unwrap_or(usize::MAX) >= self.buffer.get_ref().len()
	}
	/// Whether all queued replies have been released.
	pub fn replies_exhausted(&self) -> bool {
		self.replies.is_empty()
	}
	/// Set the error for the next `read`, if any.
	pub fn read_error(&mut self, err: Option<io::Error>) {
		self.read_error = err;
	}
	/// Set the error for the next `write`, if any.
	pub fn write_error(&mut self, err: Option<io::Error>) {
		self.write_error = err;
	}
	/// Set the error for the next `flush`, if any.
	pub fn flush_error(&mut self, err: Option<io::Error>) {
		self.flush_error = err;
	}
	/// Set the error for the next `clear_buffers`, if any.
	pub fn clear_error(&mut self, err: Option<io::Error>) {
		self.clear_error = err;
	}
	/// Set the error for the next `set_read_timeout`, if any.
	pub fn set_read_timeout_error(&mut self, err: Option<io::Error>) {
		self.set_read_timeout_error = err;
	}

	fn discard_readable(&mut self) {
		self.buffer.get_mut().clear();
		self.buffer.set_position(0);
	}
}

#[cfg(any(test, feature = "mock"))]
impl Default for Mock {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(any(test, feature = "mock"))]
impl Backend for Mock {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		if let Some(err) = self.set_read_timeout_error.take() {
			Err(err)
		} else {
			self.read_timeout = timeout;
			Ok(())
		}
	}

	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		Ok(self.read_timeout)
	}

	fn clear_buffers(&mut self) -> Result<(), io::Error> {
		if let Some(err) = self.clear_error.take() {
			Err(err)
		} else {
			self.discard_readable();
			self.clear_count += 1;
			Ok(())
		}
	}

	fn name(&self) -> Option<String> {
		Some(format!("<mock {:p}>", std::ptr::from_ref(self)))
	}
}

#[cfg(any(test, feature = "mock"))]
impl io::Read for Mock {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if let Some(err) = self.read_error.take() {
			Err(err)
		} else if self.is_empty() {
			// A real port would wait and then time out.
			Err(io::Error::new(
				io::ErrorKind::TimedOut,
				"Simulated timeout error",
			))
		} else {
			self.buffer.read(buf)
		}
	}
}

#[cfg(any(test, feature = "mock"))]
impl io::Write for Mock {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		if let Some(err) = self.write_error.take() {
			return Err(err);
		}
		self.written.extend_from_slice(buf);
		for _ in buf.iter().filter(|b| **b == b'\r') {
			if let Some(reply) = self.replies.pop_front() {
				self.buffer.get_mut().extend_from_slice(&reply);
			}
		}
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		if let Some(err) = self.flush_error.take() {
			Err(err)
		} else {
			Ok(())
		}
	}
}

mod private {
	pub trait Sealed {}

	impl Sealed for super::Serial {}
	#[cfg(any(test, feature = "mock"))]
	impl Sealed for super::Mock {}
	impl<C: super::Backend + ?Sized> Sealed for Box<C> {}
	impl<C: super::Backend + ?Sized> Sealed for &mut C {}
}

#[cfg(test)]
mod test {
	use super::*;
	use io::Write as _;

	#[test]
	fn replies_are_released_by_commands() {
		let mut mock = Mock::new();
		mock.push_reply(":A\r\n");
		mock.push_reply(":A 1\r\n");
		assert!(mock.is_empty());

		mock.write_all(b"W X").unwrap();
		assert!(mock.is_empty());
		mock.write_all(b"\r").unwrap();
		let mut buf = [0; 16];
		let n = mock.read(&mut buf).unwrap();
		assert_eq!(&buf[..n], b":A\r\n");
		assert!(!mock.replies_exhausted());
		assert_eq!(mock.written(), b"W X\r");
	}

	#[test]
	fn clearing_discards_stale_bytes() {
		let mut mock = Mock::new();
		mock.push_stale("junk");
		mock.push_reply(":A\r\n");
		assert!(!mock.is_empty());
		mock.clear_buffers().unwrap();
		assert!(mock.is_empty());
		assert_eq!(mock.clear_count(), 1);
		// Queued replies are not affected.
		mock.write_all(b"/\r").unwrap();
		assert!(!mock.is_empty());
	}

	#[test]
	fn empty_read_times_out() {
		let mut mock = Mock::new();
		let err = mock.read(&mut [0; 4]).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::TimedOut);
	}
}
