//! "Scope guards" that change a session setting and restore it when they go
//! out of scope.

use crate::{backend::Backend, connection::Connection};
use std::{io, marker::PhantomData, time::Duration};

/// A session, as required by the guards.
pub trait Session<B>: private::Sealed {
	/// Get the session's connection.
	#[doc(hidden)]
	fn connection_mut(&mut self) -> &mut Connection<B>;
	/// Get the session's poll interval.
	#[doc(hidden)]
	fn poll_interval_mut(&mut self) -> &mut Duration;
}

mod private {
	/// Marks a trait a sealed.
	pub trait Sealed {}
	impl<B> Sealed for crate::Controller<B> {}
	impl<B> Sealed for crate::Hub<B> {}
}

/// A "scope guard" that will update the session's read timeout and then reset
/// it when it goes out of scope.
///
/// To create a guard, use the session's [`timeout_guard`](crate::Controller::timeout_guard) method.
///
/// While the guard is in scope, the session can only be accessed through the
/// guard. However, because the guard implements [`Deref`](std::ops::Deref) and
/// [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the session.
///
/// If the original timeout cannot be restored, the session is poisoned and
/// its next operation returns the error.
#[derive(Debug)]
pub struct TimeoutGuard<'a, B: Backend, S: Session<B>> {
	/// The underlying session.
	session: &'a mut S,
	/// The original timeout that will be restored when the guard is dropped.
	original_timeout: Option<Duration>,
	backend_marker: PhantomData<B>,
}

impl<'a, B: Backend, S: Session<B>> TimeoutGuard<'a, B, S> {
	/// Update the session's timeout and return a [`TimeoutGuard`] wrapping the session.
	pub(crate) fn new(session: &'a mut S, timeout: Option<Duration>) -> Result<Self, io::Error> {
		let connection = session.connection_mut();
		let original_timeout = connection.read_timeout()?;
		connection.set_read_timeout(timeout)?;
		Ok(TimeoutGuard {
			session,
			original_timeout,
			backend_marker: PhantomData,
		})
	}
}

impl<B: Backend, S: Session<B>> std::ops::Deref for TimeoutGuard<'_, B, S> {
	type Target = S;
	/// Get a shared reference to the underlying session.
	fn deref(&self) -> &Self::Target {
		self.session
	}
}

impl<B: Backend, S: Session<B>> std::ops::DerefMut for TimeoutGuard<'_, B, S> {
	/// Get an exclusive reference to the underlying session.
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.session
	}
}

impl<B: Backend, S: Session<B>> std::ops::Drop for TimeoutGuard<'_, B, S> {
	fn drop(&mut self) {
		let connection = self.session.connection_mut();
		if let Err(err) = connection.backend_mut().set_read_timeout(self.original_timeout) {
			let message = match self.original_timeout {
				Some(timeout) => format!(
					"failed to reset timeout to {} ms: {err}",
					timeout.as_millis()
				),
				None => format!("failed to reset to an infinite timeout: {err}"),
			};
			log::warn!("{} {message}", connection.name());
			connection.poison(io::Error::other(message));
		}
	}
}

/// A "scope guard" that will update the session's poll interval and then
/// reset it when it goes out of scope.
///
/// To create a guard, use the session's
/// [`poll_interval_guard`](crate::Controller::poll_interval_guard) method.
#[derive(Debug)]
pub struct PollIntervalGuard<'a, B, S: Session<B>> {
	/// The underlying session.
	session: &'a mut S,
	/// The original poll interval that will be restored when the guard is dropped.
	original: Duration,
	backend_marker: PhantomData<B>,
}

impl<'a, B, S: Session<B>> PollIntervalGuard<'a, B, S> {
	/// Update the session's poll interval and return a guard wrapping the session.
	pub(crate) fn new(session: &'a mut S, interval: Duration) -> Self {
		let original = std::mem::replace(session.poll_interval_mut(), interval);
		PollIntervalGuard {
			session,
			original,
			backend_marker: PhantomData,
		}
	}
}

impl<B, S: Session<B>> std::ops::Deref for PollIntervalGuard<'_, B, S> {
	type Target = S;
	fn deref(&self) -> &Self::Target {
		self.session
	}
}

impl<B, S: Session<B>> std::ops::DerefMut for PollIntervalGuard<'_, B, S> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.session
	}
}

impl<B, S: Session<B>> std::ops::Drop for PollIntervalGuard<'_, B, S> {
	fn drop(&mut self) {
		*self.session.poll_interval_mut() = self.original;
	}
}
