//! Error types.
//!
//! Each error is represented by a unique type that implements [`std::error::Error`].
//! However, most APIs return more than one kind of error and so will return one
//! of the higher level [enums](#enums), such as [`CommandError`], [`DecodeError`],
//! or [`Error`]. The error types are convertible to the higher level enums,
//! allowing them to be used with `?`:
//!
//! ```
//! use asitiger::error::{DecodeError, Error};
//!
//! fn foo() -> Result<(), DecodeError> {
//!     // ...
//! # unimplemented!();
//! }
//!
//! fn bar() -> Result<(), Error> {
//!     foo()?;
//!     // ...
//! # Ok(())
//! }
//! ```
//!
//! Errors reported by the controller keep the command that was sent and the
//! raw reply that was received:
//!
//! ```
//! # use asitiger::error::UnrecognizedAxisParameterError;
//! # fn wrapper(error: UnrecognizedAxisParameterError) {
//! println!("{} -> {}", error.command(), error.response());
//! # }
//! ```

/// Implement Error and Display traits for the specified type.
///
/// After the type define the format string and any arguments it should
/// reference after `self =>` (to abide by macro hygiene rules).
macro_rules! impl_error_display {
	(
		$name:path,
		$self:ident =>
		$display:literal
		$(,
			$($arg:expr),+
		)?
	) => {
		impl std::error::Error for $name {}

		impl std::fmt::Display for $name {
			fn fmt(&$self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(
					f,
					$display
					$(,
						$($arg),+
					)?
				)
			}
		}
	};
}

/// Define error enums that contain concrete error types (not other error enums).
///
/// From and TryFrom traits will be implemented for the enum and it's underlying
/// errors. The enum's Display implementation will defer to the underlying errors'
/// Display implementations.
///
/// Simple implementations of From and TryFrom with other error enums can be
/// added by appending a succinct impl block, which assumes that:
///   * it is being implemented for this error enum,
///   * each variant has a single tuple value, and can be converted to the value
///     in this enum with its own From implementation.
///
/// ```compile_fail
/// # // This fails to compile because the macro is not exported.
/// error_enum!{
///     // This defines the enum and From/TryFrom between ThisError and A and B.
///     #[non_exhaustive]
///     pub enum ThisError {
///         VariantA(A),
///         VariantB(B),
///         // ...
///     }
///
///     // This implements a simple From/TryFrom between ThisError and OtherType.
///     impl From<OtherType> {
///         FromVariantA => VariantA,
///         // ...
///     }
/// }
/// ```
macro_rules! error_enum {
	(
		$(#[$attr:meta])*
		pub enum $name:ident {
			$(
				$variant:ident($inner:path)
			),+
			$(,)?
		}
		// Additional information for From/TryFrom impl blocks.
		$(
			impl From<$from_t:ident>
			{
				$($from_variant:ident => $to_variant:ident),+
				$(,)?
			}
		)*
	) => {
		// Define the error enum itself
		$(
			#[$attr]
		)*
		#[allow(missing_docs)]
		pub enum $name {
			$(
				$variant($inner)
			),+
		}

		impl std::error::Error for $name {}

		// Defer the display to the inner error type
		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				match self {
					$(
						$name::$variant(e) => e.fmt(f)
					),+
				}
			}
		}

		// Allow the enum to be convertible from an infallible error
		impl From<std::convert::Infallible> for $name {
			fn from(_: std::convert::Infallible) -> Self {
				unreachable!();
			}
		}

		// Conversions with underlying errors
		$(
			impl From<$inner> for $name {
				fn from(other: $inner) -> Self {
					$name::$variant(other)
				}
			}

			impl TryFrom<$name> for $inner {
				type Error = $name;
				fn try_from(other: $name) -> Result<Self, Self::Error> {
					match other {
						$name::$variant(value) => Ok(value),
						#[allow(unreachable_patterns)]
						value => Err(value)
					}
				}
			}
		)+

		// Conversions from other enum errors
		$(
			impl From<$from_t> for $name {
				fn from(other: $from_t) -> Self {
					match other {
						$($from_t::$from_variant(e) => $name::$to_variant(From::from(e))),+
					}
				}
			}

			impl TryFrom<$name> for $from_t {
				type Error = $name;
				fn try_from(other: $name) -> Result<Self, Self::Error> {
					match other {
						$(
							$name::$to_variant(e) => Ok($from_t::$from_variant(From::from(e)))
						),+
						,
						_ => Err(other)
					}
				}
			}
		)*
	};
}

mod command;
mod decode;

pub use command::*;
pub use decode::*;

/// The specified device is either disconnected or already in use by another process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SerialDeviceInUseOrDisconnectedError(Box<str>);

impl_error_display! {
	SerialDeviceInUseOrDisconnectedError,
	self =>
	"the specified device is either disconnected or already in use by another process: {}", self.0
}

/// The reply did not end with a line terminator before the backend ran out of data.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReplyMissingEndError(Box<[u8]>);

impl ReplyMissingEndError {
	/// Create a instance of the error
	pub(crate) fn new<R: AsRef<[u8]>>(bytes: R) -> Self {
		ReplyMissingEndError(Box::from(bytes.as_ref()))
	}

	/// Get the bytes that were received.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl_error_display! {
	ReplyMissingEndError,
	self => "reply missing line terminator: {}", String::from_utf8_lossy(&self.0).trim_end()
}

/// The reply contained bytes outside the ASCII range.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NonAsciiReplyError(Box<[u8]>);

impl NonAsciiReplyError {
	/// Create a instance of the error
	pub(crate) fn new<R: AsRef<[u8]>>(bytes: R) -> Self {
		NonAsciiReplyError(Box::from(bytes.as_ref()))
	}

	/// Get the bytes of the invalid reply.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl_error_display! {
	NonAsciiReplyError,
	self => "reply contains non-ASCII bytes: {}", String::from_utf8_lossy(&self.0).trim_end()
}

/// A Tiger hub rejected a command.
///
/// The hub does not report error codes, only the `:N` failure marker.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HubCommandFailedError(Box<(String, String)>);

impl HubCommandFailedError {
	pub(crate) fn new<C: Into<String>, R: Into<String>>(command: C, response: R) -> Self {
		HubCommandFailedError(Box::new((command.into(), response.into())))
	}

	/// The command that was sent.
	pub fn command(&self) -> &str {
		&self.0 .0
	}

	/// The raw reply to the command.
	pub fn response(&self) -> &str {
		&self.0 .1
	}
}

impl_error_display! {
	HubCommandFailedError,
	self => "command \"{}\" failed with response: {}", self.0.0, self.0.1
}

error_enum! {
	/// Any error returned by this library.
	#[derive(Debug)]
	#[non_exhaustive]
	pub enum Error {
		SerialDeviceInUseOrDisconnected(SerialDeviceInUseOrDisconnectedError),
		Io(std::io::Error),
		ReplyMissingEnd(ReplyMissingEndError),
		NonAsciiReply(NonAsciiReplyError),
		HubCommandFailed(HubCommandFailedError),
		UnknownCommand(UnknownCommandError),
		UnrecognizedAxisParameter(UnrecognizedAxisParameterError),
		MissingParameters(MissingParametersError),
		ParameterOutOfRange(ParameterOutOfRangeError),
		OperationFailed(OperationFailedError),
		Undefined(UndefinedError),
		InvalidCardAddress(InvalidCardAddressError),
		SerialCommandHalted(SerialCommandHaltedError),
		UnknownCode(UnknownCodeError),
		MalformedReply(MalformedReplyError),
		LengthMismatch(LengthMismatchError),
		MissingBuildField(MissingBuildFieldError),
		DuplicateAxis(DuplicateAxisError),
		UnknownAxisType(UnknownAxisTypeError),
		InvalidStatusByte(InvalidStatusByteError),
	}

	impl From<CommandError> {
		UnknownCommand => UnknownCommand,
		UnrecognizedAxisParameter => UnrecognizedAxisParameter,
		MissingParameters => MissingParameters,
		ParameterOutOfRange => ParameterOutOfRange,
		OperationFailed => OperationFailed,
		Undefined => Undefined,
		InvalidCardAddress => InvalidCardAddress,
		SerialCommandHalted => SerialCommandHalted,
		UnknownCode => UnknownCode,
	}

	impl From<DecodeError> {
		MalformedReply => MalformedReply,
		LengthMismatch => LengthMismatch,
		MissingBuildField => MissingBuildField,
		DuplicateAxis => DuplicateAxis,
		UnknownAxisType => UnknownAxisType,
		InvalidStatusByte => InvalidStatusByte,
	}
}

impl Error {
	/// A convenience function for determining if the error is due to the
	/// port timing out.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut)
	}

	/// Whether the error was reported by the controller itself (an `:N-<code>` reply).
	pub fn is_command_error(&self) -> bool {
		matches!(
			self,
			Error::UnknownCommand(_)
				| Error::UnrecognizedAxisParameter(_)
				| Error::MissingParameters(_)
				| Error::ParameterOutOfRange(_)
				| Error::OperationFailed(_)
				| Error::Undefined(_)
				| Error::InvalidCardAddress(_)
				| Error::SerialCommandHalted(_)
				| Error::UnknownCode(_)
		)
	}
}

impl From<serialport::Error> for Error {
	fn from(other: serialport::Error) -> Self {
		use std::io;

		match other.kind() {
			serialport::ErrorKind::NoDevice => Error::SerialDeviceInUseOrDisconnected(
				SerialDeviceInUseOrDisconnectedError(other.description.into_boxed_str()),
			),
			serialport::ErrorKind::InvalidInput => Error::Io(io::Error::new(
				io::ErrorKind::InvalidInput,
				other.description,
			)),
			serialport::ErrorKind::Unknown => Error::Io(io::Error::other(other.description)),
			serialport::ErrorKind::Io(kind) => Error::Io(io::Error::new(kind, other.description)),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn command_error_converts_both_ways() {
		let err: Error = CommandError::from(UndefinedError::new("CMD", ":N-6")).into();
		assert!(err.is_command_error());
		assert!(!err.is_timeout());
		let back = CommandError::try_from(err).unwrap();
		assert!(matches!(back, CommandError::Undefined(_)));
	}

	#[test]
	fn decode_error_is_not_a_command_error() {
		let err: Error = DecodeError::from(MalformedReplyError::new("bad", ":A X")).into();
		assert!(!err.is_command_error());
		assert!(CommandError::try_from(err).is_err());
	}

	#[test]
	fn timeout_detection() {
		let err = Error::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"));
		assert!(err.is_timeout());
	}

	#[test]
	fn hub_failure_display() {
		let err = HubCommandFailedError::new("M X=1", ":N");
		assert_eq!(err.to_string(), "command \"M X=1\" failed with response: :N");
		assert_eq!(err.command(), "M X=1");
		assert_eq!(err.response(), ":N");
	}
}
