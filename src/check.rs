//! Classification of controller replies.
//!
//! A Tiger controller reports a failed command with a reply containing the
//! error sentinel `:N-` followed by a numeric code, for instance `:N-2` when a
//! command names an axis that is not installed. [`check_response`] maps such
//! a reply onto the matching [`CommandError`] and lets every other reply
//! through untouched.
//!
//! ```
//! # use asitiger::check::check_response;
//! # use asitiger::error::CommandError;
//! assert!(check_response("W X", ":A 100").is_ok());
//!
//! let err = check_response("W Q", ":N-2").unwrap_err();
//! assert!(matches!(err, CommandError::UnrecognizedAxisParameter(_)));
//! ```

use crate::error::CommandError;

/// The text that marks a reply as a failure. The error code follows it.
pub const ERROR_SENTINEL: &str = ":N-";

/// The kinds of errors a controller can report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	/// Code `1`.
	UnknownCommand,
	/// Code `2`.
	UnrecognizedAxisParameter,
	/// Code `3`.
	MissingParameters,
	/// Code `4`.
	ParameterOutOfRange,
	/// Code `5`.
	OperationFailed,
	/// Code `6`.
	Undefined,
	/// Code `7`.
	InvalidCardAddress,
	/// Code `21`.
	SerialCommandHalted,
	/// Any code not listed above.
	UnknownCode,
}

impl ErrorCode {
	/// Look up the kind of error for the code text found after the sentinel.
	///
	/// The code is matched exactly, so `"02"` or `"2 "` are unknown codes.
	pub fn from_code(code: &str) -> ErrorCode {
		match code {
			"1" => ErrorCode::UnknownCommand,
			"2" => ErrorCode::UnrecognizedAxisParameter,
			"3" => ErrorCode::MissingParameters,
			"4" => ErrorCode::ParameterOutOfRange,
			"5" => ErrorCode::OperationFailed,
			"6" => ErrorCode::Undefined,
			"7" => ErrorCode::InvalidCardAddress,
			"21" => ErrorCode::SerialCommandHalted,
			_ => ErrorCode::UnknownCode,
		}
	}

	/// The numeric code, or `None` for [`ErrorCode::UnknownCode`].
	pub fn code(&self) -> Option<u8> {
		match self {
			ErrorCode::UnknownCommand => Some(1),
			ErrorCode::UnrecognizedAxisParameter => Some(2),
			ErrorCode::MissingParameters => Some(3),
			ErrorCode::ParameterOutOfRange => Some(4),
			ErrorCode::OperationFailed => Some(5),
			ErrorCode::Undefined => Some(6),
			ErrorCode::InvalidCardAddress => Some(7),
			ErrorCode::SerialCommandHalted => Some(21),
			ErrorCode::UnknownCode => None,
		}
	}
}

/// Get the error code text in `response`, if the response is a failure.
///
/// The code is everything after the first [`ERROR_SENTINEL`] up to the end of
/// that line. It may be empty: a bare `:N-` is still a failure and is
/// classified as [`ErrorCode::UnknownCode`].
pub fn error_code(response: &str) -> Option<&str> {
	let start = response.find(ERROR_SENTINEL)? + ERROR_SENTINEL.len();
	let rest = &response[start..];
	Some(rest.split('\n').next().unwrap_or(rest))
}

/// Check the `response` to `command`.
///
/// Returns the matching [`CommandError`] if the response contains the
/// [`ERROR_SENTINEL`], otherwise `Ok(())`.
pub fn check_response(command: &str, response: &str) -> Result<(), CommandError> {
	match error_code(response) {
		Some(code) => Err(CommandError::new(
			ErrorCode::from_code(code),
			command,
			response,
		)),
		None => Ok(()),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn success_is_not_an_error() {
		assert!(check_response("CMD", ":A").is_ok());
		assert!(check_response("CMD", ":A X=1 Y=2").is_ok());
		// The hub style failure marker without a code is not a controller error.
		assert!(check_response("CMD", ":N").is_ok());
	}

	#[test]
	fn known_codes() {
		let cases = [
			(":N-1", ErrorCode::UnknownCommand),
			(":N-2", ErrorCode::UnrecognizedAxisParameter),
			(":N-3", ErrorCode::MissingParameters),
			(":N-4", ErrorCode::ParameterOutOfRange),
			(":N-5", ErrorCode::OperationFailed),
			(":N-6", ErrorCode::Undefined),
			(":N-7", ErrorCode::InvalidCardAddress),
			(":N-21", ErrorCode::SerialCommandHalted),
		];
		for (response, expected) in cases {
			let code = error_code(response).unwrap();
			assert_eq!(ErrorCode::from_code(code), expected, "{response}");
			assert_eq!(expected.code().map(|c| c.to_string()).as_deref(), Some(code));
		}
	}

	#[test]
	fn unrecognized_axis() {
		let err = check_response("CMD", ":N-2").unwrap_err();
		assert!(matches!(err, CommandError::UnrecognizedAxisParameter(_)));
		assert_eq!(err.command(), "CMD");
		assert_eq!(err.response(), ":N-2");
	}

	#[test]
	fn unmapped_code_is_unknown() {
		let err = check_response("CMD", ":N-123").unwrap_err();
		assert!(matches!(err, CommandError::UnknownCode(_)));
		assert_eq!(ErrorCode::UnknownCode.code(), None);
	}

	#[test]
	fn sentinel_anywhere_in_the_reply() {
		assert_eq!(error_code("1:N-7"), Some("7"));
		assert_eq!(error_code(":N-4\nextra"), Some("4"));
	}

	#[test]
	fn empty_code_is_unknown() {
		assert_eq!(error_code(":N-"), Some(""));
		assert_eq!(ErrorCode::from_code(""), ErrorCode::UnknownCode);
		let err = check_response("CMD", ":N-").unwrap_err();
		assert!(matches!(err, CommandError::UnknownCode(_)));
		assert_eq!(err.response(), ":N-");
	}
}
