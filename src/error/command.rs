//! Errors the controller reports with an `:N-<code>` reply.

use crate::check::{self, ErrorCode};

/// Define one error type per controller error code, the [`CommandError`]
/// enum holding them, and the mapping from [`ErrorCode`] to the enum.
///
/// Each entry is `<Name>: "<description>"`. The type is named `<Name>Error`
/// and the matching `ErrorCode` and `CommandError` variants are named `<Name>`.
macro_rules! command_errors {
	(
		$(
			$(#[$attr:meta])*
			$name:ident : $description:literal
		),+
		$(,)?
	) => {
		paste::paste! {
			$(
				$(#[$attr])*
				#[derive(Debug, PartialEq, Eq, Hash)]
				pub struct [<$name Error>](Box<(String, String)>);

				impl [<$name Error>] {
					/// Create a new error for `command`, which the controller answered
					/// with `response`.
					pub(crate) fn new<C: Into<String>, R: Into<String>>(
						command: C,
						response: R,
					) -> Self {
						[<$name Error>](Box::new((command.into(), response.into())))
					}

					/// The command that was sent.
					pub fn command(&self) -> &str {
						&self.0 .0
					}

					/// The raw reply to the command.
					pub fn response(&self) -> &str {
						&self.0 .1
					}

					/// The error code in the reply, as text.
					pub fn code(&self) -> &str {
						check::error_code(&self.0 .1).unwrap_or_default()
					}
				}

				impl_error_display! {
					[<$name Error>],
					self => "{}: command \"{}\" failed with response: {}",
						$description, self.0.0, self.0.1
				}
			)+

			error_enum! {
				/// An error reported by the controller in response to a command.
				#[derive(Debug, PartialEq, Eq, Hash)]
				#[non_exhaustive]
				pub enum CommandError {
					$(
						$name([<$name Error>]),
					)+
				}
			}

			impl CommandError {
				/// Create the error matching `code` for a failed `command`.
				pub(crate) fn new<C: Into<String>, R: Into<String>>(
					code: ErrorCode,
					command: C,
					response: R,
				) -> Self {
					match code {
						$(
							ErrorCode::$name => [<$name Error>]::new(command, response).into(),
						)+
					}
				}

				/// The command that was sent.
				pub fn command(&self) -> &str {
					match self {
						$(
							CommandError::$name(e) => e.command(),
						)+
					}
				}

				/// The raw reply to the command.
				pub fn response(&self) -> &str {
					match self {
						$(
							CommandError::$name(e) => e.response(),
						)+
					}
				}
			}
		}
	};
}

command_errors! {
	/// The controller did not recognize the command verb (code 1).
	UnknownCommand: "unknown command",
	/// The command named an axis the controller does not have (code 2).
	UnrecognizedAxisParameter: "unrecognized axis parameter",
	/// The command was missing required parameters (code 3).
	MissingParameters: "missing parameters",
	/// A parameter was outside its allowed range (code 4).
	ParameterOutOfRange: "parameter out of range",
	/// The controller could not perform the operation (code 5).
	OperationFailed: "operation failed",
	/// The controller reported the "undefined" error (code 6).
	Undefined: "undefined",
	/// The command was prefixed with a card address that is not installed (code 7).
	InvalidCardAddress: "invalid card address",
	/// A serial command was halted (code 21).
	SerialCommandHalted: "serial command halted",
	/// The reply carried an error code this library does not know.
	UnknownCode: "unknown error",
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn display_includes_command_and_reply() {
		let err = MissingParametersError::new("M X=", ":N-3");
		assert_eq!(
			err.to_string(),
			"missing parameters: command \"M X=\" failed with response: :N-3"
		);
		assert_eq!(err.code(), "3");
	}

	#[test]
	fn new_picks_the_variant_for_the_code() {
		let err = CommandError::new(ErrorCode::SerialCommandHalted, "M X=1", ":N-21");
		assert!(matches!(err, CommandError::SerialCommandHalted(_)));
		assert_eq!(err.command(), "M X=1");
		assert_eq!(err.response(), ":N-21");

		let err = CommandError::new(ErrorCode::UnknownCode, "CMD", ":N-123");
		let CommandError::UnknownCode(inner) = err else {
			panic!("expected an unknown code error");
		};
		assert_eq!(inner.code(), "123");
	}
}
