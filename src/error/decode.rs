//! Errors for replies that do not have the shape an operation expects.

/// Implement the `new()`, `detail()` and `response()` methods for errors
/// storing a detail string and the offending reply.
macro_rules! impl_for_type_containing_reply {
	(
		$name:ident
	) => {
		impl $name {
			/// Create a instance of the error
			pub(crate) fn new<D: Into<String>, R: Into<String>>(detail: D, response: R) -> Self {
				$name(Box::new((detail.into(), response.into())))
			}

			/// What was wrong with the reply.
			pub fn detail(&self) -> &str {
				&self.0 .0
			}

			/// The offending reply.
			pub fn response(&self) -> &str {
				&self.0 .1
			}
		}
	};
}

/// A reply could not be split into the tokens an operation expects.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MalformedReplyError(Box<(String, String)>);

impl_error_display! {
	MalformedReplyError,
	self => "malformed reply ({}): {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { MalformedReplyError }

/// Lists in a reply that must line up positionally have different lengths.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LengthMismatchError(Box<(String, String)>);

impl_error_display! {
	LengthMismatchError,
	self => "mismatched lengths ({}): {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { LengthMismatchError }

/// A build report is missing one of the lines describing the axes.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MissingBuildFieldError(Box<(String, String)>);

impl_error_display! {
	MissingBuildFieldError,
	self => "build report is missing \"{}\": {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { MissingBuildFieldError }

/// A build report lists the same axis label more than once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DuplicateAxisError(Box<(String, String)>);

impl_error_display! {
	DuplicateAxisError,
	self => "axis {} is listed more than once: {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { DuplicateAxisError }

/// A build report uses an axis type letter that is not in the type table.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct UnknownAxisTypeError(Box<(String, String)>);

impl_error_display! {
	UnknownAxisTypeError,
	self => "unknown axis type \"{}\": {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { UnknownAxisTypeError }

/// A status token is neither a coarse marker nor an unsigned 8-bit integer.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InvalidStatusByteError(Box<(String, String)>);

impl_error_display! {
	InvalidStatusByteError,
	self => "invalid status \"{}\": {}", self.0.0, self.0.1
}
impl_for_type_containing_reply! { InvalidStatusByteError }

error_enum! {
	/// A reply was received but did not have the expected shape.
	#[derive(Debug, PartialEq, Eq, Hash)]
	#[non_exhaustive]
	pub enum DecodeError {
		MalformedReply(MalformedReplyError),
		LengthMismatch(LengthMismatchError),
		MissingBuildField(MissingBuildFieldError),
		DuplicateAxis(DuplicateAxisError),
		UnknownAxisType(UnknownAxisTypeError),
		InvalidStatusByte(InvalidStatusByteError),
	}
}
