//! Decoding of single-line controller replies.
//!
//! Every reply begins with a status token (`:A` on success) followed by the
//! payload. The functions here ignore the status token; classifying failures
//! is the job of [`check`](crate::check).

use crate::{
	command::{Coordinates, Value},
	error::{DecodeError, LengthMismatchError, MalformedReplyError},
};
use std::{collections::BTreeMap, str::FromStr};

/// Split a `key=value` reply into its fields.
///
/// The reply is split on runs of whitespace, the leading status token is
/// discarded and each remaining token is split on its first `=`. An empty
/// value maps to the empty string.
///
/// ```
/// # use asitiger::response::parse_fields;
/// let fields = parse_fields(":A X=a Y= Z=3").unwrap();
/// assert_eq!(fields["X"], "a");
/// assert_eq!(fields["Y"], "");
/// assert_eq!(fields["Z"], "3");
/// ```
///
/// ## Errors
///
/// A token without an `=` is a [`MalformedReplyError`].
pub fn parse_fields(line: &str) -> Result<BTreeMap<String, String>, DecodeError> {
	line.split_whitespace()
		.skip(1)
		.map(|token| {
			token
				.split_once('=')
				.map(|(key, value)| (key.to_string(), value.to_string()))
				.ok_or_else(|| {
					DecodeError::from(MalformedReplyError::new(
						format!("field `{token}` has no `=`"),
						line,
					))
				})
		})
		.collect()
}

/// Like [`parse_fields`], but parse every value as `T`.
///
/// ## Errors
///
/// A value that does not parse as `T` is a [`MalformedReplyError`].
pub fn parse_fields_as<T: FromStr>(line: &str) -> Result<BTreeMap<String, T>, DecodeError> {
	parse_fields(line)?
		.into_iter()
		.map(|(key, value)| match value.parse() {
			Ok(parsed) => Ok((key, parsed)),
			Err(_) => Err(DecodeError::from(MalformedReplyError::new(
				format!(
					"value `{value}` of `{key}` is not a valid {}",
					std::any::type_name::<T>()
				),
				line,
			))),
		})
		.collect()
}

/// Decode the reply to a `W` (where) command.
///
/// The leading status token is dropped and the remaining tokens are paired
/// positionally with `axes`. Each value is parsed as an integer, then a float,
/// and otherwise kept as text.
///
/// ```
/// # use asitiger::{command::Value, response::parse_where};
/// let coordinates = parse_where(&["X", "Y"], ":A 100 -2.5").unwrap();
/// assert_eq!(coordinates.get("X"), Some(&Value::Int(100)));
/// assert_eq!(coordinates.get("Y"), Some(&Value::Float(-2.5)));
/// ```
///
/// ## Errors
///
/// A reply with a different number of values than `axes` is a [`LengthMismatchError`].
pub fn parse_where<A: AsRef<str>>(axes: &[A], line: &str) -> Result<Coordinates, DecodeError> {
	let values: Vec<&str> = line.split_whitespace().skip(1).collect();
	if values.len() != axes.len() {
		return Err(LengthMismatchError::new(
			format!("expected {} values, got {}", axes.len(), values.len()),
			line,
		)
		.into());
	}
	Ok(axes
		.iter()
		.zip(values)
		.map(|(axis, value)| {
			let value = match value.parse::<Value>() {
				Ok(value) => value,
				Err(never) => match never {},
			};
			(axis.as_ref().to_string(), value)
		})
		.collect())
}
