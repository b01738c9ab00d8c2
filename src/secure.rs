//! Positions for the `SECURE` command, such as the plate lock.

use crate::command::Value;

/// A position of a secure output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SecurePosition {
	/// Locked (`0`)
	Locked = 0,
	/// Unlocked (`1`)
	Unlocked = 1,
}

impl SecurePosition {
	/// The numeric value sent to the controller.
	pub const fn value(self) -> i64 {
		self as i64
	}
}

impl From<SecurePosition> for Value {
	fn from(other: SecurePosition) -> Self {
		Value::Int(other.value())
	}
}

/// Normalize a position given either as a [`SecurePosition`] or as a raw
/// number into the value sent to the controller.
///
/// Raw values are passed through untouched.
///
/// ```
/// # use asitiger::{command::Value, secure::{resolve_value, SecurePosition}};
/// assert_eq!(resolve_value(SecurePosition::Unlocked), Value::Int(1));
/// assert_eq!(resolve_value(0.5), Value::Float(0.5));
/// ```
pub fn resolve_value<V: Into<Value>>(position: V) -> Value {
	position.into()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn numeric_values_pass_through() {
		assert_eq!(resolve_value(123), Value::Int(123));
		assert_eq!(resolve_value(0.5), Value::Float(0.5));
	}

	#[test]
	fn positions_resolve_to_their_value() {
		assert_eq!(resolve_value(SecurePosition::Locked), Value::Int(0));
		assert_eq!(
			resolve_value(SecurePosition::Unlocked),
			Value::Int(SecurePosition::Unlocked.value())
		);
	}
}
