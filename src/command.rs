//! Types and functions for generating Tiger commands.
//!
//! A Tiger command is a verb, optionally followed by bare arguments and
//! `axis=value` pairs, and optionally prefixed with the address of the card it
//! targets:
//!
//! ```
//! # use asitiger::command::{CommandBuilder, Coordinates, Verb};
//! let command = CommandBuilder::new(Verb::Move)
//!     .coordinates([("X", 1.5), ("Y", -20.0)])
//!     .card(2);
//! assert_eq!(command.to_string(), "2M X=1.5 Y=-20.0");
//! ```
//!
//! Values listed as "flags" are written as a bare suffix instead:
//!
//! ```
//! # use asitiger::command::{CommandBuilder, Verb};
//! let command = CommandBuilder::new(Verb::MotorControl)
//!     .coordinates([("X", "+"), ("Y", "-")])
//!     .flags(&["+", "-"]);
//! assert_eq!(command.to_string(), "MC X+ Y-");
//! ```

use std::{convert::Infallible, fmt, fmt::Write as _, str::FromStr};

/// The maximum number of characters the firmware accepts for one value.
///
/// Longer values are truncated when they are formatted.
pub const MAX_VALUE_LEN: usize = 16;

/// The command verbs understood by a Tiger controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Verb {
	/// `BU`: report the installed cards and axes.
	Build,
	/// `\`: stop all motion.
	Halt,
	/// `H`: set the current position of axes to the given values.
	Here,
	/// `!`: move axes to their home positions.
	Home,
	/// `LED`: set LED brightness.
	Led,
	/// `MC`: enable (`+`) or disable (`-`) axis motor control.
	MotorControl,
	/// `M`: absolute move.
	Move,
	/// `R`: relative move.
	MoveRelative,
	/// `RS`: read the status of axes.
	Rdstat,
	/// `SECURE`: drive the plate lock and other secure outputs.
	Secure,
	/// `HM`: set the home position of axes.
	SetHome,
	/// `S`: get or set axis speeds.
	Speed,
	/// `/`: report whether any axis is busy.
	Status,
	/// `W`: report axis positions.
	Where,
	/// `WHO`: report the installed cards.
	Who,
}

impl Verb {
	/// The verb as it is written on the wire.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Verb::Build => "BU",
			Verb::Halt => "\\",
			Verb::Here => "H",
			Verb::Home => "!",
			Verb::Led => "LED",
			Verb::MotorControl => "MC",
			Verb::Move => "M",
			Verb::MoveRelative => "R",
			Verb::Rdstat => "RS",
			Verb::Secure => "SECURE",
			Verb::SetHome => "HM",
			Verb::Speed => "S",
			Verb::Status => "/",
			Verb::Where => "W",
			Verb::Who => "WHO",
		}
	}
}

impl AsRef<str> for Verb {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Display for Verb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The value of an axis parameter.
///
/// Values are written in their canonical text form: integers in decimal,
/// floats in decimal without an exponent and always with a fractional part
/// (`3.0`), and text as is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// An integer
	Int(i64),
	/// A floating point number
	Float(f64),
	/// Raw text, such as a flag like `+` or `?`
	Text(String),
}

impl Value {
	/// Get the value as a floating point number, if it is one or can be parsed as one.
	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(value) => Some(*value as f64),
			Value::Float(value) => Some(*value),
			Value::Text(text) => text.trim().parse().ok(),
		}
	}

	/// Get the value as text, if it is text.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Value::Text(text) => Some(text.as_str()),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Int(value) => write!(f, "{value}"),
			Value::Float(value) => {
				// `Display` for floats never uses an exponent, but drops the
				// fractional part of whole numbers.
				let text = value.to_string();
				if value.is_finite() && !text.contains('.') {
					write!(f, "{text}.0")
				} else {
					f.write_str(&text)
				}
			}
			Value::Text(text) => f.write_str(text),
		}
	}
}

/// Parse a value from a reply, trying an integer, then a float, then falling
/// back to the raw text.
impl FromStr for Value {
	type Err = Infallible;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Ok(value) = s.parse::<i64>() {
			Ok(Value::Int(value))
		} else if let Ok(value) = s.parse::<f64>() {
			Ok(Value::Float(value))
		} else {
			Ok(Value::Text(s.to_string()))
		}
	}
}

macro_rules! impl_value_from {
	($($t:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$t> for Value {
				fn from(other: $t) -> Self {
					Value::$variant(other.into())
				}
			}
		)+
	};
}

impl_value_from! {
	i64 => Int,
	i32 => Int,
	i16 => Int,
	i8 => Int,
	u32 => Int,
	u16 => Int,
	u8 => Int,
	f64 => Float,
	&str => Text,
	String => Text,
	char => Text,
}

impl From<&String> for Value {
	fn from(other: &String) -> Self {
		Value::Text(other.clone())
	}
}

/// An ordered set of `axis=value` pairs.
///
/// The order axes are inserted in is the order they are written in a command.
/// Inserting an axis that is already present replaces its value but keeps its
/// position.
///
/// ```
/// # use asitiger::command::{Coordinates, Value};
/// let mut coordinates = Coordinates::from([("X", 1), ("Y", 2)]);
/// coordinates.insert("X", 3);
/// assert_eq!(coordinates.get("X"), Some(&Value::Int(3)));
/// assert_eq!(coordinates.axes().collect::<Vec<_>>(), ["X", "Y"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coordinates(Vec<(String, Value)>);

impl Coordinates {
	/// Create an empty set of coordinates.
	pub const fn new() -> Self {
		Coordinates(Vec::new())
	}

	/// Set the value of `axis`.
	///
	/// If the axis was already present, its old value is returned.
	pub fn insert<A: Into<String>, V: Into<Value>>(&mut self, axis: A, value: V) -> Option<Value> {
		let axis = axis.into();
		let value = value.into();
		if let Some((_, existing)) = self.0.iter_mut().find(|(a, _)| *a == axis) {
			Some(std::mem::replace(existing, value))
		} else {
			self.0.push((axis, value));
			None
		}
	}

	/// Get the value of `axis`, if present.
	pub fn get(&self, axis: &str) -> Option<&Value> {
		self.0.iter().find(|(a, _)| a == axis).map(|(_, value)| value)
	}

	/// The number of axes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no axes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterate over the axis labels, in order.
	pub fn axes(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(axis, _)| axis.as_str())
	}

	/// Iterate over the `(axis, value)` pairs, in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(axis, value)| (axis.as_str(), value))
	}
}

impl<A: Into<String>, V: Into<Value>> FromIterator<(A, V)> for Coordinates {
	fn from_iter<T: IntoIterator<Item = (A, V)>>(iter: T) -> Self {
		let mut coordinates = Coordinates::new();
		for (axis, value) in iter {
			coordinates.insert(axis, value);
		}
		coordinates
	}
}

impl<A: Into<String>, V: Into<Value>, const N: usize> From<[(A, V); N]> for Coordinates {
	fn from(other: [(A, V); N]) -> Self {
		other.into_iter().collect()
	}
}

impl<A: Into<String>, V: Into<Value>> From<Vec<(A, V)>> for Coordinates {
	fn from(other: Vec<(A, V)>) -> Self {
		other.into_iter().collect()
	}
}

impl IntoIterator for Coordinates {
	type Item = (String, Value);
	type IntoIter = std::vec::IntoIter<(String, Value)>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Write `value` in its canonical form, truncated to [`MAX_VALUE_LEN`] characters.
fn value_text(value: &Value) -> String {
	let mut text = value.to_string();
	if text.chars().count() > MAX_VALUE_LEN {
		let end = text
			.char_indices()
			.nth(MAX_VALUE_LEN)
			.map_or(text.len(), |(index, _)| index);
		log::warn!(
			"value `{text}` is longer than {MAX_VALUE_LEN} characters, truncating it to `{}`",
			&text[..end]
		);
		text.truncate(end);
	}
	text
}

/// Format a single axis parameter.
///
/// If `value` is text equal to one of `flag_overrides` it is written as
/// `{axis}{value}` (e.g. `X+`), otherwise as `{axis}={value}`.
///
/// ```
/// # use asitiger::command::{format_coordinate, Value};
/// assert_eq!(format_coordinate("X", &Value::from(12345.67), &[]), "X=12345.67");
/// assert_eq!(format_coordinate("Z", &Value::from("+"), &["+"]), "Z+");
/// ```
pub fn format_coordinate(axis: &str, value: &Value, flag_overrides: &[&str]) -> String {
	if let Value::Text(text) = value {
		if flag_overrides.contains(&text.as_str()) {
			return format!("{axis}{text}");
		}
	}
	format!("{axis}={}", value_text(value))
}

/// Format all axis parameters, separated by a single space, in order.
pub fn format_coordinates(coordinates: &Coordinates, flag_overrides: &[&str]) -> String {
	let mut out = String::new();
	for (i, (axis, value)) in coordinates.iter().enumerate() {
		if i > 0 {
			out.push(' ');
		}
		out.push_str(&format_coordinate(axis, value, flag_overrides));
	}
	out
}

/// Format a complete command.
///
/// The coordinates are only appended if there are any. The card address is
/// only prepended if it is `Some` and non-zero; `None` and `Some(0)` both
/// address the current card.
pub fn format(
	verb: &str,
	coordinates: &Coordinates,
	flag_overrides: &[&str],
	card_address: Option<u32>,
) -> String {
	CommandBuilder::new(verb)
		.coordinates(coordinates.clone())
		.flags(flag_overrides)
		.card_address(card_address)
		.to_string()
}

/// A builder for a Tiger command.
///
/// Create a command with [`new`](CommandBuilder::new) and add bare arguments
/// (like the axis list of `W X Y`), axis parameters, flags and a card
/// address. The command text is produced by its [`Display`](fmt::Display)
/// implementation.
///
/// ```
/// # use asitiger::command::{CommandBuilder, Verb};
/// let command = CommandBuilder::new(Verb::Where).args(["X", "Y"]);
/// assert_eq!(command.to_string(), "W X Y");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandBuilder {
	/// The card address, if any.
	card_address: Option<u32>,
	/// The command verb.
	verb: String,
	/// Bare words following the verb.
	args: Vec<String>,
	/// The axis parameters.
	coordinates: Coordinates,
	/// Values written as a bare suffix to the axis.
	flags: Vec<String>,
}

impl CommandBuilder {
	/// Create a command with the given verb.
	pub fn new<V: AsRef<str>>(verb: V) -> CommandBuilder {
		CommandBuilder {
			verb: verb.as_ref().to_string(),
			..CommandBuilder::default()
		}
	}

	/// Append bare arguments after the verb.
	#[must_use]
	pub fn args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.args
			.extend(args.into_iter().map(|arg| arg.as_ref().to_string()));
		self
	}

	/// Set the axis parameters.
	#[must_use]
	pub fn coordinates<C: Into<Coordinates>>(mut self, coordinates: C) -> Self {
		self.coordinates = coordinates.into();
		self
	}

	/// Set the values that are written as `{axis}{value}` instead of `{axis}={value}`.
	#[must_use]
	pub fn flags(mut self, flags: &[&str]) -> Self {
		self.flags = flags.iter().map(ToString::to_string).collect();
		self
	}

	/// Address the command to a specific card.
	#[must_use]
	pub fn card(self, address: u32) -> Self {
		self.card_address(Some(address))
	}

	/// Address the command to a specific card, or the current card if `None` or `Some(0)`.
	#[must_use]
	pub fn card_address(mut self, address: Option<u32>) -> Self {
		self.card_address = address;
		self
	}
}

impl fmt::Display for CommandBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut out = String::with_capacity(32);
		if let Some(address) = self.card_address.filter(|address| *address != 0) {
			write!(out, "{address}")?;
		}
		out.push_str(&self.verb);
		for arg in &self.args {
			out.push(' ');
			out.push_str(arg);
		}
		if !self.coordinates.is_empty() {
			let flags: Vec<&str> = self.flags.iter().map(String::as_str).collect();
			out.push(' ');
			out.push_str(&format_coordinates(&self.coordinates, &flags));
		}
		f.write_str(&out)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn coordinate_number() {
		assert_eq!(format_coordinate("X", &12345.67.into(), &[]), "X=12345.67");
		assert_eq!(format_coordinate("X", &7.into(), &[]), "X=7");
		assert_eq!(format_coordinate("X", &3.0.into(), &[]), "X=3.0");
		assert_eq!(format_coordinate("X", &1e20.into(), &[]), "X=1000000000000000");
	}

	#[test]
	fn coordinate_string() {
		assert_eq!(format_coordinate("Y", &"1".into(), &[]), "Y=1");
	}

	#[test]
	fn coordinate_flag() {
		assert_eq!(format_coordinate("Z", &"1".into(), &["+"]), "Z=1");
		assert_eq!(format_coordinate("Z", &"+".into(), &["+"]), "Z+");
		assert_eq!(format_coordinate("Z", &"1".into(), &["+", "-"]), "Z=1");
		assert_eq!(format_coordinate("Z", &"+".into(), &["+", "-"]), "Z+");
	}

	#[test]
	fn flags_match_exactly() {
		// A number is never a flag, even if its text matches.
		assert_eq!(format_coordinate("X", &1.into(), &["1"]), "X=1");
		assert_eq!(format_coordinate("X", &"+ ".into(), &["+"]), "X=+ ");
	}

	#[test]
	fn coordinate_truncation() {
		assert_eq!(
			format_coordinate("W", &"-123456789.123456789".into(), &[]),
			"W=-123456789.12345"
		);
		assert_eq!(
			format_coordinate("W", &(-123_456_789.123_456_79).into(), &[]),
			"W=-123456789.12345"
		);
		// Exactly at the limit is untouched.
		assert_eq!(
			format_coordinate("W", &"1234567890123456".into(), &[]),
			"W=1234567890123456"
		);
	}

	#[test]
	fn coordinates() {
		let coordinates = Coordinates::from_iter([
			("X", Value::from(1)),
			("Y", Value::from("2")),
			("Z", Value::from(3.0)),
		]);
		assert_eq!(format_coordinates(&coordinates, &[]), "X=1 Y=2 Z=3.0");
	}

	#[test]
	fn coordinates_flags() {
		let coordinates = Coordinates::from([("X", "+"), ("Y", "?"), ("Z", "!")]);
		assert_eq!(format_coordinates(&coordinates, &["+", "?"]), "X+ Y? Z=!");
	}

	#[test]
	fn coordinates_keep_insertion_order() {
		let mut coordinates = Coordinates::from([("Z", 1), ("X", 2)]);
		assert_eq!(coordinates.insert("Z", 5), Some(Value::Int(1)));
		assert_eq!(coordinates.insert("Y", 6), None);
		assert_eq!(format_coordinates(&coordinates, &[]), "Z=5 X=2 Y=6");
	}

	#[test]
	fn format_with_coordinates() {
		let coordinates = Coordinates::from_iter([("X", Value::from(1)), ("Y", Value::from(-2.0))]);
		assert_eq!(format("CMD", &coordinates, &[], None), "CMD X=1 Y=-2.0");
	}

	#[test]
	fn format_empty_coordinates() {
		assert_eq!(format("CMD", &Coordinates::new(), &[], None), "CMD");
	}

	#[test]
	fn format_card_address() {
		assert_eq!(format("CMD", &Coordinates::new(), &[], Some(123)), "123CMD");
		assert_eq!(format("CMD", &Coordinates::new(), &[], Some(0)), "CMD");
	}

	#[test]
	fn format_is_pure() {
		let coordinates = Coordinates::from([("X", 1.25), ("Y", -3.5)]);
		let first = format("M", &coordinates, &["?"], Some(2));
		let second = format("M", &coordinates, &["?"], Some(2));
		assert_eq!(first, second);
		assert_eq!(first, "2M X=1.25 Y=-3.5");
	}

	#[test]
	fn builder_args_and_card() {
		let command = CommandBuilder::new(Verb::Build).args(["X"]).card(3);
		assert_eq!(command.to_string(), "3BU X");
		let command = CommandBuilder::new(Verb::Home).args(["X", "Y"]);
		assert_eq!(command.to_string(), "! X Y");
	}

	#[test]
	fn verbs() {
		assert_eq!(Verb::Halt.as_str(), "\\");
		assert_eq!(Verb::Status.to_string(), "/");
		assert_eq!(Verb::MotorControl.as_ref(), "MC");
	}

	#[test]
	fn parse_value() {
		assert_eq!("1".parse::<Value>(), Ok(Value::Int(1)));
		assert_eq!("2.1".parse::<Value>(), Ok(Value::Float(2.1)));
		assert_eq!("abc".parse::<Value>(), Ok(Value::Text("abc".to_string())));
		assert_eq!(Value::from("2.5").as_f64(), Some(2.5));
		assert_eq!(Value::from("+").as_f64(), None);
		assert_eq!(Value::from("+").as_text(), Some("+"));
	}
}
