//! Axes and their types, as described by a controller's build report.

use crate::error::{
	DecodeError, DuplicateAxisError, LengthMismatchError, MissingBuildFieldError,
	UnknownAxisTypeError,
};
use std::collections::HashMap;

/// The role of an axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AxisType {
	/// A DAC output (`d`).
	Dac,
	/// A filter wheel (`w`).
	FilterWheel,
	/// A tunable lens (`b`).
	Lens,
	/// A programmable logic card (`g`).
	Logic,
	/// A micro-mirror (`u`).
	MicroMirror,
	/// A generic motor (`l`).
	Motor,
	/// A multi-LED driver (`i`).
	MultiLed,
	/// A piezo (`p`).
	Piezo,
	/// A linear piezo (`a`).
	PiezoLinear,
	/// A shutter (`s`).
	Shutter,
	/// A slider (`f`).
	Slider,
	/// A theta (rotary) axis (`t`).
	Theta,
	/// A turret (`o`).
	Turret,
	/// An unknown axis type (`u`).
	Unknown,
	/// One axis of an XY stage (`x`).
	XyMotor,
	/// A Z motor (`z`).
	ZMotor,
	/// A zoom axis (`m`).
	Zoom,
}

impl AxisType {
	/// The type letter shared by [`AxisType::MicroMirror`] and [`AxisType::Unknown`].
	pub const AMBIGUOUS_CODE: char = 'u';

	/// The type [`from_code`](AxisType::from_code) returns for
	/// [`AMBIGUOUS_CODE`](AxisType::AMBIGUOUS_CODE).
	///
	/// The firmware reports both micro-mirror and unknown axes as `u`, so the
	/// two cannot be told apart from a build report. Such an axis is treated
	/// as a micro-mirror, the only named type that uses the letter.
	pub const AMBIGUOUS_CODE_RESOLUTION: AxisType = AxisType::MicroMirror;

	/// Look up the axis type for a build report type letter.
	///
	/// Returns `None` if the letter is not a known type. The ambiguous letter
	/// `u` resolves to [`AMBIGUOUS_CODE_RESOLUTION`](AxisType::AMBIGUOUS_CODE_RESOLUTION).
	///
	/// ```
	/// # use asitiger::axis::AxisType;
	/// assert_eq!(AxisType::from_code('x'), Some(AxisType::XyMotor));
	/// assert_eq!(AxisType::from_code('u'), Some(AxisType::AMBIGUOUS_CODE_RESOLUTION));
	/// assert_eq!(AxisType::from_code('q'), None);
	/// ```
	pub fn from_code(code: char) -> Option<AxisType> {
		Some(match code {
			'd' => AxisType::Dac,
			'w' => AxisType::FilterWheel,
			'b' => AxisType::Lens,
			'g' => AxisType::Logic,
			AxisType::AMBIGUOUS_CODE => AxisType::AMBIGUOUS_CODE_RESOLUTION,
			'l' => AxisType::Motor,
			'i' => AxisType::MultiLed,
			'p' => AxisType::Piezo,
			'a' => AxisType::PiezoLinear,
			's' => AxisType::Shutter,
			'f' => AxisType::Slider,
			't' => AxisType::Theta,
			'o' => AxisType::Turret,
			'x' => AxisType::XyMotor,
			'z' => AxisType::ZMotor,
			'm' => AxisType::Zoom,
			_ => return None,
		})
	}

	/// The type letter used in build reports.
	pub const fn code(&self) -> char {
		match self {
			AxisType::Dac => 'd',
			AxisType::FilterWheel => 'w',
			AxisType::Lens => 'b',
			AxisType::Logic => 'g',
			AxisType::MicroMirror | AxisType::Unknown => AxisType::AMBIGUOUS_CODE,
			AxisType::Motor => 'l',
			AxisType::MultiLed => 'i',
			AxisType::Piezo => 'p',
			AxisType::PiezoLinear => 'a',
			AxisType::Shutter => 's',
			AxisType::Slider => 'f',
			AxisType::Theta => 't',
			AxisType::Turret => 'o',
			AxisType::XyMotor => 'x',
			AxisType::ZMotor => 'z',
			AxisType::Zoom => 'm',
		}
	}

	/// Whether this type shares its letter with another type.
	pub const fn is_ambiguous(&self) -> bool {
		self.code() == AxisType::AMBIGUOUS_CODE
	}
}

/// The build report line listing the axis labels.
pub const MOTOR_AXES_KEY: &str = "Motor Axes";
/// The build report line listing the axis type letters.
pub const AXIS_TYPES_KEY: &str = "Axis Types";
/// The build report line listing the decimal card addresses.
pub const AXIS_ADDR_KEY: &str = "Axis Addr";
/// The build report line listing the hexadecimal card addresses.
pub const HEX_ADDR_KEY: &str = "Hex Addr";

/// An axis installed in a controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Axis {
	/// The axis label, e.g. `X`.
	pub label: String,
	/// The role of the axis.
	pub axis_type: AxisType,
	/// The address of the card the axis is on, in decimal.
	pub address: String,
	/// The address of the card the axis is on, in hexadecimal.
	pub address_hex: String,
}

impl Axis {
	/// Read the axes out of the lines of a build report (the reply to `BU X`
	/// split on carriage returns).
	///
	/// Lines containing a colon are split into a key and whitespace separated
	/// values. The `Motor Axes`, `Axis Types`, `Axis Addr` and `Hex Addr`
	/// lines are zipped together into one [`Axis`] per label; any other lines
	/// are ignored.
	///
	/// ```
	/// # use asitiger::axis::{Axis, AxisType};
	/// let axes = Axis::from_build(&[
	///     "TIGER_COMM",
	///     "Motor Axes: X Y",
	///     "Axis Types: x x",
	///     "Axis Addr: 1 1",
	///     "Hex Addr: 31 31",
	/// ])
	/// .unwrap();
	/// assert_eq!(axes[1].label, "Y");
	/// assert_eq!(axes[1].axis_type, AxisType::XyMotor);
	/// ```
	///
	/// ## Errors
	///
	/// The report is rejected if one of the four lines is missing, if they
	/// have different numbers of values, if a type letter is unknown, or if a
	/// label appears twice.
	pub fn from_build<L: AsRef<str>>(lines: &[L]) -> Result<Vec<Axis>, DecodeError> {
		let report = || {
			lines
				.iter()
				.map(AsRef::as_ref)
				.collect::<Vec<_>>()
				.join("\r")
		};

		let mut fields: HashMap<&str, Vec<&str>> = HashMap::new();
		for line in lines.iter().map(AsRef::as_ref) {
			if let Some((key, values)) = line.split_once(':') {
				fields.insert(key.trim(), values.split_whitespace().collect());
			}
		}
		let field = |key: &'static str| {
			fields
				.get(key)
				.ok_or_else(|| MissingBuildFieldError::new(key, report()))
		};
		let labels = field(MOTOR_AXES_KEY)?;
		let types = field(AXIS_TYPES_KEY)?;
		let addresses = field(AXIS_ADDR_KEY)?;
		let hex_addresses = field(HEX_ADDR_KEY)?;

		if [types.len(), addresses.len(), hex_addresses.len()]
			.iter()
			.any(|len| *len != labels.len())
		{
			return Err(LengthMismatchError::new(
				format!(
					"{} labels, {} types, {} addresses, {} hex addresses",
					labels.len(),
					types.len(),
					addresses.len(),
					hex_addresses.len()
				),
				report(),
			)
			.into());
		}

		let mut axes: Vec<Axis> = Vec::with_capacity(labels.len());
		for (((label, code), address), address_hex) in labels
			.iter()
			.zip(types)
			.zip(addresses)
			.zip(hex_addresses)
		{
			let axis_type = single_char(code)
				.and_then(AxisType::from_code)
				.ok_or_else(|| UnknownAxisTypeError::new(*code, report()))?;
			if axes.iter().any(|axis| axis.label == *label) {
				return Err(DuplicateAxisError::new(*label, report()).into());
			}
			axes.push(Axis {
				label: (*label).to_string(),
				axis_type,
				address: (*address).to_string(),
				address_hex: (*address_hex).to_string(),
			});
		}
		Ok(axes)
	}
}

fn single_char(s: &str) -> Option<char> {
	let mut chars = s.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Some(c),
		_ => None,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	const BUILD: &[&str] = &[
		"TIGER_COMM",
		"Motor Axes: X Z S O L",
		"Axis Types: x z f o i",
		"Axis Addr: 1 2 2 3 7",
		"Hex Addr: 31 32 32 33 37",
		"Axis Props:  74   2   2   0   0",
		"SOME_EXTRA STUFF",
		"DOWN_HERE",
	];

	#[test]
	fn build_report() {
		let axes = Axis::from_build(BUILD).unwrap();
		assert_eq!(axes.len(), 5);
		assert_eq!(
			axes.iter().map(|a| a.label.as_str()).collect::<Vec<_>>(),
			["X", "Z", "S", "O", "L"]
		);
		assert_eq!(
			axes.iter().map(|a| a.axis_type).collect::<Vec<_>>(),
			[
				AxisType::XyMotor,
				AxisType::ZMotor,
				AxisType::Slider,
				AxisType::Turret,
				AxisType::MultiLed,
			]
		);
		assert_eq!(
			axes.iter().map(|a| a.address.as_str()).collect::<Vec<_>>(),
			["1", "2", "2", "3", "7"]
		);
		assert_eq!(
			axes.iter().map(|a| a.address_hex.as_str()).collect::<Vec<_>>(),
			["31", "32", "32", "33", "37"]
		);
	}

	#[test]
	fn missing_field() {
		let lines: Vec<_> = BUILD.iter().filter(|l| !l.starts_with("Hex")).collect();
		let err = Axis::from_build(&lines).unwrap_err();
		let DecodeError::MissingBuildField(err) = err else {
			panic!("expected a missing field error");
		};
		assert_eq!(err.detail(), HEX_ADDR_KEY);
	}

	#[test]
	fn mismatched_lengths() {
		let mut lines = BUILD.to_vec();
		lines[2] = "Axis Types: x z f o";
		let err = Axis::from_build(&lines).unwrap_err();
		assert!(matches!(err, DecodeError::LengthMismatch(_)));
	}

	#[test]
	fn unknown_type_letter() {
		let mut lines = BUILD.to_vec();
		lines[2] = "Axis Types: x z f o q";
		let err = Axis::from_build(&lines).unwrap_err();
		assert!(matches!(err, DecodeError::UnknownAxisType(_)));
	}

	#[test]
	fn duplicate_label() {
		let mut lines = BUILD.to_vec();
		lines[1] = "Motor Axes: X Z S X L";
		let err = Axis::from_build(&lines).unwrap_err();
		assert!(matches!(err, DecodeError::DuplicateAxis(_)));
	}

	#[test]
	fn ambiguous_letter() {
		assert_eq!(AxisType::from_code('u'), Some(AxisType::MicroMirror));
		assert!(AxisType::MicroMirror.is_ambiguous());
		assert!(AxisType::Unknown.is_ambiguous());
		assert!(!AxisType::Zoom.is_ambiguous());
		assert_eq!(AxisType::Unknown.code(), 'u');
	}

	#[test]
	fn letters_round_trip() {
		for code in "dwbglipasftoxzm".chars() {
			let axis_type = AxisType::from_code(code).unwrap();
			assert_eq!(axis_type.code(), code);
			assert!(!axis_type.is_ambiguous());
		}
	}
}
