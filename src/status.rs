//! Coarse and detailed axis status.
//!
//! The `/` command reports a coarse [`Status`] for the whole controller. The
//! `RS` command reports, per axis, either a coarse status or a status byte,
//! which decodes into an [`AxisStatus`].

pub mod token;

use crate::error::{DecodeError, InvalidStatusByteError, MalformedReplyError};

/// Whether a device or axis is moving.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
	/// Not moving (`N`).
	Idle,
	/// Moving (`B`).
	Busy,
}

impl Status {
	/// Parse a single-character marker: `N` is idle and `B` is busy.
	pub fn from_marker(marker: char) -> Option<Status> {
		match marker {
			'N' => Some(Status::Idle),
			'B' => Some(Status::Busy),
			_ => None,
		}
	}

	/// Interpret a numeric flag: zero is idle and anything else is busy.
	pub fn from_flag(flag: u8) -> Status {
		if flag == 0 {
			Status::Idle
		} else {
			Status::Busy
		}
	}

	/// The single-character marker for the status.
	pub fn marker(&self) -> char {
		match self {
			Status::Idle => 'N',
			Status::Busy => 'B',
		}
	}

	/// Parse the reply to a `/` command.
	///
	/// The reply is the bare marker, optionally preceded by `:A`.
	///
	/// ```
	/// # use asitiger::status::Status;
	/// assert_eq!(Status::from_reply("B").unwrap(), Status::Busy);
	/// assert_eq!(Status::from_reply(":A N").unwrap(), Status::Idle);
	/// assert!(Status::from_reply("?").is_err());
	/// ```
	pub fn from_reply(reply: &str) -> Result<Status, DecodeError> {
		let marker = reply.trim();
		let marker = marker.strip_prefix(":A").unwrap_or(marker).trim();
		let mut chars = marker.chars();
		match (chars.next().and_then(Status::from_marker), chars.next()) {
			(Some(status), None) => Ok(status),
			_ => Err(MalformedReplyError::new("expected `N` or `B`", reply).into()),
		}
	}
}

macro_rules! bit_status {
	(
		$(#[$attr:meta])*
		pub enum $name:ident {
			$(#[$clear_attr:meta])*
			$clear:ident,
			$(#[$set_attr:meta])*
			$set:ident $(,)?
		}
	) => {
		$(#[$attr])*
		#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
		pub enum $name {
			$(#[$clear_attr])*
			$clear,
			$(#[$set_attr])*
			$set,
		}

		impl $name {
			/// The value for a status bit.
			pub fn from_bit(set: bool) -> Self {
				if set {
					$name::$set
				} else {
					$name::$clear
				}
			}
		}
	};
}

bit_status! {
	/// Whether an axis is enabled.
	pub enum AxisEnabledStatus {
		/// Disabled
		Disabled,
		/// Enabled
		Enabled,
	}
}

bit_status! {
	/// Whether an axis's motor is powered.
	pub enum MotorStatus {
		/// Inactive
		Inactive,
		/// Active
		Active,
	}
}

bit_status! {
	/// Whether the joystick drives an axis.
	pub enum JoystickStatus {
		/// Disabled
		Disabled,
		/// Enabled
		Enabled,
	}
}

bit_status! {
	/// Whether an axis is ramping its speed.
	pub enum RampingStatus {
		/// Not ramping
		NotRamping,
		/// Ramping
		Ramping,
	}
}

bit_status! {
	/// The direction an axis is ramping its speed in.
	pub enum RampingDirection {
		/// Ramping down
		Down,
		/// Ramping up
		Up,
	}
}

bit_status! {
	/// The state of a limit switch.
	pub enum LimitStatus {
		/// Open
		Open,
		/// Closed
		Closed,
	}
}

/// The detailed status of one axis, decoded from its status byte.
///
/// | bit | meaning |
/// |-----|---------|
/// | 0 | busy |
/// | 1 | enabled |
/// | 2 | motor active |
/// | 3 | joystick enabled |
/// | 4 | ramping |
/// | 5 | ramping up |
/// | 6 | upper limit closed |
/// | 7 | lower limit closed |
///
/// ```
/// # use asitiger::status::*;
/// let status = AxisStatus::from_byte(210);
/// assert_eq!(status.status, Status::Idle);
/// assert_eq!(status.enabled, AxisEnabledStatus::Enabled);
/// assert_eq!(status.upper_limit, LimitStatus::Closed);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AxisStatus {
	/// Whether the axis is moving
	pub status: Status,
	/// Whether the axis is enabled
	pub enabled: AxisEnabledStatus,
	/// Whether the motor is powered
	pub motor: MotorStatus,
	/// Whether the joystick drives the axis
	pub joystick: JoystickStatus,
	/// Whether the axis is ramping
	pub ramping: RampingStatus,
	/// The ramping direction
	pub ramping_direction: RampingDirection,
	/// The upper limit switch
	pub upper_limit: LimitStatus,
	/// The lower limit switch
	pub lower_limit: LimitStatus,
}

impl AxisStatus {
	/// Decode a status byte.
	pub fn from_byte(byte: u8) -> AxisStatus {
		let bit = |n: u8| byte & (1 << n) != 0;
		AxisStatus {
			status: Status::from_flag(byte & 1),
			enabled: AxisEnabledStatus::from_bit(bit(1)),
			motor: MotorStatus::from_bit(bit(2)),
			joystick: JoystickStatus::from_bit(bit(3)),
			ramping: RampingStatus::from_bit(bit(4)),
			ramping_direction: RampingDirection::from_bit(bit(5)),
			upper_limit: LimitStatus::from_bit(bit(6)),
			lower_limit: LimitStatus::from_bit(bit(7)),
		}
	}

	/// Decode a status byte written in decimal.
	///
	/// ## Errors
	///
	/// Text that is not an unsigned 8-bit integer is an [`InvalidStatusByteError`].
	pub fn from_decimal(text: &str) -> Result<AxisStatus, DecodeError> {
		text.trim()
			.parse::<u8>()
			.map(AxisStatus::from_byte)
			.map_err(|e| InvalidStatusByteError::new(text, e.to_string()).into())
	}
}

/// The status of one axis in an `RS` reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AxisState {
	/// A coarse status, reported when the axis was queried with `?`
	Coarse(Status),
	/// A detailed status decoded from a status byte
	Detailed(AxisStatus),
}

impl AxisState {
	/// Decode one token of an `RS` reply, as a coarse marker if possible and
	/// as a decimal status byte otherwise.
	pub fn from_rdstat_token(token: &str) -> Result<AxisState, DecodeError> {
		let mut chars = token.chars();
		if let (Some(status), None) = (chars.next().and_then(Status::from_marker), chars.next()) {
			Ok(AxisState::Coarse(status))
		} else {
			AxisStatus::from_decimal(token).map(AxisState::Detailed)
		}
	}

	/// The coarse status, which is available in either form.
	pub fn status(&self) -> Status {
		match self {
			AxisState::Coarse(status) => *status,
			AxisState::Detailed(detail) => detail.status,
		}
	}
}

/// Decode the reply to an `RS` command into one state per axis.
///
/// ```
/// # use asitiger::status::{statuses_for_rdstat, AxisState, Status};
/// let states = statuses_for_rdstat(":A  10N 138").unwrap();
/// assert_eq!(states.len(), 3);
/// assert!(matches!(states[0], AxisState::Detailed(_)));
/// assert_eq!(states[1], AxisState::Coarse(Status::Idle));
/// assert!(matches!(states[2], AxisState::Detailed(_)));
/// ```
pub fn statuses_for_rdstat(reply: &str) -> Result<Vec<AxisState>, DecodeError> {
	token::words(reply)
		.skip(1)
		.map(AxisState::from_rdstat_token)
		.collect()
}
