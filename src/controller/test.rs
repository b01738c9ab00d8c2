use std::{io, time::Duration};

use crate::{
	axis::AxisType,
	backend::{Backend, Mock, Serial},
	command::Value,
	error::*,
	secure::SecurePosition,
	status::{AxisState, AxisStatus, Status},
	Controller,
};

static_assertions::assert_impl_all!(Controller<Serial>: Send, std::fmt::Debug);
static_assertions::assert_impl_all!(Controller<Box<dyn Backend>>: std::fmt::Debug);

/// Create a controller whose mock answers each command with the next reply.
fn open_mock(replies: &[&str]) -> Controller<Mock> {
	let mut tiger = Controller::from_backend(Mock::new());
	for reply in replies {
		tiger.backend_mut().push_reply(format!("{reply}\r\n"));
	}
	tiger
}

/// Take everything written to the mock as text.
fn written(tiger: &mut Controller<Mock>) -> String {
	String::from_utf8(tiger.backend_mut().take_written()).unwrap()
}

/// Check the exact command each session method writes.
macro_rules! check_commands {
	($($reply:literal via $method:expr => $command:literal),+ $(,)?) => {
		$(
			let mut tiger = open_mock(&[$reply]);
			let m: fn(&mut Controller<Mock>) -> Result<_, Error> = $method;
			if let Err(e) = (m)(&mut tiger) {
				panic!("unexpected error from {}: {e}\n\t{e:?}", stringify!($method));
			}
			assert_eq!(written(&mut tiger), concat!($command, "\r"), "{}", stringify!($method));
		)+
	};
}

#[test]
fn commands_written() {
	check_commands! {
		":A" via |t| t.halt() => "\\",
		":A" via |t| t.here([("X", 1), ("Y", 2)]) => "H X=1 Y=2",
		":A" via |t| t.home(&["X", "Y"]) => "! X Y",
		":A" via |t| t.led([("X", 50)], None) => "LED X=50",
		":A" via |t| t.led([("X", 50)], Some(7)) => "7LED X=50",
		":A" via |t| t.motor_control([("X", "+"), ("Y", "-")]) => "MC X+ Y-",
		":A" via |t| t.enable_axes(&["X", "Z"]) => "MC X+ Z+",
		":A" via |t| t.disable_axes(&["Y"]) => "MC Y-",
		":A" via |t| t.move_absolute([("X", 1.0), ("Y", -2.5)]) => "M X=1.0 Y=-2.5",
		":A" via |t| t.move_relative([("Z", 10)]) => "R Z=10",
		":A" via |t| t.secure([("X", 1)], Some(3)) => "3SECURE X=1",
		":A" via |t| t.set_plate_lock(SecurePosition::Locked, None) => "SECURE X=0",
		":A" via |t| t.set_plate_lock(0.5, None) => "SECURE X=0.5",
		":A" via |t| t.set_home([("X", Value::from("+")), ("Y", Value::from(10))]) => "HM X+ Y=10",
		":A" via |t| t.speed([("X", "?")]) => "S X?",
		"N" via |t| t.status() => "/",
		":A X Y" via |t| t.who() => "WHO",
	}
}

#[test]
fn send_command() {
	let mut tiger = open_mock(&[":A 1", ":N-2", ":A"]);
	assert_eq!(tiger.send_command("W X").unwrap(), ":A 1");

	let err = tiger.send_command("W Q").unwrap_err();
	assert!(err.is_command_error());
	let err = UnrecognizedAxisParameterError::try_from(err).unwrap();
	assert_eq!(err.command(), "W Q");
	assert_eq!(err.response(), ":N-2");

	// The session is still usable after a protocol error.
	assert_eq!(tiger.send_command("/").unwrap(), ":A");
	assert_eq!(written(&mut tiger), "W X\rW Q\r/\r");
	assert_eq!(tiger.backend().clear_count(), 3);
}

#[test]
fn unknown_error_code() {
	let mut tiger = open_mock(&[":N-123"]);
	let err = tiger.send_command("CMD").unwrap_err();
	assert!(matches!(err, Error::UnknownCode(_)));
}

#[test]
fn stale_bytes_are_discarded() {
	let mut tiger = open_mock(&[":A 5"]);
	tiger.backend_mut().push_stale(":A 99\r\n");
	assert_eq!(tiger.send_command("W X").unwrap(), ":A 5");
}

#[test]
fn missing_reply_times_out() {
	let mut tiger = open_mock(&[]);
	let err = tiger.halt().unwrap_err();
	assert!(err.is_timeout(), "{err:?}");
}

/// Assert `result` is an I/O error of `kind`.
fn assert_io_error<T: std::fmt::Debug>(result: Result<T, Error>, kind: io::ErrorKind) {
	match result {
		Err(Error::Io(e)) => assert_eq!(e.kind(), kind),
		other => panic!("expected an I/O error of kind {kind:?}, got {other:?}"),
	}
}

#[test]
fn clear_failure_propagates() {
	let mut tiger = open_mock(&[":A"]);
	tiger
		.backend_mut()
		.clear_error(Some(io::Error::from(io::ErrorKind::BrokenPipe)));
	assert_io_error(tiger.send_command("W X"), io::ErrorKind::BrokenPipe);
	assert_eq!(written(&mut tiger), "");

	assert_eq!(tiger.send_command("/").unwrap(), ":A");
	assert_eq!(written(&mut tiger), "/\r");
}

#[test]
fn write_failure_propagates() {
	let mut tiger = open_mock(&[":A"]);
	tiger
		.backend_mut()
		.write_error(Some(io::Error::from(io::ErrorKind::BrokenPipe)));
	assert_io_error(tiger.send_command("W X"), io::ErrorKind::BrokenPipe);
	assert_eq!(written(&mut tiger), "");

	assert_eq!(tiger.send_command("/").unwrap(), ":A");
}

#[test]
fn flush_failure_propagates() {
	let mut tiger = open_mock(&[":A 1", ":A"]);
	tiger
		.backend_mut()
		.flush_error(Some(io::Error::from(io::ErrorKind::BrokenPipe)));
	assert_io_error(tiger.send_command("W X"), io::ErrorKind::BrokenPipe);

	// The unread reply to the failed command is discarded.
	assert_eq!(tiger.send_command("/").unwrap(), ":A");
	assert_eq!(written(&mut tiger), "W X\r/\r");
}

#[test]
fn read_failure_propagates() {
	let mut tiger = open_mock(&[":A 1", ":A"]);
	tiger
		.backend_mut()
		.read_error(Some(io::Error::from(io::ErrorKind::ConnectionReset)));
	assert_io_error(tiger.send_command("W X"), io::ErrorKind::ConnectionReset);

	assert_eq!(tiger.send_command("/").unwrap(), ":A");
}

#[test]
fn build_and_axes() {
	const REPLY: &str = concat!(
		"TIGER_COMM\r",
		"Motor Axes: X Y Z\r",
		"Axis Types: x x z\r",
		"Axis Addr: 1 1 2\r",
		"Hex Addr: 31 31 32\r",
		"Axis Props: 74 10 1",
	);
	let mut tiger = open_mock(&[REPLY, REPLY]);

	let build = tiger.build(Some(2)).unwrap();
	assert_eq!(build.len(), 6);
	assert_eq!(build[0], "TIGER_COMM");
	assert_eq!(written(&mut tiger), "2BU X\r");

	let axes = tiger.axes(None).unwrap();
	assert_eq!(written(&mut tiger), "BU X\r");
	assert_eq!(axes.len(), 3);
	assert_eq!(axes[2].label, "Z");
	assert_eq!(axes[2].axis_type, AxisType::ZMotor);
	assert_eq!(axes[2].address, "2");
	assert_eq!(axes[2].address_hex, "32");
}

#[test]
fn axes_with_bad_report() {
	let mut tiger = open_mock(&[concat!(
		"TIGER_COMM\r",
		"Motor Axes: X Y\r",
		"Axis Types: x\r",
		"Axis Addr: 1 1\r",
		"Hex Addr: 31 31",
	)]);
	let err = tiger.axes(None).unwrap_err();
	assert!(matches!(err, Error::LengthMismatch(_)));
}

#[test]
fn position() {
	let mut tiger = open_mock(&[":A 100 -2.5", ":A 1"]);
	let coordinates = tiger.position(&["X", "Y"]).unwrap();
	assert_eq!(written(&mut tiger), "W X Y\r");
	assert_eq!(coordinates.get("X"), Some(&Value::Int(100)));
	assert_eq!(coordinates.get("Y"), Some(&Value::Float(-2.5)));

	let err = tiger.position(&["X", "Y"]).unwrap_err();
	assert!(matches!(err, Error::LengthMismatch(_)));
}

#[test]
fn move_relative_emulated() {
	let mut tiger = open_mock(&[":A 100 200", ":A"]);
	tiger
		.move_relative_emulated([("X", Value::from(10)), ("Y", Value::from(-4.5))])
		.unwrap();
	assert_eq!(written(&mut tiger), "W X Y\rM X=110.0 Y=195.5\r");
}

#[test]
fn move_relative_emulated_non_numeric() {
	let mut tiger = open_mock(&[":A 100", ":A"]);
	let err = tiger.move_relative_emulated([("X", "?")]).unwrap_err();
	assert!(matches!(err, Error::MalformedReply(_)));
	// Only the position was read.
	assert_eq!(written(&mut tiger), "W X\r");
}

#[test]
fn rdstat() {
	let mut tiger = open_mock(&[":A  10N 138"]);
	let states = tiger.rdstat(&["X", "Y?", "Z"]).unwrap();
	assert_eq!(written(&mut tiger), "RS X Y? Z\r");
	assert_eq!(
		states,
		[
			AxisState::Detailed(AxisStatus::from_byte(10)),
			AxisState::Coarse(Status::Idle),
			AxisState::Detailed(AxisStatus::from_byte(138)),
		]
	);
}

#[test]
#[allow(clippy::float_cmp)]
fn speed() {
	let mut tiger = open_mock(&[":A X=1.5 Y=2"]);
	let speeds = tiger.speed([("X", "?"), ("Y", "?")]).unwrap();
	assert_eq!(speeds["X"], 1.5);
	assert_eq!(speeds["Y"], 2.0);
}

#[test]
fn status_and_busy() {
	let mut tiger = open_mock(&["B", "N", "?"]);
	assert!(tiger.is_busy().unwrap());
	assert_eq!(tiger.status().unwrap(), Status::Idle);
	let err = tiger.status().unwrap_err();
	assert!(matches!(err, Error::MalformedReply(_)));
}

#[test]
fn wait_until_idle() {
	let mut tiger = open_mock(&["B", "B", "N"]);
	tiger.wait_until_idle(Some(Duration::from_millis(1))).unwrap();
	assert_eq!(written(&mut tiger), "/\r/\r/\r");
	assert!(tiger.backend().replies_exhausted());

	// A zero interval falls back to the session default rather than spinning.
	let mut tiger = open_mock(&["B", "N"]);
	tiger.set_poll_interval(Duration::from_millis(1));
	tiger.wait_until_idle(Some(Duration::ZERO)).unwrap();
	assert_eq!(written(&mut tiger), "/\r/\r");
}

#[test]
fn who() {
	let mut tiger = open_mock(&["At 1: TIGER_COMM\rAt 2: XYMotor"]);
	assert_eq!(tiger.who().unwrap(), ["At 1: TIGER_COMM", "At 2: XYMotor"]);
}

#[test]
fn poll_interval_guard() {
	let mut tiger = open_mock(&[]);
	assert_eq!(tiger.poll_interval(), Controller::<Mock>::DEFAULT_POLL_INTERVAL);
	{
		let tiger = tiger.poll_interval_guard(Duration::from_millis(250));
		assert_eq!(tiger.poll_interval(), Duration::from_millis(250));
	}
	assert_eq!(tiger.poll_interval(), Controller::<Mock>::DEFAULT_POLL_INTERVAL);
}

#[test]
fn timeout_guard() {
	let mut tiger = open_mock(&[":A"]);
	let original = tiger.read_timeout().unwrap();
	{
		let mut tiger = tiger.timeout_guard(Some(Duration::from_millis(20))).unwrap();
		assert_eq!(tiger.read_timeout().unwrap(), Some(Duration::from_millis(20)));
		tiger.halt().unwrap();
	}
	assert_eq!(tiger.read_timeout().unwrap(), original);
}

#[test]
fn timeout_guard_poisons_on_failed_restore() {
	let mut tiger = open_mock(&[":A"]);
	{
		let mut tiger = tiger.timeout_guard(None).unwrap();
		tiger
			.backend_mut()
			.set_read_timeout_error(Some(io::Error::other("port gone")));
	}
	let err = tiger.halt().unwrap_err();
	assert!(matches!(err, Error::Io(_)), "{err:?}");
	// The poison is only reported once.
	tiger.halt().unwrap();
}

#[test]
fn disconnect_returns_backend() {
	let mut tiger = open_mock(&[":A"]);
	tiger.halt().unwrap();
	let mock = tiger.into_backend();
	assert_eq!(mock.written(), b"\\\r");
}
