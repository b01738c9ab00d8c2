//! A library for communicating with ASI Tiger controllers and hubs over a
//! serial port.
//!
//! A [`Controller`] session sends one ASCII command per call and decodes the
//! reply into typed values: axis positions, [build reports](axis::Axis::from_build),
//! [status bytes](status::AxisStatus) and so on. Failures the controller
//! reports with an `:N-<code>` reply are returned as distinct
//! [error types](error), one per code.
//!
//! ```rust
//! # use asitiger::Controller;
//! # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tiger = Controller::open("/dev/ttyUSB0")?;
//! tiger.move_relative([("X", 100)])?;
//! tiger.wait_until_idle(None)?;
//! let position = tiger.position(&["X", "Y"])?;
//! # Ok(())
//! # }
//! ```
//!
//! The command encoder and reply decoders are usable on their own, see the
//! [`command`], [`response`], [`check`], [`axis`] and [`status`] modules.
//!
//! Log messages are emitted through the [`log`] crate: every command and
//! reply at the `debug` level, prefixed with the port name.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(all(doc, feature = "doc_cfg"), feature(doc_cfg))]

pub mod axis;
pub mod backend;
pub mod check;
pub mod command;
pub mod connection;
pub mod controller;
pub mod error;
pub mod guard;
pub mod hub;
pub mod response;
pub mod secure;
pub mod status;

pub use controller::{Controller, OpenSerialOptions};
pub use hub::Hub;
