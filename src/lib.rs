//! Driver for the Microchip MCP23008 8-bit I2C GPIO expander.
//!
//! Pin-number interface:
//!
//! ```no_run
//! # use embedded_hal_mock::eh1::i2c::Mock;
//! # let i2c = Mock::new(&[]);
//! use mcp23008::{Direction, Driver, IntQuery, InterruptMode};
//!
//! let mut mcp = Driver::new(i2c);
//! mcp.begin(0).unwrap();
//! mcp.pin_mode(3, Direction::Output).unwrap();
//! mcp.digital_write(3, true).unwrap();
//!
//! mcp.pull_up(5, true).unwrap();
//! mcp.setup_interrupt_pin(5, InterruptMode::Falling).unwrap();
//! if let IntQuery::Pending(level) = mcp.last_interrupt_pin_value().unwrap() {
//!     assert!(!level);
//! }
//! ```
//!
//! Typed pins implementing the `embedded-hal` digital traits:
//!
//! ```no_run
//! # use embedded_hal_mock::eh1::i2c::Mock;
//! # let i2c = Mock::new(&[]);
//! let mcp = mcp23008::Mcp23008::new(i2c, false, false, false);
//! let pins = mcp.split();
//! let mut led = pins.gp3.into_output().unwrap();
//! led.set_high().unwrap();
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
pub mod asynch;
mod bus;
mod common;
pub mod dev;
mod error;
mod mutex;
mod pin;

pub use bus::I2cBus;
#[cfg(feature = "async")]
pub use bus::I2cBusAsync;
pub use common::mode;
pub use common::{Direction, IntQuery, InterruptMode, INT_ERR};
pub use common::{
    PortDriver, PortDriverInterrupts, PortDriverPolarity, PortDriverPullUp, PortDriverTotemPole,
};
pub use error::Error;
pub use mutex::PortMutex;
pub use pin::Pin;

pub(crate) use bus::I2cExt;

pub use dev::mcp23008::{Driver, Mcp23008, Register};
