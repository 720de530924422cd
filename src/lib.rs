//! AM2302 (DHT22) Sensor Protocol Engine for Embedded Rust
//!
//! This crate decodes relative humidity and temperature from an AM2302/DHT22
//! sensor over its single open-drain data line, built on top of the
//! [`embedded-hal`] traits.
//!
//! # Features
//! - Blocking synchronous API, busy-polled with 1us resolution
//! - Designed for `no_std` environments
//! - Values kept in the sensor's native tenths-of-a-unit encoding
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! The engine needs two collaborators:
//! - a [`Line`], the pin seam. [`OpenDrainLine`] adapts any pin implementing
//!   [`InputPin`] and [`OutputPin`] in open-drain mode.
//! - a [`DelayNs`] provider, which is the only source of protocol timing.
//!
//! # Example
//!
//! ```ignore
//! let mut sensor = Am2302::new(OpenDrainLine::new(pin), delay);
//! sensor.init()?;
//!
//! match sensor.read() {
//!     Ok(reading) => println!("{}", reading), // 65,2% 26,0C
//!     Err(err) => println!("Error {}", err.code().unwrap_or(0)),
//! }
//! ```
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs each transaction outcome
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod am2302;
pub mod error;
pub mod frame;
pub mod line;

mod sim;

pub use am2302::Am2302;
pub use error::Am2302Error;
pub use frame::{Reading, SensorFrame};
pub use line::{Direction, Line, OpenDrainLine};
