#![cfg(test)]

//! A simulated sensor on a virtual microsecond clock.
//!
//! The line and the delay share one clock: time only advances when the engine
//! delays, and every sample reads the waveform at the current instant.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::frame::FRAME_LEN;
use crate::line::{Direction, Line};

/// Typical high time of a `0` bit.
pub(crate) const ZERO_HIGH_US: u32 = 26;
/// Typical high time of a `1` bit.
pub(crate) const ONE_HIGH_US: u32 = 70;

/// Durations of one bit cell: the low gap, then the high pulse of a `0` or `1`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BitTiming {
    pub(crate) low_us: u32,
    pub(crate) zero_us: u32,
    pub(crate) one_us: u32,
}

impl BitTiming {
    pub(crate) const TYPICAL: Self = Self {
        low_us: 50,
        zero_us: ZERO_HIGH_US,
        one_us: ONE_HIGH_US,
    };
}

#[derive(Default)]
pub(crate) struct Clock {
    now_ns: Cell<u64>,
}

impl Clock {
    pub(crate) fn now_us(&self) -> u64 {
        self.now_ns.get() / 1_000
    }
}

pub(crate) struct SimDelay {
    clock: Rc<Clock>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.now_ns.set(self.clock.now_ns.get() + u64::from(ns));
    }
}

/// Levels the sensor puts on the line after the start signal is released,
/// as `(level, duration)` segments. The line idles high afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct Waveform {
    segments: Vec<(PinState, u32)>,
}

impl Waveform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then(mut self, level: PinState, us: u32) -> Self {
        self.segments.push((level, us));
        self
    }

    /// Typical handshake: 30us until the sensor answers, 80us low, 80us high.
    pub(crate) fn response() -> Self {
        Self::handshake(30, 80, 80)
    }

    /// Handshake with explicit timings: time until the sensor pulls the line
    /// low, then its low and high response pulses.
    pub(crate) fn handshake(release_us: u32, low_us: u32, high_us: u32) -> Self {
        Self::new()
            .then(PinState::High, release_us)
            .then(PinState::Low, low_us)
            .then(PinState::High, high_us)
    }

    /// One bit cell: 50us low, then `high_us` high.
    pub(crate) fn bit(self, high_us: u32) -> Self {
        self.then(PinState::Low, 50).then(PinState::High, high_us)
    }

    /// Data bits of `bytes`, MSB first, followed by the closing low pulse.
    pub(crate) fn bits(mut self, bytes: [u8; FRAME_LEN], timing: BitTiming) -> Self {
        for byte in bytes {
            for i in (0..8).rev() {
                let high_us = if (byte >> i) & 1 == 1 {
                    timing.one_us
                } else {
                    timing.zero_us
                };
                self = self
                    .then(PinState::Low, timing.low_us)
                    .then(PinState::High, high_us);
            }
        }
        self.then(PinState::Low, 50)
    }

    /// Handshake followed by a full frame with typical bit timings.
    pub(crate) fn frame(bytes: [u8; FRAME_LEN]) -> Self {
        Self::response().bits(bytes, BitTiming::TYPICAL)
    }

    fn level_at(&self, elapsed_us: u64) -> PinState {
        let mut start = 0u64;
        for &(level, duration) in &self.segments {
            let end = start + u64::from(duration);
            if elapsed_us < end {
                return level;
            }
            start = end;
        }
        PinState::High
    }
}

pub(crate) struct SimLine {
    clock: Rc<Clock>,
    waveform: Waveform,
    stuck_low: bool,
    direction: Direction,
    driving_low: bool,
    released_at: Option<u64>,
    pub(crate) writes: usize,
    pub(crate) samples: usize,
}

impl SimLine {
    fn level(&self) -> PinState {
        if self.stuck_low || (self.direction == Direction::Output && self.driving_low) {
            return PinState::Low;
        }
        match self.released_at {
            Some(at) => self.waveform.level_at(self.clock.now_us() - at),
            None => PinState::High,
        }
    }
}

impl Line for SimLine {
    type Error = Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Infallible> {
        self.writes += 1;
        if direction == Direction::Input && self.driving_low {
            self.driving_low = false;
            self.released_at = Some(self.clock.now_us());
        }
        self.direction = direction;
        Ok(())
    }

    fn drive_low(&mut self) -> Result<(), Infallible> {
        self.writes += 1;
        self.driving_low = true;
        Ok(())
    }

    fn sample_level(&mut self) -> Result<PinState, Infallible> {
        self.samples += 1;
        Ok(self.level())
    }
}

/// A line answering with `waveform`, and a delay on the same clock.
pub(crate) fn sensor(waveform: Waveform) -> (SimLine, SimDelay, Rc<Clock>) {
    build(waveform, false)
}

/// A line held low by a fault or a missing sensor.
pub(crate) fn stuck_low() -> (SimLine, SimDelay, Rc<Clock>) {
    build(Waveform::new(), true)
}

fn build(waveform: Waveform, stuck_low: bool) -> (SimLine, SimDelay, Rc<Clock>) {
    let clock = Rc::new(Clock::default());
    let line = SimLine {
        clock: clock.clone(),
        waveform,
        stuck_low,
        direction: Direction::Input,
        driving_low: false,
        released_at: None,
        writes: 0,
        samples: 0,
    };
    let delay = SimDelay {
        clock: clock.clone(),
    };
    (line, delay, clock)
}
