use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// The single open-drain data line shared with the sensor.
///
/// The line is only ever driven low. A high level comes from releasing the
/// line to input and letting the external pull-up do the work, so
/// implementations must never push the pin high.
///
/// Every method sits inside the protocol's microsecond polling loops and
/// should be a direct register access.
pub trait Line {
    type Error;

    /// Switches the pin between input (high impedance) and output.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Asserts low. Only valid after switching to [`Direction::Output`].
    fn drive_low(&mut self) -> Result<(), Self::Error>;

    /// Releases the line so the pull-up returns it to high.
    fn release_high(&mut self) -> Result<(), Self::Error> {
        self.set_direction(Direction::Input)
    }

    /// Samples the current level of the line.
    fn sample_level(&mut self) -> Result<PinState, Self::Error>;

    /// Whether the line currently reads high.
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample_level()? == PinState::High)
    }

    /// Whether the line currently reads low.
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample_level()? == PinState::Low)
    }
}

/// [`Line`] backend for an `embedded-hal` pin configured as open-drain
/// output with input enabled.
///
/// On such a pin `set_low()` pulls the line down and `set_high()` turns the
/// output transistor off, which is the same as switching to input. The
/// pin's internal pull-up should be disabled; the sensor module carries its
/// own.
pub struct OpenDrainLine<P> {
    pin: P,
}

impl<P> OpenDrainLine<P> {
    /// Wraps `pin` as the sensor's data line.
    ///
    /// # Open-drain only
    ///
    /// `pin` must already be configured as an open-drain output. Releasing
    /// the line calls `set_high()`, which on a push-pull pin drives the line
    /// high against the sensor. Platforms without an open-drain mode should
    /// implement [`Line`] directly and switch the pin's direction instead.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P, E> Line for OpenDrainLine<P>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
{
    type Error = E;

    fn set_direction(&mut self, direction: Direction) -> Result<(), E> {
        match direction {
            Direction::Input => self.pin.set_high(),
            // The output stage is enabled by asserting low.
            Direction::Output => Ok(()),
        }
    }

    fn drive_low(&mut self) -> Result<(), E> {
        self.pin.set_low()
    }

    fn sample_level(&mut self) -> Result<PinState, E> {
        Ok(PinState::from(self.pin.is_high()?))
    }
}
