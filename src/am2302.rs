use embedded_hal::{delay::DelayNs, digital::PinState};

use crate::error::Am2302Error;
use crate::frame::{FRAME_LEN, Reading, SensorFrame};
use crate::line::{Direction, Line};

/// How long the start signal holds the line low (datasheet: 0.8 to 20 ms).
pub const START_SIGNAL_MS: u32 = 20;

/// Budget for the sensor to pull the line low after the start signal is
/// released (datasheet: 20 to 200us).
pub const MASTER_RELEASE_TIMEOUT_US: u32 = 200;

/// Budget for the sensor's low response pulse (datasheet: 75 to 85us).
pub const RESPONSE_LOW_TIMEOUT_US: u32 = 85;

/// Budget for the sensor's high response pulse (datasheet: 75 to 85us).
pub const RESPONSE_HIGH_TIMEOUT_US: u32 = 85;

/// Budget for the low gap before each data bit (datasheet: 48 to 55us).
pub const SIGNAL_LOW_TIMEOUT_US: u32 = 55;

/// Delay after a bit goes high before it is sampled.
///
/// A `0` bit is high for 22 to 30us and a `1` bit for 68 to 75us, so the
/// line is still high at this point only for a `1`.
pub const BIT_SAMPLE_DELAY_US: u32 = 30;

/// Budget for a `1` bit to end once it has been sampled (75us - 30us).
pub const SIGNAL_HIGH_TIMEOUT_US: u32 = 45;

/// Protocol engine for the AM2302 (DHT22) temperature and humidity sensor.
pub struct Am2302<L, D> {
    line: L,
    delay: D,
}

impl<L, D> Am2302<L, D>
where
    L: Line,
    D: DelayNs,
{
    /// Creates a new instance of the AM2302 engine.
    ///
    /// # Arguments
    ///
    /// * `line` - The data line the sensor is connected to.
    /// * `delay` - A delay provider implementing the `DelayNs` trait. All
    ///   protocol timing comes from it.
    ///
    /// Call [`Am2302::init`] before the first [`Am2302::read`].
    pub fn new(line: L, delay: D) -> Self {
        Am2302 { line, delay }
    }

    /// Releases the line to input so the sensor's pull-up holds it idle high.
    pub fn init(&mut self) -> Result<(), Am2302Error<L::Error>> {
        self.line.release_high()?;
        Ok(())
    }

    /// Reads humidity and temperature from the sensor.
    ///
    /// Blocks for roughly 25 ms: a 20 ms start signal followed by the
    /// sensor's response. Between calls the line needs time to return to
    /// idle high; the sensor itself should not be polled more than once
    /// every second or two.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the transaction completed and the checksum is valid.
    /// * `Err(Am2302Error)` naming the first phase that failed.
    pub fn read(&mut self) -> Result<Reading, Am2302Error<L::Error>> {
        let outcome = self.transact();

        #[cfg(feature = "defmt")]
        match &outcome {
            Ok(reading) => defmt::trace!("am2302 reading: {}", reading),
            Err(err) => defmt::debug!("am2302 transaction failed, code {}", err.code()),
        }

        outcome
    }

    /// Gives back the line and delay provider.
    pub fn release(self) -> (L, D) {
        (self.line, self.delay)
    }

    fn transact(&mut self) -> Result<Reading, Am2302Error<L::Error>> {
        if self.line.is_low()? {
            return Err(Am2302Error::BusNotFree);
        }

        self.start()?;
        let frame = self.read_frame()?;
        frame.decode()
    }

    /// Sends the start signal and waits through the sensor's response.
    ///
    /// The sensor answers by pulling the line low for ~80us, then
    /// releasing it for ~80us before the first data bit.
    fn start(&mut self) -> Result<(), Am2302Error<L::Error>> {
        self.line.set_direction(Direction::Output)?;
        self.line.drive_low()?;
        self.delay.delay_ms(START_SIGNAL_MS);
        self.line.release_high()?;

        self.wait_for(
            PinState::Low,
            MASTER_RELEASE_TIMEOUT_US,
            Am2302Error::MasterReleaseTimeout,
        )?;
        self.wait_for(
            PinState::High,
            RESPONSE_LOW_TIMEOUT_US,
            Am2302Error::ResponseLowTimeout,
        )?;
        self.wait_for(
            PinState::Low,
            RESPONSE_HIGH_TIMEOUT_US,
            Am2302Error::ResponseHighTimeout,
        )?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<SensorFrame, Am2302Error<L::Error>> {
        let mut bytes = [0; FRAME_LEN];

        for b in bytes.iter_mut() {
            *b = self.read_byte()?;
        }

        Ok(SensorFrame::new(bytes))
    }

    /// Reads one byte, most significant bit first.
    fn read_byte(&mut self) -> Result<u8, Am2302Error<L::Error>> {
        let mut byte: u8 = 0;

        for _ in 0..8 {
            byte <<= 1;
            if self.read_bit()? {
                byte |= 1;
            }
        }

        Ok(byte)
    }

    /// Reads a single bit.
    ///
    /// Every bit starts with the sensor holding the line low; the length of
    /// the high pulse that follows carries the value.
    fn read_bit(&mut self) -> Result<bool, Am2302Error<L::Error>> {
        self.wait_for(
            PinState::High,
            SIGNAL_LOW_TIMEOUT_US,
            Am2302Error::SignalLowTimeout,
        )?;

        self.delay.delay_us(BIT_SAMPLE_DELAY_US);

        // A zero bit has already ended and the next low gap is running.
        if self.line.is_low()? {
            return Ok(false);
        }

        self.wait_for(
            PinState::Low,
            SIGNAL_HIGH_TIMEOUT_US,
            Am2302Error::SignalHighTimeout,
        )?;
        Ok(true)
    }

    /// Polls the line once per microsecond until it reaches `level`.
    ///
    /// # Errors
    ///
    /// Returns `on_timeout` if the line still differs from `level` when
    /// sampled at the `budget_us` deadline.
    fn wait_for(
        &mut self,
        level: PinState,
        budget_us: u32,
        on_timeout: Am2302Error<L::Error>,
    ) -> Result<(), Am2302Error<L::Error>> {
        // Samples at 0, 1, .. budget_us microseconds.
        for elapsed in 0..=budget_us {
            if self.line.sample_level()? == level {
                return Ok(());
            }
            if elapsed < budget_us {
                self.delay.delay_us(1);
            }
        }
        Err(on_timeout)
    }
}
