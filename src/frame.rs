use core::fmt;

use crate::error::Am2302Error;

/// Number of bytes the sensor sends per transaction.
pub const FRAME_LEN: usize = 5;

/// Reading returned by the AM2302 sensor.
///
/// Both values are fixed point in tenths of a unit, as sent by the sensor:
/// a humidity of `652` is 65.2 %RH.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
    /// Temperature in tenths of a degree Celsius.
    ///
    /// Decoded as an unsigned value. The sensor marks sub-zero temperatures
    /// by setting the top bit, so those read as values above `0x8000` here;
    /// see [`Reading::signed_temperature`].
    pub temperature: u16,
}

impl Reading {
    /// Temperature in tenths of a degree, treating the top bit as a sign flag.
    pub fn signed_temperature(&self) -> i16 {
        let magnitude = (self.temperature & 0x7FFF) as i16;
        if self.temperature & 0x8000 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl fmt::Display for Reading {
    /// Renders as `65,2% 26,0C`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}% {},{}C",
            self.humidity / 10,
            self.humidity % 10,
            self.temperature / 10,
            self.temperature % 10
        )
    }
}

/// Raw bytes sampled from the line during one transaction.
///
/// Humidity high and low, temperature high and low, then the checksum.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorFrame {
    /// Bytes in the order they were received.
    pub bytes: [u8; FRAME_LEN],
}

impl SensorFrame {
    /// Wraps five bytes read from the line.
    pub fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Low 8 bits of the sum of the four data bytes.
    pub fn checksum(&self) -> u8 {
        self.bytes[..4]
            .iter()
            .fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Validates the checksum and splits the data bytes into a [`Reading`].
    pub fn decode<E>(&self) -> Result<Reading, Am2302Error<E>> {
        let [hum_hi, hum_lo, temp_hi, temp_lo, received] = self.bytes;

        let computed = self.checksum();
        if computed != received {
            return Err(Am2302Error::ChecksumMismatch { received, computed });
        }

        Ok(Reading {
            humidity: u16::from_be_bytes([hum_hi, hum_lo]),
            temperature: u16::from_be_bytes([temp_hi, temp_lo]),
        })
    }
}
