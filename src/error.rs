use core::fmt;

/// Possible errors from an AM2302 transaction.
///
/// The protocol variants are listed in the order the transaction can detect
/// them; the first one detected ends the transaction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Am2302Error<E> {
    /// The line was low before the start signal was sent.
    BusNotFree,
    /// The sensor did not pull the line low after the start signal was released.
    MasterReleaseTimeout,
    /// The sensor's low response pulse did not end in time.
    ResponseLowTimeout,
    /// The sensor's high response pulse did not end in time.
    ResponseHighTimeout,
    /// A data bit did not start (line stayed low) in time.
    SignalLowTimeout,
    /// A `1` bit did not end (line stayed high) in time.
    SignalHighTimeout,
    /// The checksum byte did not match the truncated sum of the data bytes.
    ChecksumMismatch { received: u8, computed: u8 },
    /// Error from the GPIO backend of the line.
    Pin(E),
}

impl<E> Am2302Error<E> {
    /// Datasheet error code, `1` (bus not free) through `7` (checksum).
    ///
    /// Backend faults have no code.
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::BusNotFree => Some(1),
            Self::MasterReleaseTimeout => Some(2),
            Self::ResponseLowTimeout => Some(3),
            Self::ResponseHighTimeout => Some(4),
            Self::SignalLowTimeout => Some(5),
            Self::SignalHighTimeout => Some(6),
            Self::ChecksumMismatch { .. } => Some(7),
            Self::Pin(_) => None,
        }
    }

    /// Whether the sensor missed one of the protocol's timing windows.
    pub fn is_timeout(&self) -> bool {
        matches!(self.code(), Some(2..=6))
    }
}

impl<E> From<E> for Am2302Error<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Am2302Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusNotFree => f.write_str("sensor bus not free"),
            Self::MasterReleaseTimeout => f.write_str("timeout: bus master release time"),
            Self::ResponseLowTimeout => f.write_str("timeout: response to low time"),
            Self::ResponseHighTimeout => f.write_str("timeout: response to high time"),
            Self::SignalLowTimeout => f.write_str("timeout: signal low time"),
            Self::SignalHighTimeout => f.write_str("timeout: signal high time"),
            Self::ChecksumMismatch { received, computed } => write!(
                f,
                "checksum mismatch: received {:#04x}, computed {:#04x}",
                received, computed
            ),
            Self::Pin(err) => write!(f, "line error: {:?}", err),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Am2302Error<E> {}
