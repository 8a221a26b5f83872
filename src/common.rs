pub trait PortDriver {
    type Error;

    /// Set all pins in `mask_high` to HIGH and all pins in `mask_low` to LOW.
    ///
    /// The driver should implement this such that all pins change state at the same time.
    fn set(&mut self, mask_high: u32, mask_low: u32) -> Result<(), Self::Error>;

    /// Check whether pins in `mask_high` were set HIGH and pins in `mask_low` were set LOW.
    ///
    /// For each pin in either of the masks, the returned `u32` should have a 1 if they meet the
    /// expected state and a 0 otherwise.  All other bits MUST always stay 0.
    fn is_set(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error>;

    /// Check whether pins in `mask_high` are driven HIGH and pins in `mask_low` are driven LOW.
    ///
    /// Same result encoding as [`PortDriver::is_set`].
    fn get(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error>;

    fn toggle(&mut self, mask: u32) -> Result<(), Self::Error> {
        // for all pins which are currently low, make them high.
        let mask_high = self.is_set(0, mask)?;
        // for all pins which are currently high, make them low.
        let mask_low = self.is_set(mask, 0)?;
        self.set(mask_high, mask_low)
    }
}

pub trait PortDriverTotemPole: PortDriver {
    /// Set the direction for all pins in `mask` to direction `dir`.
    ///
    /// When making pins outputs, `state` is latched first so the pins come up HIGH or LOW
    /// without a glitch.
    fn set_direction(&mut self, mask: u32, dir: Direction, state: bool) -> Result<(), Self::Error>;
}

pub trait PortDriverPolarity: PortDriver {
    /// Set the polarity of all pins in `mask` either `inverted` or not.
    fn set_polarity(&mut self, mask: u32, inverted: bool) -> Result<(), Self::Error>;
}

pub trait PortDriverPullUp: PortDriver {
    /// Enable pull-ups for pins in mask or set the pin to floating if enable is false.
    fn set_pull_up(&mut self, mask: u32, enable: bool) -> Result<(), Self::Error>;
}

pub trait PortDriverInterrupts: PortDriver {
    /// Arm the interrupt of all pins in `mask` with the trigger condition `mode`.
    fn enable_interrupts(&mut self, mask: u32, mode: InterruptMode) -> Result<(), Self::Error>;

    /// Disarm the interrupt of all pins in `mask`.
    fn disable_interrupts(&mut self, mask: u32) -> Result<(), Self::Error>;

    /// Pins from `mask` flagged as having caused the pending interrupt.
    ///
    /// Must not clear the interrupt on the port expander.
    fn interrupt_pending(&mut self, mask: u32) -> Result<u32, Self::Error>;

    /// State of the pins from `mask` captured when the interrupt fired.
    ///
    /// Clears the interrupt on the port expander.
    fn captured_state(&mut self, mask: u32) -> Result<u32, Self::Error>;
}

/// Pin direction as programmed into `IODIR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Condition under which an armed pin raises the interrupt output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Any change relative to the previous pin value.
    Change,
    /// Pin differs from a default of LOW.
    Rising,
    /// Pin differs from a default of HIGH.
    Falling,
}

impl InterruptMode {
    /// `INTCON` bit: compare against `DEFVAL` instead of the previous value.
    pub(crate) fn compares_defval(self) -> bool {
        self != InterruptMode::Change
    }

    /// `DEFVAL` bit: the level at which the pin is considered idle.
    pub(crate) fn default_level(self) -> bool {
        self == InterruptMode::Falling
    }
}

/// Raw value reported in place of a pin when no interrupt is pending.
pub const INT_ERR: u8 = 0xff;

/// Result of a post-interrupt query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntQuery<T> {
    /// An armed pin met its condition.
    Pending(T),
    /// `INTF` was empty.
    NoInterrupt,
}

impl<T> IntQuery<T> {
    pub fn pending(self) -> Option<T> {
        match self {
            IntQuery::Pending(v) => Some(v),
            IntQuery::NoInterrupt => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, IntQuery::Pending(_))
    }
}

impl IntQuery<u8> {
    /// Pin index, or [`INT_ERR`] when nothing is pending.
    pub fn to_raw(self) -> u8 {
        self.pending().unwrap_or(INT_ERR)
    }
}

impl IntQuery<bool> {
    /// Captured level as 0 or 1, or [`INT_ERR`] when nothing is pending.
    pub fn to_raw(self) -> u8 {
        self.pending().map_or(INT_ERR, u8::from)
    }
}

/// Pin Modes
pub mod mode {
    /// Trait for pin-modes which can be used to set a logic level.
    pub trait HasOutput {}
    /// Trait for pin-modes which can be used to read a logic level.
    pub trait HasInput {}

    /// Pin configured as an input.
    pub struct Input;
    impl HasInput for Input {}

    /// Pin configured as an output.
    pub struct Output;
    impl HasOutput for Output {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_mode_encoding() {
        assert!(!InterruptMode::Change.compares_defval());
        assert!(!InterruptMode::Change.default_level());
        assert!(InterruptMode::Rising.compares_defval());
        assert!(!InterruptMode::Rising.default_level());
        assert!(InterruptMode::Falling.compares_defval());
        assert!(InterruptMode::Falling.default_level());
    }

    #[test]
    fn raw_sentinel() {
        assert_eq!(IntQuery::Pending(5u8).to_raw(), 5);
        assert_eq!(IntQuery::<u8>::NoInterrupt.to_raw(), INT_ERR);
        assert_eq!(IntQuery::Pending(true).to_raw(), 1);
        assert_eq!(IntQuery::Pending(false).to_raw(), 0);
        assert_eq!(IntQuery::<bool>::NoInterrupt.to_raw(), INT_ERR);
        assert_eq!(IntQuery::Pending(3u8).pending(), Some(3));
        assert!(!IntQuery::<u8>::NoInterrupt.is_pending());
    }
}
