use core::marker::PhantomData;
use embedded_hal::digital as hal_digital;

use crate::InterruptMode;

/// Representation of an expander pin.
///
/// `Pin` is not constructed directly, this type is created by instantiating a port-expander and
/// then getting access to all its pins using the `.split()` method.
pub struct Pin<'a, MODE, MUTEX> {
    pin_number: u8,
    pin_mask: u32,
    port_driver: &'a MUTEX,
    _m: PhantomData<MODE>,
}

impl<'a, MODE, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub(crate) fn new(pin_number: u8, port_driver: &'a MUTEX) -> Self {
        debug_assert!(pin_number < 8);
        Self {
            pin_number,
            pin_mask: 1 << pin_number,
            port_driver,
            _m: PhantomData,
        }
    }

    pub fn pin_number(&self) -> u8 {
        self.pin_number
    }

    fn into_mode<NEWMODE>(self) -> Pin<'a, NEWMODE, MUTEX> {
        Pin {
            pin_number: self.pin_number,
            pin_mask: self.pin_mask,
            port_driver: self.port_driver,
            _m: PhantomData,
        }
    }
}

impl<'a, MODE, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver + crate::PortDriverTotemPole,
    MUTEX: crate::PortMutex<Port = PD>,
{
    /// Configure this pin as an input.
    pub fn into_input(self) -> Result<Pin<'a, crate::mode::Input, MUTEX>, PD::Error> {
        self.port_driver
            .lock(|drv| drv.set_direction(self.pin_mask, crate::Direction::Input, false))?;
        Ok(self.into_mode())
    }

    /// Configure this pin as an output with an initial LOW state.
    pub fn into_output(self) -> Result<Pin<'a, crate::mode::Output, MUTEX>, PD::Error> {
        self.port_driver
            .lock(|drv| drv.set_direction(self.pin_mask, crate::Direction::Output, false))?;
        Ok(self.into_mode())
    }

    /// Configure this pin as an output with an initial HIGH state.
    pub fn into_output_high(self) -> Result<Pin<'a, crate::mode::Output, MUTEX>, PD::Error> {
        self.port_driver
            .lock(|drv| drv.set_direction(self.pin_mask, crate::Direction::Output, true))?;
        Ok(self.into_mode())
    }
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver + crate::PortDriverPolarity,
    MUTEX: crate::PortMutex<Port = PD>,
{
    /// Turn on hardware polarity inversion for this pin.
    pub fn into_inverted(mut self) -> Result<Self, PD::Error> {
        self.set_inverted(true)?;
        Ok(self)
    }

    /// Set hardware polarity inversion for this pin.
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), PD::Error> {
        self.port_driver
            .lock(|drv| drv.set_polarity(self.pin_mask, inverted))
    }
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver + crate::PortDriverPullUp,
    MUTEX: crate::PortMutex<Port = PD>,
{
    /// Enable or disable the internal pull-up resistor of this pin.
    pub fn set_pull_up(&mut self, enable: bool) -> Result<(), PD::Error> {
        self.port_driver
            .lock(|drv| drv.set_pull_up(self.pin_mask, enable))
    }
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver + crate::PortDriverInterrupts,
    MUTEX: crate::PortMutex<Port = PD>,
{
    /// Arm the interrupt of this pin.
    pub fn enable_interrupt(&mut self, mode: InterruptMode) -> Result<(), PD::Error> {
        self.port_driver
            .lock(|drv| drv.enable_interrupts(self.pin_mask, mode))
    }

    pub fn disable_interrupt(&mut self) -> Result<(), PD::Error> {
        self.port_driver
            .lock(|drv| drv.disable_interrupts(self.pin_mask))
    }

    /// Whether this pin is flagged as a source of the pending interrupt.
    ///
    /// Does not clear the interrupt.
    pub fn interrupt_pending(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.interrupt_pending(self.pin_mask))
            .map(|v| v == self.pin_mask)
    }

    /// Level of this pin at the time the interrupt fired.
    ///
    /// Clears the interrupt for all pins of the expander.
    pub fn captured_level(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.captured_state(self.pin_mask))
            .map(|v| v == self.pin_mask)
    }
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub fn is_high(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.get(self.pin_mask, 0))
            .map(|v| v == self.pin_mask)
    }

    pub fn is_low(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.get(0, self.pin_mask))
            .map(|v| v == self.pin_mask)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    MUTEX: crate::PortMutex<Port = PD>,
{
    pub fn set_high(&mut self) -> Result<(), PD::Error> {
        self.port_driver.lock(|drv| drv.set(self.pin_mask, 0))
    }

    pub fn set_low(&mut self) -> Result<(), PD::Error> {
        self.port_driver.lock(|drv| drv.set(0, self.pin_mask))
    }

    pub fn is_set_high(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.is_set(self.pin_mask, 0))
            .map(|v| v == self.pin_mask)
    }

    pub fn is_set_low(&self) -> Result<bool, PD::Error> {
        self.port_driver
            .lock(|drv| drv.is_set(0, self.pin_mask))
            .map(|v| v == self.pin_mask)
    }

    pub fn toggle(&mut self) -> Result<(), PD::Error> {
        self.port_driver.lock(|drv| drv.toggle(self.pin_mask))
    }
}

impl<'a, MODE, MUTEX, PD> hal_digital::ErrorType for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: hal_digital::Error,
    MUTEX: crate::PortMutex<Port = PD>,
{
    type Error = PD::Error;
}

impl<'a, MODE: crate::mode::HasInput, MUTEX, PD> hal_digital::InputPin for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: hal_digital::Error,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_high(self)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_low(self)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> hal_digital::OutputPin for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: hal_digital::Error,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Pin::set_low(self)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Pin::set_high(self)
    }
}

impl<'a, MODE: crate::mode::HasOutput, MUTEX, PD> hal_digital::StatefulOutputPin
    for Pin<'a, MODE, MUTEX>
where
    PD: crate::PortDriver,
    PD::Error: hal_digital::Error,
    MUTEX: crate::PortMutex<Port = PD>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_high(self)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_low(self)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self)
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn digital_traits() {
        let expectations = [
            // gp2 into output
            mock_i2c::Transaction::write_read(0x20, vec![0x0a], vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x09, 0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x00], vec![0xff]),
            mock_i2c::Transaction::write(0x20, vec![0x00, 0xfb]),
            // OutputPin::set_high
            mock_i2c::Transaction::write_read(0x20, vec![0x0a], vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x09, 0x04]),
            // StatefulOutputPin::is_set_low
            mock_i2c::Transaction::write_read(0x20, vec![0x0a], vec![0x04]),
            // InputPin::is_low on gp6
            mock_i2c::Transaction::write_read(0x20, vec![0x09], vec![0x04]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mcp = crate::Mcp23008::new(bus.clone(), false, false, false);
        let pins = mcp.split();

        let mut gp2 = pins.gp2.into_output().unwrap();
        assert_eq!(gp2.pin_number(), 2);
        OutputPin::set_high(&mut gp2).unwrap();
        assert!(!StatefulOutputPin::is_set_low(&mut gp2).unwrap());

        let mut gp6 = pins.gp6;
        assert!(InputPin::is_low(&mut gp6).unwrap());

        bus.done();
    }

    #[test]
    fn pin_errors_surface() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x09], vec![0x00])
                .with_error(embedded_hal::i2c::ErrorKind::Other),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mcp = crate::Mcp23008::new(bus.clone(), false, false, false);
        let pins = mcp.split();

        assert_eq!(
            pins.gp0.is_high(),
            Err(crate::Error::Bus(embedded_hal::i2c::ErrorKind::Other))
        );

        bus.done();
    }
}
