//! Support for the `MCP23008` "8-Bit I/O Expander with Serial Interface"
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/DeviceDoc/MCP23008-MCP23S08-Data-Sheet-20001919F.pdf
//!
//! The MCP23008 offers one eight-bit GPIO port.  It has three address pins, so eight devices can
//! coexist on an I2C bus.  A single INT output signals pin changes; each pin can be armed to
//! trigger on any change or on a mismatch against a programmable default level.
//!
//! Two interfaces are offered:
//!
//! - [`Driver`] speaks in pin numbers (`pin_mode(3, Direction::Output)`,
//!   `digital_write(3, true)`, ...) and maps every call onto register transactions.
//! - [`Mcp23008`] wraps a `Driver` in a [`PortMutex`][crate::PortMutex] and hands out one typed
//!   [`Pin`][crate::Pin] per GPIO.
//!
//! Neither keeps a copy of the device registers; each single-bit change is a fresh
//! read-modify-write on the bus.
use crate::I2cExt;
use crate::{Direction, Error, IntQuery, InterruptMode};

/// `MCP23008` "8-Bit I/O Expander with Serial Interface"
pub struct Mcp23008<M>(M);

impl<I2C> Mcp23008<core::cell::RefCell<Driver<I2C>>>
where
    I2C: crate::I2cBus,
{
    pub fn new(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        Self::with_mutex(i2c, a0, a1, a2)
    }
}

impl<I2C, M> Mcp23008<M>
where
    I2C: crate::I2cBus,
    M: crate::PortMutex<Port = Driver<I2C>>,
{
    pub fn with_mutex(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        Self(crate::PortMutex::create(Driver::with_address(i2c, a0, a1, a2)))
    }

    /// Hand out one [`Pin`][crate::Pin] per GPIO.  The device-wide methods below stay usable
    /// while the pins are alive.
    pub fn split(&self) -> Parts<'_, I2C, M> {
        Parts {
            gp0: crate::Pin::new(0, &self.0),
            gp1: crate::Pin::new(1, &self.0),
            gp2: crate::Pin::new(2, &self.0),
            gp3: crate::Pin::new(3, &self.0),
            gp4: crate::Pin::new(4, &self.0),
            gp5: crate::Pin::new(5, &self.0),
            gp6: crate::Pin::new(6, &self.0),
            gp7: crate::Pin::new(7, &self.0),
        }
    }

    /// Make all pins inputs, as after power-on reset.
    pub fn begin(&self) -> Result<(), Error<I2C::BusError>> {
        self.0.lock(|drv| {
            let addr = drv.hw_address();
            drv.begin(addr)
        })
    }

    /// See [`Driver::setup_interrupts`].
    pub fn setup_interrupts(
        &self,
        mirroring: bool,
        open_drain: bool,
        active_high: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        self.0
            .lock(|drv| drv.setup_interrupts(mirroring, open_drain, active_high))
    }

    /// See [`Driver::last_interrupt_pin`].
    pub fn last_interrupt_pin(&self) -> Result<IntQuery<u8>, Error<I2C::BusError>> {
        self.0.lock(|drv| drv.last_interrupt_pin())
    }

    /// See [`Driver::last_interrupt_pin_value`].
    pub fn last_interrupt_pin_value(&self) -> Result<IntQuery<bool>, Error<I2C::BusError>> {
        self.0.lock(|drv| drv.last_interrupt_pin_value())
    }

    pub fn read_gpio(&self) -> Result<u8, Error<I2C::BusError>> {
        self.0.lock(|drv| drv.read_gpio())
    }

    pub fn write_gpio(&self, value: u8) -> Result<(), Error<I2C::BusError>> {
        self.0.lock(|drv| drv.write_gpio(value))
    }
}

pub struct Parts<'a, I2C, M = core::cell::RefCell<Driver<I2C>>>
where
    I2C: crate::I2cBus,
    M: crate::PortMutex<Port = Driver<I2C>>,
{
    pub gp0: crate::Pin<'a, crate::mode::Input, M>,
    pub gp1: crate::Pin<'a, crate::mode::Input, M>,
    pub gp2: crate::Pin<'a, crate::mode::Input, M>,
    pub gp3: crate::Pin<'a, crate::mode::Input, M>,
    pub gp4: crate::Pin<'a, crate::mode::Input, M>,
    pub gp5: crate::Pin<'a, crate::mode::Input, M>,
    pub gp6: crate::Pin<'a, crate::mode::Input, M>,
    pub gp7: crate::Pin<'a, crate::mode::Input, M>,
}

/// Register map.
///
/// All registers reset to 0x00, except `IODIR` which resets to 0xFF (all pins inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// IODIR: input/output direction: 0=output; 1=input
    IODIR = 0x00,
    /// IPOL: input polarity: 0=register values match input pins; 1=opposite
    IPOL = 0x01,
    /// GPINTEN: interrupt-on-change: 0=disable; 1=enable
    GPINTEN = 0x02,
    /// DEFVAL: default values for interrupt-on-change
    DEFVAL = 0x03,
    /// INTCON: interrupt-on-change config: 0=compare to previous pin value;
    ///   1=compare to corresponding bit in DEFVAL
    INTCON = 0x04,
    /// IOCON: configuration register
    /// - Bit 6: MIRROR: no effect on the single INT pin of the MCP23008
    /// - Bit 5: SEQOP: controls the incrementing function of the address pointer
    /// - Bit 4: DISSLW: disables slew rate control on SDA
    /// - Bit 3: HAEN: no effect on MCP23008
    /// - Bit 2: ODR: INT is 0=active-driver output (INTPOL sets polarity)
    ///   or 1=open-drain output (overrides INTPOL)
    /// - Bit 1: INTPOL: INT is 0=active-low or 1=active-high
    IOCON = 0x05,
    /// GPPU: GPIO pull-ups: enables weak 100k pull-ups on each input pin
    GPPU = 0x06,
    /// INTF: interrupt flags: 0=no interrupt pending; 1=corresponding pin caused interrupt
    INTF = 0x07,
    /// INTCAP: interrupt captured value: port value at the time of the interrupt.  Reading
    ///   clears the interrupt.
    INTCAP = 0x08,
    /// GPIO: reflects logic level on pins; writing modifies OLAT
    GPIO = 0x09,
    /// OLAT: output latches: sets state for pins configured as outputs
    OLAT = 0x0a,
}

impl From<Register> for u8 {
    fn from(r: Register) -> u8 {
        r as u8
    }
}

const ADDRESS_BASE: u8 = 0x20;
const PIN_COUNT: u8 = 8;

const IOCON_MIRROR: u8 = 1 << 6;
const IOCON_ODR: u8 = 1 << 2;
const IOCON_INTPOL: u8 = 1 << 1;

/// 7-bit bus address for the hardware address `hw_addr` (A2..A0).
pub(crate) fn bus_address(hw_addr: u8) -> u8 {
    ADDRESS_BASE | (hw_addr & 0x07)
}

/// Addresses above 7 saturate instead of wrapping.
pub(crate) fn clamp_address(addr: u8) -> u8 {
    addr.min(PIN_COUNT - 1)
}

/// Register holding pin `pin`.  There is only one port, so this is the identity.
pub(crate) fn reg_for_pin(_pin: u8, reg: Register) -> Register {
    reg
}

/// Bit position of pin `pin` within its register.
pub(crate) fn bit_for_pin<E>(pin: u8) -> Result<u8, Error<E>> {
    if pin >= PIN_COUNT {
        return Err(Error::InvalidPin(pin));
    }
    Ok(pin % PIN_COUNT)
}

/// `(mask_set, mask_clear)` pair that drives all bits of `mask` to `value`.
pub(crate) fn masks(mask: u8, value: bool) -> (u8, u8) {
    if value {
        (mask, 0)
    } else {
        (0, mask)
    }
}

pub(crate) fn iocon_masks(mirroring: bool, open_drain: bool, active_high: bool) -> (u8, u8) {
    [
        (IOCON_MIRROR, mirroring),
        (IOCON_ODR, open_drain),
        (IOCON_INTPOL, active_high),
    ]
    .iter()
    .fold((0, 0), |(set, clear), &(bit, value)| {
        let (s, c) = masks(bit, value);
        (set | s, clear | c)
    })
}

/// Lowest pin flagged in `INTF`.  Simultaneous interrupts report only the lowest index.
pub(crate) fn lowest_pending(intf: u8) -> IntQuery<u8> {
    if intf == 0 {
        IntQuery::NoInterrupt
    } else {
        IntQuery::Pending(intf.trailing_zeros() as u8)
    }
}

pub struct Driver<I2C> {
    i2c: I2C,
    hw_addr: u8,
}

impl<I2C> Driver<I2C> {
    /// Bind to the device with all address pins tied low.  No bus traffic until [`begin`] or
    /// another operation is called.
    ///
    /// [`begin`]: Driver::begin
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, hw_addr: 0 }
    }

    pub fn with_address(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        let hw_addr = ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self { i2c, hw_addr }
    }

    /// Hardware address (A2..A0) currently latched, `0..=7`.
    pub fn hw_address(&self) -> u8 {
        self.hw_addr
    }

    /// 7-bit I2C address of the device.
    pub fn address(&self) -> u8 {
        bus_address(self.hw_addr)
    }

    /// Give back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: crate::I2cBus> Driver<I2C> {
    /// Latch the hardware address and make every pin an input.
    ///
    /// `addr` values above 7 are clamped to 7.  Only `IODIR` is written; all other registers
    /// keep whatever the device currently holds.
    pub fn begin(&mut self, addr: u8) -> Result<(), Error<I2C::BusError>> {
        self.hw_addr = clamp_address(addr);
        self.write_register(Register::IODIR, 0xff)
    }

    /// Same as `begin(0)`.
    pub fn begin_default(&mut self) -> Result<(), Error<I2C::BusError>> {
        self.begin(0)
    }

    fn pin_bit(pin: u8) -> Result<u8, Error<I2C::BusError>> {
        bit_for_pin(pin)
    }

    pub fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::BusError>> {
        let addr = self.address();
        self.i2c.read_reg(addr, reg).map_err(Error::Bus)
    }

    pub fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::BusError>> {
        let addr = self.address();
        self.i2c.write_reg(addr, reg, value).map_err(Error::Bus)
    }

    /// Read `reg`, set or clear the bit belonging to `pin` and write it back.
    ///
    /// The two transfers are independent; another bus master changing `reg` in between is
    /// overwritten.
    pub fn update_register_bit(
        &mut self,
        pin: u8,
        value: bool,
        reg: Register,
    ) -> Result<(), Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        self.update_masked(reg_for_pin(pin, reg), 1 << bit, value)
    }

    fn update_masked(
        &mut self,
        reg: Register,
        mask: u8,
        value: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        let (mask_set, mask_clear) = masks(mask, value);
        let addr = self.address();
        self.i2c
            .update_reg(addr, reg, mask_set, mask_clear)
            .map_err(Error::Bus)
    }

    pub fn pin_mode(&mut self, pin: u8, dir: Direction) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, dir == Direction::Input, Register::IODIR)
    }

    /// Enable or disable the 100k pull-up of `pin`.
    pub fn pull_up(&mut self, pin: u8, enable: bool) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, enable, Register::GPPU)
    }

    /// Invert the logic level reported for input `pin`.
    pub fn set_polarity(&mut self, pin: u8, inverted: bool) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, inverted, Register::IPOL)
    }

    pub fn digital_read(&mut self, pin: u8) -> Result<bool, Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        let gpio = self.read_register(reg_for_pin(pin, Register::GPIO))?;
        Ok((gpio >> bit) & 0x01 != 0)
    }

    /// Drive output `pin` to `value`.
    ///
    /// The current state is taken from `OLAT` rather than `GPIO`, so externally driven inputs
    /// never leak into the output latches.
    pub fn digital_write(&mut self, pin: u8, value: bool) -> Result<(), Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        let olat = self.read_register(reg_for_pin(pin, Register::OLAT))?;
        let (mask_set, mask_clear) = masks(1 << bit, value);
        self.write_register(
            reg_for_pin(pin, Register::GPIO),
            (olat | mask_set) & !mask_clear,
        )
    }

    pub fn read_gpio(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::GPIO)
    }

    /// Write the whole port in a single transfer.
    pub fn write_gpio(&mut self, value: u8) -> Result<(), Error<I2C::BusError>> {
        #[cfg(not(feature = "legacy-port-write"))]
        let payload = [u8::from(Register::GPIO), value];
        #[cfg(feature = "legacy-port-write")]
        let payload = [u8::from(Register::GPIO), value, 0x00];

        let addr = self.address();
        self.i2c
            .write(addr, &payload)
            .map_err(|e| Error::Bus(e.into()))
    }

    /// Configure the INT output.
    ///
    /// - `mirroring`: IOCON.MIRROR.  Has no effect with a single INT pin but is still written.
    /// - `open_drain`: IOCON.ODR, overrides `active_high` when set.
    /// - `active_high`: IOCON.INTPOL.
    ///
    /// All other IOCON bits are preserved.  Power-on default is `(false, false, false)`.
    pub fn setup_interrupts(
        &mut self,
        mirroring: bool,
        open_drain: bool,
        active_high: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        let (mask_set, mask_clear) = iocon_masks(mirroring, open_drain, active_high);
        let addr = self.address();
        self.i2c
            .update_reg(addr, Register::IOCON, mask_set, mask_clear)
            .map_err(Error::Bus)
    }

    /// Arm the interrupt of `pin`.
    ///
    /// `INTCON`, `DEFVAL` and `GPINTEN` are updated in three separate transfers, in that order.
    /// Configure pins before enabling the host-side interrupt line.
    pub fn setup_interrupt_pin(
        &mut self,
        pin: u8,
        mode: InterruptMode,
    ) -> Result<(), Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        self.arm_interrupts(1 << bit, mode)
    }

    /// Disarm the interrupt of `pin`, leaving `INTCON` and `DEFVAL` untouched.
    pub fn disable_interrupt_pin(&mut self, pin: u8) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, false, Register::GPINTEN)
    }

    fn arm_interrupts(
        &mut self,
        mask: u8,
        mode: InterruptMode,
    ) -> Result<(), Error<I2C::BusError>> {
        self.update_masked(Register::INTCON, mask, mode.compares_defval())?;
        self.update_masked(Register::DEFVAL, mask, mode.default_level())?;
        self.update_masked(Register::GPINTEN, mask, true)
    }

    /// Pin that caused the latest interrupt.
    ///
    /// Only `INTF` is read, so the interrupt stays latched.
    pub fn last_interrupt_pin(&mut self) -> Result<IntQuery<u8>, Error<I2C::BusError>> {
        Ok(lowest_pending(self.interrupt_flags()?))
    }

    /// Level of the interrupting pin at the time of the interrupt.
    ///
    /// Reads `INTCAP`, which clears the interrupt on the device.  Nothing beyond `INTF` is read
    /// when no interrupt is pending.
    pub fn last_interrupt_pin_value(&mut self) -> Result<IntQuery<bool>, Error<I2C::BusError>> {
        let pin = match self.last_interrupt_pin()? {
            IntQuery::Pending(pin) => pin,
            IntQuery::NoInterrupt => return Ok(IntQuery::NoInterrupt),
        };
        let bit = Self::pin_bit(pin)?;
        let cap = self.read_register(reg_for_pin(pin, Register::INTCAP))?;
        Ok(IntQuery::Pending((cap >> bit) & 0x01 != 0))
    }

    /// Raw `INTF`.  Does not clear the interrupt.
    pub fn interrupt_flags(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::INTF)
    }

    /// Raw `INTCAP`.  Clears the interrupt.
    pub fn interrupt_capture(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::INTCAP)
    }
}

impl<I2C: crate::I2cBus> crate::PortDriver for Driver<I2C> {
    type Error = Error<I2C::BusError>;

    fn set(&mut self, mask_high: u32, mask_low: u32) -> Result<(), Self::Error> {
        let olat = self.read_register(Register::OLAT)?;
        self.write_register(Register::GPIO, (olat | mask_high as u8) & !(mask_low as u8))
    }

    fn is_set(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error> {
        let olat = self.read_register(Register::OLAT)? as u32;
        Ok((olat & mask_high) | (!olat & mask_low))
    }

    fn get(&mut self, mask_high: u32, mask_low: u32) -> Result<u32, Self::Error> {
        let in_ = self.read_register(Register::GPIO)? as u32;
        Ok((in_ & mask_high) | (!in_ & mask_low))
    }
}

impl<I2C: crate::I2cBus> crate::PortDriverTotemPole for Driver<I2C> {
    fn set_direction(
        &mut self,
        mask: u32,
        dir: crate::Direction,
        state: bool,
    ) -> Result<(), Self::Error> {
        // set state before switching direction to prevent glitch
        if dir == crate::Direction::Output {
            use crate::PortDriver;
            if state {
                self.set(mask, 0)?;
            } else {
                self.set(0, mask)?;
            }
        }
        self.update_masked(Register::IODIR, mask as u8, dir == Direction::Input)
    }
}

impl<I2C: crate::I2cBus> crate::PortDriverPullUp for Driver<I2C> {
    fn set_pull_up(&mut self, mask: u32, enable: bool) -> Result<(), Self::Error> {
        self.update_masked(Register::GPPU, mask as u8, enable)
    }
}

impl<I2C: crate::I2cBus> crate::PortDriverPolarity for Driver<I2C> {
    fn set_polarity(&mut self, mask: u32, inverted: bool) -> Result<(), Self::Error> {
        self.update_masked(Register::IPOL, mask as u8, inverted)
    }
}

impl<I2C: crate::I2cBus> crate::PortDriverInterrupts for Driver<I2C> {
    fn enable_interrupts(&mut self, mask: u32, mode: InterruptMode) -> Result<(), Self::Error> {
        self.arm_interrupts(mask as u8, mode)
    }

    fn disable_interrupts(&mut self, mask: u32) -> Result<(), Self::Error> {
        self.update_masked(Register::GPINTEN, mask as u8, false)
    }

    fn interrupt_pending(&mut self, mask: u32) -> Result<u32, Self::Error> {
        Ok(self.interrupt_flags()? as u32 & mask)
    }

    fn captured_state(&mut self, mask: u32) -> Result<u32, Self::Error> {
        Ok(self.interrupt_capture()? as u32 & mask)
    }
}
