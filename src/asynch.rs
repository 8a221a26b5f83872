//! Async MCP23008 driver on top of an `embedded-hal-async` I2C bus.
//!
//! This module is only built if the `"async"` feature is enabled.  [`Mcp23008Async`] mirrors the
//! pin-number API of [`Driver`][crate::Driver] and issues exactly the same bus transactions, so
//! everything documented there applies here as well.

use crate::bus::I2cExtAsync;
use crate::dev::mcp23008::{
    bit_for_pin, bus_address, clamp_address, iocon_masks, lowest_pending, masks, reg_for_pin,
    Register,
};
use crate::{Direction, Error, IntQuery, InterruptMode};

pub struct Mcp23008Async<I2C> {
    i2c: I2C,
    hw_addr: u8,
}

impl<I2C> Mcp23008Async<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, hw_addr: 0 }
    }

    pub fn with_address(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        let hw_addr = ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self { i2c, hw_addr }
    }

    pub fn hw_address(&self) -> u8 {
        self.hw_addr
    }

    pub fn address(&self) -> u8 {
        bus_address(self.hw_addr)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: crate::I2cBusAsync> Mcp23008Async<I2C> {
    pub async fn begin(&mut self, addr: u8) -> Result<(), Error<I2C::BusError>> {
        self.hw_addr = clamp_address(addr);
        self.write_register(Register::IODIR, 0xff).await
    }

    pub async fn begin_default(&mut self) -> Result<(), Error<I2C::BusError>> {
        self.begin(0).await
    }

    fn pin_bit(pin: u8) -> Result<u8, Error<I2C::BusError>> {
        bit_for_pin(pin)
    }

    pub async fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::BusError>> {
        let addr = self.address();
        self.i2c.read_reg(addr, reg.into()).await.map_err(Error::Bus)
    }

    pub async fn write_register(
        &mut self,
        reg: Register,
        value: u8,
    ) -> Result<(), Error<I2C::BusError>> {
        let addr = self.address();
        self.i2c
            .write_reg(addr, reg.into(), value)
            .await
            .map_err(Error::Bus)
    }

    pub async fn update_register_bit(
        &mut self,
        pin: u8,
        value: bool,
        reg: Register,
    ) -> Result<(), Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        let (mask_set, mask_clear) = masks(1 << bit, value);
        self.update_register(reg_for_pin(pin, reg), mask_set, mask_clear)
            .await
    }

    async fn update_register(
        &mut self,
        reg: Register,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Error<I2C::BusError>> {
        let addr = self.address();
        self.i2c
            .update_reg(addr, reg.into(), mask_set, mask_clear)
            .await
            .map_err(Error::Bus)
    }

    pub async fn pin_mode(&mut self, pin: u8, dir: Direction) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, dir == Direction::Input, Register::IODIR)
            .await
    }

    pub async fn pull_up(&mut self, pin: u8, enable: bool) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, enable, Register::GPPU).await
    }

    pub async fn set_polarity(
        &mut self,
        pin: u8,
        inverted: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, inverted, Register::IPOL)
            .await
    }

    pub async fn digital_read(&mut self, pin: u8) -> Result<bool, Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        let gpio = self.read_register(reg_for_pin(pin, Register::GPIO)).await?;
        Ok((gpio >> bit) & 0x01 != 0)
    }

    pub async fn digital_write(
        &mut self,
        pin: u8,
        value: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        let bit = Self::pin_bit(pin)?;
        let olat = self.read_register(reg_for_pin(pin, Register::OLAT)).await?;
        let (mask_set, mask_clear) = masks(1 << bit, value);
        self.write_register(
            reg_for_pin(pin, Register::GPIO),
            (olat | mask_set) & !mask_clear,
        )
        .await
    }

    pub async fn read_gpio(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::GPIO).await
    }

    pub async fn write_gpio(&mut self, value: u8) -> Result<(), Error<I2C::BusError>> {
        #[cfg(not(feature = "legacy-port-write"))]
        let payload = [u8::from(Register::GPIO), value];
        #[cfg(feature = "legacy-port-write")]
        let payload = [u8::from(Register::GPIO), value, 0x00];

        let addr = self.address();
        self.i2c
            .write(addr, &payload)
            .await
            .map_err(|e| Error::Bus(e.into()))
    }

    pub async fn setup_interrupts(
        &mut self,
        mirroring: bool,
        open_drain: bool,
        active_high: bool,
    ) -> Result<(), Error<I2C::BusError>> {
        let (mask_set, mask_clear) = iocon_masks(mirroring, open_drain, active_high);
        self.update_register(Register::IOCON, mask_set, mask_clear)
            .await
    }

    pub async fn setup_interrupt_pin(
        &mut self,
        pin: u8,
        mode: InterruptMode,
    ) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, mode.compares_defval(), Register::INTCON)
            .await?;
        self.update_register_bit(pin, mode.default_level(), Register::DEFVAL)
            .await?;
        self.update_register_bit(pin, true, Register::GPINTEN)
            .await
    }

    pub async fn disable_interrupt_pin(&mut self, pin: u8) -> Result<(), Error<I2C::BusError>> {
        self.update_register_bit(pin, false, Register::GPINTEN)
            .await
    }

    pub async fn last_interrupt_pin(&mut self) -> Result<IntQuery<u8>, Error<I2C::BusError>> {
        Ok(lowest_pending(self.interrupt_flags().await?))
    }

    pub async fn last_interrupt_pin_value(
        &mut self,
    ) -> Result<IntQuery<bool>, Error<I2C::BusError>> {
        let pin = match self.last_interrupt_pin().await? {
            IntQuery::Pending(pin) => pin,
            IntQuery::NoInterrupt => return Ok(IntQuery::NoInterrupt),
        };
        let bit = Self::pin_bit(pin)?;
        let cap = self
            .read_register(reg_for_pin(pin, Register::INTCAP))
            .await?;
        Ok(IntQuery::Pending((cap >> bit) & 0x01 != 0))
    }

    pub async fn interrupt_flags(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::INTF).await
    }

    pub async fn interrupt_capture(&mut self) -> Result<u8, Error<I2C::BusError>> {
        self.read_register(Register::INTCAP).await
    }
}

#[cfg(test)]
mod tests {
    use super::Mcp23008Async;
    use crate::{Direction, Error, IntQuery, InterruptMode};
    use embassy_futures::block_on;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn led_blink() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x00, 0xff]),
            mock_i2c::Transaction::write_read(0x20, vec![0x00], vec![0xff]),
            mock_i2c::Transaction::write(0x20, vec![0x00, 0xf7]),
            mock_i2c::Transaction::write_read(0x20, vec![0x0a], vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x09, 0x08]),
            mock_i2c::Transaction::write_read(0x20, vec![0x0a], vec![0x08]),
            mock_i2c::Transaction::write(0x20, vec![0x09, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut mcp = Mcp23008Async::new(bus.clone());
        block_on(async {
            mcp.begin(0).await.unwrap();
            mcp.pin_mode(3, Direction::Output).await.unwrap();
            mcp.digital_write(3, true).await.unwrap();
            mcp.digital_write(3, false).await.unwrap();
        });

        bus.done();
    }

    #[test]
    fn falling_edge_interrupt() {
        let expectations = [
            mock_i2c::Transaction::write(0x27, vec![0x00, 0xff]),
            mock_i2c::Transaction::write_read(0x27, vec![0x06], vec![0x00]),
            mock_i2c::Transaction::write(0x27, vec![0x06, 0x20]),
            mock_i2c::Transaction::write_read(0x27, vec![0x04], vec![0x00]),
            mock_i2c::Transaction::write(0x27, vec![0x04, 0x20]),
            mock_i2c::Transaction::write_read(0x27, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write(0x27, vec![0x03, 0x20]),
            mock_i2c::Transaction::write_read(0x27, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write(0x27, vec![0x02, 0x20]),
            mock_i2c::Transaction::write_read(0x27, vec![0x05], vec![0b1010_1010]),
            mock_i2c::Transaction::write(0x27, vec![0x05, 0b1110_1010]),
            mock_i2c::Transaction::write_read(0x27, vec![0x07], vec![0x20]),
            mock_i2c::Transaction::write_read(0x27, vec![0x08], vec![0x00]),
            mock_i2c::Transaction::write_read(0x27, vec![0x07], vec![0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut mcp = Mcp23008Async::new(bus.clone());
        block_on(async {
            mcp.begin(42).await.unwrap();
            mcp.pull_up(5, true).await.unwrap();
            mcp.setup_interrupt_pin(5, InterruptMode::Falling)
                .await
                .unwrap();
            mcp.setup_interrupts(true, false, true).await.unwrap();
            assert_eq!(
                mcp.last_interrupt_pin_value().await.unwrap(),
                IntQuery::Pending(false)
            );
            assert_eq!(
                mcp.last_interrupt_pin().await.unwrap(),
                IntQuery::NoInterrupt
            );
        });

        bus.done();
    }

    #[test]
    fn whole_port_and_invalid_pin() {
        #[cfg(not(feature = "legacy-port-write"))]
        let write = vec![0x09, 0xa5];
        #[cfg(feature = "legacy-port-write")]
        let write = vec![0x09, 0xa5, 0x00];

        let expectations = [
            mock_i2c::Transaction::write(0x23, write),
            mock_i2c::Transaction::write_read(0x23, vec![0x09], vec![0xa5]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut mcp = Mcp23008Async::with_address(bus.clone(), true, true, false);
        block_on(async {
            mcp.write_gpio(0xa5).await.unwrap();
            assert!(mcp.digital_read(7).await.unwrap());
            assert_eq!(mcp.digital_read(8).await, Err(Error::InvalidPin(8)));
        });

        bus.done();
    }
}
