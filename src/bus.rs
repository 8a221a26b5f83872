use embedded_hal::i2c as hal_i2c;

/// Blanket trait for types implementing `i2c::I2c`
pub trait I2cBus: hal_i2c::I2c {
    type BusError: From<<Self as hal_i2c::ErrorType>::Error>;
}

impl<T, E> I2cBus for T
where
    T: hal_i2c::I2c<Error = E>,
    E: hal_i2c::Error,
{
    type BusError = E;
}

pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = I2C::BusError;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        let reg = reg.into();
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x}: reg {=u8:#x} <- {=u8:#x}", addr, reg, value);
        self.write(addr, &[reg, value])?;
        Ok(())
    }

    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error> {
        let reg = reg.into();
        let val = self.read_reg(addr, reg)?;
        self.write_reg(addr, reg, (val | mask_set) & !mask_clear)
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let reg = reg.into();
        let mut buf = [0x00];
        self.write_read(addr, &[reg], &mut buf)?;
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x}: reg {=u8:#x} -> {=u8:#x}", addr, reg, buf[0]);
        Ok(buf[0])
    }
}

/// Async counterpart of [`I2cBus`] for `embedded-hal-async` buses.
#[cfg(feature = "async")]
pub trait I2cBusAsync: embedded_hal_async::i2c::I2c {
    type BusError: From<<Self as hal_i2c::ErrorType>::Error>;
}

#[cfg(feature = "async")]
impl<T, E> I2cBusAsync for T
where
    T: embedded_hal_async::i2c::I2c<Error = E>,
    E: hal_i2c::Error,
{
    type BusError = E;
}

#[cfg(feature = "async")]
pub(crate) trait I2cExtAsync {
    type Error;

    async fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), Self::Error>;
    async fn update_reg(
        &mut self,
        addr: u8,
        reg: u8,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error>;
    async fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8, Self::Error>;
}

#[cfg(feature = "async")]
impl<I2C: I2cBusAsync> I2cExtAsync for I2C {
    type Error = I2C::BusError;

    async fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x}: reg {=u8:#x} <- {=u8:#x}", addr, reg, value);
        self.write(addr, &[reg, value]).await?;
        Ok(())
    }

    async fn update_reg(
        &mut self,
        addr: u8,
        reg: u8,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error> {
        let val = self.read_reg(addr, reg).await?;
        self.write_reg(addr, reg, (val | mask_set) & !mask_clear)
            .await
    }

    async fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg], &mut buf).await?;
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x}: reg {=u8:#x} -> {=u8:#x}", addr, reg, buf[0]);
        Ok(buf[0])
    }
}
