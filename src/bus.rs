//! Register transport and program executor.
//! GC2607 uses 16-bit register addresses (sent high byte first) and 8-bit values.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{IoError, ProgramError};
use crate::registers::{DEFAULT_I2C_ADDRESS, Program, RegisterOp};

/// Blocking single-register access to one device on the control bus.
pub struct RegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> RegisterBus<I2C> {
    /// Bus handle for a device at the default I2C address (0x37).
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_I2C_ADDRESS,
        }
    }

    /// Bus handle for a device at a custom 7-bit address.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Return the 7-bit I2C address used for transactions.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying bus.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterBus<I2C>
where
    I2C: I2c,
{
    /// Read a single register: address phase (2 bytes) then a 1-byte read.
    pub fn read(&mut self, reg: u16) -> Result<u8, IoError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut buf)
            .map_err(|cause| IoError { address: reg, cause })?;
        Ok(buf[0])
    }

    /// Write a single register in one 3-byte transaction.
    pub fn write(&mut self, reg: u16, value: u8) -> Result<(), IoError<I2C::Error>> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .map_err(|cause| IoError { address: reg, cause })
    }

    /// Run `program` in order, stopping at the first failed write.
    ///
    /// Returns the number of registers written. There is no rollback: on error the
    /// sensor holds whatever the writes before `index` left behind.
    pub fn apply<D: DelayNs>(
        &mut self,
        program: &Program,
        delay: &mut D,
    ) -> Result<usize, ProgramError<I2C::Error>> {
        let mut written = 0;
        for (index, op) in program.ops().iter().enumerate() {
            match *op {
                RegisterOp::Write { address, value } => {
                    if let Err(e) = self.write(address, value) {
                        error!("failed to write reg {:#x} at index {}", address, index);
                        return Err(ProgramError {
                            index,
                            address,
                            cause: e.cause,
                        });
                    }
                    written += 1;
                }
                RegisterOp::Delay(ms) => delay.delay_ms(u32::from(ms)),
                RegisterOp::End => break,
            }
        }
        debug!("wrote {} registers", written);
        Ok(written)
    }
}
