//! Register map, register programs and the vendor initialization tables for GC2607.
//! Addresses are 16-bit, values 8-bit. Table contents come from the vendor reference driver.

/// Default 7-bit I2C address of the GC2607.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x37;

/// Expected chip identity, high byte in `addr::CHIP_ID_H`, low byte in `addr::CHIP_ID_L`.
pub const CHIP_ID_H: u8 = 0x26;
pub const CHIP_ID_L: u8 = 0x07;
pub const CHIP_ID: u16 = u16::from_be_bytes([CHIP_ID_H, CHIP_ID_L]);

/// Register addresses (16-bit).
pub mod addr {
    /// Chip identity, high byte.
    pub const CHIP_ID_H: u16 = 0x03f0;
    /// Chip identity, low byte.
    pub const CHIP_ID_L: u16 = 0x03f1;
    /// Soft reset / page control.
    pub const RESET_CTRL: u16 = 0x03fe;
    /// Line length (HTS), high/low.
    pub const HTS_H: u16 = 0x0342;
    pub const HTS_L: u16 = 0x0343;
    /// Frame length (VTS), high/low.
    pub const VTS_H: u16 = 0x0220;
    pub const VTS_L: u16 = 0x0221;
    /// Coarse exposure, high/low.
    pub const EXPOSURE_H: u16 = 0x0202;
    pub const EXPOSURE_L: u16 = 0x0203;
    /// Output window height, high/low.
    pub const OUT_HEIGHT_H: u16 = 0x034a;
    pub const OUT_HEIGHT_L: u16 = 0x034b;
    /// Output window width, high/low.
    pub const OUT_WIDTH_H: u16 = 0x034c;
    pub const OUT_WIDTH_L: u16 = 0x034d;
}

/// Raw-table marker: an entry at this address is a delay of `value` milliseconds.
pub const RAW_DELAY_MARKER: u16 = 0x0000;
/// Raw-table marker: end of table.
pub const RAW_END_MARKER: u16 = 0xffff;

/// One step of a register program.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegisterOp {
    /// Write `value` to the 16-bit register `address`.
    Write { address: u16, value: u8 },
    /// Block for at least this many milliseconds.
    Delay(u8),
    /// Terminates the program; nothing after it runs.
    End,
}

impl RegisterOp {
    /// Shorthand for [`RegisterOp::Write`], keeps tables readable.
    pub const fn w(address: u16, value: u8) -> Self {
        RegisterOp::Write { address, value }
    }

    /// Decode a vendor `{addr, val}` pair where address 0x0000 means "sleep `val` ms"
    /// and 0xffff terminates the table.
    pub const fn from_raw(address: u16, value: u8) -> Self {
        match address {
            RAW_DELAY_MARKER => RegisterOp::Delay(value),
            RAW_END_MARKER => RegisterOp::End,
            _ => RegisterOp::Write { address, value },
        }
    }
}

/// An immutable, ordered register program terminated by [`RegisterOp::End`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Program {
    ops: &'static [RegisterOp],
}

impl Program {
    /// Wrap a static table. Panics (at compile time for `const` programs) if the table
    /// is not terminated by `End`.
    pub const fn new(ops: &'static [RegisterOp]) -> Self {
        assert!(!ops.is_empty(), "register program is empty");
        assert!(
            matches!(ops[ops.len() - 1], RegisterOp::End),
            "register program must end with RegisterOp::End"
        );
        Self { ops }
    }

    /// Operations up to and including the first `End`.
    pub fn ops(&self) -> &'static [RegisterOp] {
        match self.ops.iter().position(|op| matches!(op, RegisterOp::End)) {
            Some(end) => &self.ops[..=end],
            None => self.ops,
        }
    }

    /// Number of register writes the program issues when it runs to completion.
    pub fn write_count(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, RegisterOp::Write { .. }))
            .count()
    }
}

const fn w(address: u16, value: u8) -> RegisterOp {
    RegisterOp::w(address, value)
}

/// 1920x1080 @ 30 fps, 2-lane MIPI, RAW10 GRBG.
pub const MODE_1080P_30FPS: Program = Program::new(MODE_1080P_30FPS_REGS);

const MODE_1080P_30FPS_REGS: &[RegisterOp] = &[
    w(addr::RESET_CTRL, 0xf0),
    w(addr::RESET_CTRL, 0xf0),
    w(addr::RESET_CTRL, 0x00),
    w(addr::RESET_CTRL, 0x00),
    w(addr::RESET_CTRL, 0x00),
    w(addr::RESET_CTRL, 0x00),
    w(0x0d06, 0x01),
    w(0x0315, 0xd4),
    w(0x0d82, 0x14),
    w(0x0a70, 0x80),
    w(0x0134, 0x5b),
    w(0x0110, 0x01),
    w(0x0dd1, 0x56),
    w(0x0137, 0x03),
    w(0x0135, 0x01),
    w(0x0136, 0x2a),
    w(0x0130, 0x08),
    w(0x0132, 0x01),
    w(0x031c, 0x93),
    w(0x0218, 0x00),
    w(0x0340, 0x0a),
    w(0x0341, 0x6e),
    w(addr::HTS_H, 0x08),
    w(addr::HTS_L, 0x00),
    w(addr::VTS_H, 0x05),
    w(addr::VTS_L, 0x37),
    w(0x0af4, 0x2b),
    w(0x0002, 0x30),
    w(0x00c3, 0x3c),
    w(0x0101, 0x00),
    w(0x0d05, 0xcc),
    w(0x0218, 0x00),
    w(0x005e, 0x84),
    w(0x0007, 0x15),
    w(0x0350, 0x01),
    w(0x00c0, 0x07),
    w(0x00c1, 0x90),
    w(0x0346, 0x00),
    w(0x0347, 0x02),
    w(addr::OUT_HEIGHT_H, 0x04),
    w(addr::OUT_HEIGHT_L, 0x40),
    w(0x021f, 0x12),
    w(addr::OUT_WIDTH_H, 0x07),
    w(addr::OUT_WIDTH_L, 0x80),
    w(0x0353, 0x00),
    w(0x0354, 0x04),
    w(0x0d11, 0x10),
    w(0x0d22, 0x00),
    w(0x03f6, 0x4d),
    w(0x03f5, 0x3c),
    w(0x03f3, 0x54),
    w(0x0d07, 0xdd),
    w(0x0e71, 0x00),
    w(0x0e72, 0x10),
    w(0x0e17, 0x26),
    w(0x0e22, 0x0d),
    w(0x0e23, 0x20),
    w(0x0e1b, 0x30),
    w(0x0e3a, 0x15),
    w(0x0e0a, 0x00),
    w(0x0e0b, 0x00),
    w(0x0e0e, 0x00),
    w(0x0e2a, 0x08),
    w(0x0e2b, 0x08),
    w(0x0d02, 0x73),
    w(0x0d22, 0x38),
    w(0x0d25, 0x00),
    w(0x0e6a, 0x39),
    w(0x0050, 0x05),
    w(0x0089, 0x03),
    w(0x0070, 0x40),
    w(0x0071, 0x40),
    w(0x0072, 0x40),
    w(0x0073, 0x40),
    w(0x0040, 0x82),
    w(0x0030, 0x80),
    w(0x0031, 0x80),
    w(0x0032, 0x80),
    w(0x0033, 0x80),
    w(addr::EXPOSURE_H, 0x04),
    w(addr::EXPOSURE_L, 0x38),
    w(0x02b3, 0x00),
    w(0x02b3, 0x00),
    w(0x02b4, 0x00),
    w(0x0208, 0x04),
    w(0x0209, 0x00),
    w(0x009e, 0x01),
    w(0x009f, 0xa0),
    w(0x0db8, 0x08),
    w(0x0db6, 0x02),
    w(0x0db4, 0x05),
    w(0x0db5, 0x16),
    w(0x0db9, 0x09),
    w(0x0d93, 0x05),
    w(0x0d94, 0x06),
    w(0x0d95, 0x0b),
    w(0x0d99, 0x10),
    w(0x0082, 0x03),
    w(0x0107, 0x05),
    w(0x0117, 0x01),
    w(0x0d80, 0x07),
    w(0x0d81, 0x02),
    w(0x0d84, 0x09),
    w(0x0d85, 0x60),
    w(0x0d86, 0x04),
    w(0x0d87, 0xb1),
    w(0x0222, 0x00),
    w(0x0223, 0x01),
    w(0x0117, 0x91),
    w(0x03f4, 0x38),
    w(0x0e69, 0x00),
    w(0x00d6, 0x00),
    w(0x00d0, 0x0d),
    w(0x00e0, 0x18),
    w(0x00e1, 0x18),
    w(0x00e2, 0x18),
    w(0x00e3, 0x18),
    w(0x00e4, 0x18),
    w(0x00e5, 0x18),
    w(0x00e6, 0x18),
    w(0x00e7, 0x18),
    RegisterOp::End,
];
