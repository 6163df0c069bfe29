#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, Operation};
use gc2607_rs::error::PowerError;
use gc2607_rs::pm::{PowerControl, RuntimePower};
use gc2607_rs::power::{Clock, Regulator};

/// Everything the fakes below observe, in order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    RegulatorOn,
    RegulatorOff,
    ClockOn,
    ClockOff,
    Reset(bool),
    Powerdown(bool),
    DelayMs(u32),
    Write(u16, u8),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<Event> {
    log.borrow_mut().drain(..).collect()
}

pub struct FakeRegulator {
    pub log: Log,
    pub fail_enable: bool,
}

impl Regulator for FakeRegulator {
    type Error = ();

    fn enable(&mut self) -> Result<(), ()> {
        if self.fail_enable {
            return Err(());
        }
        self.log.borrow_mut().push(Event::RegulatorOn);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ()> {
        self.log.borrow_mut().push(Event::RegulatorOff);
        Ok(())
    }
}

/// Regulator that switches on but refuses to switch off.
pub struct StuckRegulator {
    pub log: Log,
}

impl Regulator for StuckRegulator {
    type Error = ();

    fn enable(&mut self) -> Result<(), ()> {
        self.log.borrow_mut().push(Event::RegulatorOn);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ()> {
        Err(())
    }
}

pub struct FakeClock {
    pub log: Log,
    pub fail_enable: bool,
}

impl Clock for FakeClock {
    type Error = ();

    fn prepare_enable(&mut self) -> Result<(), ()> {
        if self.fail_enable {
            return Err(());
        }
        self.log.borrow_mut().push(Event::ClockOn);
        Ok(())
    }

    fn disable_unprepare(&mut self) {
        self.log.borrow_mut().push(Event::ClockOff);
    }

    fn rate_hz(&self) -> Option<u32> {
        Some(19_200_000)
    }
}

#[derive(Clone, Copy)]
pub enum Line {
    Reset,
    Powerdown,
}

pub struct RecordingPin {
    pub log: Log,
    pub line: Line,
}

impl RecordingPin {
    fn record(&self, high: bool) {
        let event = match self.line {
            Line::Reset => Event::Reset(high),
            Line::Powerdown => Event::Powerdown(high),
        };
        self.log.borrow_mut().push(event);
    }
}

impl PinErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.record(true);
        Ok(())
    }
}

pub struct RecordingDelay {
    pub log: Log,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// Bus that accepts every single-buffer write and logs it as a register write.
/// `fail_at` makes the n-th write (0-based) fail.
pub struct LoggingI2c {
    pub log: Log,
    pub writes: usize,
    pub fail_at: Option<usize>,
}

impl i2c::ErrorType for LoggingI2c {
    type Error = ErrorKind;
}

impl i2c::I2c for LoggingI2c {
    fn transaction(&mut self, _address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) if bytes.len() == 3 => {
                    if self.fail_at == Some(self.writes) {
                        return Err(ErrorKind::Other);
                    }
                    self.writes += 1;
                    let address = u16::from_be_bytes([bytes[0], bytes[1]]);
                    self.log.borrow_mut().push(Event::Write(address, bytes[2]));
                }
                Operation::Write(_) => {}
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Power facade that counts every call and forwards edges to the device.
#[derive(Default)]
pub struct CountingPm {
    pub refs: u32,
    pub acquires: u32,
    pub releases: u32,
}

impl RuntimePower for CountingPm {
    fn acquire<P: PowerControl + ?Sized>(&mut self, device: &mut P) -> Result<(), PowerError> {
        self.acquires += 1;
        if self.refs == 0 {
            device.power_on()?;
        }
        self.refs += 1;
        Ok(())
    }

    fn release<P: PowerControl + ?Sized>(&mut self, device: &mut P) {
        self.releases += 1;
        self.refs -= 1;
        if self.refs == 0 {
            device.power_off();
        }
    }
}
