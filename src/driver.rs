//! GC2607 sensor driver: identity check, format negotiation and stream control.
//!
//! All operations block the caller and take `&mut self`; the host serializes access.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::bus::RegisterBus;
use crate::data_types::{self, Format, FormatRequest, FrameSize, Mode, Negotiation, PixelFormat};
use crate::error::{DetectError, FormatError, PowerError, ProbeError, StreamError};
use crate::pm::{PowerControl, RuntimePm, RuntimePower};
use crate::power::{Clock, NoClock, NoPin, NoRegulator, PowerResources, PowerSequencer, PowerState, Regulator};
use crate::registers::{CHIP_ID, addr};

/// One attached GC2607.
pub struct Gc2607<I2C, D, REG = NoRegulator, CLK = NoClock, RST = NoPin, PWDN = NoPin, PM = RuntimePm> {
    bus: RegisterBus<I2C>,
    delay: D,
    power: PowerSequencer<REG, CLK, RST, PWDN>,
    pm: PM,
    modes: &'static [Mode],
    mode: &'static Mode,
    format: Format,
    streaming: bool,
}

/// Pairs the sequencer with the delay it needs so the power facade can drive it.
struct Sequenced<'a, REG, CLK, RST, PWDN, D> {
    power: &'a mut PowerSequencer<REG, CLK, RST, PWDN>,
    delay: &'a mut D,
}

impl<REG, CLK, RST, PWDN, D> PowerControl for Sequenced<'_, REG, CLK, RST, PWDN, D>
where
    REG: Regulator,
    CLK: Clock,
    RST: OutputPin,
    PWDN: OutputPin,
    D: DelayNs,
{
    fn power_on(&mut self) -> Result<(), PowerError> {
        self.power.power_on(self.delay)
    }

    fn power_off(&mut self) {
        self.power.power_off();
    }
}

/// Parts handed back by [`Gc2607::detach`].
pub struct Parts<I2C, D, REG, CLK, RST, PWDN, PM> {
    pub i2c: I2C,
    pub delay: D,
    pub resources: PowerResources<REG, CLK, RST, PWDN>,
    pub pm: PM,
}

impl<I2C, D, REG, CLK, RST, PWDN, PM> Gc2607<I2C, D, REG, CLK, RST, PWDN, PM> {
    /// Return the 7-bit I2C address configured for this instance.
    pub fn address(&self) -> u8 {
        self.bus.address()
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn active_mode(&self) -> &'static Mode {
        self.mode
    }

    /// Active media-bus format.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn resources(&self) -> &PowerResources<REG, CLK, RST, PWDN> {
        self.power.resources()
    }

    pub fn runtime_pm(&self) -> &PM {
        &self.pm
    }

    /// Replace the mode catalog. Its first entry becomes the default and active mode.
    ///
    /// An empty catalog is ignored, as is any change while streaming.
    pub fn with_modes(mut self, modes: &'static [Mode]) -> Self {
        match modes.first() {
            Some(first) if !self.streaming => {
                self.modes = modes;
                self.mode = first;
                self.format = first.format();
            }
            Some(_) => warn!("mode catalog change refused while streaming"),
            None => warn!("empty mode catalog ignored"),
        }
        self
    }

    /// Supported modes, default first.
    pub fn modes(&self) -> core::slice::Iter<'static, Mode> {
        self.modes.iter()
    }

    pub fn default_mode(&self) -> &'static Mode {
        self.modes.first().unwrap_or(self.mode)
    }

    pub fn pixel_formats(&self) -> impl Iterator<Item = PixelFormat> {
        data_types::pixel_formats_in(self.modes)
    }

    pub fn frame_sizes(&self, pixel_format: PixelFormat) -> impl Iterator<Item = FrameSize> {
        data_types::frame_sizes_in(self.modes, pixel_format)
    }

    /// Pick the mode for `request`. `Commit` makes it active and is refused while
    /// streaming; `Try` never changes state.
    ///
    /// Only exact size/format matches are honoured; anything else yields the default mode.
    pub fn negotiate(&mut self, request: FormatRequest, which: Negotiation) -> Result<&'static Mode, FormatError> {
        let mode = data_types::find_mode_in(self.modes, &request).unwrap_or(self.mode);
        if which == Negotiation::Commit {
            if self.streaming {
                warn!("format change refused while streaming");
                return Err(FormatError::Busy);
            }
            self.mode = mode;
            self.format = mode.format();
            debug!("active mode {}x{}@{}", mode.width, mode.height, mode.max_fps);
        }
        Ok(mode)
    }
}

impl<I2C, D, REG, CLK, RST, PWDN, PM> Gc2607<I2C, D, REG, CLK, RST, PWDN, PM>
where
    I2C: I2c,
    D: DelayNs,
    REG: Regulator,
    CLK: Clock,
    RST: OutputPin,
    PWDN: OutputPin,
    PM: RuntimePower,
{
    /// Create a driver at the default I2C address (0x37). Performs no I/O.
    pub fn new(i2c: I2C, delay: D, resources: PowerResources<REG, CLK, RST, PWDN>, pm: PM) -> Self {
        Self::from_bus(RegisterBus::new(i2c), delay, resources, pm)
    }

    /// Create a driver for a sensor strapped to a different I2C address.
    pub fn with_address(
        i2c: I2C,
        address: u8,
        delay: D,
        resources: PowerResources<REG, CLK, RST, PWDN>,
        pm: PM,
    ) -> Self {
        Self::from_bus(RegisterBus::with_address(i2c, address), delay, resources, pm)
    }

    fn from_bus(bus: RegisterBus<I2C>, delay: D, resources: PowerResources<REG, CLK, RST, PWDN>, pm: PM) -> Self {
        let mode = data_types::default_mode();
        Self {
            bus,
            delay,
            power: PowerSequencer::new(resources),
            pm,
            modes: data_types::MODES,
            mode,
            format: mode.format(),
            streaming: false,
        }
    }

    /// Attach-time check: power the sensor, verify its identity, drop the power reference.
    pub fn probe(&mut self) -> Result<u16, ProbeError<I2C::Error>> {
        info!("probing GC2607 at {:#x}", self.bus.address());
        self.pm
            .acquire(&mut Sequenced {
                power: &mut self.power,
                delay: &mut self.delay,
            })
            .map_err(ProbeError::PowerOn)?;

        let detected = self.detect();

        self.pm.release(&mut Sequenced {
            power: &mut self.power,
            delay: &mut self.delay,
        });

        detected.map_err(ProbeError::Detect)
    }

    /// Read and check the chip identity. The sensor must already be powered.
    pub fn detect(&mut self) -> Result<u16, DetectError<I2C::Error>> {
        let id_h = self.bus.read(addr::CHIP_ID_H).inspect_err(|_| {
            error!("failed to read chip id high byte (sensor unpowered, wrong address or bus fault?)");
        })?;
        let id_l = self.bus.read(addr::CHIP_ID_L).inspect_err(|_| {
            error!("failed to read chip id low byte");
        })?;

        let actual = u16::from_be_bytes([id_h, id_l]);
        info!("read chip id {:#x}", actual);
        if actual != CHIP_ID {
            error!("wrong chip id: expected {:#x}, got {:#x}", CHIP_ID, actual);
            return Err(DetectError::UnexpectedId {
                expected: CHIP_ID,
                actual,
            });
        }
        Ok(actual)
    }

    /// Start streaming: take a power reference, program the active mode, go active.
    ///
    /// On error the power reference is returned and the sensor stays idle.
    pub fn enable(&mut self) -> Result<(), StreamError<I2C::Error>> {
        if self.streaming {
            return Ok(());
        }

        self.pm
            .acquire(&mut Sequenced {
                power: &mut self.power,
                delay: &mut self.delay,
            })
            .map_err(StreamError::PowerOn)?;

        info!("initializing sensor registers");
        if let Err(e) = self.bus.apply(&self.mode.program, &mut self.delay) {
            error!("failed to initialize sensor");
            self.pm.release(&mut Sequenced {
                power: &mut self.power,
                delay: &mut self.delay,
            });
            return Err(StreamError::Program(e));
        }

        self.streaming = true;
        info!("stream on");
        Ok(())
    }

    /// Stop streaming and return the power reference. A no-op when already idle.
    pub fn disable(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        info!("stream off");
        self.pm.release(&mut Sequenced {
            power: &mut self.power,
            delay: &mut self.delay,
        });
    }

    pub fn set_stream(&mut self, enable: bool) -> Result<(), StreamError<I2C::Error>> {
        if enable {
            self.enable()
        } else {
            self.disable();
            Ok(())
        }
    }

    /// Let the power facade run deferred suspend work.
    pub fn runtime_idle(&mut self) {
        self.pm.idle(&mut Sequenced {
            power: &mut self.power,
            delay: &mut self.delay,
        });
    }

    /// Stop streaming, power the sensor off and hand back its parts. Safe in any state.
    pub fn detach(mut self) -> Parts<I2C, D, REG, CLK, RST, PWDN, PM> {
        info!("detaching GC2607");
        self.disable();
        self.runtime_idle();
        self.power.power_off();
        Parts {
            i2c: self.bus.free(),
            delay: self.delay,
            resources: self.power.free(),
            pm: self.pm,
        }
    }
}
