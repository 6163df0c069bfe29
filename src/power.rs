//! Power resources and the power-on / power-off sequencer.
//!
//! Any of the four resources may be owned by the platform (for example a PMIC that
//! drives the supplies, clock and GPIOs itself). Such resources are [`PowerResource::Absent`]
//! and their steps are skipped.

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::error::PowerError;

/// Hold times of the power sequence, in milliseconds. These are minimums.
pub mod timing {
    /// Supply settling after the regulators come up (5-6 ms window).
    pub const SUPPLY_SETTLE_MS: u32 = 5;
    /// Settling after the master clock starts (5-6 ms window).
    pub const CLOCK_SETTLE_MS: u32 = 5;
    /// Reset released before the reset pulse.
    pub const RESET_PRE_MS: u32 = 20;
    /// Reset pulse width.
    pub const RESET_PULSE_MS: u32 = 20;
    /// Hold after reset release.
    pub const RESET_POST_MS: u32 = 10;
    /// Power-down pulse width.
    pub const POWERDOWN_PULSE_MS: u32 = 10;
    /// Hold after power-down release.
    pub const POWERDOWN_POST_MS: u32 = 10;
    /// Internal boot time before the first register access.
    pub const BOOT_MS: u32 = 20;
}

/// The sensor's supply set (analog, I/O and digital core rails), switched together.
pub trait Regulator {
    type Error: Debug;

    fn enable(&mut self) -> Result<(), Self::Error>;
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// The sensor's master clock (typically 19.2 MHz).
pub trait Clock {
    type Error: Debug;

    fn prepare_enable(&mut self) -> Result<(), Self::Error>;
    fn disable_unprepare(&mut self);

    /// Clock rate, when the provider knows it.
    fn rate_hz(&self) -> Option<u32> {
        None
    }
}

/// Placeholder regulator type for platforms that manage the supplies themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegulator;

impl Regulator for NoRegulator {
    type Error = Infallible;

    fn enable(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Placeholder clock type for platforms that provide the clock themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClock;

impl Clock for NoClock {
    type Error = Infallible;

    fn prepare_enable(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn disable_unprepare(&mut self) {}
}

/// Placeholder pin type for lines the platform drives itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// An optional power capability.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerResource<T> {
    /// This driver switches the resource.
    Owned(T),
    /// Something else owns it; the matching sequence step is skipped.
    Absent,
}

impl<T> PowerResource<T> {
    pub fn is_owned(&self) -> bool {
        matches!(self, PowerResource::Owned(_))
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            PowerResource::Owned(r) => Some(r),
            PowerResource::Absent => None,
        }
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            PowerResource::Owned(r) => Some(r),
            PowerResource::Absent => None,
        }
    }

    pub fn into_inner(self) -> Option<T> {
        match self {
            PowerResource::Owned(r) => Some(r),
            PowerResource::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for PowerResource<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(r) => PowerResource::Owned(r),
            None => PowerResource::Absent,
        }
    }
}

bitflags::bitflags! {
    /// Which power resources this driver owns.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ResourceFlags: u8 {
        const REGULATORS = 1 << 0;
        const CLOCK      = 1 << 1;
        const RESET      = 1 << 2;
        const POWERDOWN  = 1 << 3;
    }
}

/// The four power resources of one sensor. Starts with everything absent.
pub struct PowerResources<REG, CLK, RST, PWDN> {
    pub regulators: PowerResource<REG>,
    pub clock: PowerResource<CLK>,
    /// Reset line, active low.
    pub reset: PowerResource<RST>,
    /// Power-down line, active high.
    pub powerdown: PowerResource<PWDN>,
}

impl PowerResources<NoRegulator, NoClock, NoPin, NoPin> {
    /// No resources owned: the platform handles power entirely.
    pub fn new() -> Self {
        Self {
            regulators: PowerResource::Absent,
            clock: PowerResource::Absent,
            reset: PowerResource::Absent,
            powerdown: PowerResource::Absent,
        }
    }
}

impl Default for PowerResources<NoRegulator, NoClock, NoPin, NoPin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<REG, CLK, RST, PWDN> PowerResources<REG, CLK, RST, PWDN> {
    pub fn with_regulators<R: Regulator>(self, regulators: R) -> PowerResources<R, CLK, RST, PWDN> {
        PowerResources {
            regulators: PowerResource::Owned(regulators),
            clock: self.clock,
            reset: self.reset,
            powerdown: self.powerdown,
        }
    }

    pub fn with_clock<C: Clock>(self, clock: C) -> PowerResources<REG, C, RST, PWDN> {
        PowerResources {
            regulators: self.regulators,
            clock: PowerResource::Owned(clock),
            reset: self.reset,
            powerdown: self.powerdown,
        }
    }

    pub fn with_reset<P: OutputPin>(self, reset: P) -> PowerResources<REG, CLK, P, PWDN> {
        PowerResources {
            regulators: self.regulators,
            clock: self.clock,
            reset: PowerResource::Owned(reset),
            powerdown: self.powerdown,
        }
    }

    pub fn with_powerdown<P: OutputPin>(self, powerdown: P) -> PowerResources<REG, CLK, RST, P> {
        PowerResources {
            regulators: self.regulators,
            clock: self.clock,
            reset: self.reset,
            powerdown: PowerResource::Owned(powerdown),
        }
    }

    /// Resources currently owned by this driver.
    pub fn present(&self) -> ResourceFlags {
        let mut flags = ResourceFlags::empty();
        flags.set(ResourceFlags::REGULATORS, self.regulators.is_owned());
        flags.set(ResourceFlags::CLOCK, self.clock.is_owned());
        flags.set(ResourceFlags::RESET, self.reset.is_owned());
        flags.set(ResourceFlags::POWERDOWN, self.powerdown.is_owned());
        flags
    }
}

/// Electrical state as last left by the sequencer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerState {
    Unpowered,
    Powered,
}

/// Drives the power resources through the sensor's boot and shutdown sequences.
pub struct PowerSequencer<REG, CLK, RST, PWDN> {
    resources: PowerResources<REG, CLK, RST, PWDN>,
    state: PowerState,
}

impl<REG, CLK, RST, PWDN> PowerSequencer<REG, CLK, RST, PWDN> {
    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_powered(&self) -> bool {
        self.state == PowerState::Powered
    }

    pub fn resources(&self) -> &PowerResources<REG, CLK, RST, PWDN> {
        &self.resources
    }

    /// Give back the resources. Does not power off; see [`power_off`](Self::power_off).
    pub fn free(self) -> PowerResources<REG, CLK, RST, PWDN> {
        self.resources
    }
}

impl<REG, CLK, RST, PWDN> PowerSequencer<REG, CLK, RST, PWDN>
where
    REG: Regulator,
    CLK: Clock,
    RST: OutputPin,
    PWDN: OutputPin,
{
    pub fn new(resources: PowerResources<REG, CLK, RST, PWDN>) -> Self {
        let present = resources.present();
        if !present.contains(ResourceFlags::REGULATORS) {
            warn!("no regulators, assuming the platform handles power");
        }
        match resources.clock.as_ref() {
            Some(clk) => {
                if let Some(hz) = clk.rate_hz() {
                    info!("master clock {} Hz", hz);
                }
            }
            None => warn!("no clock, assuming the platform provides it"),
        }
        if !present.contains(ResourceFlags::RESET) {
            warn!("no reset GPIO, assuming the platform handles it");
        }
        if !present.contains(ResourceFlags::POWERDOWN) {
            debug!("no powerdown GPIO");
        }
        Self {
            resources,
            state: PowerState::Unpowered,
        }
    }

    /// Bring the sensor from unpowered to ready for register access.
    ///
    /// Only the regulator and clock steps can fail. A clock failure switches the
    /// regulators back off, so an error always leaves the sensor unpowered.
    pub fn power_on<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        info!("powering on sensor");

        if let Some(reg) = self.resources.regulators.as_mut() {
            if reg.enable().is_err() {
                error!("failed to enable regulators");
                return Err(PowerError::Regulator);
            }
            debug!("regulators enabled");
            delay.delay_ms(timing::SUPPLY_SETTLE_MS);
        }

        if let Some(clk) = self.resources.clock.as_mut() {
            if clk.prepare_enable().is_err() {
                error!("failed to enable clock");
                if let Some(reg) = self.resources.regulators.as_mut() {
                    if reg.disable().is_err() {
                        warn!("failed to disable regulators");
                    }
                }
                return Err(PowerError::Clock);
            }
            debug!("clock enabled");
            delay.delay_ms(timing::CLOCK_SETTLE_MS);
        }

        // Active low: high = running, low = held in reset.
        if let Some(rst) = self.resources.reset.as_mut() {
            let _ = rst.set_high();
            delay.delay_ms(timing::RESET_PRE_MS);
            let _ = rst.set_low();
            delay.delay_ms(timing::RESET_PULSE_MS);
            let _ = rst.set_high();
            delay.delay_ms(timing::RESET_POST_MS);
            debug!("reset pulse completed");
        }

        // Active high: high = powered down.
        if let Some(pwdn) = self.resources.powerdown.as_mut() {
            let _ = pwdn.set_high();
            delay.delay_ms(timing::POWERDOWN_PULSE_MS);
            let _ = pwdn.set_low();
            delay.delay_ms(timing::POWERDOWN_POST_MS);
            debug!("powerdown pulse completed");
        }

        delay.delay_ms(timing::BOOT_MS);

        self.state = PowerState::Powered;
        info!("sensor powered on");
        Ok(())
    }

    /// Put the sensor back into reset and switch everything off. Best effort; a no-op
    /// when already unpowered.
    pub fn power_off(&mut self) {
        if self.state == PowerState::Unpowered {
            return;
        }
        info!("powering off sensor");

        if let Some(rst) = self.resources.reset.as_mut() {
            let _ = rst.set_low();
        }
        if let Some(pwdn) = self.resources.powerdown.as_mut() {
            let _ = pwdn.set_high();
        }
        if let Some(clk) = self.resources.clock.as_mut() {
            clk.disable_unprepare();
        }
        if let Some(reg) = self.resources.regulators.as_mut() {
            if reg.disable().is_err() {
                warn!("failed to disable regulators");
            }
        }

        self.state = PowerState::Unpowered;
        info!("sensor powered off");
    }
}
