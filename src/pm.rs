//! Reference-counted runtime power management.
//!
//! The driver never switches power directly while streaming; it takes and returns
//! references through [`RuntimePower`]. Only the 0→1 and 1→0 transitions reach the
//! device's [`PowerControl`].

use crate::error::PowerError;

/// Something that can be physically powered on and off.
pub trait PowerControl {
    fn power_on(&mut self) -> Result<(), PowerError>;
    fn power_off(&mut self);
}

/// Reference-counted power facade.
pub trait RuntimePower {
    /// Take a reference, powering the device on the first one.
    fn acquire<P: PowerControl + ?Sized>(&mut self, device: &mut P) -> Result<(), PowerError>;

    /// Return a reference. The last one may power the device off, now or later.
    fn release<P: PowerControl + ?Sized>(&mut self, device: &mut P);

    /// Give the facade a chance to run deferred work while nothing holds a reference.
    fn idle<P: PowerControl + ?Sized>(&mut self, _device: &mut P) {}
}

/// When to power off after the last reference goes away.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SuspendPolicy {
    /// Power off on the 1→0 transition.
    #[default]
    Immediate,
    /// Leave the device powered until [`RuntimePower::idle`] runs.
    Deferred,
}

/// Default [`RuntimePower`] implementation: a usage counter plus a suspend policy.
#[derive(Clone, Debug, Default)]
pub struct RuntimePm {
    usage: u32,
    active: bool,
    policy: SuspendPolicy,
}

impl RuntimePm {
    pub fn new(policy: SuspendPolicy) -> Self {
        Self {
            usage: 0,
            active: false,
            policy,
        }
    }

    pub fn usage(&self) -> u32 {
        self.usage
    }

    /// True while the device is (or is left) powered by this facade.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn policy(&self) -> SuspendPolicy {
        self.policy
    }

    fn suspend<P: PowerControl + ?Sized>(&mut self, device: &mut P) {
        device.power_off();
        self.active = false;
    }
}

impl RuntimePower for RuntimePm {
    fn acquire<P: PowerControl + ?Sized>(&mut self, device: &mut P) -> Result<(), PowerError> {
        if self.usage == 0 && !self.active {
            device.power_on()?;
            self.active = true;
        }
        self.usage += 1;
        Ok(())
    }

    fn release<P: PowerControl + ?Sized>(&mut self, device: &mut P) {
        if self.usage == 0 {
            warn!("runtime pm: unbalanced release");
            return;
        }
        self.usage -= 1;
        if self.usage == 0 && self.policy == SuspendPolicy::Immediate {
            self.suspend(device);
        }
    }

    fn idle<P: PowerControl + ?Sized>(&mut self, device: &mut P) {
        if self.usage == 0 && self.active {
            self.suspend(device);
        }
    }
}
