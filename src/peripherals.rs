// SPDX-License-Identifier: Apache-2.0

//! Peripheral seams the state machines drive: the analog output and edge-triggered inputs.
//!
//! GPIO outputs use [`embedded_hal::digital::OutputPin`] directly; timer channels live in
//! [`crate::timer`].

use embedded_hal::pwm::SetDutyCycle;

/// 12-bit DAC magnitude.
#[derive(Default, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample(u16);

impl Sample {
    /// Output at 0 V
    pub const ZERO: Self = Self(0);
    /// Full-scale output
    pub const MAX: Self = Self(0x0FFF);

    /// Create a sample, discarding anything above 12 bits.
    pub const fn new(raw: u16) -> Self {
        Self(raw & Self::MAX.0)
    }

    /// Get the 12-bit magnitude
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Low 8 bits, as loaded into a split data register.
    pub const fn low_byte(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// High 4 bits, as loaded into a split data register.
    pub const fn high_nibble(&self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }
}

/// 12-bit analog output.
pub trait Dac {
    /// Power the output stage.
    fn enable(&mut self);
    /// Power the output stage down. The last loaded value is not retained.
    fn disable(&mut self);
    /// Load a new output value. Ignored while disabled.
    fn load(&mut self, sample: Sample);
}

/// Edge-triggered input line (push button, keypad data-available).
pub trait EdgeLine {
    /// Enable the line's edge interrupt.
    fn listen(&mut self);
    /// Disable the line's edge interrupt. Pending edges are discarded.
    fn unlisten(&mut self);
    /// An enabled edge has been latched and not yet acknowledged.
    fn is_pending(&self) -> bool;
    /// Clear the latched edge.
    fn acknowledge(&mut self);
    /// Re-read the line level: `true` if it still sits at the level the edge moved it to.
    fn is_asserted(&mut self) -> bool;
}

/// [`Dac`] built on a PWM channel followed by an RC filter.
///
/// The 12-bit sample is scaled onto the channel's duty range, so the channel's `top` does
/// not have to be 4095.
pub struct PwmDac<C: SetDutyCycle> {
    /// Output channel
    channel: C,
    /// Output stage powered
    enabled: bool,
}

impl<C: SetDutyCycle> PwmDac<C> {
    /// Wrap a PWM channel. The output starts disabled at 0.
    pub fn new(mut channel: C) -> Self {
        channel.set_duty_cycle_fully_off().ok();
        Self {
            channel,
            enabled: false,
        }
    }

    /// Output stage powered
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Duty value for a sample on this channel.
    fn duty_for(&self, sample: Sample) -> u16 {
        let max = u32::from(self.channel.max_duty_cycle());
        (u32::from(sample.get()) * max / u32::from(Sample::MAX.get())) as u16
    }
}

impl<C: SetDutyCycle> Dac for PwmDac<C> {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.channel.set_duty_cycle_fully_off().ok();
        self.enabled = false;
    }

    fn load(&mut self, sample: Sample) {
        if self.enabled {
            let duty = self.duty_for(sample);
            self.channel.set_duty_cycle(duty).ok();
        }
    }
}
