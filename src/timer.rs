// SPDX-License-Identifier: Apache-2.0

//! Timer channels shared out between the subsystems.
//!
//! One timer block provides several independent one-shot channels. Each subsystem owns
//! exactly one of them for its whole lifetime, so no channel is ever programmed by two
//! subsystems. A channel only fires again after its owner calls
//! [`schedule`](TimerChannel::schedule) from the expiry handler. Disarming the channel
//! drops any countdown still running, so arming it again never delivers a stale expiry.

use fugit::MicrosDurationU32;

/// Base tick for the slow subsystems (motor sequencer and password blink).
pub const TIMER_TICK: MicrosDurationU32 = MicrosDurationU32::millis(500);

/// Period between two wave samples.
///
/// The generator's nominal 9.756 ms period goes through the bus-clock formula
/// (`period × clock / 2`), so the programmed delay is half of it. 41 samples at this rate
/// give a 5 Hz waveform.
pub const SAMPLE_PERIOD: MicrosDurationU32 = MicrosDurationU32::micros(4_878);

/// Delay of `count` base ticks.
pub const fn ticks(count: u32) -> MicrosDurationU32 {
    MicrosDurationU32::micros(TIMER_TICK.ticks() * count)
}

/// One-shot countdown channel with its own expiry interrupt.
pub trait TimerChannel {
    /// Load a fresh countdown and start it.
    fn schedule(&mut self, delay: MicrosDurationU32);
    /// Let the channel's expiry raise its interrupt. An expiry already latched fires at once.
    fn arm(&mut self);
    /// Stop the channel: cancel a running countdown, clear a latched expiry and keep later
    /// expiries from raising the interrupt.
    fn disarm(&mut self);
    /// Clear the channel's expiry flag. Called first thing in the expiry handler.
    fn acknowledge(&mut self);
}

/// Which subsystem owns which channel of the timer block.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Sample clock of the wave generator
    WaveGen,
    /// Behavior steps of the motor sequencer
    MotorControl,
    /// Feedback blink of the password gate
    PasswordBlink,
}

impl Channel {
    /// Every owned channel, in hardware order.
    pub const ALL: [Channel; 3] = [Channel::WaveGen, Channel::MotorControl, Channel::PasswordBlink];

    /// Hardware channel (alarm) number.
    pub const fn index(self) -> u8 {
        match self {
            Channel::WaveGen => 0,
            Channel::MotorControl => 1,
            Channel::PasswordBlink => 2,
        }
    }
}
