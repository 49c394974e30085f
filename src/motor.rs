// SPDX-License-Identifier: Apache-2.0

//! DC motor sequencer. Each sequence is a short program of (action, duration) steps played
//! in a loop on the subsystem's timer channel; the button steps
//! SequenceA → SequenceB → Idle → SequenceA.

use embedded_hal::digital::OutputPin;

use crate::{
    buffer::RingIndex,
    components::{Indicator, IndicatorPair, Pattern},
    interrupt::Process,
    peripherals::EdgeLine,
    timer::{ticks, TimerChannel},
};

/// Motor drive level for one step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Motor running
    On,
    /// Motor stopped
    Off,
}

/// One step of a sequence: hold `action` for `duration` seconds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Behavior {
    /// Drive level
    pub action: Action,
    /// Hold time, in seconds (2 base ticks each)
    pub duration: u8,
}

impl Behavior {
    /// Step holding `action` for `duration` seconds.
    pub const fn new(action: Action, duration: u8) -> Self {
        Self { action, duration }
    }
}

/// Off 1 s, on 1 s, off 3 s, on 1 s.
const SEQUENCE_A: [Behavior; 4] = [
    Behavior::new(Action::Off, 1),
    Behavior::new(Action::On, 1),
    Behavior::new(Action::Off, 3),
    Behavior::new(Action::On, 1),
];

/// Off 4 s, on 4 s.
const SEQUENCE_B: [Behavior; 2] = [Behavior::new(Action::Off, 4), Behavior::new(Action::On, 4)];

/// Motor sequencer states, in button order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorSequence {
    /// Short pulses
    SequenceA,
    /// Long on/off cycle
    SequenceB,
    /// Motor held off, no steps
    Idle,
}

impl MotorSequence {
    /// State reached by the next button press.
    pub const fn next(self) -> Self {
        match self {
            MotorSequence::SequenceA => MotorSequence::SequenceB,
            MotorSequence::SequenceB => MotorSequence::Idle,
            MotorSequence::Idle => MotorSequence::SequenceA,
        }
    }

    /// Steps played in this state; empty for [`Idle`](MotorSequence::Idle).
    pub const fn behaviors(self) -> &'static [Behavior] {
        match self {
            MotorSequence::SequenceA => &SEQUENCE_A,
            MotorSequence::SequenceB => &SEQUENCE_B,
            MotorSequence::Idle => &[],
        }
    }

    /// State LEDs for this sequence.
    pub const fn pattern(self) -> Pattern {
        match self {
            MotorSequence::SequenceA => Pattern::new(false, true),
            MotorSequence::SequenceB => Pattern::new(true, false),
            MotorSequence::Idle => Pattern::new(true, true),
        }
    }
}

/// Motor sequencer hardware and state.
pub struct MotorControl<T: TimerChannel, B: EdgeLine, P: OutputPin> {
    /// Motor driver input
    motor: P,
    /// Last drive level
    running: bool,
    /// Step clock (exclusively owned channel)
    timer: T,
    /// Sequence select button
    button: B,
    /// LED1/LED2 sequence display
    leds: IndicatorPair<P>,
    /// Motor-active lamp
    lamp: Indicator<P>,
    /// Current sequence
    sequence: MotorSequence,
    /// Next step of the current sequence
    step: RingIndex,
}

impl<T: TimerChannel, B: EdgeLine, P: OutputPin> MotorControl<T, B, P> {
    /// Take the hardware and leave the sequencer disabled with the motor off.
    pub fn new(mut motor: P, mut timer: T, mut button: B, leds: IndicatorPair<P>, lamp: Indicator<P>) -> Self {
        motor.set_low().ok();
        timer.disarm();
        button.unlisten();
        Self {
            motor,
            running: false,
            timer,
            button,
            leds,
            lamp,
            sequence: MotorSequence::Idle,
            step: RingIndex::START,
        }
    }

    /// Start the step clock in the Idle state, listen on the button and light the lamp.
    pub fn enable(&mut self) {
        self.timer.schedule(ticks(1));
        self.timer.arm();
        self.button.listen();
        self.sequence = MotorSequence::Idle;
        self.step.reset();
        self.lamp.on();
    }

    /// Stop the motor and both interrupts, and darken every LED.
    pub fn disable(&mut self) {
        self.drive(Action::Off);
        self.timer.disarm();
        self.button.unlisten();
        self.lamp.off();
        self.leds.clear();
    }

    /// Button edge: step to the next sequence and play its first step right away.
    pub fn change_sequence(&mut self) {
        self.sequence = self.sequence.next();
        self.leds.show(self.sequence.pattern());
        self.timer.arm();
        self.step.reset();
        debug!("motor: {:?}", self.sequence);
        self.advance_behavior();
    }

    /// Play the current step: drive the motor and hold it for the step's duration. In Idle the
    /// motor is stopped and the step clock disarmed.
    pub fn advance_behavior(&mut self) {
        let behaviors = self.sequence.behaviors();
        let Some(&behavior) = behaviors.get(self.step.get()) else {
            self.drive(Action::Off);
            self.timer.disarm();
            return;
        };
        self.timer.schedule(ticks(2 * u32::from(behavior.duration)));
        self.drive(behavior.action);
        self.step.advance(behaviors.len());
    }

    /// Set the motor driver input.
    fn drive(&mut self, action: Action) {
        self.running = action == Action::On;
        match action {
            Action::On => self.motor.set_high().ok(),
            Action::Off => self.motor.set_low().ok(),
        };
    }

    /// Current sequence
    pub fn sequence(&self) -> MotorSequence {
        self.sequence
    }

    /// Next step of the current sequence
    pub fn step(&self) -> RingIndex {
        self.step
    }

    /// Motor currently driven on
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sequence LEDs as displayed
    pub fn pattern(&self) -> Pattern {
        self.leds.pattern()
    }

    /// Motor-active lamp lit
    pub fn is_active(&self) -> bool {
        self.lamp.is_lit()
    }
}

impl<T: TimerChannel, B: EdgeLine, P: OutputPin> Process for MotorControl<T, B, P> {
    fn enable(&mut self) {
        MotorControl::enable(self)
    }

    fn disable(&mut self) {
        MotorControl::disable(self)
    }

    fn on_button(&mut self) -> bool {
        if !self.button.is_pending() {
            return false;
        }
        self.button.acknowledge();
        self.change_sequence();
        true
    }

    fn on_timer(&mut self) {
        self.timer.acknowledge();
        self.advance_behavior();
    }
}
