// SPDX-License-Identifier: Apache-2.0

//! RP2040 binding: the peripheral seams implemented on `rp2040-hal` types, the concrete
//! subsystem types and the interrupt configuration used by the firmware binary.

use embedded_hal::digital::InputPin;
use fugit::MicrosDurationU32;
use rp2040_hal::{
    gpio::{DynPinId, FunctionSioInput, FunctionSioOutput, Interrupt as EdgeKind, Pin, PullDown, PullType, PullUp},
    pac,
    pwm::{Channel as PwmChannel, FreeRunning, Pwm3, Slice, A},
    timer::{Alarm, Alarm0, Alarm1, Alarm2},
};

use crate::{
    keypad::Keypad,
    motor::MotorControl,
    password::Password,
    peripherals::{EdgeLine, PwmDac},
    timer::{Channel, TimerChannel},
    wavegen::WaveGenerator,
};

/// Push-pull output with its pin number erased.
pub type OutputLine = Pin<DynPinId, FunctionSioOutput, PullDown>;
/// Pulled-down input with its pin number erased.
pub type InputLine = Pin<DynPinId, FunctionSioInput, PullDown>;
/// Pulled-up input with its pin number erased.
pub type ButtonLine = Pin<DynPinId, FunctionSioInput, PullUp>;

/// PWM channel behind the wave generator's DAC (GPIO22).
pub type DacChannel = PwmChannel<Slice<Pwm3, FreeRunning>, A>;

/// Wave generator on the Pico
pub type BoardWaveGen = WaveGenerator<PwmDac<DacChannel>, AlarmChannel<Alarm0>, EdgePin<PullUp>, OutputLine>;
/// Motor sequencer on the Pico
pub type BoardMotorControl = MotorControl<AlarmChannel<Alarm1>, EdgePin<PullUp>, OutputLine>;
/// Password gate on the Pico
pub type BoardPassword = Password<AlarmChannel<Alarm2>, OutputLine>;
/// Keypad encoder on the Pico
pub type BoardKeypad = Keypad<InputLine, EdgePin<PullDown>>;

/// Priority of the GPIO bank (keypad and buttons) and the password blink.
pub const INPUT_PRIORITY: u8 = 0x40;
/// Priority of the wave and motor timer channels.
pub const OUTPUT_PRIORITY: u8 = 0x80;

/// Busy-wait after a subsystem button edge, in CPU cycles.
pub const BUTTON_DEBOUNCE_CYCLES: u32 = 30_000;
/// Busy-wait after a keypad edge, in CPU cycles.
pub const KEYPAD_DEBOUNCE_CYCLES: u32 = 25_000;

/// Timer interrupt line of each owned channel.
pub const fn timer_irq(channel: Channel) -> pac::Interrupt {
    match channel {
        Channel::WaveGen => pac::Interrupt::TIMER_IRQ_0,
        Channel::MotorControl => pac::Interrupt::TIMER_IRQ_1,
        Channel::PasswordBlink => pac::Interrupt::TIMER_IRQ_2,
    }
}

/// NVIC priority of each owned channel. The blink preempts the two output channels.
pub const fn timer_priority(channel: Channel) -> u8 {
    match channel {
        Channel::PasswordBlink => INPUT_PRIORITY,
        Channel::WaveGen | Channel::MotorControl => OUTPUT_PRIORITY,
    }
}

/// GPIO input watched for one kind of edge.
pub struct EdgePin<P: PullType> {
    /// Input pin
    pin: Pin<DynPinId, FunctionSioInput, P>,
    /// Edge that raises the interrupt
    edge: EdgeKind,
}

impl<P: PullType> EdgePin<P> {
    /// Take an input pin. The edge interrupt stays off until [`EdgeLine::listen`].
    pub fn new(pin: Pin<DynPinId, FunctionSioInput, P>, edge: EdgeKind) -> Self {
        pin.set_interrupt_enabled(edge, false);
        Self { pin, edge }
    }
}

impl<P: PullType> EdgeLine for EdgePin<P> {
    fn listen(&mut self) {
        self.pin.clear_interrupt(self.edge);
        self.pin.set_interrupt_enabled(self.edge, true);
    }

    fn unlisten(&mut self) {
        self.pin.set_interrupt_enabled(self.edge, false);
        self.pin.clear_interrupt(self.edge);
    }

    fn is_pending(&self) -> bool {
        self.pin.interrupt_status(self.edge)
    }

    fn acknowledge(&mut self) {
        self.pin.clear_interrupt(self.edge);
    }

    fn is_asserted(&mut self) -> bool {
        match self.edge {
            EdgeKind::EdgeHigh | EdgeKind::LevelHigh => self.pin.is_high().unwrap_or(false),
            EdgeKind::EdgeLow | EdgeKind::LevelLow => self.pin.is_low().unwrap_or(false),
        }
    }
}

/// One RP2040 `TIMER` alarm owned by one subsystem.
pub struct AlarmChannel<T: Alarm> {
    /// Hardware alarm
    alarm: T,
    /// Owner, for log messages
    owner: Channel,
}

impl<T: Alarm> AlarmChannel<T> {
    /// Take an alarm for `owner`, with its interrupt off.
    pub fn new(mut alarm: T, owner: Channel) -> Self {
        alarm.disable_interrupt();
        alarm.clear_interrupt();
        Self { alarm, owner }
    }
}

impl<T: Alarm> TimerChannel for AlarmChannel<T> {
    fn schedule(&mut self, delay: MicrosDurationU32) {
        if self.alarm.schedule(delay).is_err() {
            error!("alarm {}: {} us is out of range for {:?}", self.owner.index(), delay.ticks(), self.owner);
        }
    }

    fn arm(&mut self) {
        self.alarm.enable_interrupt();
    }

    fn disarm(&mut self) {
        self.alarm.disable_interrupt();
        // A disabled alarm still counts down and latches INTR; the next arm would fire at once
        if self.alarm.cancel().is_err() {
            warn!("alarm {}: cancel failed for {:?}", self.owner.index(), self.owner);
        }
        self.alarm.clear_interrupt();
    }

    fn acknowledge(&mut self) {
        self.alarm.clear_interrupt();
    }
}
