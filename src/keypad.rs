// SPDX-License-Identifier: Apache-2.0

//! 16-key pad behind an MM74C922-style encoder.
//!
//! The encoder latches a 4-bit code on lines A–D (bit 3 = A … bit 0 = D) and raises its
//! data-available line once the key has been debounced.

use embedded_hal::digital::InputPin;

use crate::{password::Target, peripherals::EdgeLine};

/// Keys of the pad, named by their legend.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// `0`
    Num0,
    /// `1`
    Num1,
    /// `2`
    Num2,
    /// `3`
    Num3,
    /// `4`
    Num4,
    /// `5`
    Num5,
    /// `6`
    Num6,
    /// `7`
    Num7,
    /// `8`
    Num8,
    /// `9`
    Num9,
    /// `A`, selects the motor sequencer
    A,
    /// `B`, selects the wave generator
    B,
    /// `C`
    C,
    /// `D`
    D,
    /// `*`
    Star,
    /// `#`
    Hash,
}

impl Key {
    /// Decode the encoder's 4-bit output. Only the low nibble is used, so every value maps to
    /// a key.
    pub const fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0x4 => Key::Num0,
            0xF => Key::Num1,
            0x7 => Key::Num2,
            0xB => Key::Num3,
            0xD => Key::Num4,
            0x5 => Key::Num5,
            0x9 => Key::Num6,
            0xE => Key::Num7,
            0x6 => Key::Num8,
            0xA => Key::Num9,
            0x3 => Key::A,
            0x1 => Key::B,
            0x2 => Key::C,
            0x0 => Key::D,
            0xC => Key::Star,
            _ => Key::Hash,
        }
    }

    /// 4-bit code the encoder reports for this key.
    pub const fn nibble(self) -> u8 {
        match self {
            Key::Num0 => 0x4,
            Key::Num1 => 0xF,
            Key::Num2 => 0x7,
            Key::Num3 => 0xB,
            Key::Num4 => 0xD,
            Key::Num5 => 0x5,
            Key::Num6 => 0x9,
            Key::Num7 => 0xE,
            Key::Num8 => 0x6,
            Key::Num9 => 0xA,
            Key::A => 0x3,
            Key::B => 0x1,
            Key::C => 0x2,
            Key::D => 0x0,
            Key::Star => 0xC,
            Key::Hash => 0x8,
        }
    }

    /// Subsystem selected by this key, if it is a selection key.
    pub const fn target(self) -> Option<Target> {
        match self {
            Key::A => Some(Target::Motor),
            Key::B => Some(Target::Wave),
            _ => None,
        }
    }
}

/// Outcome of servicing the data-available line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEdge {
    /// No edge latched on this line
    Quiet,
    /// Edge latched but the line had already dropped again
    Spurious,
    /// A key is ready
    Pressed(Key),
}

/// Anything that can service the keypad's interrupt line.
pub trait KeySource {
    /// Acknowledge a latched edge and read the key, if any.
    fn poll(&mut self) -> KeyEdge;
}

/// Encoder data lines plus the data-available edge line.
pub struct Keypad<I: InputPin, E: EdgeLine> {
    /// Lines A, B, C, D (most significant first)
    data: [I; 4],
    /// Data-available line
    ready: E,
}

impl<I: InputPin, E: EdgeLine> Keypad<I, E> {
    /// Take the lines and start listening for key presses.
    pub fn new(data: [I; 4], mut ready: E) -> Self {
        ready.listen();
        Self { data, ready }
    }

    /// Read the 4-bit code currently on the data lines.
    pub fn read_nibble(&mut self) -> u8 {
        self.data.iter_mut().fold(0, |code, line| {
            (code << 1) | u8::from(line.is_high().unwrap_or(false))
        })
    }
}

impl<I: InputPin, E: EdgeLine> KeySource for Keypad<I, E> {
    fn poll(&mut self) -> KeyEdge {
        if !self.ready.is_pending() {
            return KeyEdge::Quiet;
        }
        // Re-check the level before trusting the data lines
        let edge = if self.ready.is_asserted() {
            KeyEdge::Pressed(Key::from_nibble(self.read_nibble()))
        } else {
            KeyEdge::Spurious
        };
        self.ready.acknowledge();
        edge
    }
}
