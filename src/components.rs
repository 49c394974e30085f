// SPDX-License-Identifier: Apache-2.0

//! Basic component structs
use embedded_hal::digital::OutputPin;

/// Pin level that lights an LED.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Anode on the pin
    High,
    /// Cathode on the pin (e.g. common-anode RGB)
    Low,
}

/// Drive level of the subsystem lamps for the selected status feature.
#[cfg(feature = "rgba_status")]
pub const LAMP_LEVEL: ActiveLevel = ActiveLevel::Low;
/// Drive level of the subsystem lamps for the selected status feature.
#[cfg(not(feature = "rgba_status"))]
pub const LAMP_LEVEL: ActiveLevel = ActiveLevel::High;

/// One LED that remembers whether it is lit.
pub struct Indicator<P: OutputPin> {
    /// Output pin
    pin: P,
    /// Level that lights the LED
    active: ActiveLevel,
    /// Last commanded state
    lit: bool,
}

impl<P: OutputPin> Indicator<P> {
    /// Take the pin and turn the LED off.
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        let mut indicator = Self {
            pin,
            active,
            lit: true,
        };
        indicator.set(false);
        indicator
    }

    /// Active-high LED, initially off.
    pub fn active_high(pin: P) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    /// Subsystem lamp, driven at [`LAMP_LEVEL`], initially off.
    pub fn lamp(pin: P) -> Self {
        Self::new(pin, LAMP_LEVEL)
    }

    /// Drive the LED logically on (`true`) or off (`false`).
    pub fn set(&mut self, on: bool) {
        match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high().ok(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low().ok(),
        };
        self.lit = on;
    }

    /// Light the LED.
    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    /// Darken the LED.
    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    /// Invert the LED.
    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    /// Last commanded state
    #[inline]
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

/// Pattern shown on a pair of state LEDs.
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pattern {
    /// LED1 lit
    pub first: bool,
    /// LED2 lit
    pub second: bool,
}

impl Pattern {
    /// Both LEDs dark
    pub const DARK: Self = Self::new(false, false);

    /// Pattern with LED1 and LED2 as given.
    pub const fn new(first: bool, second: bool) -> Self {
        Self { first, second }
    }
}

/// Two active-high LEDs that report which state a subsystem is in.
pub struct IndicatorPair<P: OutputPin> {
    /// LED1
    first: Indicator<P>,
    /// LED2
    second: Indicator<P>,
}

impl<P: OutputPin> IndicatorPair<P> {
    /// Take both pins and turn the LEDs off.
    pub fn new(first: P, second: P) -> Self {
        Self {
            first: Indicator::active_high(first),
            second: Indicator::active_high(second),
        }
    }

    /// Display a pattern
    pub fn show(&mut self, pattern: Pattern) {
        self.first.set(pattern.first);
        self.second.set(pattern.second);
    }

    /// Turn both LEDs off.
    pub fn clear(&mut self) {
        self.show(Pattern::DARK);
    }

    /// Pattern currently displayed
    pub fn pattern(&self) -> Pattern {
        Pattern::new(self.first.is_lit(), self.second.is_lit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn active_low_indicator_inverts_levels() {
        let expectations = [
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let pin = PinMock::new(&expectations);
        let mut handle = pin.clone();

        let mut led = Indicator::new(pin, ActiveLevel::Low);
        assert!(!led.is_lit());
        led.on();
        assert!(led.is_lit());
        led.toggle();
        assert!(!led.is_lit());

        handle.done();
    }

    #[test]
    fn active_high_toggle_sequence() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
        ];
        let pin = PinMock::new(&expectations);
        let mut handle = pin.clone();

        let mut led = Indicator::active_high(pin);
        led.toggle();
        led.toggle();
        led.toggle();
        assert!(led.is_lit());

        handle.done();
    }

    #[test]
    fn pair_shows_patterns() {
        let first = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let second = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::Low),
            Transaction::set(State::Low),
        ]);
        let (mut first_handle, mut second_handle) = (first.clone(), second.clone());

        let mut pair = IndicatorPair::new(first, second);
        pair.show(Pattern::new(true, false));
        assert_eq!(pair.pattern(), Pattern::new(true, false));
        pair.clear();
        assert_eq!(pair.pattern(), Pattern::DARK);

        first_handle.done();
        second_handle.done();
    }
}
