// SPDX-License-Identifier: Apache-2.0

//! Password gate: collects 4-digit codes from the keypad and switches the motor sequencer
//! and wave generator on and off.
//!
//! The gate starts out expecting the master code. Once the master code is accepted, digits
//! are ignored until a selection key (`A` for the motor, `B` for the wave generator) picks a
//! subsystem; the next 4 digits are then judged against that subsystem's code. A correct
//! subsystem code toggles the subsystem and returns to selection.
//!
//! Every judged attempt is acknowledged by blinking the correct or incorrect LED: 4 toggles,
//! one every [`BLINK_PERIOD`], after which the blink timer channel is disarmed.

use embedded_hal::digital::OutputPin;
use fugit::MicrosDurationU32;

use crate::{
    components::Indicator,
    interrupt::{Gate, Process},
    keypad::Key,
    timer::{ticks, TimerChannel},
};

/// Master code, `1 2 3 4`
pub const MASTER_CODE: u16 = 0xF7BD;
/// Motor sequencer code, `4 5 6 7`
pub const MOTOR_CODE: u16 = 0xD59E;
/// Wave generator code, `7 8 9 0`
pub const WAVE_CODE: u16 = 0xE6A4;

/// Digits in every code.
pub const CODE_LEN: u8 = 4;
/// Blink rearms after the first toggle; 3 rearms give 4 toggles.
pub const BLINK_REPEATS: u8 = 3;
/// Time between two blink toggles.
pub const BLINK_PERIOD: MicrosDurationU32 = ticks(2);

/// Subsystem a selection key points the gate at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// DC motor sequencer
    Motor,
    /// Wave generator
    Wave,
}

impl Target {
    /// Code that toggles this subsystem.
    pub const fn code(self) -> u16 {
        match self {
            Target::Motor => MOTOR_CODE,
            Target::Wave => WAVE_CODE,
        }
    }
}

/// Outcome of [`PasswordSession::judge`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Judgement {
    /// A selection key was taken; digits for this subsystem's code are now accepted.
    AwaitingCode(Target),
    /// Master code matched; a subsystem can now be selected.
    Unlocked,
    /// Subsystem code matched and the subsystem was flipped to `active`.
    Toggled {
        /// Subsystem that was switched
        target: Target,
        /// New state of the subsystem
        active: bool,
    },
    /// Code did not match; the gate stays in the same mode.
    Rejected,
}

impl Judgement {
    /// Whether this outcome is acknowledged with a blink, and with which LED.
    ///
    /// Selecting a subsystem is not an attempt and gets no feedback.
    pub const fn feedback(&self) -> Option<bool> {
        match self {
            Judgement::AwaitingCode(_) => None,
            Judgement::Unlocked | Judgement::Toggled { .. } => Some(true),
            Judgement::Rejected => Some(false),
        }
    }
}

/// Every piece of mutable password state, with no hardware attached.
#[derive(Debug, Eq, PartialEq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PasswordSession {
    /// Digits collected for the current attempt, 0 to [`CODE_LEN`]
    digits_entered: u8,
    /// Collected digits, first digit in the most significant nibble
    code: u16,
    /// Digits are being collected (otherwise only selection keys are honored)
    accepting: bool,
    /// Subsystem whose code is being collected, `None` while the master code is expected or
    /// while waiting for a selection
    selected: Option<Target>,
    /// Motor sequencer enabled
    motor_active: bool,
    /// Wave generator enabled
    wave_active: bool,
    /// Blink rearms done so far
    blink_repeats: u8,
    /// Current blink uses the correct LED
    blink_correct: bool,
}

impl Default for PasswordSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordSession {
    /// Fresh session expecting the master code.
    pub const fn new() -> Self {
        Self {
            digits_entered: 0,
            code: 0,
            accepting: true,
            selected: None,
            motor_active: false,
            wave_active: false,
            blink_repeats: 0,
            blink_correct: false,
        }
    }

    /// Pack one digit into the next free nibble. Returns `true` once a full code has been
    /// collected and must be judged. Ignored while digits are not accepted.
    pub fn push_digit(&mut self, nibble: u8) -> bool {
        if !self.accepting || self.digits_entered >= CODE_LEN {
            return false;
        }
        let shift = 4 * (CODE_LEN - 1 - self.digits_entered);
        self.code |= u16::from(nibble & 0x0F) << shift;
        self.digits_entered += 1;
        self.digits_entered == CODE_LEN
    }

    /// Record a selection key. Returns `true` if it was honored and must be judged, which
    /// only happens while digits are not accepted.
    pub fn select(&mut self, target: Target) -> bool {
        if self.accepting {
            return false;
        }
        self.selected = Some(target);
        true
    }

    /// Judge the pending input and move to the next mode. The collected code is cleared
    /// whatever the outcome.
    pub fn judge(&mut self) -> Judgement {
        let code = self.code;
        self.code = 0;
        self.digits_entered = 0;

        match (self.accepting, self.selected) {
            (false, Some(target)) => {
                self.accepting = true;
                Judgement::AwaitingCode(target)
            }
            // Nothing to judge until a subsystem is selected
            (false, None) => Judgement::Rejected,
            (true, None) if code == MASTER_CODE => {
                self.accepting = false;
                Judgement::Unlocked
            }
            (true, Some(target)) if code == target.code() => {
                let active = self.flip(target);
                self.accepting = false;
                self.selected = None;
                Judgement::Toggled { target, active }
            }
            (true, _) => Judgement::Rejected,
        }
    }

    /// Invert a subsystem's active flag and return the new value.
    fn flip(&mut self, target: Target) -> bool {
        let flag = match target {
            Target::Motor => &mut self.motor_active,
            Target::Wave => &mut self.wave_active,
        };
        *flag = !*flag;
        *flag
    }

    /// Restart the blink counter for a new attempt.
    pub fn start_blink(&mut self, correct: bool) {
        self.blink_repeats = 0;
        self.blink_correct = correct;
    }

    /// Count one blink toggle. Returns `true` if another toggle follows.
    pub fn blink_step(&mut self) -> bool {
        if self.blink_repeats >= BLINK_REPEATS {
            self.blink_repeats = 0;
            false
        } else {
            self.blink_repeats += 1;
            true
        }
    }

    /// Digits collected for the current attempt
    pub fn digits_entered(&self) -> u8 {
        self.digits_entered
    }

    /// Collected code so far
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Digits are being collected
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Selected subsystem, if any
    pub fn selected(&self) -> Option<Target> {
        self.selected
    }

    /// Active flag of a subsystem, as last switched by the gate
    pub fn is_active(&self, target: Target) -> bool {
        match target {
            Target::Motor => self.motor_active,
            Target::Wave => self.wave_active,
        }
    }

    /// Blink uses the correct LED
    pub fn blink_correct(&self) -> bool {
        self.blink_correct
    }
}

/// Subsystems the gate can switch on and off.
pub trait Targets {
    /// Enable (`active`) or disable the subsystem. Must complete before returning.
    fn switch(&mut self, target: Target, active: bool);
}

/// [`Targets`] over two subsystems borrowed directly.
pub struct Linked<'a, M: Process, W: Process> {
    /// Motor sequencer
    pub motor: &'a mut M,
    /// Wave generator
    pub wave: &'a mut W,
}

impl<M: Process, W: Process> Targets for Linked<'_, M, W> {
    fn switch(&mut self, target: Target, active: bool) {
        match (target, active) {
            (Target::Motor, true) => self.motor.enable(),
            (Target::Motor, false) => self.motor.disable(),
            (Target::Wave, true) => self.wave.enable(),
            (Target::Wave, false) => self.wave.disable(),
        }
    }
}

/// Password gate with its feedback LEDs and blink timer channel.
pub struct Password<T: TimerChannel, P: OutputPin> {
    /// Mutable state
    session: PasswordSession,
    /// Blink timer (exclusively owned channel)
    timer: T,
    /// Blinks after an accepted code
    correct: Indicator<P>,
    /// Blinks after a rejected code
    incorrect: Indicator<P>,
    /// Lit once the master code is accepted
    unlocked: Indicator<P>,
}

impl<T: TimerChannel, P: OutputPin> Password<T, P> {
    /// Take the hardware; every LED starts off and the blink channel disarmed.
    pub fn new(mut timer: T, correct: P, incorrect: P, unlocked: P) -> Self {
        timer.disarm();
        Self {
            session: PasswordSession::new(),
            timer,
            correct: Indicator::active_high(correct),
            incorrect: Indicator::active_high(incorrect),
            unlocked: Indicator::lamp(unlocked),
        }
    }

    /// Route one key press: selection keys select, everything else is a digit.
    pub fn submit_key(&mut self, key: Key, targets: &mut dyn Targets) {
        match key.target() {
            Some(target) => self.submit_target(target, targets),
            None => self.submit_digit(key.nibble(), targets),
        }
    }

    /// Collect one digit, judging the code once 4 have been collected.
    pub fn submit_digit(&mut self, nibble: u8, targets: &mut dyn Targets) {
        if !self.session.is_accepting() {
            debug!("password: digit {:#x} ignored, waiting for a selection", nibble);
            return;
        }
        if self.session.push_digit(nibble) {
            self.evaluate(targets);
        }
    }

    /// Select a subsystem, which is only honored while digits are not accepted.
    pub fn submit_target(&mut self, target: Target, targets: &mut dyn Targets) {
        if self.session.select(target) {
            self.evaluate(targets);
        } else {
            debug!("password: selection {:?} ignored while collecting digits", target);
        }
    }

    /// Judge the pending input, switch the selected subsystem and start the feedback blink.
    pub fn evaluate(&mut self, targets: &mut dyn Targets) {
        let judgement = self.session.judge();
        match judgement {
            Judgement::AwaitingCode(target) => debug!("password: enter the {:?} code", target),
            Judgement::Unlocked => {
                info!("password: master code accepted");
                self.unlocked.on();
            }
            Judgement::Toggled { target, active } => {
                info!("password: {:?} code accepted, active = {}", target, active);
                targets.switch(target, active);
            }
            Judgement::Rejected => info!("password: code rejected"),
        }
        if let Some(correct) = judgement.feedback() {
            self.start_blink(correct);
        }
    }

    /// Start a fresh 4-toggle blink on the correct or incorrect LED.
    pub fn start_blink(&mut self, correct: bool) {
        self.correct.off();
        self.incorrect.off();
        self.session.start_blink(correct);
        self.blink_tick();
    }

    /// One blink toggle. Rearms the blink channel until the last toggle, then disarms it.
    pub fn blink_tick(&mut self) {
        if self.session.blink_correct() {
            self.correct.toggle();
        } else {
            self.incorrect.toggle();
        }
        if self.session.blink_step() {
            self.timer.schedule(BLINK_PERIOD);
            self.timer.arm();
        } else {
            self.timer.disarm();
        }
    }

    /// Password state
    pub fn session(&self) -> &PasswordSession {
        &self.session
    }

    /// Correct LED lit
    pub fn correct_lit(&self) -> bool {
        self.correct.is_lit()
    }

    /// Incorrect LED lit
    pub fn incorrect_lit(&self) -> bool {
        self.incorrect.is_lit()
    }

    /// Unlocked lamp lit
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.is_lit()
    }
}

impl<T: TimerChannel, P: OutputPin> Gate for Password<T, P> {
    fn on_key(&mut self, key: Key, targets: &mut dyn Targets) {
        self.submit_key(key, targets);
    }

    fn on_timer(&mut self) {
        self.timer.acknowledge();
        self.blink_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{ActiveLevel, LAMP_LEVEL},
        mock::{FakePin, FakeTimer, PinProbe, TimerProbe},
    };

    /// Records every switch request instead of driving a subsystem.
    #[derive(Default)]
    struct Switches(Vec<(Target, bool)>);

    impl Targets for Switches {
        fn switch(&mut self, target: Target, active: bool) {
            self.0.push((target, active));
        }
    }

    fn enter(session: &mut PasswordSession, keys: [Key; 4]) -> Judgement {
        let done: Vec<bool> = keys.iter().map(|key| session.push_digit(key.nibble())).collect();
        assert_eq!(done, [false, false, false, true]);
        session.judge()
    }

    const MASTER: [Key; 4] = [Key::Num1, Key::Num2, Key::Num3, Key::Num4];
    const MOTOR: [Key; 4] = [Key::Num4, Key::Num5, Key::Num6, Key::Num7];
    const WAVE: [Key; 4] = [Key::Num7, Key::Num8, Key::Num9, Key::Num0];

    #[test]
    fn codes_pack_most_significant_first() {
        for (keys, code) in [(MASTER, MASTER_CODE), (MOTOR, MOTOR_CODE), (WAVE, WAVE_CODE)] {
            let mut session = PasswordSession::new();
            for key in keys {
                session.push_digit(key.nibble());
            }
            assert_eq!(session.code(), code);
        }
    }

    #[test]
    fn master_code_enters_selection() {
        let mut session = PasswordSession::new();
        assert_eq!(enter(&mut session, MASTER), Judgement::Unlocked);
        assert!(!session.is_accepting());
        assert_eq!(session.selected(), None);
        assert_eq!((session.digits_entered(), session.code()), (0, 0));
    }

    #[test]
    fn wrong_master_code_keeps_mode() {
        let mut session = PasswordSession::new();
        assert_eq!(enter(&mut session, MOTOR), Judgement::Rejected);
        assert!(session.is_accepting());
        assert_eq!((session.digits_entered(), session.code()), (0, 0));
        assert_eq!(enter(&mut session, MASTER), Judgement::Unlocked);
    }

    #[test]
    fn digits_ignored_during_selection() {
        let mut session = PasswordSession::new();
        enter(&mut session, MASTER);
        assert!(!session.push_digit(Key::Num4.nibble()));
        assert_eq!(session.digits_entered(), 0);
    }

    #[test]
    fn selection_ignored_while_collecting() {
        let mut session = PasswordSession::new();
        assert!(!session.select(Target::Motor));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn subsystem_code_toggles_and_returns_to_selection() {
        let mut session = PasswordSession::new();
        enter(&mut session, MASTER);

        assert!(session.select(Target::Wave));
        assert_eq!(session.judge(), Judgement::AwaitingCode(Target::Wave));
        assert!(session.is_accepting());

        let on = Judgement::Toggled {
            target: Target::Wave,
            active: true,
        };
        assert_eq!(enter(&mut session, WAVE), on);
        assert!(!session.is_accepting());
        assert_eq!(session.selected(), None);
        assert!(session.is_active(Target::Wave));
        assert!(!session.is_active(Target::Motor));
    }

    #[test]
    fn wrong_subsystem_code_keeps_target() {
        let mut session = PasswordSession::new();
        enter(&mut session, MASTER);
        session.select(Target::Motor);
        session.judge();

        // The wave code is not the motor code
        assert_eq!(enter(&mut session, WAVE), Judgement::Rejected);
        assert!(session.is_accepting());
        assert_eq!(session.selected(), Some(Target::Motor));
        assert!(!session.is_active(Target::Motor));
    }

    #[test]
    fn blink_counter_allows_three_rearms() {
        let mut session = PasswordSession::new();
        session.start_blink(true);
        let steps: Vec<bool> = (0..5).map(|_| session.blink_step()).collect();
        assert_eq!(steps, [true, true, true, false, true]);
    }

    fn gate() -> (Password<FakeTimer, FakePin>, TimerProbe, [PinProbe; 3]) {
        let timer = FakeTimer::new();
        let pins = [FakePin::new(), FakePin::new(), FakePin::new()];
        let probes = (timer.probe(), pins.each_ref().map(FakePin::probe));
        let [correct, incorrect, unlocked] = pins;
        (Password::new(timer, correct, incorrect, unlocked), probes.0, probes.1)
    }

    #[test]
    fn judged_attempt_blinks_four_times() {
        let (mut password, timer, [correct, incorrect, unlocked]) = gate();
        let mut switches = Switches::default();

        for key in MASTER {
            password.submit_key(key, &mut switches);
        }
        assert!(password.is_unlocked());
        assert_eq!(unlocked.is_high(), LAMP_LEVEL == ActiveLevel::High);
        assert!(correct.is_high());
        assert!(timer.armed());
        assert_eq!(timer.last_scheduled(), Some(BLINK_PERIOD.ticks()));

        for _ in 0..3 {
            password.on_timer();
        }
        assert!(!timer.armed());
        assert_eq!(correct.changes(), 4);
        assert!(!correct.is_high());
        assert_eq!(incorrect.changes(), 0);
        assert_eq!(timer.scheduled().len(), 3);
        assert_eq!(timer.acknowledged(), 3);
        assert!(switches.0.is_empty());
    }

    #[test]
    fn new_attempt_restarts_blink() {
        let (mut password, timer, [correct, incorrect, _unlocked]) = gate();
        let mut switches = Switches::default();

        for key in WAVE {
            password.submit_key(key, &mut switches);
        }
        assert!(password.incorrect_lit());
        password.on_timer();
        assert!(!password.incorrect_lit());

        // Second attempt while the first blink is still running
        for key in MASTER {
            password.submit_key(key, &mut switches);
        }
        assert!(!incorrect.is_high());
        assert!(correct.is_high());
        for _ in 0..3 {
            password.on_timer();
        }
        assert!(!timer.armed());
        assert_eq!(correct.changes(), 4);
        assert!(!password.correct_lit());
    }

    #[test]
    fn selection_switches_target_once_code_matches() {
        let (mut password, timer, _) = gate();
        let mut switches = Switches::default();

        for key in MASTER {
            password.submit_key(key, &mut switches);
        }
        let scheduled = timer.scheduled().len();

        password.submit_key(Key::A, &mut switches);
        assert_eq!(password.session().selected(), Some(Target::Motor));
        assert_eq!(timer.scheduled().len(), scheduled);

        for key in MOTOR {
            password.submit_key(key, &mut switches);
        }
        password.submit_key(Key::A, &mut switches);
        for key in MOTOR {
            password.submit_key(key, &mut switches);
        }
        assert_eq!(switches.0, [(Target::Motor, true), (Target::Motor, false)]);
    }

    #[test]
    fn stray_keys_are_no_ops() {
        let (mut password, timer, _) = gate();
        let mut switches = Switches::default();

        password.submit_key(Key::B, &mut switches);
        assert_eq!(password.session(), &PasswordSession::new());

        for key in MASTER {
            password.submit_key(key, &mut switches);
        }
        let before = password.session().clone();
        password.submit_key(Key::Star, &mut switches);
        password.submit_key(Key::Num9, &mut switches);
        assert_eq!(password.session(), &before);
        assert_eq!(timer.scheduled().len(), 1);
    }
}
