// SPDX-License-Identifier: Apache-2.0

//! Interrupt handler bodies, plus the static [`Mutex`]es that hand the subsystems to them.
//!
//! Each subsystem is created once at start-up, leaked to `'static` and installed in its
//! static. A handler body takes the critical section, borrows the one subsystem it serves and
//! returns; the only cross-subsystem access is the password gate switching the motor
//! sequencer or wave generator from inside the keypad handler's critical section.
//!
//! Debouncing is left to the caller so these bodies never busy-wait with interrupts masked.

use core::cell::RefCell;
use critical_section::{CriticalSection, Mutex};

use crate::{
    keypad::{Key, KeyEdge, KeySource},
    password::{Target, Targets},
};

/// Static slot for a subsystem shared with interrupt handlers.
pub type Shared<T> = Mutex<RefCell<Option<T>>>;

/// A subsystem the password gate can switch, with one button and one timer channel.
pub trait Process {
    /// Power up and start listening to the button and timer channel.
    fn enable(&mut self);
    /// Stop all outputs and ignore the button and timer channel.
    fn disable(&mut self);
    /// Service the button line. Returns `true` if an edge was latched and handled.
    fn on_button(&mut self) -> bool;
    /// Service an expiry of the subsystem's timer channel.
    fn on_timer(&mut self);
}

/// Keypad consumer with its own feedback timer channel.
pub trait Gate {
    /// Handle one key press, switching subsystems through `targets`.
    fn on_key(&mut self, key: Key, targets: &mut dyn Targets);
    /// Service an expiry of the feedback timer channel.
    fn on_timer(&mut self);
}

/// Wave generator for access in interrupts
pub static WAVE_GEN: Shared<&'static mut (dyn Process + Send)> = Mutex::new(RefCell::new(None));
/// Motor sequencer for access in interrupts
pub static MOTOR_CONTROL: Shared<&'static mut (dyn Process + Send)> = Mutex::new(RefCell::new(None));
/// Password gate for access in interrupts
pub static PASSWORD: Shared<&'static mut (dyn Gate + Send)> = Mutex::new(RefCell::new(None));
/// Keypad reader for access in interrupts
pub static KEYPAD: Shared<&'static mut (dyn KeySource + Send)> = Mutex::new(RefCell::new(None));

/// Hand the wave generator to its handlers.
pub fn install_wave_gen(wave_gen: &'static mut (dyn Process + Send)) {
    critical_section::with(|cs| WAVE_GEN.replace(cs, Some(wave_gen)));
}

/// Hand the motor sequencer to its handlers.
pub fn install_motor_control(motor_control: &'static mut (dyn Process + Send)) {
    critical_section::with(|cs| MOTOR_CONTROL.replace(cs, Some(motor_control)));
}

/// Hand the password gate and keypad reader to their handlers.
pub fn install_password(password: &'static mut (dyn Gate + Send), keypad: &'static mut (dyn KeySource + Send)) {
    critical_section::with(|cs| {
        PASSWORD.replace(cs, Some(password));
        KEYPAD.replace(cs, Some(keypad));
    });
}

/// [`Targets`] that reach the subsystems through their statics. Only exists inside a
/// critical section.
pub struct SharedTargets<'cs> {
    /// Token for the enclosing critical section
    cs: CriticalSection<'cs>,
}

impl<'cs> SharedTargets<'cs> {
    /// Borrow the statics for the length of `cs`.
    pub fn new(cs: CriticalSection<'cs>) -> Self {
        Self { cs }
    }
}

impl Targets for SharedTargets<'_> {
    fn switch(&mut self, target: Target, active: bool) {
        let slot = match target {
            Target::Motor => &MOTOR_CONTROL,
            Target::Wave => &WAVE_GEN,
        };
        if let Some(ref mut process) = *slot.borrow_ref_mut(self.cs) {
            if active {
                info!("{:?} enabled", target);
                process.enable();
            } else {
                info!("{:?} disabled", target);
                process.disable();
            }
        } else {
            warn!("{:?} switched before it was installed", target);
        }
    }
}

/// Keypad data-available edge. Returns `true` if an edge was latched, so the caller can
/// debounce.
pub fn keypad_edge() -> bool {
    critical_section::with(|cs| {
        let edge = match *KEYPAD.borrow_ref_mut(cs) {
            Some(ref mut keypad) => keypad.poll(),
            None => return false,
        };
        match edge {
            KeyEdge::Quiet => false,
            KeyEdge::Spurious => {
                warn!("keypad: data-available dropped before it was read");
                true
            }
            KeyEdge::Pressed(key) => {
                debug!("keypad: {:?}", key);
                if let Some(ref mut password) = *PASSWORD.borrow_ref_mut(cs) {
                    password.on_key(key, &mut SharedTargets::new(cs));
                } else {
                    warn!("keypad: no password gate installed");
                }
                true
            }
        }
    })
}

/// Service one subsystem's button line.
fn process_button(slot: &Shared<&'static mut (dyn Process + Send)>) -> bool {
    critical_section::with(|cs| match *slot.borrow_ref_mut(cs) {
        Some(ref mut process) => process.on_button(),
        None => false,
    })
}

/// Service one subsystem's timer channel.
fn process_timer(slot: &Shared<&'static mut (dyn Process + Send)>, name: &str) {
    critical_section::with(|cs| {
        if let Some(ref mut process) = *slot.borrow_ref_mut(cs) {
            process.on_timer();
        } else {
            warn!("{}: timer fired before install", name);
        }
    });
}

/// Wave generator button edge. Returns `true` if an edge was handled.
pub fn wave_gen_button() -> bool {
    process_button(&WAVE_GEN)
}

/// Motor sequencer button edge. Returns `true` if an edge was handled.
pub fn motor_control_button() -> bool {
    process_button(&MOTOR_CONTROL)
}

/// Wave generator sample clock expiry.
pub fn wave_gen_timer() {
    process_timer(&WAVE_GEN, "wave_gen");
}

/// Motor sequencer step clock expiry.
pub fn motor_control_timer() {
    process_timer(&MOTOR_CONTROL, "motor_control");
}

/// Password blink expiry.
pub fn password_blink_timer() {
    critical_section::with(|cs| {
        if let Some(ref mut password) = *PASSWORD.borrow_ref_mut(cs) {
            password.on_timer();
        } else {
            warn!("password: timer fired before install");
        }
    });
}
