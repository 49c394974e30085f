// SPDX-License-Identifier: Apache-2.0

//! Recording fakes for the peripheral seams, used by the unit tests.
//!
//! Every fake hands out a probe sharing its state, so a test can keep observing the
//! peripheral after moving it into a state machine. State sits behind `Arc<Mutex<_>>` so
//! the fakes are `Send` and can live in the interrupt statics.

use core::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::digital;
use fugit::MicrosDurationU32;

use crate::{
    peripherals::{Dac, EdgeLine, Sample},
    timer::TimerChannel,
};

/// Shared state behind a fake and its probe.
#[derive(Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().expect("fake peripheral state poisoned")
    }
}

#[derive(Default)]
pub struct PinState {
    high: bool,
    changes: usize,
}

/// Output pin starting low.
#[derive(Default)]
pub struct FakePin(Shared<PinState>);

impl FakePin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> PinProbe {
        PinProbe(self.0.clone())
    }

    fn drive(&mut self, high: bool) {
        let mut state = self.0.lock();
        if state.high != high {
            state.changes += 1;
        }
        state.high = high;
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl digital::OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

#[derive(Clone)]
pub struct PinProbe(Shared<PinState>);

impl PinProbe {
    pub fn is_high(&self) -> bool {
        self.0.lock().high
    }

    /// Number of level changes so far
    pub fn changes(&self) -> usize {
        self.0.lock().changes
    }
}

#[derive(Default)]
pub struct TimerState {
    scheduled: Vec<u32>,
    armed: bool,
    /// Countdown loaded and not yet expired
    counting: bool,
    /// Expiry flag, set whether or not the channel is armed
    latched: bool,
    acknowledged: usize,
}

/// Timer channel that records every countdown it is given.
///
/// Expiry follows the hardware: a countdown keeps running while the channel is disarmed and
/// latches its flag, which only [`TimerChannel::acknowledge`] or
/// [`TimerChannel::disarm`] clear.
#[derive(Default)]
pub struct FakeTimer(Shared<TimerState>);

impl FakeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> TimerProbe {
        TimerProbe(self.0.clone())
    }
}

impl TimerChannel for FakeTimer {
    fn schedule(&mut self, delay: MicrosDurationU32) {
        let mut state = self.0.lock();
        state.scheduled.push(delay.ticks());
        state.counting = true;
    }

    fn arm(&mut self) {
        self.0.lock().armed = true;
    }

    fn disarm(&mut self) {
        let mut state = self.0.lock();
        state.armed = false;
        state.counting = false;
        state.latched = false;
    }

    fn acknowledge(&mut self) {
        let mut state = self.0.lock();
        state.latched = false;
        state.acknowledged += 1;
    }
}

#[derive(Clone)]
pub struct TimerProbe(Shared<TimerState>);

impl TimerProbe {
    /// Countdowns in microseconds, oldest first
    pub fn scheduled(&self) -> Vec<u32> {
        self.0.lock().scheduled.clone()
    }

    pub fn last_scheduled(&self) -> Option<u32> {
        self.0.lock().scheduled.last().copied()
    }

    pub fn armed(&self) -> bool {
        self.0.lock().armed
    }

    pub fn acknowledged(&self) -> usize {
        self.0.lock().acknowledged
    }

    /// Let the running countdown, if any, reach zero.
    pub fn expire(&self) {
        let mut state = self.0.lock();
        if state.counting {
            state.counting = false;
            state.latched = true;
        }
    }

    /// The expiry interrupt would be taken now.
    pub fn irq_pending(&self) -> bool {
        let state = self.0.lock();
        state.armed && state.latched
    }
}

#[derive(Default)]
pub struct DacState {
    enabled: bool,
    loads: Vec<u16>,
}

/// DAC that records every sample loaded while powered.
#[derive(Default)]
pub struct FakeDac(Shared<DacState>);

impl FakeDac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> DacProbe {
        DacProbe(self.0.clone())
    }
}

impl Dac for FakeDac {
    fn enable(&mut self) {
        self.0.lock().enabled = true;
    }

    fn disable(&mut self) {
        self.0.lock().enabled = false;
    }

    fn load(&mut self, sample: Sample) {
        let mut state = self.0.lock();
        if state.enabled {
            state.loads.push(sample.get());
        }
    }
}

#[derive(Clone)]
pub struct DacProbe(Shared<DacState>);

impl DacProbe {
    pub fn enabled(&self) -> bool {
        self.0.lock().enabled
    }

    pub fn loads(&self) -> Vec<u16> {
        self.0.lock().loads.clone()
    }

    pub fn last(&self) -> Option<u16> {
        self.0.lock().loads.last().copied()
    }
}

#[derive(Default)]
pub struct EdgeState {
    listening: bool,
    pending: bool,
    asserted: bool,
}

/// Edge line driven by the test through its probe.
#[derive(Default)]
pub struct FakeEdge(Shared<EdgeState>);

impl FakeEdge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> EdgeProbe {
        EdgeProbe(self.0.clone())
    }
}

impl EdgeLine for FakeEdge {
    fn listen(&mut self) {
        self.0.lock().listening = true;
    }

    fn unlisten(&mut self) {
        let mut state = self.0.lock();
        state.listening = false;
        state.pending = false;
    }

    fn is_pending(&self) -> bool {
        self.0.lock().pending
    }

    fn acknowledge(&mut self) {
        self.0.lock().pending = false;
    }

    fn is_asserted(&mut self) -> bool {
        self.0.lock().asserted
    }
}

#[derive(Clone)]
pub struct EdgeProbe(Shared<EdgeState>);

impl EdgeProbe {
    /// Clean press: latched only while the line is listened to.
    pub fn press(&self) {
        let mut state = self.0.lock();
        state.asserted = true;
        if state.listening {
            state.pending = true;
        }
    }

    /// Edge latched, but the level has already bounced back.
    pub fn bounce(&self) {
        let mut state = self.0.lock();
        state.asserted = false;
        if state.listening {
            state.pending = true;
        }
    }

    pub fn listening(&self) -> bool {
        self.0.lock().listening
    }

    pub fn pending(&self) -> bool {
        self.0.lock().pending
    }
}
