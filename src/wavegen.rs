// SPDX-License-Identifier: Apache-2.0

//! Wave generator: plays one of three 41-sample waveforms through the DAC, one sample per
//! expiry of its timer channel. Its button steps Square → Sine → Triangle → Square.

use embedded_hal::digital::OutputPin;

use crate::{
    buffer::{RingIndex, SampleRing, SINE, SQUARE, TRIANGLE},
    components::{Indicator, IndicatorPair, Pattern},
    interrupt::Process,
    peripherals::{Dac, EdgeLine, Sample},
    timer::{TimerChannel, SAMPLE_PERIOD},
};

/// Waveform states, in button order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Waveform {
    /// Full-scale square wave
    Square,
    /// Sine wave around mid-scale
    Sine,
    /// Symmetric triangle wave
    Triangle,
}

impl Waveform {
    /// State reached by the next button press.
    pub const fn next(self) -> Self {
        match self {
            Waveform::Square => Waveform::Sine,
            Waveform::Sine => Waveform::Triangle,
            Waveform::Triangle => Waveform::Square,
        }
    }

    /// Samples played in this state.
    pub fn table(self) -> &'static SampleRing {
        match self {
            Waveform::Square => &SQUARE,
            Waveform::Sine => &SINE,
            Waveform::Triangle => &TRIANGLE,
        }
    }

    /// State LEDs for this waveform.
    pub const fn pattern(self) -> Pattern {
        match self {
            Waveform::Square => Pattern::new(false, true),
            Waveform::Sine => Pattern::new(true, false),
            Waveform::Triangle => Pattern::new(true, true),
        }
    }
}

/// Wave generator hardware and state.
pub struct WaveGenerator<D, T, B, P>
where
    D: Dac,
    T: TimerChannel,
    B: EdgeLine,
    P: OutputPin,
{
    /// Analog output
    dac: D,
    /// Sample clock (exclusively owned channel)
    timer: T,
    /// Waveform select button
    button: B,
    /// LED1/LED2 waveform display
    leds: IndicatorPair<P>,
    /// Wave-active lamp
    lamp: Indicator<P>,
    /// Current waveform
    waveform: Waveform,
    /// Next sample to play
    cursor: RingIndex,
}

impl<D, T, B, P> WaveGenerator<D, T, B, P>
where
    D: Dac,
    T: TimerChannel,
    B: EdgeLine,
    P: OutputPin,
{
    /// Take the hardware and leave the generator disabled: DAC off, LEDs dark, button and
    /// sample clock ignored.
    pub fn new(mut dac: D, mut timer: T, mut button: B, leds: IndicatorPair<P>, lamp: Indicator<P>) -> Self {
        dac.disable();
        timer.disarm();
        button.unlisten();
        Self {
            dac,
            timer,
            button,
            leds,
            lamp,
            waveform: Waveform::Triangle,
            cursor: RingIndex::START,
        }
    }

    /// Power the DAC, start the sample clock from the Triangle state and light the lamp.
    pub fn enable(&mut self) {
        self.dac.enable();
        self.timer.schedule(SAMPLE_PERIOD);
        self.button.listen();
        self.waveform = Waveform::Triangle;
        self.timer.arm();
        self.lamp.on();
    }

    /// Drive the output to 0, power it down, stop both interrupts and darken every LED.
    pub fn disable(&mut self) {
        self.timer.disarm();
        self.button.unlisten();
        self.dac.load(Sample::ZERO);
        self.dac.disable();
        self.lamp.off();
        self.leds.clear();
    }

    /// Button edge: step to the next waveform.
    pub fn change_sequence(&mut self) {
        self.timer.arm();
        self.dac.enable();
        self.waveform = self.waveform.next();
        self.leds.show(self.waveform.pattern());
    }

    /// Timer expiry: play the sample under the cursor, step the cursor and reload the sample
    /// clock.
    pub fn index_shifting(&mut self) {
        let sample = self.waveform.table().sample(self.cursor);
        self.dac.load(sample);
        #[cfg(feature = "trace_samples")]
        trace!("{:?}[{}] = {}", self.waveform, self.cursor.get(), sample.get());
        self.cursor.advance(self.waveform.table().len());
        self.timer.schedule(SAMPLE_PERIOD);
    }

    /// Current waveform
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Next sample position
    pub fn cursor(&self) -> RingIndex {
        self.cursor
    }

    /// Waveform LEDs as displayed
    pub fn pattern(&self) -> Pattern {
        self.leds.pattern()
    }

    /// Wave-active lamp lit
    pub fn is_active(&self) -> bool {
        self.lamp.is_lit()
    }
}

impl<D, T, B, P> Process for WaveGenerator<D, T, B, P>
where
    D: Dac,
    T: TimerChannel,
    B: EdgeLine,
    P: OutputPin,
{
    fn enable(&mut self) {
        WaveGenerator::enable(self)
    }

    fn disable(&mut self) {
        WaveGenerator::disable(self)
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
        self.index_shifting();
    }
}
