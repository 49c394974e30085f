//! This [RP2040](https://docs.rs/rp2040-hal) project runs three small "appliances" from one
//! set of interrupt handlers: a keypad password gate, a DC motor sequencer and a 5 Hz wave
//! generator. There is no scheduler. Every subsystem is a state machine that only moves
//! when one of its interrupts fires, and the timer block is split so each subsystem owns
//! one alarm.
//!
//! ## Crate features
//!
//! - `triple_status`: Three separate subsystem lamps (unlocked, motor active, wave active),
//!   driven active-high. Enabled by default.
//! - `rgba_status`: Alternate configuration which uses a single common-anode RGB LED, one
//!   colour per subsystem.
//! - `trace_samples`: Logs every sample loaded into the DAC. Very noisy! See
//!   [`wavegen::WaveGenerator::index_shifting`].
//! - `defmt`: Sends log output through [`defmt`](https://docs.rs/defmt) instead of the
//!   [`log`] facade.
//! - `rp2040`: Board binding ([`board`]) and the firmware binary. Implies `defmt`.
//!
//! <div class="warning">Features <code>triple_status</code> and <code>rgba_status</code> are
//! mutually exclusive.</div>
//!
//! ## Layout
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`buffer`] | Sample tables and the ring cursor used to walk them |
//! | [`components`] | Indicator LEDs and subsystem lamps |
//! | [`peripherals`] | DAC and edge-line seams the state machines drive |
//! | [`timer`] | Timer channel seam and the tick constants shared by all subsystems |
//! | [`keypad`] | 16-key pad codes and the data-available reader |
//! | [`wavegen`] | Wave generator state machine |
//! | [`motor`] | Motor sequencer state machine |
//! | [`password`] | Password gate state machine |
//! | [`interrupt`] | Interrupt-shared statics and handler bodies |
//!
//! ## Operation
//!
//! 1. Type the master code (`1 2 3 4`) on the keypad. The green feedback LED blinks and
//!    the "unlocked" lamp lights.
//! 2. Press `A` (motor) or `B` (wave), then type that subsystem's code (`4 5 6 7` or
//!    `7 8 9 0`). A correct code toggles the subsystem on or off and returns to step 2.
//! 3. While a subsystem is on, its button steps through its sequences.

// Copyright 2024 Appliance panel firmware contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg), feature(doc_cfg_hide))]

mod fmt;

pub mod buffer;
pub mod components;
pub mod interrupt;
pub mod keypad;
pub mod motor;
pub mod password;
pub mod peripherals;
pub mod timer;
pub mod wavegen;

#[cfg(feature = "rp2040")]
pub mod board;

#[cfg(test)]
mod mock;

#[cfg(all(feature = "triple_status", feature = "rgba_status"))]
compile_error!("Features `triple_status` and `rgba_status` cannot be enabled at the same time in crate appliance_panel");
