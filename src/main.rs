//! Keypad-gated motor sequencer and wave generator for the Raspberry Pi Pico.
#![no_std]
#![no_main]
#![doc(html_playground_url = "https://play.rust-lang.org/")]
#![warn(missing_docs)]

use appliance_panel::{
    board::{
        timer_irq, timer_priority, AlarmChannel, BoardKeypad, BoardMotorControl, BoardPassword, BoardWaveGen,
        ButtonLine, EdgePin, InputLine, OutputLine, BUTTON_DEBOUNCE_CYCLES, INPUT_PRIORITY, KEYPAD_DEBOUNCE_CYCLES,
    },
    components::{Indicator, IndicatorPair},
    interrupt::{
        install_motor_control, install_password, install_wave_gen, keypad_edge, motor_control_button,
        motor_control_timer, password_blink_timer, wave_gen_button, wave_gen_timer,
    },
    keypad::Keypad,
    motor::MotorControl,
    password::Password,
    peripherals::{PwmDac, Sample},
    timer::Channel,
    wavegen::WaveGenerator,
};
use defmt::{debug, info, warn};
#[allow(unused_imports)]
use defmt_rtt as _;
#[allow(unused_imports)]
use panic_probe as _;
use rp2040_hal::{
    clocks::init_clocks_and_plls,
    entry,
    fugit::RateExtU32,
    gpio::{Interrupt as EdgeKind, Pins},
    pac::{self, interrupt},
    prelude::*,
    pwm::Slices,
    Sio, Timer, Watchdog,
};

/// Second-stage bootloader, from [rp2040-boot2](https://docs.rs/rp2040-boot2)
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;
/// External high-speed crystal on the pico board is 12Mhz
pub const XOSC_FREQ_HZ: u32 = 12_000_000;
/// Attempt to run system clock at 24 MHz
pub const SYS_CLOCK_FREQ: u32 = 24_000_000;

/// Main operation loop
#[entry]
fn main() -> ! {
    info!("Appliance panel startup");
    let mut pac = pac::Peripherals::take().unwrap();
    let mut core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    let mut clocks = init_clocks_and_plls(
        XOSC_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    // Attempt to switch system to 24 MHz for efficiency
    clocks
        .system_clock
        .configure_clock(&clocks.reference_clock, SYS_CLOCK_FREQ.Hz())
        .unwrap_or_else(|err| {
            warn!(
                "Unable to downscale clock speed: {}\nClocks will continue to run at {=u32}",
                err,
                clocks.system_clock.freq().to_Hz()
            )
        });
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );
    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Wave generator: PWM DAC with a 12-bit range on GPIO22
    debug!("init wave generator");
    let mut pwm_slices = Slices::new(pac.PWM, &mut pac.RESETS);
    pwm_slices.pwm3.set_top(Sample::MAX.get());
    pwm_slices.pwm3.enable();
    let mut dac_channel = pwm_slices.pwm3.channel_a;
    dac_channel.output_to(pins.gpio22);
    let wave_button: ButtonLine = pins.gpio7.into_pull_up_input().into_dyn_pin();
    let wave_led1: OutputLine = pins.gpio10.into_push_pull_output().into_dyn_pin();
    let wave_led2: OutputLine = pins.gpio11.into_push_pull_output().into_dyn_pin();
    let wave_gen = cortex_m::singleton!(: BoardWaveGen = WaveGenerator::new(
        PwmDac::new(dac_channel),
        AlarmChannel::new(timer.alarm_0().unwrap(), Channel::WaveGen),
        EdgePin::new(wave_button, EdgeKind::EdgeLow),
        IndicatorPair::new(wave_led1, wave_led2),
        Indicator::lamp(pins.gpio20.into_push_pull_output().into_dyn_pin()),
    ))
    .unwrap();

    // Motor sequencer
    debug!("init motor sequencer");
    let motor_button: ButtonLine = pins.gpio8.into_pull_up_input().into_dyn_pin();
    let motor_control = cortex_m::singleton!(: BoardMotorControl = MotorControl::new(
        pins.gpio14.into_push_pull_output().into_dyn_pin(),
        AlarmChannel::new(timer.alarm_1().unwrap(), Channel::MotorControl),
        EdgePin::new(motor_button, EdgeKind::EdgeLow),
        IndicatorPair::new(
            pins.gpio12.into_push_pull_output().into_dyn_pin(),
            pins.gpio13.into_push_pull_output().into_dyn_pin(),
        ),
        Indicator::lamp(pins.gpio19.into_push_pull_output().into_dyn_pin()),
    ))
    .unwrap();

    // Password gate and keypad encoder
    debug!("init password gate");
    let password = cortex_m::singleton!(: BoardPassword = Password::new(
        AlarmChannel::new(timer.alarm_2().unwrap(), Channel::PasswordBlink),
        pins.gpio15.into_push_pull_output().into_dyn_pin(),
        pins.gpio16.into_push_pull_output().into_dyn_pin(),
        pins.gpio18.into_push_pull_output().into_dyn_pin(),
    ))
    .unwrap();
    let data_lines: [InputLine; 4] = [
        pins.gpio2.into_pull_down_input().into_dyn_pin(),
        pins.gpio3.into_pull_down_input().into_dyn_pin(),
        pins.gpio4.into_pull_down_input().into_dyn_pin(),
        pins.gpio5.into_pull_down_input().into_dyn_pin(),
    ];
    let data_available = EdgePin::new(
        pins.gpio6.into_pull_down_input().into_dyn_pin(),
        EdgeKind::EdgeHigh,
    );
    let keypad = cortex_m::singleton!(: BoardKeypad = Keypad::new(data_lines, data_available)).unwrap();

    debug!("critical_section: install subsystems");
    install_wave_gen(wave_gen);
    install_motor_control(motor_control);
    install_password(password, keypad);

    // Nothing may fire before every subsystem is installed
    unsafe {
        core.NVIC.set_priority(pac::Interrupt::IO_IRQ_BANK0, INPUT_PRIORITY);
        for channel in Channel::ALL {
            core.NVIC.set_priority(timer_irq(channel), timer_priority(channel));
        }
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
        for channel in Channel::ALL {
            pac::NVIC::unmask(timer_irq(channel));
        }
    }
    info!("Ready: enter the master code");

    loop {
        cortex_m::asm::wfi();
    }
}

/// Keypad data-available and both subsystem buttons share the GPIO bank interrupt.
#[interrupt]
fn IO_IRQ_BANK0() {
    if keypad_edge() {
        cortex_m::asm::delay(KEYPAD_DEBOUNCE_CYCLES);
    }
    if wave_gen_button() {
        cortex_m::asm::delay(BUTTON_DEBOUNCE_CYCLES);
    }
    if motor_control_button() {
        cortex_m::asm::delay(BUTTON_DEBOUNCE_CYCLES);
    }
}

/// Wave generator sample clock
#[interrupt]
fn TIMER_IRQ_0() {
    wave_gen_timer();
}

/// Motor sequencer step clock
#[interrupt]
fn TIMER_IRQ_1() {
    motor_control_timer();
}

/// Password feedback blink
#[interrupt]
fn TIMER_IRQ_2() {
    password_blink_timer();
}
