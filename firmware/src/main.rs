#![no_std]
#![no_main]

mod config;
mod current_sensor;
mod fmt;
mod hall_sensor;
mod hardware;
mod motor_driver;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use ac_motor_cascade::{CascadeConfig, ControlLoop};
use embassy_executor::Spawner;
use embassy_stm32::{
    adc::{Adc, AdcChannel, SampleTime},
    gpio::{Input, Pull},
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
    },
};

use current_sensor::ShuntCurrentSensor;
use hall_sensor::HallAngleSensor;
use hardware::EmbassyClock;
use motor_driver::PwmInverter;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_stm32::init(hardware::create_clock_config());

    info!("═══════════════════════════════════════════");
    info!("  AC motor cascade controller • STM32G431VB");
    info!("═══════════════════════════════════════════");

    let cascade_config = CascadeConfig::DEFAULT;
    cascade_config.validate().unwrap();

    // PWM初期化（TIM1、3相補完PWM）
    let mut uvw_pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(
            p.PE9,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE8,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE11,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE10,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE13,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE12,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        None,
        None,
        config::pwm::FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    uvw_pwm.set_dead_time(config::pwm::DEAD_TIME);
    let inverter = PwmInverter::new(uvw_pwm, config::V_DC_BUS);

    // 電流センサ（U相: PA0、V相: PA1）
    let mut adc1 = Adc::new(p.ADC1);
    adc1.set_sample_time(SampleTime::CYCLES24_5);
    let current_sensor =
        ShuntCurrentSensor::new(adc1, p.PA0.degrade_adc(), p.PA1.degrade_adc());

    // Hallセンサ（PB6=H1、PB7=H2、PB8=H3）
    let angle_sensor = HallAngleSensor::new(
        Input::new(p.PB6, Pull::Up),
        Input::new(p.PB7, Pull::Up),
        Input::new(p.PB8, Pull::Up),
        config::HALL_ANGLE_OFFSET,
    );

    if cascade_config.control_period_us < 1_000_000 / config::pwm::FREQUENCY.0 {
        warn!("Control period shorter than one PWM period");
    }

    let control = ControlLoop::new(
        &cascade_config,
        inverter,
        current_sensor,
        angle_sensor,
        EmbassyClock,
    );
    control.run()
}
