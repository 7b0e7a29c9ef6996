#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{
    gpio::{Input, InputConfig, Pull},
    timer::timg::TimerGroup,
};
use esp_println::logger::init_logger;
use log::{error, info, warn};
use tft_weatherstation::{
    config::ConfigurationSet,
    forecast::{ForecastMode, ForecastState},
    profile::install,
    weather::build_onecall_target,
};

const HEAP_KB: usize = 16;

// The forecast button is wired to the boot button
const FORECAST_BUTTON_GPIO: u8 = 0;

esp_bootloader_esp_idf::esp_app_desc!();

// Use https://docs.rs/static_cell/2.1.1/static_cell/macro.make_static.html
// once rust feature(type_alias_impl_trait) is stable
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

/// Toggle the forecast mode on every press.
#[embassy_executor::task]
async fn forecast_button(mut button: Input<'static>, state: &'static ForecastState) {
    info!("Watching forecast button on GPIO{}", state.pin());
    loop {
        button.wait_for_falling_edge().await;
        state.toggle();
    }
}

/// Redraw whenever the forecast mode changes.
#[embassy_executor::task]
async fn display_refresh(config: &'static ConfigurationSet, state: &'static ForecastState) {
    loop {
        let mode = state.changed().await;
        info!(
            "Redrawing {:?} forecast, {} / {} labels",
            mode, config.labels.sun, config.labels.moon
        );
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // Initialize logger for esp-println
    init_logger(log::LevelFilter::Info);
    esp_alloc::heap_allocator!(size: HEAP_KB * 1024);

    info!("Initialize peripherals");
    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialize and start RTOS timer
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = match ConfigurationSet::from_env()
        .and_then(|config| config.pwm.validate().map(|_| config))
        .and_then(install)
    {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            // nothing to recover without a new build
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };
    info!("Configuration:\n{}", config);

    match build_onecall_target(config) {
        Ok(_) => info!(
            "Weather request ready, refreshing every {}s",
            config.update_interval_secs
        ),
        Err(e) => warn!("Weather request cannot be built: {e}"),
    }

    if config.forecast.button_pin != FORECAST_BUTTON_GPIO {
        warn!(
            "Forecast button configured on GPIO{} but wired to GPIO{}",
            config.forecast.button_pin, FORECAST_BUTTON_GPIO
        );
    }
    let initial = if config.forecast.hourly_by_default {
        ForecastMode::Hourly
    } else {
        ForecastMode::Daily
    };
    let state = &*mk_static!(
        ForecastState,
        ForecastState::new(FORECAST_BUTTON_GPIO, initial)
    );
    let button = Input::new(
        peripherals.GPIO0,
        InputConfig::default().with_pull(Pull::Up),
    );

    spawner.spawn(forecast_button(button, state)).ok();
    spawner.spawn(display_refresh(config, state)).ok();

    loop {
        Timer::after(Duration::from_secs(config.update_interval_secs.into())).await;
        info!(
            "Update interval elapsed, {:?} forecast due for refresh",
            state.mode()
        );
    }
}
