//! Forecast-mode switch shared between the button handler and the display.
//!
//! The state is owned by whoever creates it (the firmware keeps it in a
//! `StaticCell`) and handed to both tasks by reference.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Daily or hourly forecast presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    Daily,
    Hourly,
}

impl ForecastMode {
    pub fn toggled(self) -> Self {
        match self {
            ForecastMode::Daily => ForecastMode::Hourly,
            ForecastMode::Hourly => ForecastMode::Daily,
        }
    }
}

pub struct ForecastState {
    pin: u8,
    // updated inside a critical section so the button interrupt never tears it
    mode: Mutex<CriticalSectionRawMutex, Cell<ForecastMode>>,
    changed: Signal<CriticalSectionRawMutex, ForecastMode>,
}

impl ForecastState {
    pub const fn new(pin: u8, initial: ForecastMode) -> Self {
        Self {
            pin,
            mode: Mutex::new(Cell::new(initial)),
            changed: Signal::new(),
        }
    }

    /// Input pin that toggles the mode.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn mode(&self) -> ForecastMode {
        self.mode.lock(Cell::get)
    }

    pub fn set(&self, mode: ForecastMode) {
        let previous = self.mode.lock(|cell| cell.replace(mode));
        if previous != mode {
            log::debug!("Forecast mode set to {:?}", mode);
            self.changed.signal(mode);
        }
    }

    /// Flip the mode and return the new value.
    pub fn toggle(&self) -> ForecastMode {
        let mode = self.mode.lock(|cell| {
            let next = cell.get().toggled();
            cell.set(next);
            next
        });
        log::info!("Forecast mode toggled to {:?}", mode);
        self.changed.signal(mode);
        mode
    }

    /// Wait for the next change and return the mode it settled on.
    pub async fn changed(&self) -> ForecastMode {
        self.changed.wait().await
    }
}
