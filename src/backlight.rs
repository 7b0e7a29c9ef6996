use serde::{Deserialize, Serialize};

use crate::error::AppError;

// LEDC limits on the ESP32-S2
const LEDC_CHANNELS: u8 = 8;
const LEDC_MAX_RESOLUTION_BITS: u8 = 14;

/// Backlight PWM properties. The defaults match the TFT wiring and should not change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    pub frequency_hz: u32,
    pub resolution_bits: u8,
    /// Backlight PWM channel number
    pub channel: u8,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 5000,
            resolution_bits: 8,
            channel: 4,
        }
    }
}

impl PwmConfig {
    /// Check the values against what the LEDC peripheral supports.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.frequency_hz == 0
            || self.resolution_bits == 0
            || self.resolution_bits > LEDC_MAX_RESOLUTION_BITS
            || self.channel >= LEDC_CHANNELS
        {
            log::error!("Unsupported PWM configuration: {:?}", self);
            return Err(AppError::InvalidPwmConfig);
        }
        Ok(())
    }

    pub fn max_duty(&self) -> u32 {
        (1u32 << self.resolution_bits.min(LEDC_MAX_RESOLUTION_BITS)) - 1
    }

    /// Scale an 8-bit brightness level to the configured resolution.
    pub fn duty_for_level(&self, level: u8) -> u32 {
        u32::from(level) * self.max_duty() / u32::from(u8::MAX)
    }
}
