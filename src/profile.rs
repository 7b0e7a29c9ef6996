//! Named configuration variants and the process-wide installed record.

use core::str::FromStr;

use once_cell::sync::OnceCell;

use crate::backlight::PwmConfig;
use crate::config::{
    ConfigurationSet, DEFAULT_UPDATE_INTERVAL_SECS, ForecastSettings, HOURS_PER_DAY, Labels,
    Language, Location, MIN_FREE_TIER_INTERVAL_SECS, PLACEHOLDER_API_KEY, TABLE_LEN, Units,
    WifiCredentials, text, text_table,
};
use crate::error::AppError;

// Secrets and location come from the build environment when set
const WIFI_SSID: &str = match option_env!("SSID") {
    Some(ssid) => ssid,
    None => "YOUR_WIFI_SSID",
};
const WIFI_PASSWORD: &str = match option_env!("PASSWORD") {
    Some(password) => password,
    None => "YOUR_WIFI_PASSWORD",
};
const OPENWEATHER_API_KEY: &str = match option_env!("OPENWEATHER_API_KEY") {
    Some(key) => key,
    None => PLACEHOLDER_API_KEY,
};
const LATITUDE: Option<&str> = option_env!("LATITUDE");
const LONGITUDE: Option<&str> = option_env!("LONGITUDE");
const PROFILE: Option<&str> = option_env!("WEATHER_PROFILE");

const DEFAULT_LATITUDE: &str = "18.512989";
const DEFAULT_LONGITUDE: &str = "120.737259";

// Hong Kong
const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

// GPIO0, the boot button
const DEFAULT_FORECAST_BUTTON_PIN: u8 = 0;

const SHORT_DOW: [&str; TABLE_LEN] = ["???", "SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const MOON_PHASES: [&str; TABLE_LEN] = [
    "New", "Waxing", "1st qtr", "Waxing", "Full", "Waning", "Last qtr", "Waning",
];

#[rustfmt::skip]
const METRIC_BRILLIANCE: [u8; HOURS_PER_DAY] = [
    //0   1    2    3    4    5
    60,  50,  30,  30,  20,  20,
    //6   7    8    9   10   11
    30,  50,  70,  80,  80, 100,
    //12  13   14   15   16   17
    120, 140, 160, 160, 160, 160,
    //18  19   20   21   22   23
    160, 150, 140, 130, 120,  80,
];

#[rustfmt::skip]
const IMPERIAL_BRILLIANCE: [u8; HOURS_PER_DAY] = [
    //0   1    2    3    4    5
    60,  50,  30,  30,  20,  20,
    //6   7    8    9   10   11
    30,  50,  70,  80, 100, 120,
    //12  13   14   15   16   17
    140, 160, 160, 160, 160, 160,
    //18  19   20   21   22   23
    160, 150, 140, 130, 120,  80,
];

static INSTALLED: OnceCell<ConfigurationSet> = OnceCell::new();

/// A complete named configuration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Metric,
    Imperial,
}

impl Profile {
    fn units(&self) -> Units {
        match self {
            Profile::Metric => Units::Metric,
            Profile::Imperial => Units::Imperial,
        }
    }

    fn brilliance(&self) -> [u8; HOURS_PER_DAY] {
        match self {
            Profile::Metric => METRIC_BRILLIANCE,
            Profile::Imperial => IMPERIAL_BRILLIANCE,
        }
    }
}

impl FromStr for Profile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("metric") {
            Ok(Profile::Metric)
        } else if s.eq_ignore_ascii_case("imperial") {
            Ok(Profile::Imperial)
        } else {
            Err(AppError::InvalidProfile)
        }
    }
}

impl ConfigurationSet {
    /// Build the record for `profile` using the compiled-in secrets.
    pub fn from_profile(profile: Profile) -> Result<Self, AppError> {
        Ok(Self {
            wifi: WifiCredentials {
                ssid: text("wifi_ssid", WIFI_SSID)?,
                password: text("wifi_password", WIFI_PASSWORD)?,
            },
            api_key: text("api_key", OPENWEATHER_API_KEY)?,
            location: Location {
                latitude: text("latitude", DEFAULT_LATITUDE)?,
                longitude: text("longitude", DEFAULT_LONGITUDE)?,
            },
            units: profile.units(),
            language: Language::new("en")?,
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            short_dow: text_table("short_dow", &SHORT_DOW)?,
            moon_phase: text_table("moon_phase", &MOON_PHASES)?,
            labels: Labels {
                sun: text("sun_label", "Sun")?,
                moon: text("moon_label", "Moon")?,
                cloud: text("cloud_label", "Cloud")?,
                humidity: text("humidity_label", "Humidity")?,
            },
            hourly_brilliance: profile.brilliance(),
            pwm: PwmConfig::default(),
            forecast: ForecastSettings {
                button_pin: DEFAULT_FORECAST_BUTTON_PIN,
                hourly_by_default: false,
            },
        })
    }

    /// Build the record selected by the `WEATHER_PROFILE` build variable,
    /// with `LATITUDE`/`LONGITUDE` overriding the default location.
    pub fn from_env() -> Result<Self, AppError> {
        let profile = match PROFILE {
            Some(name) => name.parse()?,
            None => Profile::default(),
        };
        let mut config = Self::from_profile(profile)?;
        if let Some(latitude) = LATITUDE {
            config.location.latitude = text("latitude", latitude)?;
        }
        if let Some(longitude) = LONGITUDE {
            config.location.longitude = text("longitude", longitude)?;
        }
        log::info!("Loaded {:?} configuration profile", profile);
        Ok(config)
    }
}

/// Store `config` as the process-wide record. Only the first call succeeds.
pub fn install(config: ConfigurationSet) -> Result<&'static ConfigurationSet, AppError> {
    if config.update_interval_secs == 0 {
        log::error!("Update interval must be greater than zero");
        return Err(AppError::InvalidUpdateInterval);
    }
    if config.wifi.ssid.is_empty() || config.wifi.password.is_empty() {
        log::warn!("WiFi credentials are empty");
    }
    if config.update_interval_secs < MIN_FREE_TIER_INTERVAL_SECS {
        log::warn!(
            "Update interval of {}s exceeds the free tier's 1000 requests per day",
            config.update_interval_secs
        );
    }
    INSTALLED
        .set(config)
        .map_err(|_| AppError::AlreadyInstalled)?;
    INSTALLED.get().ok_or(AppError::AlreadyInstalled)
}

/// The record stored by [`install`], if any.
pub fn installed() -> Option<&'static ConfigurationSet> {
    INSTALLED.get()
}
