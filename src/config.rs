//! The canonical configuration record for the weather station.
//!
//! Every value the firmware needs at startup lives in [`ConfigurationSet`]:
//! network credentials, the OpenWeather request settings, label tables for the
//! display and the backlight brightness schedule. Named variants are built by
//! [`crate::profile`].

use core::fmt::{self, Display};
use core::str::FromStr;

use heapless::String;
use serde::{Deserialize, Serialize};
use serde_json_core::{self as json_core};

use crate::backlight::PwmConfig;
use crate::error::AppError;

// Heapless sizing limits
pub const SSID_LEN: usize = 32;
pub const PASSWORD_LEN: usize = 64;
pub const API_KEY_LEN: usize = 64;
pub const COORD_LEN: usize = 16;
pub const LANG_LEN: usize = 8;
pub const LABEL_LEN: usize = 16;

/// Buffer size for a serialized [`ConfigurationSet`]. Fits every record whose
/// text needs only short escapes; text full of control characters (written as
/// six-byte `\u00XX`) can overflow it, and [`ConfigurationSet::to_json`] then
/// fails with [`AppError::JsonSerializeFailed`].
pub const JSON_LEN: usize = 1536;

/// Scratch space for unescaping the longest text field while parsing.
const UNESCAPE_LEN: usize = if PASSWORD_LEN > API_KEY_LEN {
    PASSWORD_LEN
} else {
    API_KEY_LEN
};

pub const HOURS_PER_DAY: usize = 24;
pub const TABLE_LEN: usize = 8;

/// Update every hour; the free OpenWeather tier allows 1000 requests a day.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u32 = 60 * 60;

/// Shortest interval that stays inside the free tier's daily quota.
pub const MIN_FREE_TIER_INTERVAL_SECS: u32 = 87;

pub const PLACEHOLDER_API_KEY: &str = "Your_free_key";

/// Language codes accepted by the OpenWeather `lang=` parameter.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "al", "ar", "az", "bg", "ca", "cz", "da", "de", "el", "en", "eu", "fa", "fi", "fr", "gl",
    "he", "hi", "hr", "hu", "id", "it", "ja", "kr", "la", "lt", "mk", "no", "nl", "pl", "pt",
    "pt_br", "ro", "ru", "sv", "se", "sk", "sl", "sp", "es", "sr", "th", "tr", "ua", "uk", "vi",
    "zh_cn", "zh_tw", "zu",
];

pub type Label = String<LABEL_LEN>;

/// Copy `value` into a fixed-capacity string, naming `field` on overflow.
pub(crate) fn text<const N: usize>(field: &'static str, value: &str) -> Result<String<N>, AppError> {
    String::try_from(value).map_err(|_| AppError::ValueTooLong(field))
}

pub(crate) fn text_table<const L: usize>(
    field: &'static str,
    values: &[&str; L],
) -> Result<[Label; L], AppError> {
    let mut out: [Label; L] = core::array::from_fn(|_| Label::new());
    for (slot, value) in out.iter_mut().zip(values.iter()) {
        *slot = text(field, value)?;
    }
    Ok(out)
}

/// Measurement system passed to the weather service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// A language code from [`SUPPORTED_LANGUAGES`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "String<LANG_LEN>", into = "String<LANG_LEN>")]
pub struct Language(String<LANG_LEN>);

impl Language {
    pub fn new(code: &str) -> Result<Self, AppError> {
        if !SUPPORTED_LANGUAGES.contains(&code) {
            return Err(AppError::InvalidLanguage);
        }
        Ok(Self(text("language", code)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String<LANG_LEN>> for Language {
    type Error = AppError;

    fn try_from(value: String<LANG_LEN>) -> Result<Self, Self::Error> {
        Language::new(&value)
    }
}

impl From<Language> for String<LANG_LEN> {
    fn from(value: Language) -> Self {
        value.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String<SSID_LEN>,
    pub password: String<PASSWORD_LEN>,
}

/// Decimal-degree coordinates kept as text; consumers parse them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub latitude: String<COORD_LEN>,
    pub longitude: String<COORD_LEN>,
}

/// Labels printed next to the weather readings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub sun: Label,
    pub moon: Label,
    pub cloud: Label,
    pub humidity: Label,
}

/// Input binding and initial state of the forecast-mode switch.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastSettings {
    pub button_pin: u8,
    pub hourly_by_default: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSet {
    pub wifi: WifiCredentials,
    pub api_key: String<API_KEY_LEN>,
    pub location: Location,
    pub units: Units,
    pub language: Language,
    /// Seconds east of UTC used for the local hour and weekday.
    pub utc_offset_secs: i32,
    pub update_interval_secs: u32,
    /// Index 0 is the "unknown day" sentinel, 1..=7 are Sunday..Saturday.
    pub short_dow: [Label; TABLE_LEN],
    pub moon_phase: [Label; TABLE_LEN],
    pub labels: Labels,
    /// Backlight level for each hour of the day.
    pub hourly_brilliance: [u8; HOURS_PER_DAY],
    pub pwm: PwmConfig,
    pub forecast: ForecastSettings,
}

/// Every value a consumer can look up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    WifiSsid,
    WifiPassword,
    ApiKey,
    Latitude,
    Longitude,
    Units,
    Language,
    UtcOffsetSecs,
    UpdateIntervalSecs,
    ShortDow,
    MoonPhase,
    SunLabel,
    MoonLabel,
    CloudLabel,
    HumidityLabel,
    HourlyBrilliance,
    PwmFreq,
    PwmResolution,
    PwmLedChannel,
    ForecastButtonPin,
    HourlyForecast,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 21] = [
        ConfigKey::WifiSsid,
        ConfigKey::WifiPassword,
        ConfigKey::ApiKey,
        ConfigKey::Latitude,
        ConfigKey::Longitude,
        ConfigKey::Units,
        ConfigKey::Language,
        ConfigKey::UtcOffsetSecs,
        ConfigKey::UpdateIntervalSecs,
        ConfigKey::ShortDow,
        ConfigKey::MoonPhase,
        ConfigKey::SunLabel,
        ConfigKey::MoonLabel,
        ConfigKey::CloudLabel,
        ConfigKey::HumidityLabel,
        ConfigKey::HourlyBrilliance,
        ConfigKey::PwmFreq,
        ConfigKey::PwmResolution,
        ConfigKey::PwmLedChannel,
        ConfigKey::ForecastButtonPin,
        ConfigKey::HourlyForecast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::WifiSsid => "wifi_ssid",
            ConfigKey::WifiPassword => "wifi_password",
            ConfigKey::ApiKey => "api_key",
            ConfigKey::Latitude => "latitude",
            ConfigKey::Longitude => "longitude",
            ConfigKey::Units => "units",
            ConfigKey::Language => "language",
            ConfigKey::UtcOffsetSecs => "utc_offset_secs",
            ConfigKey::UpdateIntervalSecs => "update_interval_secs",
            ConfigKey::ShortDow => "short_dow",
            ConfigKey::MoonPhase => "moon_phase",
            ConfigKey::SunLabel => "sun_label",
            ConfigKey::MoonLabel => "moon_label",
            ConfigKey::CloudLabel => "cloud_label",
            ConfigKey::HumidityLabel => "humidity_label",
            ConfigKey::HourlyBrilliance => "hourly_brilliance",
            ConfigKey::PwmFreq => "pwm_freq",
            ConfigKey::PwmResolution => "pwm_resolution",
            ConfigKey::PwmLedChannel => "pwm_led_channel",
            ConfigKey::ForecastButtonPin => "forecast_button_pin",
            ConfigKey::HourlyForecast => "hourly_forecast",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or(())
    }
}

/// A borrowed view of one configuration value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigValue<'a> {
    Text(&'a str),
    Integer(i64),
    Flag(bool),
    Levels(&'a [u8]),
    Table(&'a [Label]),
}

impl ConfigurationSet {
    /// Look up a value by key. Total over [`ConfigKey`].
    pub fn get(&self, key: ConfigKey) -> ConfigValue<'_> {
        match key {
            ConfigKey::WifiSsid => ConfigValue::Text(&self.wifi.ssid),
            ConfigKey::WifiPassword => ConfigValue::Text(&self.wifi.password),
            ConfigKey::ApiKey => ConfigValue::Text(&self.api_key),
            ConfigKey::Latitude => ConfigValue::Text(&self.location.latitude),
            ConfigKey::Longitude => ConfigValue::Text(&self.location.longitude),
            ConfigKey::Units => ConfigValue::Text(self.units.as_str()),
            ConfigKey::Language => ConfigValue::Text(self.language.as_str()),
            ConfigKey::UtcOffsetSecs => ConfigValue::Integer(self.utc_offset_secs.into()),
            ConfigKey::UpdateIntervalSecs => ConfigValue::Integer(self.update_interval_secs.into()),
            ConfigKey::ShortDow => ConfigValue::Table(&self.short_dow),
            ConfigKey::MoonPhase => ConfigValue::Table(&self.moon_phase),
            ConfigKey::SunLabel => ConfigValue::Text(&self.labels.sun),
            ConfigKey::MoonLabel => ConfigValue::Text(&self.labels.moon),
            ConfigKey::CloudLabel => ConfigValue::Text(&self.labels.cloud),
            ConfigKey::HumidityLabel => ConfigValue::Text(&self.labels.humidity),
            ConfigKey::HourlyBrilliance => ConfigValue::Levels(&self.hourly_brilliance),
            ConfigKey::PwmFreq => ConfigValue::Integer(self.pwm.frequency_hz.into()),
            ConfigKey::PwmResolution => ConfigValue::Integer(self.pwm.resolution_bits.into()),
            ConfigKey::PwmLedChannel => ConfigValue::Integer(self.pwm.channel.into()),
            ConfigKey::ForecastButtonPin => ConfigValue::Integer(self.forecast.button_pin.into()),
            ConfigKey::HourlyForecast => ConfigValue::Flag(self.forecast.hourly_by_default),
        }
    }

    /// Backlight level for `hour`.
    ///
    /// # Panics
    /// If `hour` is outside `0..=23`. Callers normalize with [`normalize_hour`].
    pub fn brightness_for_hour(&self, hour: i32) -> u8 {
        assert!(
            (0..HOURS_PER_DAY as i32).contains(&hour),
            "hour {hour} outside 0..=23"
        );
        self.hourly_brilliance[hour as usize]
    }

    /// Backlight duty for `hour`, scaled to the PWM resolution.
    pub fn backlight_duty_for_hour(&self, hour: i32) -> u32 {
        self.pwm.duty_for_level(self.brightness_for_hour(hour))
    }

    /// Short day name; index 0 is the "???" sentinel, 1..=7 map to Sun..Sat.
    ///
    /// # Panics
    /// If `index` is greater than 7.
    pub fn day_abbrev(&self, index: u8) -> &str {
        assert!(
            (index as usize) < TABLE_LEN,
            "weekday index {index} outside 0..=7"
        );
        &self.short_dow[index as usize]
    }

    /// # Panics
    /// If `bucket` is greater than 7.
    pub fn moon_phase_label(&self, bucket: u8) -> &str {
        assert!(
            (bucket as usize) < TABLE_LEN,
            "moon phase bucket {bucket} outside 0..=7"
        );
        &self.moon_phase[bucket as usize]
    }

    /// Serialize to JSON in a heapless buffer.
    pub fn to_json<const N: usize>(&self) -> Result<String<N>, AppError> {
        json_core::to_string(self).map_err(|e| {
            log::error!("Failed to serialize configuration: {:?}", e);
            AppError::JsonSerializeFailed
        })
    }
}

/// Wrap any hour, including negative offsets, into `0..=23`.
pub fn normalize_hour(hour: i64) -> i32 {
    hour.rem_euclid(HOURS_PER_DAY as i64) as i32
}

/// Moon phase bucket for a lunation fraction in `[0, 1]`, 0 = new, 0.5 = full.
pub fn moon_phase_bucket(fraction: f32) -> Option<u8> {
    if !(0.0..=1.0).contains(&fraction) {
        return None;
    }
    Some(((fraction * TABLE_LEN as f32 + 0.5) as u8) % TABLE_LEN as u8)
}

impl TryFrom<&[u8]> for ConfigurationSet {
    type Error = AppError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let mut scratch = [0u8; UNESCAPE_LEN];
        // serde_json_core::from_slice_escaped returns (T, consumed)
        let (parsed, _consumed) =
            json_core::from_slice_escaped::<ConfigurationSet>(value, &mut scratch).map_err(|e| {
                log::error!("Failed to parse configuration: {:?}", e);
                AppError::JsonParseFailed
            })?;
        Ok(parsed)
    }
}

/// Log-friendly summary with secrets masked.
impl Display for ConfigurationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "wifi: {} (password {} chars)", self.wifi.ssid, self.wifi.password.len())?;
        let key_state = if self.api_key.is_empty() {
            "missing"
        } else if self.api_key == PLACEHOLDER_API_KEY {
            "placeholder"
        } else {
            "set"
        };
        writeln!(f, "api key: {key_state}")?;
        writeln!(
            f,
            "lat: {} lon: {} utc offset: {}s",
            self.location.latitude, self.location.longitude, self.utc_offset_secs
        )?;
        writeln!(
            f,
            "units: {} lang: {} update every {}s",
            self.units.as_str(),
            self.language.as_str(),
            self.update_interval_secs
        )?;
        write!(
            f,
            "pwm: {}Hz {}bit ch{} forecast pin: {}",
            self.pwm.frequency_hz, self.pwm.resolution_bits, self.pwm.channel, self.forecast.button_pin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn metric() -> ConfigurationSet {
        ConfigurationSet::from_profile(Profile::Metric).unwrap()
    }

    #[test]
    fn brightness_matches_table_for_every_hour() {
        let cfg = metric();
        for hour in 0..24 {
            assert_eq!(cfg.brightness_for_hour(hour), cfg.hourly_brilliance[hour as usize]);
        }
        assert_eq!(cfg.brightness_for_hour(0), 60);
        assert_eq!(cfg.brightness_for_hour(13), 140);
        assert_eq!(cfg.brightness_for_hour(23), 80);
    }

    #[test]
    fn imperial_variant_is_brighter_at_one_pm() {
        let cfg = ConfigurationSet::from_profile(Profile::Imperial).unwrap();
        assert_eq!(cfg.brightness_for_hour(13), 160);
    }

    #[test]
    #[should_panic(expected = "outside 0..=23")]
    fn brightness_rejects_hour_24() {
        metric().brightness_for_hour(24);
    }

    #[test]
    #[should_panic(expected = "outside 0..=23")]
    fn brightness_rejects_negative_hour() {
        metric().brightness_for_hour(-1);
    }

    #[test]
    fn backlight_duty_scales_table_level() {
        let mut cfg = metric();
        assert_eq!(cfg.backlight_duty_for_hour(13), 140);
        cfg.pwm.resolution_bits = 10;
        assert_eq!(cfg.backlight_duty_for_hour(4), 80);
    }

    #[test]
    fn normalize_hour_wraps_both_directions() {
        assert_eq!(normalize_hour(24), 0);
        assert_eq!(normalize_hour(-1), 23);
        assert_eq!(normalize_hour(49), 1);
        assert_eq!(normalize_hour(13), 13);
    }

    #[test]
    fn day_abbrev_has_sentinel_at_zero() {
        let cfg = metric();
        assert_eq!(cfg.day_abbrev(0), "???");
        assert_eq!(cfg.day_abbrev(1), "SUN");
        assert_eq!(cfg.day_abbrev(7), "SAT");
    }

    #[test]
    #[should_panic(expected = "weekday index 8")]
    fn day_abbrev_rejects_index_past_saturday() {
        metric().day_abbrev(8);
    }

    #[test]
    fn moon_phase_labels() {
        let cfg = metric();
        assert_eq!(cfg.moon_phase_label(0), "New");
        assert_eq!(cfg.moon_phase_label(2), "1st qtr");
        assert_eq!(cfg.moon_phase_label(4), "Full");
        assert_eq!(cfg.moon_phase_label(7), "Waning");
    }

    #[test]
    #[should_panic(expected = "moon phase bucket 8")]
    fn moon_phase_rejects_bucket_eight() {
        metric().moon_phase_label(8);
    }

    #[test]
    fn moon_phase_bucket_rounds_to_nearest_eighth() {
        assert_eq!(moon_phase_bucket(0.0), Some(0));
        assert_eq!(moon_phase_bucket(0.25), Some(2));
        assert_eq!(moon_phase_bucket(0.5), Some(4));
        assert_eq!(moon_phase_bucket(0.74), Some(6));
        assert_eq!(moon_phase_bucket(0.97), Some(0));
        assert_eq!(moon_phase_bucket(1.0), Some(0));
        assert_eq!(moon_phase_bucket(1.5), None);
        assert_eq!(moon_phase_bucket(f32::NAN), None);
    }

    #[test]
    fn get_covers_every_key() {
        let cfg = metric();
        for key in ConfigKey::ALL {
            assert_eq!(key.name().parse::<ConfigKey>(), Ok(key));
            // total: must not panic
            let _ = cfg.get(key);
        }
        assert_eq!(cfg.get(ConfigKey::Units), ConfigValue::Text("metric"));
        assert_eq!(cfg.get(ConfigKey::PwmFreq), ConfigValue::Integer(5000));
        assert_eq!(cfg.get(ConfigKey::PwmLedChannel), ConfigValue::Integer(4));
        assert_eq!(cfg.get(ConfigKey::SunLabel), ConfigValue::Text("Sun"));
        assert_eq!(
            cfg.get(ConfigKey::UpdateIntervalSecs),
            ConfigValue::Integer(DEFAULT_UPDATE_INTERVAL_SECS as i64)
        );
        assert!("no_such_key".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn json_round_trip_is_identity() {
        let cfg = ConfigurationSet::from_profile(Profile::Imperial).unwrap();
        let json: String<JSON_LEN> = cfg.to_json().unwrap();
        let parsed = ConfigurationSet::try_from(json.as_bytes()).unwrap();
        assert_eq!(parsed, cfg);

        let again: String<JSON_LEN> = parsed.to_json().unwrap();
        assert_eq!(again, json);
    }

    #[test]
    fn json_round_trip_keeps_quotes_and_backslashes() {
        let mut cfg = metric();
        cfg.wifi.password = text("password", "pa\"ss\\word").unwrap();
        cfg.api_key = text("api_key", "\\key\"with\"quotes\\").unwrap();
        let json: String<JSON_LEN> = cfg.to_json().unwrap();
        let parsed = ConfigurationSet::try_from(json.as_bytes());
        assert_eq!(parsed, Ok(cfg));
    }

    #[test]
    fn json_round_trip_keeps_full_length_escaped_password() {
        let mut cfg = metric();
        let password: std::string::String = "\"\\".repeat(PASSWORD_LEN / 2);
        cfg.wifi.password = text("password", &password).unwrap();
        let json: String<JSON_LEN> = cfg.to_json().unwrap();
        let parsed = ConfigurationSet::try_from(json.as_bytes()).unwrap();
        assert_eq!(parsed.wifi.password.as_str(), password);
    }

    #[test]
    fn json_rejects_unknown_language() {
        let cfg = metric();
        let json: String<JSON_LEN> = cfg.to_json().unwrap();
        let tampered = json.replace("\"language\":\"en\"", "\"language\":\"xx\"");
        assert_eq!(
            ConfigurationSet::try_from(tampered.as_bytes()),
            Err(AppError::JsonParseFailed)
        );
    }

    #[test]
    fn json_too_small_buffer_fails() {
        assert_eq!(metric().to_json::<64>(), Err(AppError::JsonSerializeFailed));
    }

    #[test]
    fn language_vocabulary_is_enforced() {
        assert!(Language::new("en").is_ok());
        assert!(Language::new("zh_cn").is_ok());
        assert_eq!(Language::new("english"), Err(AppError::InvalidLanguage));
    }

    #[test]
    fn summary_masks_secrets() {
        let mut cfg = metric();
        cfg.wifi.password = text("password", "hunter22").unwrap();
        cfg.api_key = text("api_key", "0123456789abcdef").unwrap();
        let summary = std::format!("{cfg}");
        assert!(!summary.contains("hunter22"));
        assert!(!summary.contains("0123456789abcdef"));
        assert!(summary.contains("password 8 chars"));
        assert!(summary.contains("api key: set"));
        assert!(summary.contains("units: metric lang: en"));
    }
}
