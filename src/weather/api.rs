use core::fmt::Write as _;

use heapless::String;

use crate::{
    config::{ConfigurationSet, PLACEHOLDER_API_KEY},
    error::AppError,
    weather::http::{build_get_request, url_encode_component},
};

const ONECALL_PATH: &str = "/data/3.0/onecall";
const EXCLUDE_FIELDS: &str = "minutely,alerts";
const HEADERS_STR: &str = "Accept: application/json";
pub const OPENWEATHER_URL: &str = "api.openweathermap.org";

pub const QUERY_LEN: usize = 128;
pub const TARGET_LEN: usize = 256;
pub const REQUEST_LEN: usize = 512;

/// Parse a decimal-degree coordinate and check it lies within `limit`.
fn parse_coordinate(field: &'static str, value: &str, limit: f64) -> Result<f64, AppError> {
    let degrees: f64 = value.trim().parse().map_err(|_| {
        log::error!("Cannot parse {} {:?}", field, value);
        AppError::InvalidCoordinate(field)
    })?;
    if !(-limit..=limit).contains(&degrees) {
        log::error!("{} {} is outside +-{}", field, degrees, limit);
        return Err(AppError::InvalidCoordinate(field));
    }
    Ok(degrees)
}

/// Parse the configured location into `(latitude, longitude)`.
pub fn coordinates(config: &ConfigurationSet) -> Result<(f64, f64), AppError> {
    Ok((
        parse_coordinate("latitude", &config.location.latitude, 90.0)?,
        parse_coordinate("longitude", &config.location.longitude, 180.0)?,
    ))
}

/// Build the `units`, `lang`, `lat` and `lon` query parameters.
///
/// Coordinates are validated but emitted exactly as configured so the
/// requested precision is preserved.
pub fn build_query_params(config: &ConfigurationSet) -> Result<String<QUERY_LEN>, AppError> {
    coordinates(config)?;

    let lang_enc: String<16> = url_encode_component(config.language.as_str())?;
    let lat_enc: String<32> = url_encode_component(config.location.latitude.trim())?;
    let lon_enc: String<32> = url_encode_component(config.location.longitude.trim())?;

    let mut query: String<QUERY_LEN> = String::new();
    write!(
        query,
        "units={}&lang={}&lat={}&lon={}",
        config.units.as_str(),
        lang_enc,
        lat_enc,
        lon_enc
    )
    .map_err(|_| AppError::HttpRequestFailed)?;
    Ok(query)
}

/// Build the One Call request target (path and query, including the API key).
pub fn build_onecall_target(config: &ConfigurationSet) -> Result<String<TARGET_LEN>, AppError> {
    if config.api_key.is_empty() {
        log::error!("No OpenWeather API key configured");
        return Err(AppError::MissingApiKey);
    }
    if config.api_key == PLACEHOLDER_API_KEY {
        log::warn!("OpenWeather API key is still the placeholder, expect an authorization failure");
    }

    let params = build_query_params(config)?;
    let key_enc: String<128> = url_encode_component(&config.api_key)?;

    let mut target: String<TARGET_LEN> = String::new();
    write!(
        target,
        "{}?{}&exclude={}&appid={}",
        ONECALL_PATH, params, EXCLUDE_FIELDS, key_enc
    )
    .map_err(|_| AppError::HttpRequestFailed)?;
    log::debug!("OpenWeather target {}?{}&appid=...", ONECALL_PATH, params);
    Ok(target)
}

/// Build the complete HTTP request for the configured location.
pub fn build_onecall_request(config: &ConfigurationSet) -> Result<String<REQUEST_LEN>, AppError> {
    let target = build_onecall_target(config)?;
    build_get_request(&target, OPENWEATHER_URL, Some(HEADERS_STR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Language, Units, text};
    use crate::profile::Profile;

    fn imperial() -> ConfigurationSet {
        let mut cfg = ConfigurationSet::from_profile(Profile::Imperial).unwrap();
        cfg.location.latitude = text("latitude", "18.512989").unwrap();
        cfg.location.longitude = text("longitude", "120.737259").unwrap();
        cfg.language = Language::new("en").unwrap();
        cfg.api_key = text("api_key", "abc123").unwrap();
        cfg
    }

    #[test]
    fn query_params_follow_configuration() {
        let cfg = imperial();
        assert_eq!(cfg.units, Units::Imperial);
        let query = build_query_params(&cfg).unwrap();
        assert_eq!(
            query.as_str(),
            "units=imperial&lang=en&lat=18.512989&lon=120.737259"
        );
    }

    #[test]
    fn target_appends_exclusions_and_key() {
        let target = build_onecall_target(&imperial()).unwrap();
        assert_eq!(
            target.as_str(),
            "/data/3.0/onecall?units=imperial&lang=en&lat=18.512989&lon=120.737259\
             &exclude=minutely,alerts&appid=abc123"
        );
    }

    #[test]
    fn request_targets_openweather_host() {
        let req = build_onecall_request(&imperial()).unwrap();
        assert!(req.starts_with("GET /data/3.0/onecall?units=imperial"));
        assert!(req.contains("\r\nHost: api.openweathermap.org\r\n"));
        assert!(req.ends_with("\r\n\r\n"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let mut cfg = imperial();
        cfg.api_key.clear();
        assert_eq!(build_onecall_target(&cfg), Err(AppError::MissingApiKey));
    }

    #[test]
    fn placeholder_api_key_still_builds() {
        let mut cfg = imperial();
        cfg.api_key = text("api_key", PLACEHOLDER_API_KEY).unwrap();
        assert!(build_onecall_target(&cfg).unwrap().ends_with("appid=Your_free_key"));
    }

    #[test]
    fn malformed_coordinates_are_invalid_configuration() {
        let mut cfg = imperial();
        cfg.location.latitude = text("latitude", "north").unwrap();
        assert_eq!(
            build_query_params(&cfg),
            Err(AppError::InvalidCoordinate("latitude"))
        );

        let mut cfg = imperial();
        cfg.location.longitude = text("longitude", "-180.5").unwrap();
        assert_eq!(
            build_query_params(&cfg),
            Err(AppError::InvalidCoordinate("longitude"))
        );
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        let mut cfg = imperial();
        cfg.location.latitude = text("latitude", "-90").unwrap();
        cfg.location.longitude = text("longitude", "180.0").unwrap();
        assert_eq!(coordinates(&cfg), Ok((-90.0, 180.0)));
    }
}
