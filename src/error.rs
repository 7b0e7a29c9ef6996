use thiserror::Error;

/// Unified application error type for configuration loading and the
/// collaborators that consume it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // Configuration errors
    #[error("value for `{0}` does not fit its buffer")]
    ValueTooLong(&'static str),
    #[error("invalid coordinate for `{0}`")]
    InvalidCoordinate(&'static str),
    #[error("unsupported language code")]
    InvalidLanguage,
    #[error("unknown configuration profile")]
    InvalidProfile,
    #[error("invalid PWM configuration")]
    InvalidPwmConfig,
    #[error("update interval must be greater than zero")]
    InvalidUpdateInterval,
    #[error("configuration already installed")]
    AlreadyInstalled,

    // Time errors
    #[error("timestamp out of range")]
    InvalidTimestamp,

    // Weather request errors
    #[error("OpenWeather API key is missing")]
    MissingApiKey,
    #[error("HTTP request failed")]
    HttpRequestFailed,

    // Serialization errors
    #[error("JSON serialize failed")]
    JsonSerializeFailed,
    #[error("JSON parse failed")]
    JsonParseFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write as _;
    use heapless::String;

    #[test]
    fn display_names_the_offending_field() {
        let mut msg: String<64> = String::new();
        write!(msg, "{}", AppError::InvalidCoordinate("latitude")).unwrap();
        assert_eq!(msg.as_str(), "invalid coordinate for `latitude`");
    }
}
