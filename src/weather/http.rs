use core::fmt::Write as _;
use heapless::String;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::AppError;

const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    // common separators / punctuation / reserved characters:
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub fn url_encode_component<const N: usize>(component: &str) -> Result<String<N>, AppError> {
    let mut buf = String::new();
    write!(buf, "{}", utf8_percent_encode(component, QUERY_ENCODE_SET))
        .map_err(|_| AppError::HttpRequestFailed)?;
    Ok(buf)
}

/// Returns a heapless string containing a full HTTP/1.0 GET request.
pub fn build_get_request<const N: usize>(
    target: &str,
    host: &str,
    headers: Option<&str>,
) -> Result<String<N>, AppError> {
    let mut req: String<N> = String::new();
    write!(req, "GET {} HTTP/1.0\r\nHost: {}\r\n", target, host)
        .map_err(|_| AppError::HttpRequestFailed)?;

    if let Some(h) = headers {
        write!(req, "{}\r\n", h).map_err(|_| AppError::HttpRequestFailed)?;
    }

    write!(req, "\r\n").map_err(|_| AppError::HttpRequestFailed)?;

    Ok(req)
}
