//! OpenWeather request construction from the installed configuration.
//!
//! Sending the request and decoding the response belong to the network
//! client; this module only turns a [`crate::config::ConfigurationSet`] into
//! the request it should send.

pub mod api;
pub mod http;

pub use api::{build_onecall_request, build_onecall_target, build_query_params, coordinates};
