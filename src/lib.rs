#![cfg_attr(not(test), no_std)]

pub mod backlight;
pub mod config;
pub mod error;
pub mod forecast;
pub mod profile;
pub mod time;
pub mod weather;
