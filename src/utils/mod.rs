//! Utility functions for short codes, URL checks, and request handling.
//!
//! - [`short_code`] - Code alphabet, secure generation, format validation, base-62 codec
//! - [`url_validator`] - Long URL validation
//! - [`client_ip`] - Client identity from socket address and proxy headers

pub mod client_ip;
pub mod short_code;
pub mod url_validator;
