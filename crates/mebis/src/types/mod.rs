//! Validated configuration types.

mod platform_url;

pub use platform_url::{PLATFORM_URL_ENV, PlatformUrl};
