pub mod cached_source;
#[cfg(test)]
pub(crate) mod delayed_source;
pub mod error;
pub mod memory_source;
pub mod source;
pub mod weather_api;
