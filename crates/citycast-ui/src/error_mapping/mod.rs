//! Maps weather and storage errors to citycast_core::AppError for consistent
//! user-facing messages. Each source has its own module to keep mappings small.
//!
//! Plain functions rather than `From` impls: neither side of the conversion
//! is defined in this crate.

mod storage;
mod weather;

pub use storage::storage_error;
pub use weather::weather_error;
