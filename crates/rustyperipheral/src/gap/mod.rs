//! GAP (Generic Access Profile): advertising
//!
//! Advertising parameters, payload encoding and the start/stop lifecycle.

pub mod advertiser;
pub mod constants;
pub mod types;

pub use advertiser::{AdvertiseStarted, Advertiser, AdvertisingPhase, PendingStart};
pub use constants::*;
pub use types::*;
