//! Peripheral configuration

use crate::gap::AdvertiseSettings;
use std::time::Duration;

/// How long the application has to answer a request before the session
/// replies on its behalf. Kept below the 30 s ATT transaction timeout, after
/// which the central drops the link.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_ADVERTISE_TIMEOUT: Duration = Duration::from_secs(10);

/// Which status goes back to the radio when the application responds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyStatusPolicy {
    /// Send the status the application passed to `respond`
    #[default]
    Forward,
    /// Always reply success, whatever the application passed
    AlwaysSuccess,
}

#[derive(Debug, Clone)]
pub struct PeripheralConfig {
    pub request_timeout: Duration,
    /// Upper bound on waiting for the radio's advertise outcome
    pub advertise_timeout: Duration,
    pub advertise_settings: AdvertiseSettings,
    /// Include the adapter name in the advertisement payload
    pub include_device_name: bool,
    pub reply_status: ReplyStatusPolicy,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            advertise_timeout: DEFAULT_ADVERTISE_TIMEOUT,
            advertise_settings: AdvertiseSettings::default(),
            include_device_name: true,
            reply_status: ReplyStatusPolicy::Forward,
        }
    }
}

impl PeripheralConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_advertise_timeout(mut self, timeout: Duration) -> Self {
        self.advertise_timeout = timeout;
        self
    }

    pub fn with_advertise_settings(mut self, settings: AdvertiseSettings) -> Self {
        self.advertise_settings = settings;
        self
    }

    pub fn with_device_name(mut self, include: bool) -> Self {
        self.include_device_name = include;
        self
    }

    pub fn with_reply_status(mut self, policy: ReplyStatusPolicy) -> Self {
        self.reply_status = policy;
        self
    }
}
