//! Platform collaborators
//!
//! The core never talks to hardware directly. A platform binding implements
//! [`Radio`] (and optionally [`EnablePrompt`]) and feeds the radio's callbacks
//! back into [`crate::Peripheral`].

use crate::error::PeripheralResult;
use crate::gap::{AdvertiseData, AdvertiseSettings, BdAddr};
use crate::gatt::{GattStatus, Service};

// Adapter state codes reported by the platform
pub const ADAPTER_STATE_OFF: i32 = 10;
pub const ADAPTER_STATE_TURNING_ON: i32 = 11;
pub const ADAPTER_STATE_ON: i32 = 12;
pub const ADAPTER_STATE_TURNING_OFF: i32 = 13;

// Connection state codes reported by the platform
pub const STATE_DISCONNECTED: i32 = 0;
pub const STATE_CONNECTING: i32 = 1;
pub const STATE_CONNECTED: i32 = 2;
pub const STATE_DISCONNECTING: i32 = 3;

/// Status value the platform uses for a successful callback
pub const GATT_SUCCESS: i32 = 0;

/// Power state of the local adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Off,
    TurningOn,
    On,
    TurningOff,
}

impl AdapterState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            ADAPTER_STATE_OFF => Some(AdapterState::Off),
            ADAPTER_STATE_TURNING_ON => Some(AdapterState::TurningOn),
            ADAPTER_STATE_ON => Some(AdapterState::On),
            ADAPTER_STATE_TURNING_OFF => Some(AdapterState::TurningOff),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self == AdapterState::On
    }
}

/// Coarse adapter state reported to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Unknown,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::PoweredOn => "poweredOn",
            PowerState::PoweredOff => "poweredOff",
            PowerState::Unknown => "unknown",
        }
    }
}

impl From<Option<AdapterState>> for PowerState {
    fn from(state: Option<AdapterState>) -> Self {
        match state {
            Some(AdapterState::On) => PowerState::PoweredOn,
            Some(AdapterState::Off)
            | Some(AdapterState::TurningOn)
            | Some(AdapterState::TurningOff) => PowerState::PoweredOff,
            None => PowerState::Unknown,
        }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link state delivered with a connection callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            STATE_DISCONNECTED => Some(ConnectionState::Disconnected),
            STATE_CONNECTING => Some(ConnectionState::Connecting),
            STATE_CONNECTED => Some(ConnectionState::Connected),
            STATE_DISCONNECTING => Some(ConnectionState::Disconnecting),
            _ => None,
        }
    }
}

/// The platform BLE stack as seen by the core.
///
/// Outcomes of `start_advertising` are reported asynchronously through
/// [`crate::Peripheral::on_advertise_start_success`] and
/// [`crate::Peripheral::on_advertise_start_failure`]; an `Err` from the call
/// itself means the request never reached the radio.
pub trait Radio: Send + Sync {
    /// Current adapter state, or `None` when the device has no BLE adapter
    fn adapter_state(&self) -> Option<AdapterState>;

    /// Set the name the adapter advertises
    fn set_name(&self, name: &str) -> PeripheralResult<()>;

    /// Open the GATT server and publish the given services
    fn open_gatt_server(&self, services: &[Service]) -> PeripheralResult<()>;

    fn close_gatt_server(&self);

    fn start_advertising(
        &self,
        settings: &AdvertiseSettings,
        data: &AdvertiseData,
    ) -> PeripheralResult<()>;

    fn stop_advertising(&self) -> PeripheralResult<()>;

    /// Answer an outstanding read or write request
    fn send_response(
        &self,
        device: &BdAddr,
        request_id: i32,
        status: GattStatus,
        offset: u16,
        value: &[u8],
    ) -> PeripheralResult<()>;
}

/// Out-of-band flow asking the user to switch the radio on
pub trait EnablePrompt: Send + Sync {
    fn request_enable(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_codes() {
        assert_eq!(AdapterState::from_code(ADAPTER_STATE_ON), Some(AdapterState::On));
        assert_eq!(
            AdapterState::from_code(ADAPTER_STATE_TURNING_OFF),
            Some(AdapterState::TurningOff)
        );
        assert_eq!(AdapterState::from_code(99), None);

        assert_eq!(
            PowerState::from(AdapterState::from_code(ADAPTER_STATE_ON)),
            PowerState::PoweredOn
        );
        assert_eq!(
            PowerState::from(AdapterState::from_code(ADAPTER_STATE_TURNING_ON)),
            PowerState::PoweredOff
        );
        assert_eq!(PowerState::from(AdapterState::from_code(-1)), PowerState::Unknown);
    }

    #[test]
    fn test_connection_codes() {
        assert_eq!(
            ConnectionState::from_code(STATE_CONNECTED),
            Some(ConnectionState::Connected)
        );
        assert_eq!(
            ConnectionState::from_code(STATE_DISCONNECTED),
            Some(ConnectionState::Disconnected)
        );
        assert_eq!(
            ConnectionState::from_code(STATE_DISCONNECTING),
            Some(ConnectionState::Disconnecting)
        );
        assert_eq!(ConnectionState::from_code(7), None);
    }
}
