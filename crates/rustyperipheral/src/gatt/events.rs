//! Events raised to the application

use super::pending::RequestToken;
use crate::radio::PowerState;
use crate::uuid::Uuid;
use std::sync::Arc;

pub const READ_REQUEST: &str = "BlePeripheral:ReadRequest";
pub const WRITE_REQUEST: &str = "BlePeripheral:WriteRequest";
pub const STATE_CHANGED: &str = "BlePeripheral:StateChanged";
pub const SUBSCRIBED: &str = "BlePeripheral:Subscribed";
pub const UNSUBSCRIBED: &str = "BlePeripheral:Unsubscribed";

/// Callback receiving every event the peripheral raises
pub type EventCallback = Arc<dyn Fn(PeripheralEvent) + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralEvent {
    /// A central asked to read a characteristic
    ReadRequest {
        /// Token to pass to `respond`
        request_id: RequestToken,
        offset: u16,
        characteristic_uuid: Uuid,
        service_uuid: Uuid,
    },
    /// A central wrote a characteristic; the value is already stored
    WriteRequest {
        /// Token to pass to `respond`
        request_id: RequestToken,
        offset: u16,
        /// Written bytes, base64 encoded
        value: String,
        characteristic_uuid: Uuid,
        service_uuid: Uuid,
    },
    /// Reserved for adapter state notifications
    StateChanged { state: PowerState },
    /// Reserved for notification subscriptions
    Subscribed {
        characteristic_uuid: Uuid,
        service_uuid: Uuid,
    },
    /// Reserved for notification subscriptions
    Unsubscribed {
        characteristic_uuid: Uuid,
        service_uuid: Uuid,
    },
}

impl PeripheralEvent {
    /// Name the host subscribes to
    pub fn name(&self) -> &'static str {
        match self {
            PeripheralEvent::ReadRequest { .. } => READ_REQUEST,
            PeripheralEvent::WriteRequest { .. } => WRITE_REQUEST,
            PeripheralEvent::StateChanged { .. } => STATE_CHANGED,
            PeripheralEvent::Subscribed { .. } => SUBSCRIBED,
            PeripheralEvent::Unsubscribed { .. } => UNSUBSCRIBED,
        }
    }

    /// Token carried by read/write events
    pub fn request_id(&self) -> Option<&RequestToken> {
        match self {
            PeripheralEvent::ReadRequest { request_id, .. }
            | PeripheralEvent::WriteRequest { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}
