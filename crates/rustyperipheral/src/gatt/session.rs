//! GATT session
//!
//! The server instance bound to the radio. Radio callbacks file pending
//! requests and raise events; the application answers by token through
//! [`GattSession::respond`], possibly from another thread.
//!
//! Each table sits behind its own lock. When two are needed the registry is
//! taken before the pending table, and no lock is held while calling the
//! radio or the event callback.

use super::connections::ConnectionSet;
use super::events::{EventCallback, PeripheralEvent};
use super::pending::{NewRequest, PendingRequest, PendingRequestTable, RequestKind, RequestToken};
use super::registry::AttributeRegistry;
use super::status::GattStatus;
use super::types::{Service, ServiceDeclaration};
use crate::config::{PeripheralConfig, ReplyStatusPolicy};
use crate::error::{PeripheralError, PeripheralResult};
use crate::gap::BdAddr;
use crate::radio::{ConnectionState, Radio, GATT_SUCCESS};
use crate::uuid::Uuid;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use log::{debug, error, info, trace, warn};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

pub struct GattSession {
    radio: Arc<dyn Radio>,
    registry: RwLock<AttributeRegistry>,
    connections: RwLock<ConnectionSet>,
    pending: Mutex<PendingRequestTable>,
    event_callback: Mutex<Option<EventCallback>>,
    reply_status: RwLock<ReplyStatusPolicy>,
}

impl GattSession {
    pub fn new(radio: Arc<dyn Radio>, config: &PeripheralConfig) -> Self {
        Self {
            radio,
            registry: RwLock::new(AttributeRegistry::new()),
            connections: RwLock::new(ConnectionSet::new()),
            pending: Mutex::new(PendingRequestTable::new(config.request_timeout)),
            event_callback: Mutex::new(None),
            reply_status: RwLock::new(config.reply_status),
        }
    }

    /// Apply the request timeout and reply policy from `config`
    pub fn apply_config(&self, config: &PeripheralConfig) {
        self.pending.lock().unwrap().set_timeout(config.request_timeout);
        *self.reply_status.write().unwrap() = config.reply_status;
    }

    pub fn set_event_callback<F>(&self, callback: F)
    where
        F: Fn(PeripheralEvent) + Send + Sync + 'static,
    {
        let mut event_callback = self.event_callback.lock().unwrap();
        *event_callback = Some(Arc::new(callback));
    }

    fn emit(&self, event: PeripheralEvent) {
        let callback = self.event_callback.lock().unwrap().clone();
        match callback {
            Some(callback) => callback(event),
            None => debug!("No listener for {}", event.name()),
        }
    }

    // --- Attribute registry ---

    /// Register a service; see [`AttributeRegistry::declare_service`]
    pub fn declare_service(&self, declaration: &ServiceDeclaration) -> PeripheralResult<bool> {
        self.registry.write().unwrap().declare_service(declaration)
    }

    pub fn service(&self, uuid: &Uuid) -> Option<Service> {
        self.registry.read().unwrap().lookup(uuid).cloned()
    }

    pub fn services(&self) -> Vec<Service> {
        self.registry.read().unwrap().services().to_vec()
    }

    pub fn characteristic_value(&self, service: &Uuid, characteristic: &Uuid) -> Option<Vec<u8>> {
        self.registry
            .read()
            .unwrap()
            .characteristic(service, characteristic)
            .map(|c| c.value.clone())
    }

    pub(crate) fn freeze_registry(&self) -> Vec<Service> {
        self.registry.write().unwrap().freeze()
    }

    pub(crate) fn unfreeze_registry(&self) {
        self.registry.write().unwrap().unfreeze();
    }

    /// Forget all connections and drop outstanding requests without replying.
    /// Used when the GATT server is (re)opened or closed.
    pub(crate) fn reset(&self) {
        self.connections.write().unwrap().clear();
        let dropped = self.pending.lock().unwrap().drain();
        if !dropped.is_empty() {
            warn!("Dropped {} unanswered request(s) on session reset", dropped.len());
        }
    }

    // --- Radio callbacks ---

    pub fn on_connection_state_change(&self, device: BdAddr, status: i32, new_state: ConnectionState) {
        if status != GATT_SUCCESS {
            debug!("Connection callback for {} failed with status {}", device, status);
            self.drop_connection(&device);
            return;
        }

        match new_state {
            ConnectionState::Connected => {
                if self.connections.write().unwrap().add(device) {
                    info!("Central {} connected", device);
                }
            }
            ConnectionState::Disconnected => self.drop_connection(&device),
            other => trace!("Central {} is {:?}", device, other),
        }
    }

    fn drop_connection(&self, device: &BdAddr) {
        if self.connections.write().unwrap().remove(device) {
            info!("Central {} disconnected", device);
        }

        let orphaned = self.pending.lock().unwrap().take_for_device(device);
        if !orphaned.is_empty() {
            warn!(
                "Dropped {} unanswered request(s) from disconnected central {}",
                orphaned.len(),
                device
            );
        }
    }

    pub fn on_characteristic_read_request(
        &self,
        device: BdAddr,
        request_id: i32,
        offset: u16,
        service: Uuid,
        characteristic: Uuid,
    ) {
        self.process_timeouts();

        let current = self.characteristic_value(&service, &characteristic);
        let Some(value) = current else {
            self.reject_unknown_characteristic(device, request_id, offset, &service, &characteristic);
            return;
        };

        let token = self.pending.lock().unwrap().insert(NewRequest {
            kind: RequestKind::Read,
            device,
            request_id,
            offset,
            value,
            service,
            characteristic,
        });
        debug!("Read request {} on {:?} from {}", token, characteristic, device);

        self.emit(PeripheralEvent::ReadRequest {
            request_id: token,
            offset,
            characteristic_uuid: characteristic,
            service_uuid: service,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn on_characteristic_write_request(
        &self,
        device: BdAddr,
        request_id: i32,
        service: Uuid,
        characteristic: Uuid,
        prepared_write: bool,
        response_needed: bool,
        offset: u16,
        value: &[u8],
    ) {
        self.process_timeouts();

        // The stored value reflects the write before the application answers.
        let stored = self
            .registry
            .write()
            .unwrap()
            .write_value(&service, &characteristic, value);
        if !stored {
            self.reject_unknown_characteristic(device, request_id, offset, &service, &characteristic);
            return;
        }

        let token = self.pending.lock().unwrap().insert(NewRequest {
            kind: RequestKind::Write,
            device,
            request_id,
            offset,
            value: value.to_vec(),
            service,
            characteristic,
        });
        debug!(
            "Write request {} on {:?} from {} ({} bytes, prepared={}, response_needed={})",
            token,
            characteristic,
            device,
            value.len(),
            prepared_write,
            response_needed
        );

        self.emit(PeripheralEvent::WriteRequest {
            request_id: token,
            offset,
            value: BASE64_STANDARD.encode(value),
            characteristic_uuid: characteristic,
            service_uuid: service,
        });
    }

    pub fn on_notification_sent(&self, device: BdAddr, status: i32) {
        trace!("Notification sent to {} with status {}", device, status);
    }

    fn reject_unknown_characteristic(
        &self,
        device: BdAddr,
        request_id: i32,
        offset: u16,
        service: &Uuid,
        characteristic: &Uuid,
    ) {
        warn!(
            "Request {} from {} targets unregistered characteristic {:?} in {:?}",
            request_id, device, characteristic, service
        );
        if let Err(e) =
            self.radio
                .send_response(&device, request_id, GattStatus::AttributeNotFound, offset, &[])
        {
            error!("Failed to reject request {}: {}", request_id, e);
        }
    }

    // --- Application responses ---

    /// Answer a pending request by token.
    ///
    /// `status` is a symbolic name from [`super::status::STATUS_TABLE`]. When
    /// `value_base64` is absent the value captured with the request is sent.
    pub fn respond(
        &self,
        token: &str,
        status: &str,
        value_base64: Option<&str>,
    ) -> PeripheralResult<()> {
        let status: GattStatus = status.parse()?;
        let value = value_base64.map(decode_value).transpose()?;
        self.respond_with(token, status, value)
    }

    /// Typed form of [`GattSession::respond`]
    pub fn respond_with(
        &self,
        token: &str,
        status: GattStatus,
        value: Option<Vec<u8>>,
    ) -> PeripheralResult<()> {
        let request = self
            .pending
            .lock()
            .unwrap()
            .take(token)
            .ok_or_else(|| PeripheralError::UnknownRequest(token.to_string()))?;

        let status = match *self.reply_status.read().unwrap() {
            ReplyStatusPolicy::Forward => status,
            ReplyStatusPolicy::AlwaysSuccess => GattStatus::Success,
        };
        let value = value.unwrap_or_else(|| request.value.clone());

        if status.is_success() {
            trace!("Answering {} ({} bytes)", token, value.len());
        } else {
            debug!("Answering {} with error status {}", token, status);
        }
        self.radio
            .send_response(&request.device, request.request_id, status, request.offset, &value)
    }

    /// Evict requests whose deadline has passed, answering each with
    /// `insufficientResources`. Returns how many were evicted.
    pub fn process_timeouts(&self) -> usize {
        let expired = self.pending.lock().unwrap().take_expired(Instant::now());

        for request in &expired {
            warn!(
                "No response for {:?} request {} from {} in time, replying insufficientResources",
                request.kind, request.token, request.device
            );
            self.reply_expired(request);
        }

        expired.len()
    }

    fn reply_expired(&self, request: &PendingRequest) {
        if let Err(e) = self.radio.send_response(
            &request.device,
            request.request_id,
            GattStatus::InsufficientResources,
            request.offset,
            &[],
        ) {
            error!("Failed to answer expired request {}: {}", request.token, e);
        }
    }

    // --- Introspection ---

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn is_pending(&self, token: &RequestToken) -> bool {
        self.pending.lock().unwrap().contains(token.as_str())
    }

    pub fn connected_devices(&self) -> Vec<BdAddr> {
        self.connections.read().unwrap().devices()
    }

    pub fn is_connected(&self, device: &BdAddr) -> bool {
        self.connections.read().unwrap().contains(device)
    }
}

/// Decode a base64 value from the bridge, tolerating line breaks
fn decode_value(text: &str) -> PeripheralResult<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(BASE64_STANDARD.decode(cleaned)?)
}
