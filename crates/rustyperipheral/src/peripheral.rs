//! Application-facing peripheral
//!
//! [`Peripheral`] is what a host bridge talks to. It owns the GATT session
//! and the advertiser for one radio, and exposes the radio's callbacks as
//! plain methods for the platform binding to call from its own thread.

use crate::config::PeripheralConfig;
use crate::error::{PeripheralError, PeripheralResult};
use crate::gap::{
    AdvertiseData, AdvertiseSettings, AdvertiseStarted, Advertiser, AdvertisingPhase, BdAddr,
    ADV_MAX_LEGACY_PAYLOAD,
};
use crate::gatt::{
    GattSession, GattStatus, PeripheralEvent, RequestToken, Service, ServiceDeclaration,
};
use crate::radio::{ConnectionState, EnablePrompt, PowerState, Radio};
use crate::uuid::Uuid;
use log::{debug, error, info, warn};
use std::sync::{Arc, RwLock};

pub struct Peripheral {
    radio: Arc<dyn Radio>,
    enable_prompt: Option<Arc<dyn EnablePrompt>>,
    session: GattSession,
    advertiser: Advertiser,
    config: RwLock<PeripheralConfig>,
}

impl Peripheral {
    pub fn new(radio: Arc<dyn Radio>, config: PeripheralConfig) -> Self {
        Self {
            session: GattSession::new(radio.clone(), &config),
            radio,
            enable_prompt: None,
            advertiser: Advertiser::new(),
            config: RwLock::new(config),
        }
    }

    /// Flow to run when `get_state` finds the adapter switched off
    pub fn with_enable_prompt(mut self, prompt: Arc<dyn EnablePrompt>) -> Self {
        self.enable_prompt = Some(prompt);
        self
    }

    pub fn config(&self) -> PeripheralConfig {
        self.config.read().unwrap().clone()
    }

    /// Replace the configuration. Advertising settings apply from the next
    /// start, the request timeout to requests filed from now on.
    pub fn set_config(&self, config: PeripheralConfig) {
        self.session.apply_config(&config);
        *self.config.write().unwrap() = config;
    }

    pub fn set_event_callback<F>(&self, callback: F)
    where
        F: Fn(PeripheralEvent) + Send + Sync + 'static,
    {
        self.session.set_event_callback(callback);
    }

    pub fn session(&self) -> &GattSession {
        &self.session
    }

    /// Report the adapter's power state.
    ///
    /// A present but disabled adapter triggers the enable prompt; the call
    /// still returns `PoweredOff` straight away.
    pub fn get_state(&self) -> PowerState {
        let adapter = self.radio.adapter_state();
        info!("Bluetooth Adapter state: {:?}", adapter);

        if let Some(state) = adapter {
            if !state.is_enabled() {
                match &self.enable_prompt {
                    Some(prompt) => {
                        debug!("Adapter is {:?}, asking the user to enable it", state);
                        prompt.request_enable();
                    }
                    None => debug!("Adapter is {:?} and no enable prompt is set", state),
                }
            }
        }

        PowerState::from(adapter)
    }

    /// Declare a service for the next advertisement
    pub fn add_service(&self, declaration: &ServiceDeclaration) -> PeripheralResult<()> {
        self.session.declare_service(declaration).map(|_| ())
    }

    /// Publish the registered services and start advertising under `name`.
    ///
    /// Blocks until the radio reports the outcome or the configured
    /// advertise timeout passes.
    pub fn start_advertising(&self, name: &str) -> PeripheralResult<AdvertiseStarted> {
        let pending = self.advertiser.begin()?;
        let attempt = pending.attempt();
        let config = self.config();
        let services = self.session.freeze_registry();

        let mut server_open = false;
        let outcome = self
            .launch(name, &services, &config, &mut server_open)
            .and_then(|_| pending.wait(config.advertise_timeout));

        match outcome {
            Ok(settings) => Ok(AdvertiseStarted {
                name: name.to_string(),
                settings,
            }),
            Err(e) => {
                self.abort_start(attempt, &e, server_open);
                Err(e)
            }
        }
    }

    fn launch(
        &self,
        name: &str,
        services: &[Service],
        config: &PeripheralConfig,
        server_open: &mut bool,
    ) -> PeripheralResult<()> {
        self.radio.set_name(name)?;

        self.session.reset();
        self.radio.open_gatt_server(services)?;
        *server_open = true;

        let data = AdvertiseData {
            include_device_name: config.include_device_name,
            service_uuids: services.iter().map(|s| s.uuid).collect(),
        };
        match data.encode(name) {
            Ok(payload) if payload.len() > ADV_MAX_LEGACY_PAYLOAD => warn!(
                "Advertisement for {:?} with {} service(s) is {} bytes, over the legacy payload",
                name,
                data.service_uuids.len(),
                payload.len()
            ),
            Ok(_) => {}
            Err(e) => warn!("Advertisement for {:?} cannot be encoded: {}", name, e),
        }

        let settings = &config.advertise_settings;
        debug!(
            "Requesting advertising with {:?} (interval {} x 0.625 ms, {} dBm)",
            settings,
            settings.mode.interval(),
            settings.tx_power.dbm()
        );
        self.radio.start_advertising(settings, &data)
    }

    fn abort_start(&self, attempt: u64, cause: &PeripheralError, server_open: bool) {
        warn!("Advertising start failed: {}", cause);
        // A stop or a newer start owns the radio and the session now
        if !self.advertiser.abandon(attempt) {
            return;
        }

        if *cause == PeripheralError::AdvertiseTimeout {
            if let Err(e) = self.radio.stop_advertising() {
                error!("Failed to stop abandoned advertisement: {}", e);
            }
        }
        if server_open {
            self.radio.close_gatt_server();
        }
        self.session.reset();
        self.session.unfreeze_registry();
        self.advertiser.finish_stop();
    }

    /// Stop advertising and close the GATT server. No-op when idle.
    pub fn stop_advertising(&self) -> PeripheralResult<()> {
        if !self.advertiser.stop() {
            debug!("Stop requested while not advertising");
            return Ok(());
        }

        let stopped = self.radio.stop_advertising();
        self.radio.close_gatt_server();
        self.session.reset();
        self.session.unfreeze_registry();
        self.advertiser.finish_stop();
        info!("Advertising stopped");
        stopped
    }

    pub fn advertising_phase(&self) -> AdvertisingPhase {
        self.advertiser.phase()
    }

    pub fn is_advertising(&self) -> bool {
        self.advertiser.phase() == AdvertisingPhase::Advertising
    }

    // --- Responses ---

    /// Answer a pending request; see [`GattSession::respond`]
    pub fn respond(
        &self,
        token: &str,
        status: &str,
        value_base64: Option<&str>,
    ) -> PeripheralResult<()> {
        self.session.respond(token, status, value_base64)
    }

    pub fn respond_with(
        &self,
        token: &str,
        status: GattStatus,
        value: Option<Vec<u8>>,
    ) -> PeripheralResult<()> {
        self.session.respond_with(token, status, value)
    }

    pub fn process_timeouts(&self) -> usize {
        self.session.process_timeouts()
    }

    // --- Introspection ---

    pub fn services(&self) -> Vec<Service> {
        self.session.services()
    }

    pub fn characteristic_value(&self, service: &Uuid, characteristic: &Uuid) -> Option<Vec<u8>> {
        self.session.characteristic_value(service, characteristic)
    }

    pub fn pending_count(&self) -> usize {
        self.session.pending_count()
    }

    pub fn is_pending(&self, token: &RequestToken) -> bool {
        self.session.is_pending(token)
    }

    pub fn connected_devices(&self) -> Vec<BdAddr> {
        self.session.connected_devices()
    }

    pub fn is_connected(&self, device: &BdAddr) -> bool {
        self.session.is_connected(device)
    }

    // --- Radio callbacks ---

    pub fn on_connection_state_change(&self, device: BdAddr, status: i32, new_state: ConnectionState) {
        self.session.on_connection_state_change(device, status, new_state);
    }

    pub fn on_characteristic_read_request(
        &self,
        device: BdAddr,
        request_id: i32,
        offset: u16,
        service: Uuid,
        characteristic: Uuid,
    ) {
        self.session
            .on_characteristic_read_request(device, request_id, offset, service, characteristic);
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
        self.session.on_characteristic_write_request(
            device,
            request_id,
            service,
            characteristic,
            prepared_write,
            response_needed,
            offset,
            value,
        );
    }

    pub fn on_notification_sent(&self, device: BdAddr, status: i32) {
        self.session.on_notification_sent(device, status);
    }

    pub fn on_advertise_start_success(&self, settings: AdvertiseSettings) {
        self.advertiser.on_start_success(settings);
    }

    pub fn on_advertise_start_failure(&self, code: i32) {
        self.advertiser.on_start_failure(code);
    }
}
