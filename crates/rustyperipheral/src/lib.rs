//! RustyPeripheral - A BLE GATT peripheral session
//!
//! This library lets an application declare GATT services, advertise them,
//! and answer remote reads and writes asynchronously. Every inbound request is
//! filed under an opaque token and raised as an event; the application answers
//! later with [`Peripheral::respond`], from any thread.
//!
//! The platform BLE stack is reached through the [`Radio`] trait, and the
//! platform binding forwards the stack's callbacks to the `on_*` methods of
//! [`Peripheral`].

pub mod config;
pub mod error;
pub mod gap;
pub mod gatt;
pub mod peripheral;
pub mod radio;
pub mod uuid;

// Re-export common types for convenience
pub use config::{PeripheralConfig, ReplyStatusPolicy};
pub use error::{PeripheralError, PeripheralResult};
pub use gap::{
    AdvertiseData, AdvertiseMode, AdvertiseSettings, AdvertiseStarted, AdvertisingPhase, BdAddr,
    TxPowerLevel,
};
pub use gatt::{
    CharacteristicDeclaration, GattStatus, PeripheralEvent, RequestToken, Service,
    ServiceDeclaration,
};
pub use peripheral::Peripheral;
pub use radio::{AdapterState, ConnectionState, EnablePrompt, PowerState, Radio};
pub use uuid::Uuid;
