//! GATT (Generic Attribute Profile) server side
//!
//! This module holds the declared attribute tree, the requests waiting on the
//! application, and the session that ties them to the radio.

pub mod connections;
pub mod events;
pub mod pending;
pub mod registry;
pub mod session;
pub mod status;
pub mod types;


pub use connections::ConnectionSet;
pub use events::{EventCallback, PeripheralEvent};
pub use pending::{PendingRequest, PendingRequestTable, RequestKind, RequestToken};
pub use registry::AttributeRegistry;
pub use session::GattSession;
pub use status::GattStatus;
pub use types::{
    AttributePermissions, Characteristic, CharacteristicDeclaration, CharacteristicProperties,
    Service, ServiceDeclaration,
};
