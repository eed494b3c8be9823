//! Common types for GATT declarations
//!
//! This module defines the property/permission masks and the declaration and
//! snapshot types exchanged between the application, the registry and the radio.

use crate::uuid::Uuid;
use bitflags::bitflags;

bitflags! {
    /// Characteristic properties as defined in the Bluetooth specification
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharacteristicProperties: u8 {
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        const EXTENDED_PROPERTIES = 0x80;
    }
}

bitflags! {
    /// Access permissions on a characteristic value
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributePermissions: u16 {
        const READ = 0x0001;
        const WRITE = 0x0002;
        const READ_ENCRYPTED = 0x0004;
        const WRITE_ENCRYPTED = 0x0008;
        const READ_AUTHENTICATED = 0x0010;
        const WRITE_AUTHENTICATED = 0x0020;
        const READ_AUTHORIZED = 0x0040;
        const WRITE_AUTHORIZED = 0x0080;
    }
}

impl CharacteristicProperties {
    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(&self) -> bool {
        self.contains(Self::WRITE)
    }
}

/// Property/permission profile given to characteristics declared without one.
pub const DEFAULT_CHARACTERISTIC_PROFILE: (CharacteristicProperties, AttributePermissions) =
    (CharacteristicProperties::WRITE, AttributePermissions::WRITE);

/// One characteristic entry of a service declaration, as supplied by the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacteristicDeclaration {
    pub uuid: Option<String>,
    pub properties: Option<CharacteristicProperties>,
    pub permissions: Option<AttributePermissions>,
}

impl CharacteristicDeclaration {
    /// A characteristic with the default (write-only) profile
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            properties: None,
            permissions: None,
        }
    }

    pub fn with_properties(mut self, properties: CharacteristicProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_permissions(mut self, permissions: AttributePermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// A service declaration as supplied by the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDeclaration {
    pub uuid: String,
    pub characteristics: Vec<CharacteristicDeclaration>,
}

impl ServiceDeclaration {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            characteristics: Vec::new(),
        }
    }

    pub fn characteristic(mut self, characteristic: CharacteristicDeclaration) -> Self {
        self.characteristics.push(characteristic);
        self
    }
}

/// A registered characteristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Characteristic {
    pub uuid: Uuid,
    pub properties: CharacteristicProperties,
    pub permissions: AttributePermissions,
    /// Current value
    pub value: Vec<u8>,
}

/// A registered primary service with its characteristics in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub uuid: Uuid,
    pub characteristics: Vec<Characteristic>,
}

impl Service {
    pub fn characteristic(&self, uuid: &Uuid) -> Option<&Characteristic> {
        self.characteristics.iter().find(|c| c.uuid == *uuid)
    }

    pub(crate) fn characteristic_mut(&mut self, uuid: &Uuid) -> Option<&mut Characteristic> {
        self.characteristics.iter_mut().find(|c| c.uuid == *uuid)
    }
}
