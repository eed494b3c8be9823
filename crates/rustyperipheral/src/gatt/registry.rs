//! Attribute registry
//!
//! Holds the declared service/characteristic tree. Registration is purely
//! local; the radio only sees the tree when advertising starts.

use super::types::{
    Characteristic, Service, ServiceDeclaration, DEFAULT_CHARACTERISTIC_PROFILE,
};
use crate::error::{PeripheralError, PeripheralResult};
use crate::uuid::Uuid;
use log::debug;

/// Declared services, in declaration order
#[derive(Debug, Default, Clone)]
pub struct AttributeRegistry {
    services: Vec<Service>,
    /// Set while the services are published to the radio
    frozen: bool,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service.
    ///
    /// The whole declaration is validated before anything is stored. A service
    /// UUID that is already registered keeps its original characteristics and
    /// `Ok(false)` is returned. Fails with `RegistryFrozen` while published.
    pub fn declare_service(&mut self, declaration: &ServiceDeclaration) -> PeripheralResult<bool> {
        if self.is_frozen() {
            return Err(PeripheralError::RegistryFrozen);
        }

        let uuid: Uuid = declaration.uuid.parse()?;

        let mut characteristics: Vec<Characteristic> = Vec::new();
        for (index, entry) in declaration.characteristics.iter().enumerate() {
            let text = entry.uuid.as_deref().ok_or_else(|| {
                PeripheralError::InvalidArgument(format!(
                    "characteristic {} of service {} has no uuid",
                    index, declaration.uuid
                ))
            })?;
            let char_uuid: Uuid = text.parse()?;

            if characteristics.iter().any(|c| c.uuid == char_uuid) {
                debug!("Ignoring repeated characteristic {:?} in service {:?}", char_uuid, uuid);
                continue;
            }

            let (default_properties, default_permissions) = DEFAULT_CHARACTERISTIC_PROFILE;
            characteristics.push(Characteristic {
                uuid: char_uuid,
                properties: entry.properties.unwrap_or(default_properties),
                permissions: entry.permissions.unwrap_or(default_permissions),
                value: Vec::new(),
            });
        }

        if self.lookup(&uuid).is_some() {
            debug!("Service {:?} already registered, keeping original", uuid);
            return Ok(false);
        }

        debug!(
            "Registered service {:?} with {} characteristic(s)",
            uuid,
            characteristics.len()
        );
        self.services.push(Service { uuid, characteristics });
        Ok(true)
    }

    pub fn lookup(&self, uuid: &Uuid) -> Option<&Service> {
        self.services.iter().find(|s| s.uuid == *uuid)
    }

    pub fn characteristic(&self, service: &Uuid, characteristic: &Uuid) -> Option<&Characteristic> {
        self.lookup(service)?.characteristic(characteristic)
    }

    /// Overwrite a characteristic's stored value. Returns `false` when the
    /// characteristic is not registered.
    pub fn write_value(&mut self, service: &Uuid, characteristic: &Uuid, value: &[u8]) -> bool {
        let target = self
            .services
            .iter_mut()
            .find(|s| s.uuid == *service)
            .and_then(|s| s.characteristic_mut(characteristic));

        match target {
            Some(c) => {
                c.value = value.to_vec();
                true
            }
            None => false,
        }
    }

    /// Stop accepting declarations and return a snapshot of the tree
    pub fn freeze(&mut self) -> Vec<Service> {
        self.frozen = true;
        self.services.clone()
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service_uuids(&self) -> Vec<Uuid> {
        self.services.iter().map(|s| s.uuid).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gatt::types::{
        AttributePermissions, CharacteristicDeclaration, CharacteristicProperties,
    };

    fn heart_rate() -> ServiceDeclaration {
        ServiceDeclaration::new("180D")
            .characteristic(CharacteristicDeclaration::new("2A37"))
            .characteristic(CharacteristicDeclaration::new("2A38"))
    }

    #[test]
    fn test_declared_characteristics_are_write_only() {
        let mut registry = AttributeRegistry::new();
        assert_eq!(registry.declare_service(&heart_rate()), Ok(true));

        let service = registry.lookup(&Uuid::from_u16(0x180D)).unwrap();
        let uuids: Vec<Uuid> = service.characteristics.iter().map(|c| c.uuid).collect();
        assert_eq!(uuids, vec![Uuid::from_u16(0x2A37), Uuid::from_u16(0x2A38)]);

        for c in &service.characteristics {
            assert_eq!(c.properties, CharacteristicProperties::WRITE);
            assert_eq!(c.permissions, AttributePermissions::WRITE);
            assert!(c.value.is_empty());
        }
    }

    #[test]
    fn test_redeclaring_keeps_original() {
        let mut registry = AttributeRegistry::new();
        registry.declare_service(&heart_rate()).unwrap();

        let replacement =
            ServiceDeclaration::new("180d").characteristic(CharacteristicDeclaration::new("2A39"));
        assert_eq!(registry.declare_service(&replacement), Ok(false));

        assert_eq!(registry.len(), 1);
        let service = registry.lookup(&Uuid::from_u16(0x180D)).unwrap();
        assert_eq!(service.characteristics.len(), 2);
        assert!(service.characteristic(&Uuid::from_u16(0x2A39)).is_none());
    }

    #[test]
    fn test_invalid_declarations_have_no_effect() {
        let mut registry = AttributeRegistry::new();

        let bad_service = ServiceDeclaration::new("not-a-uuid");
        assert!(matches!(
            registry.declare_service(&bad_service),
            Err(PeripheralError::InvalidArgument(_))
        ));

        let missing_uuid = ServiceDeclaration::new("180F")
            .characteristic(CharacteristicDeclaration::new("2A19"))
            .characteristic(CharacteristicDeclaration::default());
        assert!(matches!(
            registry.declare_service(&missing_uuid),
            Err(PeripheralError::InvalidArgument(_))
        ));

        let bad_characteristic =
            ServiceDeclaration::new("180F").characteristic(CharacteristicDeclaration::new("2A1"));
        assert!(registry.declare_service(&bad_characteristic).is_err());

        assert!(registry.is_empty());
    }

    #[test]
    fn test_profile_override_and_repeated_characteristic() {
        let mut registry = AttributeRegistry::new();
        let declaration = ServiceDeclaration::new("180F")
            .characteristic(
                CharacteristicDeclaration::new("2A19")
                    .with_properties(CharacteristicProperties::READ | CharacteristicProperties::NOTIFY)
                    .with_permissions(AttributePermissions::READ),
            )
            .characteristic(CharacteristicDeclaration::new("2A19"));
        registry.declare_service(&declaration).unwrap();

        let service = registry.lookup(&Uuid::from_u16(0x180F)).unwrap();
        assert_eq!(service.characteristics.len(), 1);
        assert!(service.characteristics[0].properties.can_read());
        assert!(!service.characteristics[0].properties.can_write());
    }

    #[test]
    fn test_frozen_registry_rejects_declarations() {
        let mut registry = AttributeRegistry::new();
        registry.declare_service(&heart_rate()).unwrap();

        assert!(!registry.is_frozen());
        let snapshot = registry.freeze();
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_frozen());
        assert_eq!(
            registry.declare_service(&ServiceDeclaration::new("180F")),
            Err(PeripheralError::RegistryFrozen)
        );

        // Values stay writable while published
        assert!(registry.write_value(&Uuid::from_u16(0x180D), &Uuid::from_u16(0x2A37), &[0x07]));

        registry.unfreeze();
        assert!(!registry.is_frozen());
        assert_eq!(registry.declare_service(&ServiceDeclaration::new("180F")), Ok(true));
    }

    #[test]
    fn test_write_value_and_service_order() {
        let mut registry = AttributeRegistry::new();
        registry.declare_service(&heart_rate()).unwrap();
        registry.declare_service(&ServiceDeclaration::new("180F")).unwrap();

        let service = Uuid::from_u16(0x180D);
        let characteristic = Uuid::from_u16(0x2A37);
        assert!(registry.write_value(&service, &characteristic, &[0x01, 0x02]));
        assert_eq!(
            registry.characteristic(&service, &characteristic).unwrap().value,
            vec![0x01, 0x02]
        );
        assert!(!registry.write_value(&service, &Uuid::from_u16(0x2A00), &[0x00]));

        assert_eq!(
            registry.service_uuids(),
            vec![Uuid::from_u16(0x180D), Uuid::from_u16(0x180F)]
        );
    }
}
