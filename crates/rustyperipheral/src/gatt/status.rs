//! Symbolic GATT status codes
use crate::error::PeripheralError;
use std::fmt;
use std::str::FromStr;

pub const GATT_STATUS_SUCCESS: u8 = 0x00;
pub const GATT_STATUS_INVALID_HANDLE: u8 = 0x01;
pub const GATT_STATUS_READ_NOT_PERMITTED: u8 = 0x02;
pub const GATT_STATUS_WRITE_NOT_PERMITTED: u8 = 0x03;
pub const GATT_STATUS_INVALID_PDU: u8 = 0x04;
pub const GATT_STATUS_INSUFFICIENT_AUTHENTICATION: u8 = 0x05;
pub const GATT_STATUS_REQUEST_NOT_SUPPORTED: u8 = 0x06;
pub const GATT_STATUS_INVALID_OFFSET: u8 = 0x07;
pub const GATT_STATUS_INSUFFICIENT_AUTHORIZATION: u8 = 0x08;
pub const GATT_STATUS_PREPARE_QUEUE_FULL: u8 = 0x09;
pub const GATT_STATUS_ATTRIBUTE_NOT_FOUND: u8 = 0x0A;
pub const GATT_STATUS_ATTRIBUTE_NOT_LONG: u8 = 0x0B;
pub const GATT_STATUS_INSUFFICIENT_ENCRYPTION_KEY_SIZE: u8 = 0x0C;
pub const GATT_STATUS_INVALID_ATTRIBUTE_VALUE_LENGTH: u8 = 0x0D;
pub const GATT_STATUS_UNLIKELY_ERROR: u8 = 0x0E;
pub const GATT_STATUS_INSUFFICIENT_ENCRYPTION: u8 = 0x0F;
pub const GATT_STATUS_UNSUPPORTED_GROUP_TYPE: u8 = 0x10;
pub const GATT_STATUS_INSUFFICIENT_RESOURCES: u8 = 0x11;

/// Status sent back to the radio when answering a read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GattStatus {
    Success,
    InvalidHandle,
    ReadNotPermitted,
    WriteNotPermitted,
    InvalidPdu,
    InsufficientAuthentication,
    RequestNotSupported,
    InvalidOffset,
    InsufficientAuthorization,
    PrepareQueueFull,
    AttributeNotFound,
    AttributeNotLong,
    InsufficientEncryptionKeySize,
    InvalidAttributeValueLength,
    UnlikelyError,
    InsufficientEncryption,
    UnsupportedGroupType,
    InsufficientResources,
    /// A code outside the symbolic table, e.g. an application error (0x80-0x9F)
    Other(u8),
}

/// Every symbolic status with its name, in code order
pub const STATUS_TABLE: [(&str, GattStatus); 18] = [
    ("success", GattStatus::Success),
    ("invalidHandle", GattStatus::InvalidHandle),
    ("readNotPermitted", GattStatus::ReadNotPermitted),
    ("writeNotPermitted", GattStatus::WriteNotPermitted),
    ("invalidPdu", GattStatus::InvalidPdu),
    ("insufficientAuthentication", GattStatus::InsufficientAuthentication),
    ("requestNotSupported", GattStatus::RequestNotSupported),
    ("invalidOffset", GattStatus::InvalidOffset),
    ("insufficientAuthorization", GattStatus::InsufficientAuthorization),
    ("prepareQueueFull", GattStatus::PrepareQueueFull),
    ("attributeNotFound", GattStatus::AttributeNotFound),
    ("attributeNotLong", GattStatus::AttributeNotLong),
    ("insufficientEncryptionKeySize", GattStatus::InsufficientEncryptionKeySize),
    ("invalidAttributeValueLength", GattStatus::InvalidAttributeValueLength),
    ("unlikelyError", GattStatus::UnlikelyError),
    ("insufficientEncryption", GattStatus::InsufficientEncryption),
    ("unsupportedGroupType", GattStatus::UnsupportedGroupType),
    ("insufficientResources", GattStatus::InsufficientResources),
];

impl GattStatus {
    /// Look up a status by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        STATUS_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, status)| *status)
    }

    /// Symbolic name, if the status is in the table
    pub fn name(&self) -> Option<&'static str> {
        STATUS_TABLE
            .iter()
            .find(|(_, status)| status == self)
            .map(|(name, _)| *name)
    }

    pub fn code(&self) -> u8 {
        (*self).into()
    }

    pub fn is_success(&self) -> bool {
        *self == GattStatus::Success
    }
}

impl From<u8> for GattStatus {
    fn from(code: u8) -> Self {
        match code {
            GATT_STATUS_SUCCESS => GattStatus::Success,
            GATT_STATUS_INVALID_HANDLE => GattStatus::InvalidHandle,
            GATT_STATUS_READ_NOT_PERMITTED => GattStatus::ReadNotPermitted,
            GATT_STATUS_WRITE_NOT_PERMITTED => GattStatus::WriteNotPermitted,
            GATT_STATUS_INVALID_PDU => GattStatus::InvalidPdu,
            GATT_STATUS_INSUFFICIENT_AUTHENTICATION => GattStatus::InsufficientAuthentication,
            GATT_STATUS_REQUEST_NOT_SUPPORTED => GattStatus::RequestNotSupported,
            GATT_STATUS_INVALID_OFFSET => GattStatus::InvalidOffset,
            GATT_STATUS_INSUFFICIENT_AUTHORIZATION => GattStatus::InsufficientAuthorization,
            GATT_STATUS_PREPARE_QUEUE_FULL => GattStatus::PrepareQueueFull,
            GATT_STATUS_ATTRIBUTE_NOT_FOUND => GattStatus::AttributeNotFound,
            GATT_STATUS_ATTRIBUTE_NOT_LONG => GattStatus::AttributeNotLong,
            GATT_STATUS_INSUFFICIENT_ENCRYPTION_KEY_SIZE => {
                GattStatus::InsufficientEncryptionKeySize
            }
            GATT_STATUS_INVALID_ATTRIBUTE_VALUE_LENGTH => GattStatus::InvalidAttributeValueLength,
            GATT_STATUS_UNLIKELY_ERROR => GattStatus::UnlikelyError,
            GATT_STATUS_INSUFFICIENT_ENCRYPTION => GattStatus::InsufficientEncryption,
            GATT_STATUS_UNSUPPORTED_GROUP_TYPE => GattStatus::UnsupportedGroupType,
            GATT_STATUS_INSUFFICIENT_RESOURCES => GattStatus::InsufficientResources,
            other => GattStatus::Other(other),
        }
    }
}

impl From<GattStatus> for u8 {
    fn from(status: GattStatus) -> u8 {
        match status {
            GattStatus::Success => GATT_STATUS_SUCCESS,
            GattStatus::InvalidHandle => GATT_STATUS_INVALID_HANDLE,
            GattStatus::ReadNotPermitted => GATT_STATUS_READ_NOT_PERMITTED,
            GattStatus::WriteNotPermitted => GATT_STATUS_WRITE_NOT_PERMITTED,
            GattStatus::InvalidPdu => GATT_STATUS_INVALID_PDU,
            GattStatus::InsufficientAuthentication => GATT_STATUS_INSUFFICIENT_AUTHENTICATION,
            GattStatus::RequestNotSupported => GATT_STATUS_REQUEST_NOT_SUPPORTED,
            GattStatus::InvalidOffset => GATT_STATUS_INVALID_OFFSET,
            GattStatus::InsufficientAuthorization => GATT_STATUS_INSUFFICIENT_AUTHORIZATION,
            GattStatus::PrepareQueueFull => GATT_STATUS_PREPARE_QUEUE_FULL,
            GattStatus::AttributeNotFound => GATT_STATUS_ATTRIBUTE_NOT_FOUND,
            GattStatus::AttributeNotLong => GATT_STATUS_ATTRIBUTE_NOT_LONG,
            GattStatus::InsufficientEncryptionKeySize => {
                GATT_STATUS_INSUFFICIENT_ENCRYPTION_KEY_SIZE
            }
            GattStatus::InvalidAttributeValueLength => GATT_STATUS_INVALID_ATTRIBUTE_VALUE_LENGTH,
            GattStatus::UnlikelyError => GATT_STATUS_UNLIKELY_ERROR,
            GattStatus::InsufficientEncryption => GATT_STATUS_INSUFFICIENT_ENCRYPTION,
            GattStatus::UnsupportedGroupType => GATT_STATUS_UNSUPPORTED_GROUP_TYPE,
            GattStatus::InsufficientResources => GATT_STATUS_INSUFFICIENT_RESOURCES,
            GattStatus::Other(code) => code,
        }
    }
}

impl FromStr for GattStatus {
    type Err = PeripheralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GattStatus::from_name(s)
            .ok_or_else(|| PeripheralError::InvalidArgument(format!("unknown status: {}", s)))
    }
}

impl fmt::Display for GattStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:02X})", name, self.code()),
            None => write!(f, "0x{:02X}", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_and_codes_line_up() {
        for (index, (name, status)) in STATUS_TABLE.iter().enumerate() {
            assert_eq!(status.code() as usize, index);
            assert_eq!(GattStatus::from_name(name), Some(*status));
            assert_eq!(status.name(), Some(*name));
            assert_eq!(GattStatus::from(status.code()), *status);
        }
    }

    #[test]
    fn test_parse_status_names() {
        assert_eq!("success".parse::<GattStatus>(), Ok(GattStatus::Success));
        assert_eq!("invalidOffset".parse::<GattStatus>(), Ok(GattStatus::InvalidOffset));
        assert_eq!(GattStatus::InsufficientResources.code(), 0x11);
        assert!(matches!(
            "Success".parse::<GattStatus>(),
            Err(PeripheralError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_codes_outside_table() {
        let status = GattStatus::from(0x80);
        assert_eq!(status, GattStatus::Other(0x80));
        assert_eq!(status.name(), None);
        assert_eq!(status.to_string(), "0x80");
        assert_eq!(GattStatus::Success.to_string(), "success (0x00)");
    }

    #[test]
    fn test_only_success_is_success() {
        assert!(GattStatus::Success.is_success());
        assert!(GattStatus::from(0x00).is_success());
        assert!(!GattStatus::InvalidOffset.is_success());
        assert!(!GattStatus::Other(0x80).is_success());
    }
}
