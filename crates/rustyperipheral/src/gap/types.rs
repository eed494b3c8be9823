use crate::error::{PeripheralError, PeripheralResult};
use crate::gap::constants::*;
use crate::uuid::Uuid;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Platform handle of a remote central
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseMode {
    LowPower,
    Balanced,
    LowLatency,
}

impl AdvertiseMode {
    /// Advertising interval in 0.625 ms units
    pub fn interval(&self) -> u16 {
        match self {
            AdvertiseMode::LowPower => ADV_INTERVAL_LOW_POWER,
            AdvertiseMode::Balanced => ADV_INTERVAL_BALANCED,
            AdvertiseMode::LowLatency => ADV_INTERVAL_LOW_LATENCY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TxPowerLevel {
    UltraLow,
    Low,
    Medium,
    High,
}

impl TxPowerLevel {
    /// Nominal transmit power in dBm
    pub fn dbm(&self) -> i8 {
        match self {
            TxPowerLevel::UltraLow => -21,
            TxPowerLevel::Low => -15,
            TxPowerLevel::Medium => -7,
            TxPowerLevel::High => 1,
        }
    }
}

/// Broadcast parameters handed to the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertiseSettings {
    pub mode: AdvertiseMode,
    pub tx_power: TxPowerLevel,
    pub connectable: bool,
}

impl Default for AdvertiseSettings {
    fn default() -> Self {
        Self {
            mode: AdvertiseMode::LowLatency,
            tx_power: TxPowerLevel::High,
            connectable: true,
        }
    }
}

/// Advertisement payload contents
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvertiseData {
    pub include_device_name: bool,
    pub service_uuids: Vec<Uuid>,
}

impl AdvertiseData {
    /// Render the payload as AD structures: flags, complete service UUID
    /// lists grouped by width, then the complete local name.
    ///
    /// Fails when a single AD structure would exceed 254 bytes of data.
    pub fn encode(&self, local_name: &str) -> PeripheralResult<Vec<u8>> {
        let mut out = Vec::new();

        push_ad(
            &mut out,
            ADV_TYPE_FLAGS,
            &[ADV_FLAG_LE_GENERAL_DISCOVERABLE | ADV_FLAG_BR_EDR_NOT_SUPPORTED],
        )?;

        let mut uuids16 = Vec::new();
        let mut uuids32 = Vec::new();
        let mut uuids128 = Vec::new();
        for uuid in &self.service_uuids {
            if let Some(value) = uuid.as_u16() {
                let mut buf = [0u8; 2];
                LittleEndian::write_u16(&mut buf, value);
                uuids16.extend_from_slice(&buf);
            } else if let Some(value) = uuid.as_u32() {
                let mut buf = [0u8; 4];
                LittleEndian::write_u32(&mut buf, value);
                uuids32.extend_from_slice(&buf);
            } else {
                uuids128.extend_from_slice(uuid.as_bytes_le());
            }
        }

        if !uuids16.is_empty() {
            push_ad(&mut out, ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, &uuids16)?;
        }
        if !uuids32.is_empty() {
            push_ad(&mut out, ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE, &uuids32)?;
        }
        if !uuids128.is_empty() {
            push_ad(&mut out, ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE, &uuids128)?;
        }

        if self.include_device_name && !local_name.is_empty() {
            push_ad(&mut out, ADV_TYPE_COMPLETE_LOCAL_NAME, local_name.as_bytes())?;
        }

        Ok(out)
    }

    /// Whether the encoded payload fits a legacy advertising PDU
    pub fn fits_legacy_payload(&self, local_name: &str) -> bool {
        matches!(self.encode(local_name), Ok(payload) if payload.len() <= ADV_MAX_LEGACY_PAYLOAD)
    }
}

fn push_ad(out: &mut Vec<u8>, ad_type: u8, data: &[u8]) -> PeripheralResult<()> {
    // Length byte covers the type byte too
    let len = u8::try_from(data.len() + 1).map_err(|_| {
        PeripheralError::InvalidArgument(format!(
            "AD structure 0x{:02X} carries {} bytes, at most 254 fit",
            ad_type,
            data.len()
        ))
    })?;
    out.push(len);
    out.push(ad_type);
    out.extend_from_slice(data);
    Ok(())
}

/// Well-known platform reasons for an advertise start failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertiseFailureReason {
    DataTooLarge,
    TooManyAdvertisers,
    AlreadyStarted,
    InternalError,
    FeatureUnsupported,
    Unknown(i32),
}

impl AdvertiseFailureReason {
    pub fn from_code(code: i32) -> Self {
        match code {
            ADVERTISE_FAILED_DATA_TOO_LARGE => AdvertiseFailureReason::DataTooLarge,
            ADVERTISE_FAILED_TOO_MANY_ADVERTISERS => AdvertiseFailureReason::TooManyAdvertisers,
            ADVERTISE_FAILED_ALREADY_STARTED => AdvertiseFailureReason::AlreadyStarted,
            ADVERTISE_FAILED_INTERNAL_ERROR => AdvertiseFailureReason::InternalError,
            ADVERTISE_FAILED_FEATURE_UNSUPPORTED => AdvertiseFailureReason::FeatureUnsupported,
            other => AdvertiseFailureReason::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ad(data: &[u8]) -> Vec<(u8, Vec<u8>)> {
        let mut result = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let length = data[i] as usize;
            result.push((data[i + 1], data[i + 2..i + 1 + length].to_vec()));
            i += 1 + length;
        }
        result
    }

    #[test]
    fn test_encode_heart_rate_payload() {
        let data = AdvertiseData {
            include_device_name: true,
            service_uuids: vec![Uuid::from_u16(0x180D)],
        };

        let encoded = data.encode("HRM").unwrap();
        let structures = parse_ad(&encoded);

        assert_eq!(
            structures,
            vec![
                (ADV_TYPE_FLAGS, vec![0x06]),
                (ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, vec![0x0D, 0x18]),
                (ADV_TYPE_COMPLETE_LOCAL_NAME, b"HRM".to_vec()),
            ]
        );
        assert!(data.fits_legacy_payload("HRM"));
    }

    #[test]
    fn test_encode_groups_uuid_widths_and_omits_name() {
        let custom: Uuid = "6e400001-b5a3-f393-e0a9-e50e24dcca9e".parse().unwrap();
        let data = AdvertiseData {
            include_device_name: false,
            service_uuids: vec![Uuid::from_u16(0x180D), custom, Uuid::from_u16(0x180F)],
        };

        let structures = parse_ad(&data.encode("ignored").unwrap());

        assert_eq!(structures.len(), 3);
        assert_eq!(structures[1], (ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, vec![0x0D, 0x18, 0x0F, 0x18]));
        assert_eq!(structures[2].0, ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE);
        assert_eq!(structures[2].1, custom.as_bytes_le().to_vec());
    }

    #[test]
    fn test_oversized_payload_detected() {
        let data = AdvertiseData {
            include_device_name: true,
            service_uuids: vec!["6e400001-b5a3-f393-e0a9-e50e24dcca9e".parse().unwrap()],
        };

        // 3 (flags) + 18 (128-bit list) + 2 + name
        assert!(data.fits_legacy_payload("HRM-01"));
        assert!(!data.fits_legacy_payload("a-rather-long-name"));
    }

    #[test]
    fn test_overlong_uuid_list_is_rejected() {
        // 16 x 16 bytes = 256 bytes, one AD structure cannot carry them
        let uuids: Vec<Uuid> = (0..16u8)
            .map(|i| format!("6e4000{:02x}-b5a3-f393-e0a9-e50e24dcca9e", i).parse().unwrap())
            .collect();
        let data = AdvertiseData {
            include_device_name: false,
            service_uuids: uuids.clone(),
        };

        assert!(matches!(
            data.encode(""),
            Err(PeripheralError::InvalidArgument(_))
        ));
        assert!(!data.fits_legacy_payload(""));

        // 15 x 16 = 240 bytes still encodes, just not as a legacy payload
        let data = AdvertiseData {
            include_device_name: false,
            service_uuids: uuids[..15].to_vec(),
        };
        let encoded = data.encode("").unwrap();
        assert_eq!(encoded[3], 241);
        assert_eq!(encoded.len(), 3 + 2 + 240);
        assert!(!data.fits_legacy_payload(""));
    }

    #[test]
    fn test_slower_modes_use_longer_intervals() {
        assert!(AdvertiseMode::LowPower.interval() > AdvertiseMode::Balanced.interval());
        assert!(AdvertiseMode::Balanced.interval() > AdvertiseMode::LowLatency.interval());
        assert_eq!(AdvertiseMode::LowPower.interval(), ADV_INTERVAL_LOW_POWER);
        assert!(TxPowerLevel::UltraLow.dbm() < TxPowerLevel::Medium.dbm());
    }

    #[test]
    fn test_failure_reason_classification() {
        assert_eq!(AdvertiseFailureReason::from_code(1), AdvertiseFailureReason::DataTooLarge);
        assert_eq!(AdvertiseFailureReason::from_code(2), AdvertiseFailureReason::TooManyAdvertisers);
        assert_eq!(AdvertiseFailureReason::from_code(3), AdvertiseFailureReason::AlreadyStarted);
        assert_eq!(AdvertiseFailureReason::from_code(42), AdvertiseFailureReason::Unknown(42));
    }

    #[test]
    fn test_default_settings_and_address_display() {
        let settings = AdvertiseSettings::default();
        assert_eq!(settings.mode, AdvertiseMode::LowLatency);
        assert_eq!(settings.tx_power, TxPowerLevel::High);
        assert!(settings.connectable);

        assert_eq!(settings.mode.interval(), ADV_INTERVAL_LOW_LATENCY);
        assert_eq!(settings.tx_power.dbm(), 1);

        let addr = BdAddr::new([0x55, 0x44, 0x33, 0x22, 0x11, 0x00]);
        assert_eq!(addr.to_string(), "00:11:22:33:44:55");
        assert_eq!(BdAddr::from_slice(&[1, 2, 3]), None);
    }
}
