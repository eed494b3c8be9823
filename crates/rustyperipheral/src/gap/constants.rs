// Advertising Data Types
pub const ADV_TYPE_FLAGS: u8 = 0x01;
pub const ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE: u8 = 0x03;
pub const ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE: u8 = 0x05;
pub const ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE: u8 = 0x07;
pub const ADV_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

// Advertising flags
pub const ADV_FLAG_LE_GENERAL_DISCOVERABLE: u8 = 0x02;
pub const ADV_FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Legacy advertising payload limit
pub const ADV_MAX_LEGACY_PAYLOAD: usize = 31;

// Advertise start failure codes reported by the platform
pub const ADVERTISE_FAILED_DATA_TOO_LARGE: i32 = 1;
pub const ADVERTISE_FAILED_TOO_MANY_ADVERTISERS: i32 = 2;
pub const ADVERTISE_FAILED_ALREADY_STARTED: i32 = 3;
pub const ADVERTISE_FAILED_INTERNAL_ERROR: i32 = 4;
pub const ADVERTISE_FAILED_FEATURE_UNSUPPORTED: i32 = 5;

// Advertising interval per mode, in 0.625 ms units
pub const ADV_INTERVAL_LOW_POWER: u16 = 0x0640; // 1 s
pub const ADV_INTERVAL_BALANCED: u16 = 0x0190; // 250 ms
pub const ADV_INTERVAL_LOW_LATENCY: u16 = 0x00A0; // 100 ms
