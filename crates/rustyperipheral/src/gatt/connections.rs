//! Connected centrals
//!
//! Membership is best-effort: it follows the radio's connection callbacks and
//! nothing else.

use crate::gap::BdAddr;
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct ConnectionSet {
    devices: HashSet<BdAddr>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the device was not already connected
    pub fn add(&mut self, device: BdAddr) -> bool {
        self.devices.insert(device)
    }

    /// Returns `true` if the device was connected
    pub fn remove(&mut self, device: &BdAddr) -> bool {
        self.devices.remove(device)
    }

    pub fn contains(&self, device: &BdAddr) -> bool {
        self.devices.contains(device)
    }

    pub fn devices(&self) -> Vec<BdAddr> {
        self.devices.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
