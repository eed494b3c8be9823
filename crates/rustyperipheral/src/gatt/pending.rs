//! Pending request table
//!
//! Correlates in-flight remote reads/writes with the opaque token handed to
//! the application. Each entry carries a deadline; expired entries are handed
//! back to the session so it can answer the radio on the application's behalf.

use crate::gap::BdAddr;
use crate::uuid::Uuid;
use log::trace;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Opaque identifier the application uses to answer a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(String);

impl RequestToken {
    fn generate() -> Self {
        RequestToken(Uuid::new_random_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RequestToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Read,
    Write,
}

/// One remote read or write awaiting an application decision
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub kind: RequestKind,
    /// Originating central
    pub device: BdAddr,
    /// Platform request id, echoed in the reply
    pub request_id: i32,
    pub offset: u16,
    /// Prior value for reads, incoming value for writes
    pub value: Vec<u8>,
    pub service: Uuid,
    pub characteristic: Uuid,
    pub created: Instant,
    pub deadline: Instant,
}

/// Fields of a request as delivered by the radio
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub kind: RequestKind,
    pub device: BdAddr,
    pub request_id: i32,
    pub offset: u16,
    pub value: Vec<u8>,
    pub service: Uuid,
    pub characteristic: Uuid,
}

#[derive(Debug)]
pub struct PendingRequestTable {
    requests: HashMap<RequestToken, PendingRequest>,
    timeout: Duration,
}

impl PendingRequestTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            timeout,
        }
    }

    /// Applies to requests filed from now on
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// File a request under a fresh token and return the token
    pub fn insert(&mut self, request: NewRequest) -> RequestToken {
        let mut token = RequestToken::generate();
        while self.requests.contains_key(&token) {
            token = RequestToken::generate();
        }

        let created = Instant::now();
        let pending = PendingRequest {
            token: token.clone(),
            kind: request.kind,
            device: request.device,
            request_id: request.request_id,
            offset: request.offset,
            value: request.value,
            service: request.service,
            characteristic: request.characteristic,
            created,
            deadline: created + self.timeout,
        };

        trace!("Filed {:?} request {} from {}", pending.kind, token, pending.device);
        self.requests.insert(token.clone(), pending);
        token
    }

    /// Remove and return the request filed under `token`
    pub fn take(&mut self, token: &str) -> Option<PendingRequest> {
        self.requests.remove(token)
    }

    pub fn get(&self, token: &str) -> Option<&PendingRequest> {
        self.requests.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.requests.contains_key(token)
    }

    /// Remove every request whose deadline is at or before `now`
    pub fn take_expired(&mut self, now: Instant) -> Vec<PendingRequest> {
        self.take_where(|r| r.deadline <= now)
    }

    /// Remove every request that originated from `device`
    pub fn take_for_device(&mut self, device: &BdAddr) -> Vec<PendingRequest> {
        self.take_where(|r| r.device == *device)
    }

    pub fn drain(&mut self) -> Vec<PendingRequest> {
        self.requests.drain().map(|(_, r)| r).collect()
    }

    fn take_where<F>(&mut self, predicate: F) -> Vec<PendingRequest>
    where
        F: Fn(&PendingRequest) -> bool,
    {
        let tokens: Vec<RequestToken> = self
            .requests
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.token.clone())
            .collect();

        let mut taken: Vec<PendingRequest> = tokens
            .iter()
            .filter_map(|token| self.requests.remove(token))
            .collect();
        taken.sort_by_key(|r| r.created);
        taken
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(device: u8, request_id: i32) -> NewRequest {
        NewRequest {
            kind: RequestKind::Write,
            device: BdAddr::new([device, 0, 0, 0, 0, 0]),
            request_id,
            offset: 0,
            value: vec![request_id as u8],
            service: Uuid::from_u16(0x180D),
            characteristic: Uuid::from_u16(0x2A37),
        }
    }

    #[test]
    fn test_tokens_are_unique_and_consumed_once() {
        let mut table = PendingRequestTable::new(Duration::from_secs(15));

        let tokens: Vec<RequestToken> = (0..64).map(|i| table.insert(request(1, i))).collect();
        let mut deduped = tokens.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), tokens.len());
        assert_eq!(table.len(), 64);

        let first = table.take(tokens[0].as_str()).unwrap();
        assert_eq!(first.request_id, 0);
        assert_eq!(first.value, vec![0]);
        assert!(table.take(tokens[0].as_str()).is_none());
        assert_eq!(table.len(), 63);
    }

    #[test]
    fn test_expiry_uses_deadline() {
        let mut table = PendingRequestTable::new(Duration::from_secs(60));
        let kept = table.insert(request(1, 1));

        table.set_timeout(Duration::ZERO);
        let expired = table.insert(request(1, 2));

        let taken = table.take_expired(Instant::now());
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].token, expired);
        assert!(table.contains(kept.as_str()));

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(table.take_expired(later).len(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_take_for_device() {
        let mut table = PendingRequestTable::new(Duration::from_secs(15));
        table.insert(request(1, 1));
        let other = table.insert(request(2, 2));
        table.insert(request(1, 3));

        let dropped = table.take_for_device(&BdAddr::new([1, 0, 0, 0, 0, 0]));
        let ids: Vec<i32> = dropped.iter().map(|r| r.request_id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1) && ids.contains(&3));
        assert_eq!(table.len(), 1);
        assert!(table.get(other.as_str()).is_some());
    }
}
