//! Advertising lifecycle
//!
//! Tracks whether advertising is idle, starting or running, and hands the
//! radio's asynchronous start outcome to the caller blocked in
//! [`PendingStart::wait`]. Only one start may be in flight at a time.
//!
//! Tearing down a start or a running advertisement is claimed by moving to
//! `Stopping`; whoever claims it cleans up and then calls
//! [`Advertiser::finish_stop`]. Nothing else can begin until then.

use super::types::{AdvertiseFailureReason, AdvertiseSettings};
use crate::error::{PeripheralError, PeripheralResult};
use log::{debug, info, warn};
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingPhase {
    Idle,
    /// Waiting for the radio to report the outcome of a start request
    Starting,
    Advertising,
    /// A stop or an aborted start is being cleaned up
    Stopping,
}

type StartOutcome = Result<AdvertiseSettings, i32>;

#[derive(Debug)]
struct AdvertiserState {
    phase: AdvertisingPhase,
    outcome_tx: Option<Sender<StartOutcome>>,
    /// Incremented on every start so stale aborts can be told apart
    attempt: u64,
    active: Option<AdvertiseSettings>,
}

/// Result of a successful start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseStarted {
    /// Name the adapter advertises under
    pub name: String,
    /// Settings in effect, as reported by the radio
    pub settings: AdvertiseSettings,
}

impl fmt::Display for AdvertiseStarted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success, Started Advertising")
    }
}

/// A start request waiting for the radio's verdict
#[derive(Debug)]
pub struct PendingStart {
    rx: Receiver<StartOutcome>,
    attempt: u64,
}

impl PendingStart {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Block until the radio reports the outcome or `timeout` elapses
    pub fn wait(self, timeout: Duration) -> PeripheralResult<AdvertiseSettings> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(settings)) => Ok(settings),
            Ok(Err(code)) => Err(PeripheralError::AdvertiseStartFailure(code)),
            Err(RecvTimeoutError::Timeout) => Err(PeripheralError::AdvertiseTimeout),
            Err(RecvTimeoutError::Disconnected) => {
                Err(PeripheralError::Radio("advertising start cancelled".to_string()))
            }
        }
    }
}

#[derive(Debug)]
pub struct Advertiser {
    state: Mutex<AdvertiserState>,
}

impl Default for Advertiser {
    fn default() -> Self {
        Self::new()
    }
}

impl Advertiser {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AdvertiserState {
                phase: AdvertisingPhase::Idle,
                outcome_tx: None,
                attempt: 0,
                active: None,
            }),
        }
    }

    /// Move to `Starting` and return the handle the outcome arrives on
    pub fn begin(&self) -> PeripheralResult<PendingStart> {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            AdvertisingPhase::Starting | AdvertisingPhase::Stopping => {
                return Err(PeripheralError::AdvertisingInProgress)
            }
            AdvertisingPhase::Advertising => return Err(PeripheralError::AlreadyAdvertising),
            AdvertisingPhase::Idle => {}
        }

        let (tx, rx) = mpsc::channel();
        state.attempt += 1;
        state.phase = AdvertisingPhase::Starting;
        state.outcome_tx = Some(tx);
        debug!("Advertising start attempt {}", state.attempt);

        Ok(PendingStart {
            rx,
            attempt: state.attempt,
        })
    }

    /// Radio callback: the start request succeeded
    pub fn on_start_success(&self, settings: AdvertiseSettings) {
        let mut state = self.state.lock().unwrap();
        let Some(tx) = self.awaiting_outcome(&mut state) else {
            warn!("Ignoring advertise success outside of a start ({:?})", state.phase);
            return;
        };

        info!("Advertising started: {:?}", settings);
        state.phase = AdvertisingPhase::Advertising;
        state.active = Some(settings);
        let _ = tx.send(Ok(settings));
    }

    /// Radio callback: the start request failed with a platform code.
    /// The phase stays `Starting` until the caller abandons the attempt.
    pub fn on_start_failure(&self, code: i32) {
        let mut state = self.state.lock().unwrap();
        let Some(tx) = self.awaiting_outcome(&mut state) else {
            warn!("Ignoring advertise failure {} outside of a start ({:?})", code, state.phase);
            return;
        };

        warn!(
            "Advertising onStartFailure: {} ({:?})",
            code,
            AdvertiseFailureReason::from_code(code)
        );
        let _ = tx.send(Err(code));
    }

    fn awaiting_outcome(&self, state: &mut AdvertiserState) -> Option<Sender<StartOutcome>> {
        if state.phase == AdvertisingPhase::Starting {
            state.outcome_tx.take()
        } else {
            None
        }
    }

    /// Claim the cleanup of `attempt` after its caller gave up on it.
    ///
    /// Returns `false` when the attempt was already stopped or superseded;
    /// the caller must then leave the radio and the session alone. On `true`
    /// the phase is `Stopping` until [`Advertiser::finish_stop`].
    pub fn abandon(&self, attempt: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        let current = state.attempt == attempt
            && matches!(
                state.phase,
                AdvertisingPhase::Starting | AdvertisingPhase::Advertising
            );
        if !current {
            debug!("Attempt {} is no longer current, skipping cleanup", attempt);
            return false;
        }
        state.phase = AdvertisingPhase::Stopping;
        state.outcome_tx = None;
        state.active = None;
        true
    }

    /// Claim the cleanup of whatever is running or starting.
    /// Returns `false` if nothing was, or another stop already holds it.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if !matches!(
            state.phase,
            AdvertisingPhase::Starting | AdvertisingPhase::Advertising
        ) {
            return false;
        }
        state.phase = AdvertisingPhase::Stopping;
        // Dropping the sender wakes a blocked waiter
        state.outcome_tx = None;
        state.active = None;
        true
    }

    /// Cleanup claimed by `abandon` or `stop` is done
    pub fn finish_stop(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase == AdvertisingPhase::Stopping {
            state.phase = AdvertisingPhase::Idle;
        }
    }

    pub fn phase(&self) -> AdvertisingPhase {
        self.state.lock().unwrap().phase
    }

    /// Settings of the running advertisement
    pub fn active_settings(&self) -> Option<AdvertiseSettings> {
        self.state.lock().unwrap().active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_success_reported_before_wait() {
        let advertiser = Advertiser::new();
        let pending = advertiser.begin().unwrap();
        assert_eq!(advertiser.phase(), AdvertisingPhase::Starting);

        advertiser.on_start_success(AdvertiseSettings::default());
        assert_eq!(pending.wait(WAIT), Ok(AdvertiseSettings::default()));
        assert_eq!(advertiser.phase(), AdvertisingPhase::Advertising);
        assert_eq!(advertiser.active_settings(), Some(AdvertiseSettings::default()));
    }

    #[test]
    fn test_single_flight() {
        let advertiser = Advertiser::new();
        let _pending = advertiser.begin().unwrap();
        assert_eq!(
            advertiser.begin().unwrap_err(),
            PeripheralError::AdvertisingInProgress
        );

        advertiser.on_start_success(AdvertiseSettings::default());
        assert_eq!(
            advertiser.begin().unwrap_err(),
            PeripheralError::AlreadyAdvertising
        );

        assert!(advertiser.stop());
        assert!(!advertiser.stop());
        assert_eq!(
            advertiser.begin().unwrap_err(),
            PeripheralError::AdvertisingInProgress
        );

        advertiser.finish_stop();
        assert!(advertiser.begin().is_ok());
    }

    #[test]
    fn test_failure_from_another_thread() {
        let advertiser = Arc::new(Advertiser::new());
        let pending = advertiser.begin().unwrap();
        let attempt = pending.attempt();

        let radio = {
            let advertiser = advertiser.clone();
            thread::spawn(move || advertiser.on_start_failure(2))
        };

        assert_eq!(
            pending.wait(WAIT),
            Err(PeripheralError::AdvertiseStartFailure(2))
        );
        radio.join().unwrap();
        assert_eq!(advertiser.phase(), AdvertisingPhase::Starting);

        // A second report for the same attempt is ignored
        advertiser.on_start_success(AdvertiseSettings::default());
        assert_eq!(advertiser.phase(), AdvertisingPhase::Starting);

        assert!(advertiser.abandon(attempt));
        assert_eq!(advertiser.phase(), AdvertisingPhase::Stopping);
        advertiser.finish_stop();
        assert_eq!(advertiser.phase(), AdvertisingPhase::Idle);
    }

    #[test]
    fn test_timeout_then_late_outcome_is_dropped() {
        let advertiser = Advertiser::new();
        let pending = advertiser.begin().unwrap();
        let attempt = pending.attempt();

        assert_eq!(
            pending.wait(Duration::from_millis(10)),
            Err(PeripheralError::AdvertiseTimeout)
        );
        assert!(advertiser.abandon(attempt));
        advertiser.finish_stop();
        assert_eq!(advertiser.phase(), AdvertisingPhase::Idle);

        advertiser.on_start_success(AdvertiseSettings::default());
        assert_eq!(advertiser.phase(), AdvertisingPhase::Idle);
    }

    #[test]
    fn test_stop_cancels_waiter() {
        let advertiser = Advertiser::new();
        let pending = advertiser.begin().unwrap();
        let attempt = pending.attempt();
        assert!(advertiser.stop());

        assert!(matches!(pending.wait(WAIT), Err(PeripheralError::Radio(_))));
        // The stop owns the cleanup, not the cancelled caller
        assert!(!advertiser.abandon(attempt));
    }

    #[test]
    fn test_stale_abandon_is_ignored() {
        let advertiser = Advertiser::new();
        let first = advertiser.begin().unwrap().attempt();
        advertiser.stop();
        advertiser.finish_stop();

        let _second = advertiser.begin().unwrap();
        assert!(!advertiser.abandon(first));
        assert_eq!(advertiser.phase(), AdvertisingPhase::Starting);
    }

    #[test]
    fn test_started_message() {
        let started = AdvertiseStarted {
            name: "HRM".to_string(),
            settings: AdvertiseSettings::default(),
        };
        assert_eq!(started.to_string(), "Success, Started Advertising");
    }
}
