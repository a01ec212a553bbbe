//! Write-behind persistence for whole-collection state.
//!
//! Each store owns one [`Persister`], bound to one backend key. Every
//! mutation stages the freshly serialized collection into a single pending
//! slot; the slot is written to the backend according to the [`FlushPolicy`].
//! Failures never reach the mutating call. They are counted, logged and
//! handed to an optional observer, and the failed blob stays pending so a
//! later flush can retry it.
//!
//! Blobs use the envelope `{"state": ..., "version": 0}`.

use crate::error::{Error, Result};
use crate::persist_logging::{EventLog, PersistEvent};
use crate::traits::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Format version written into every envelope.
pub const STATE_VERSION: u32 = 0;

/// When staged state is written to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Flush right after every mutation.
    #[default]
    Immediate,
    /// Flush only on [`Persister::flush`] or drop.
    Deferred,
}

/// Callback receiving `(key, error)` for every failed write.
pub type FailureObserver = Box<dyn FnMut(&str, &Error)>;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct RawEnvelope {
    state: serde_json::Value,
    version: u32,
}

/// Serialize state into a versioned envelope.
///
/// # Errors
///
/// Returns an error if the state cannot be serialized.
pub fn encode<T: Serialize>(state: &T) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef { state, version: STATE_VERSION })?)
}

/// Decode a versioned envelope read from `key`.
///
/// # Errors
///
/// Returns [`Error::CorruptState`] for malformed blobs and
/// [`Error::UnsupportedVersion`] for envelopes from another format version.
pub fn decode<T: DeserializeOwned>(key: &str, blob: &str) -> Result<T> {
    let raw: RawEnvelope = serde_json::from_str(blob)
        .map_err(|source| Error::CorruptState { key: key.to_string(), source })?;
    if raw.version != STATE_VERSION {
        return Err(Error::UnsupportedVersion { key: key.to_string(), version: raw.version });
    }
    serde_json::from_value(raw.state)
        .map_err(|source| Error::CorruptState { key: key.to_string(), source })
}

/// Single-key write-behind queue.
pub struct Persister {
    backend: Rc<dyn KeyValueStore>,
    key: String,
    policy: FlushPolicy,
    pending: Option<String>,
    failures: usize,
    observer: Option<FailureObserver>,
    log: EventLog,
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("backend", &self.backend.name())
            .field("key", &self.key)
            .field("policy", &self.policy)
            .field("pending", &self.pending.is_some())
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl Persister {
    /// Create a persister writing `key` on `backend`.
    pub fn new(
        backend: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        policy: FlushPolicy,
        log: EventLog,
    ) -> Self {
        Self { backend, key: key.into(), policy, pending: None, failures: 0, observer: None, log }
    }

    /// The backend key this persister owns.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The active flush policy.
    #[must_use]
    pub const fn policy(&self) -> FlushPolicy {
        self.policy
    }

    /// Whether a staged blob has not been written yet.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of failed writes since creation.
    #[must_use]
    pub const fn failure_count(&self) -> usize {
        self.failures
    }

    /// Install a callback invoked on every failed write.
    pub fn on_failure(&mut self, observer: impl FnMut(&str, &Error) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Read and decode the state stored under this persister's key.
    ///
    /// # Returns
    ///
    /// `None` if the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the blob cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(blob) = self.backend.get(&self.key)? else {
            self.log.record(PersistEvent::Load, &self.key, "missing");
            return Ok(None);
        };
        let state = decode(&self.key, &blob)?;
        self.log.record(
            PersistEvent::Load,
            &self.key,
            &format!("backend={} bytes={}", self.backend.name(), blob.len()),
        );
        Ok(Some(state))
    }

    /// Stage the full state for writing, replacing any unwritten blob.
    ///
    /// With [`FlushPolicy::Immediate`] the blob is written before returning;
    /// a failure is reported through the observer and log, never returned.
    pub fn stage<T: Serialize>(&mut self, state: &T) {
        match encode(state) {
            Ok(blob) => self.pending = Some(blob),
            Err(e) => {
                self.report(&e);
                return;
            }
        }
        if self.policy == FlushPolicy::Immediate {
            let _ = self.flush();
        }
    }

    /// Write the pending blob, if any.
    ///
    /// # Returns
    ///
    /// `false` if nothing was pending, `true` after a successful write.
    ///
    /// # Errors
    ///
    /// Returns the backend error. The blob stays pending.
    pub fn flush(&mut self) -> Result<bool> {
        let Some(blob) = self.pending.take() else {
            return Ok(false);
        };
        match self.backend.set(&self.key, &blob) {
            Ok(()) => {
                self.log.record(
                    PersistEvent::Flush,
                    &self.key,
                    &format!("backend={} bytes={}", self.backend.name(), blob.len()),
                );
                Ok(true)
            }
            Err(e) => {
                self.pending = Some(blob);
                self.report(&e);
                Err(e)
            }
        }
    }

    fn report(&mut self, err: &Error) {
        self.failures += 1;
        self.log.record(PersistEvent::FlushFailed, &self.key, &err.to_string());
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.key, err);
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if self.pending.is_some() {
            let _ = self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockKvStore;
    use std::cell::RefCell;

    fn persister(policy: FlushPolicy) -> (Rc<MockKvStore>, Persister) {
        let kv = Rc::new(MockKvStore::new());
        let p = Persister::new(kv.clone(), "items", policy, EventLog::disabled());
        (kv, p)
    }

    #[test]
    fn test_encode_envelope_shape() {
        let blob = encode(&vec![1, 2, 3]).unwrap();
        assert_eq!(blob, r#"{"state":[1,2,3],"version":0}"#);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let err = decode::<Vec<u32>>("items", "not json").unwrap_err();
        assert!(matches!(err, Error::CorruptState { ref key, .. } if key == "items"));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = decode::<Vec<u32>>("items", r#"{"state":{"a":1},"version":0}"#).unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = decode::<Vec<u32>>("items", r#"{"state":[],"version":3}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 3, .. }));
    }

    #[test]
    fn test_immediate_policy_writes_on_stage() {
        let (kv, mut p) = persister(FlushPolicy::Immediate);
        p.stage(&vec!["a"]);
        assert!(!p.has_pending());
        assert_eq!(kv.write_count(), 1);
        assert_eq!(kv.peek("items").as_deref(), Some(r#"{"state":["a"],"version":0}"#));
    }

    #[test]
    fn test_deferred_policy_coalesces() {
        let (kv, mut p) = persister(FlushPolicy::Deferred);
        p.stage(&vec!["a"]);
        p.stage(&vec!["a", "b"]);
        assert!(p.has_pending());
        assert_eq!(kv.write_count(), 0);

        assert!(p.flush().unwrap());
        assert_eq!(kv.write_count(), 1);
        assert_eq!(kv.peek("items").as_deref(), Some(r#"{"state":["a","b"],"version":0}"#));

        assert!(!p.flush().unwrap());
    }

    #[test]
    fn test_drop_flushes_pending() {
        let (kv, mut p) = persister(FlushPolicy::Deferred);
        p.stage(&vec![7]);
        drop(p);
        assert_eq!(kv.peek("items").as_deref(), Some(r#"{"state":[7],"version":0}"#));
    }

    #[test]
    fn test_failure_is_observed_and_retained() {
        let (kv, mut p) = persister(FlushPolicy::Immediate);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        p.on_failure(move |key, err| sink.borrow_mut().push(format!("{key}: {err}")));

        kv.set_fail_writes(true);
        p.stage(&vec![1]);

        assert!(p.has_pending());
        assert_eq!(p.failure_count(), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].starts_with("items: Storage error"));

        kv.set_fail_writes(false);
        assert!(p.flush().unwrap());
        assert!(!p.has_pending());
        assert_eq!(kv.peek("items").as_deref(), Some(r#"{"state":[1],"version":0}"#));
    }

    #[test]
    fn test_flush_error_returned_to_explicit_caller() {
        let (kv, mut p) = persister(FlushPolicy::Deferred);
        p.stage(&vec![1]);
        kv.set_fail_writes(true);
        assert!(p.flush().is_err());
        assert_eq!(p.failure_count(), 1);
        kv.set_fail_writes(false);
    }

    #[test]
    fn test_load_missing_and_present() {
        let (kv, p) = persister(FlushPolicy::Immediate);
        assert_eq!(p.load::<Vec<u32>>().unwrap(), None);

        kv.set("items", r#"{"state":[4,5],"version":0}"#).unwrap();
        assert_eq!(p.load::<Vec<u32>>().unwrap(), Some(vec![4, 5]));
    }

    #[test]
    fn test_load_read_failure_propagates() {
        let (kv, p) = persister(FlushPolicy::Immediate);
        kv.set_fail_reads(true);
        assert!(matches!(p.load::<Vec<u32>>(), Err(Error::Storage(_))));
    }

    #[test]
    fn test_flush_policy_serde_names() {
        assert_eq!(serde_yaml::to_string(&FlushPolicy::Deferred).unwrap().trim(), "deferred");
        let parsed: FlushPolicy = serde_yaml::from_str("immediate").unwrap();
        assert_eq!(parsed, FlushPolicy::Immediate);
    }
}
