//! Gateway reports - allow-list validation and slot updates
//!
//! A report is accepted in three steps, each of which can reject it before
//! the store is touched: the gateway code is resolved against the
//! allow-list, the body is decoded into an [`UpdateBatch`], and only then
//! are the matching slots rewritten.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, StoreError};
use crate::store::SlotStore;

/// Gateway code that passed the allow-list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GatewayCode(String);

impl GatewayCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of gateway codes allowed to report
#[derive(Debug, Clone)]
pub struct GatewayAllowList {
    codes: HashSet<String>,
}

impl GatewayAllowList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.codes.iter().cloned())
    }

    /// Resolve a raw code from the request path
    pub fn resolve(&self, code: &str) -> Result<GatewayCode, GatewayError> {
        if self.codes.contains(code) {
            Ok(GatewayCode(code.to_string()))
        } else {
            Err(GatewayError::InvalidGateway(code.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Allowed codes, sorted
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.iter().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

impl Default for GatewayAllowList {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

/// Decoded report body: slot key → reported number
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct UpdateBatch(HashMap<String, f64>);

impl UpdateBatch {
    /// Decode a JSON object of numbers
    ///
    /// Anything else (arrays, `null`, strings, objects with non-numeric
    /// values) is rejected as malformed.
    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice(body).map_err(|e| GatewayError::MalformedInput(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for UpdateBatch {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Reported number as a slot value: truncated toward zero, saturating at
/// the `i64` range
fn slot_value(reported: f64) -> i64 {
    reported as i64
}

impl SlotStore {
    /// Apply a report from `gateway`, stamping slots with `now_ms`
    ///
    /// Keys outside the provisioned space are skipped. Each slot is
    /// rewritten under a single exclusive lock, so its time never moves
    /// backwards, even when `now_ms` is older than a concurrent report
    /// that got there first. Returns the number of slots written.
    pub fn apply(&self, gateway: &GatewayCode, batch: &UpdateBatch, now_ms: i64) -> usize {
        let mut applied = 0;

        for (key, reported) in batch.iter() {
            let result = self.modify(key, |slot| {
                slot.gateway = gateway.as_str().to_string();
                slot.value = slot_value(reported);
                slot.time = now_ms.max(slot.time);
            });

            match result {
                Ok(_) => applied += 1,
                Err(StoreError::UnknownSlot(_)) => {
                    tracing::trace!(key, "Skipping unprovisioned slot");
                }
                Err(e) => tracing::warn!(key, error = %e, "Slot write rejected"),
            }
        }

        applied
    }

    /// Apply a report stamped with the current wall-clock time
    pub fn apply_now(&self, gateway: &GatewayCode, batch: &UpdateBatch) -> usize {
        self.apply(gateway, batch, chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;
    use pretty_assertions::assert_eq;

    fn code(raw: &str) -> GatewayCode {
        GatewayAllowList::default().resolve(raw).unwrap()
    }

    #[test]
    fn test_default_allow_list() {
        let allow = GatewayAllowList::default();
        assert_eq!(allow.codes(), vec!["241", "242", "243", "244", "245"]);

        for raw in ["241", "242", "243", "244", "245"] {
            assert_eq!(allow.resolve(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_unknown_gateway_rejected() {
        let allow = GatewayAllowList::default();
        for raw in ["999", "240", "246", "", " 241", "241/"] {
            let err = allow.resolve(raw).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidGateway(ref c) if c == raw));
        }
    }

    #[test]
    fn test_custom_allow_list() {
        let allow = GatewayAllowList::new(["north", "south"]);
        assert_eq!(allow.len(), 2);
        assert!(allow.resolve("north").is_ok());
        assert!(allow.resolve("241").is_err());
    }

    #[test]
    fn test_decode_batch() {
        let batch = UpdateBatch::from_json(br#"{"k1": 5, "k2": 3.9, "k3": -2.5}"#).unwrap();
        assert_eq!(batch.len(), 3);

        let empty = UpdateBatch::from_json(b"{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        let bodies: [&[u8]; 7] = [
            b"",
            b"not json",
            b"[1, 2]",
            b"null",
            b"42",
            br#"{"k1": "5"}"#,
            br#"{"k1": {"value": 5}}"#,
        ];

        for body in bodies {
            let err = UpdateBatch::from_json(body).unwrap_err();
            assert!(
                matches!(err, GatewayError::MalformedInput(_)),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_slot_value_truncates() {
        assert_eq!(slot_value(5.0), 5);
        assert_eq!(slot_value(3.9), 3);
        assert_eq!(slot_value(-2.5), -2);
        assert_eq!(slot_value(1e300), i64::MAX);
        assert_eq!(slot_value(-1e300), i64::MIN);
    }

    #[test]
    fn test_apply_updates_known_slot() {
        let store = SlotStore::new(40);
        let batch: UpdateBatch = [("k1", 5.0)].into_iter().collect();

        let applied = store.apply(&code("241"), &batch, 1_000);

        assert_eq!(applied, 1);
        assert_eq!(
            store.get("k1"),
            Some(Slot {
                gateway: "241".to_string(),
                value: 5,
                time: 1_000,
            })
        );
    }

    #[test]
    fn test_apply_skips_unknown_keys() {
        let store = SlotStore::new(2);
        let batch: UpdateBatch = [("k1", 10.0), ("kX", 1.0), ("k999", 3.0)]
            .into_iter()
            .collect();

        let applied = store.apply(&code("242"), &batch, 5);

        assert_eq!(applied, 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("kX").is_none());
        assert!(store.get("k999").is_none());
        assert_eq!(
            String::from_utf8(store.to_json().unwrap()).unwrap(),
            r#"{"k1":{"gateway":"242","value":10,"time":5},"k2":{"gateway":"","value":0,"time":0}}"#
        );
    }

    #[test]
    fn test_apply_time_never_goes_backwards() {
        let store = SlotStore::new(1);
        let batch: UpdateBatch = [("k1", 1.0)].into_iter().collect();

        store.apply(&code("241"), &batch, 2_000);
        store.apply(&code("243"), &batch, 1_500);

        let slot = store.get("k1").unwrap();
        assert_eq!(slot.gateway, "243");
        assert_eq!(slot.time, 2_000);
    }

    #[test]
    fn test_apply_now_stamps_wall_clock() {
        let store = SlotStore::new(1);
        let batch: UpdateBatch = [("k1", 1.0)].into_iter().collect();

        store.apply_now(&code("244"), &batch);
        let first = store.get("k1").unwrap().time;
        store.apply_now(&code("244"), &batch);
        let second = store.get("k1").unwrap().time;

        assert!(first > 0);
        assert!(second >= first);
    }

    #[test]
    fn test_concurrent_reports_keep_latest_time() {
        let store = std::sync::Arc::new(SlotStore::new(1));

        let handles: Vec<_> = (0..8i64)
            .map(|worker| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    let batch: UpdateBatch = [("k1", worker as f64)].into_iter().collect();
                    // Interleave rising and falling clocks across workers
                    for step in 0..500i64 {
                        let now = if worker % 2 == 0 { step } else { 1_000 - step };
                        store.apply(&code("241"), &batch, now);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("k1").unwrap().time, 1_000);
    }

    #[test]
    fn test_last_report_wins() {
        let store = SlotStore::new(1);

        store.apply(&code("241"), &[("k1", 1.0)].into_iter().collect(), 10);
        store.apply(&code("245"), &[("k1", 2.0)].into_iter().collect(), 20);

        let slot = store.get("k1").unwrap();
        assert_eq!(slot.gateway, "245");
        assert_eq!(slot.value, 2);
    }
}
