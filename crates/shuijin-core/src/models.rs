//! Slot model

use serde::{Deserialize, Serialize};

/// Last reported state of one slot
///
/// A freshly provisioned slot is all zero values: empty gateway, value 0
/// and time 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Code of the gateway that reported this slot last
    pub gateway: String,
    /// Last reported value
    pub value: i64,
    /// Time of the last report, milliseconds since the Unix epoch
    pub time: i64,
}

/// Key of the `n`-th provisioned slot (1-based): `k1`, `k2`, ...
pub fn slot_key(n: usize) -> String {
    format!("k{}", n)
}
