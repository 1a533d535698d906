use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod validation;
#[cfg(test)]
mod tests;

pub use validation::{admit, AdmissionError};

/// PositionUpdate is an immutable, accepted location sample.
///
/// Producers submit `lat`/`lng` plus whatever metadata they like; the metadata
/// rides along untouched in `extra`. `received_at_ms` and `ip` are stamped at
/// admission and always win over caller-supplied values of the same name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Latitude in decimal degrees
    pub lat: f64,

    /// Longitude in decimal degrees
    pub lng: f64,

    /// Unix epoch milliseconds at acceptance
    pub received_at_ms: i64,

    /// Best-effort producer address (forwarded header, else raw peer).
    /// Serialized as `null` when no signal was available.
    pub ip: Option<String>,

    /// Caller-supplied metadata, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
