//! CSV and JSON exports of a simulation result
//!
//! Both formats cover only the retained sample events, never the full
//! population.

use crate::error::BeamResult;
use crate::runtime::SimulationResult;

pub const CSV_HEADER: &str = "eventId,momentum,beta,gamma,timeOfFlight,survived,decayPosition";

/// Serde adapter writing `+∞` as `null` and reading `null` back as `+∞`.
/// JSON has no infinity, and stable species have an infinite decay length.
pub mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One header row plus one row per retained event; absent values are empty
pub fn to_csv(result: &SimulationResult) -> String {
    let mut csv = String::with_capacity(64 * (result.events.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for event in &result.events {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            event.id,
            event.actual_momentum,
            event.beta,
            event.gamma,
            optional(event.time_of_flight),
            event.survived,
            optional(event.decay_position),
        ));
    }
    csv
}

/// Full result as pretty-printed JSON
pub fn to_json(result: &SimulationResult) -> BeamResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn from_json(text: &str) -> BeamResult<SimulationResult> {
    Ok(serde_json::from_str(text)?)
}

/// Write the CSV export to disk
pub fn write_csv(result: &SimulationResult, path: impl AsRef<std::path::Path>) -> BeamResult<()> {
    std::fs::write(path, to_csv(result))?;
    Ok(())
}

/// Write the JSON export to disk
pub fn write_json(result: &SimulationResult, path: impl AsRef<std::path::Path>) -> BeamResult<()> {
    std::fs::write(path, to_json(result)?)?;
    Ok(())
}
