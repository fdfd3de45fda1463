use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A point on the map, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase tag used in forms and persisted records.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Name of the variant-specific input, as shown in validation errors.
    pub const fn extra_field(self) -> &'static str {
        match self {
            Self::Running => "cadence",
            Self::Cycling => "elevation gain",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown workout type {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for WorkoutKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Persisted shape of one workout.
///
/// `type` stays a plain string so that a record with an unknown tag can be
/// reported and skipped instead of failing the whole slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub coordinates: Coords,
    pub distance_km: f64,
    pub duration_min: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interaction_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_km_per_h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_known_tags_only() {
        assert_eq!("running".parse::<WorkoutKind>(), Ok(WorkoutKind::Running));
        assert_eq!("cycling".parse::<WorkoutKind>(), Ok(WorkoutKind::Cycling));

        let err = "Running".parse::<WorkoutKind>().unwrap_err();
        assert_eq!(err, UnknownKind("Running".to_string()));
    }

    #[test]
    fn coords_serialize_as_lat_lng_pair() {
        let c = Coords::new(51.5, -0.125);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[51.5,-0.125]");

        let back: Coords = serde_json::from_str("[51.5,-0.125]").unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn record_uses_camel_case_and_omits_absent_variant_fields() {
        let record = WorkoutRecord {
            id: Uuid::nil(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            coordinates: Coords::new(1.0, 2.0),
            distance_km: 5.0,
            duration_min: 30.0,
            kind: "running".to_string(),
            description: "Running on January 1".to_string(),
            interaction_count: 0,
            cadence_spm: Some(80),
            pace_min_per_km: Some(6.0),
            elevation_gain_m: None,
            speed_km_per_h: None,
        };

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["type"], "running");
        assert_eq!(v["distanceKm"], 5.0);
        assert_eq!(v["cadenceSpm"], 80);
        assert_eq!(v["coordinates"], serde_json::json!([1.0, 2.0]));
        assert!(v.get("elevationGainM").is_none());
        assert!(v.get("speedKmPerH").is_none());
    }
}
