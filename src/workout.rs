use crate::types::{Coords, UnknownKind, WorkoutKind, WorkoutRecord};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Minutes per kilometre.
pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// Kilometres per hour.
pub fn speed_km_per_h(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// "Running on October 19" style title.
pub fn describe(kind: WorkoutKind, date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {month} {}", kind.label(), date.day())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be a whole number")]
    NotWhole { field: &'static str },
}

/// Check raw form input for a workout of `kind`.
///
/// All three values must be finite. Distance and duration must be strictly
/// positive. Cadence must also be positive and whole; elevation gain may be
/// zero but not negative.
pub fn validate(
    kind: WorkoutKind,
    distance_km: f64,
    duration_min: f64,
    extra: f64,
) -> Result<(), ValidationError> {
    let inputs = [
        ("distance", distance_km),
        ("duration", duration_min),
        (kind.extra_field(), extra),
    ];

    if let Some(&(field, _)) = inputs.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValidationError::NotFinite { field });
    }

    let must_be_positive = match kind {
        WorkoutKind::Running => &inputs[..],
        WorkoutKind::Cycling => &inputs[..2],
    };
    if let Some(&(field, _)) = must_be_positive.iter().find(|(_, v)| *v <= 0.0) {
        return Err(ValidationError::NotPositive { field });
    }

    let field = kind.extra_field();
    match kind {
        WorkoutKind::Running if extra.fract() != 0.0 || extra > f64::from(u32::MAX) => {
            Err(ValidationError::NotWhole { field })
        }
        WorkoutKind::Cycling if extra < 0.0 => Err(ValidationError::Negative { field }),
        _ => Ok(()),
    }
}

/// Both halves of a map coordinate must be finite; non-finite values do not
/// survive the JSON slot.
pub fn validate_coords(coords: Coords) -> Result<(), ValidationError> {
    if !coords.lat.is_finite() {
        return Err(ValidationError::NotFinite { field: "latitude" });
    }
    if !coords.lng.is_finite() {
        return Err(ValidationError::NotFinite { field: "longitude" });
    }
    Ok(())
}

/// Variant payload: the caller-supplied extra input plus the derived metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running {
        cadence_spm: u32,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl Activity {
    pub fn running(distance_km: f64, duration_min: f64, cadence_spm: u32) -> Self {
        Self::Running {
            cadence_spm,
            pace_min_per_km: pace_min_per_km(distance_km, duration_min),
        }
    }

    pub fn cycling(distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self::Cycling {
            elevation_gain_m,
            speed_km_per_h: speed_km_per_h(distance_km, duration_min),
        }
    }

    /// `extra` must already have passed [`validate`] for `kind`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn for_kind(kind: WorkoutKind, distance_km: f64, duration_min: f64, extra: f64) -> Self {
        match kind {
            WorkoutKind::Running => Self::running(distance_km, duration_min, extra as u32),
            WorkoutKind::Cycling => Self::cycling(distance_km, duration_min, extra),
        }
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A logged session. Everything except the interaction counter is fixed
/// at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: Uuid,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    interaction_count: u32,
    activity: Activity,
}

impl Workout {
    #[cfg(test)]
    pub(crate) fn running(coords: Coords, distance_km: f64, duration_min: f64, cadence_spm: u32) -> Self {
        let activity = Activity::running(distance_km, duration_min, cadence_spm);
        Self::assemble(Uuid::new_v4(), Utc::now(), coords, distance_km, duration_min, activity)
    }

    #[cfg(test)]
    pub(crate) fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        let activity = Activity::cycling(distance_km, duration_min, elevation_gain_m);
        Self::assemble(Uuid::new_v4(), Utc::now(), coords, distance_km, duration_min, activity)
    }

    /// Build a workout from a tag-dispatched form input that already passed
    /// [`validate`].
    pub(crate) fn from_validated(
        kind: WorkoutKind,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        extra: f64,
    ) -> Self {
        let activity = Activity::for_kind(kind, distance_km, duration_min, extra);
        Self::assemble(Uuid::new_v4(), Utc::now(), coords, distance_km, duration_min, activity)
    }

    fn assemble(
        id: Uuid,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        activity: Activity,
    ) -> Self {
        let local_date = created_at.with_timezone(&Local).date_naive();
        Self {
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            description: describe(activity.kind(), local_date),
            interaction_count: 0,
            activity,
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn interaction_count(&self) -> u32 {
        self.interaction_count
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    pub const fn pace_min_per_km(&self) -> Option<f64> {
        match self.activity {
            Activity::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn speed_km_per_h(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            Activity::Running { .. } => None,
        }
    }

    /// Count one user interaction (e.g. locating the workout on the map).
    pub fn record_interaction(&mut self) -> u32 {
        self.interaction_count = self.interaction_count.saturating_add(1);
        self.interaction_count
    }

    /// Marker popup text.
    pub fn popup_label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }

    /// One line for the workout list.
    pub fn summary_row(&self) -> String {
        let head = format!(
            "{} | {} km | {} min",
            self.description, self.distance_km, self.duration_min
        );
        match self.activity {
            Activity::Running {
                cadence_spm,
                pace_min_per_km,
            } => format!("{head} | {pace_min_per_km:.1} min/km | {cadence_spm} spm"),
            Activity::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => format!("{head} | {speed_km_per_h:.1} km/h | {elevation_gain_m} m"),
        }
    }
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let mut record = Self {
            id: w.id,
            created_at: w.created_at,
            coordinates: w.coords,
            distance_km: w.distance_km,
            duration_min: w.duration_min,
            kind: w.kind().tag().to_string(),
            description: w.description.clone(),
            interaction_count: w.interaction_count,
            cadence_spm: None,
            pace_min_per_km: None,
            elevation_gain_m: None,
            speed_km_per_h: None,
        };

        match w.activity {
            Activity::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                record.cadence_spm = Some(cadence_spm);
                record.pace_min_per_km = Some(pace_min_per_km);
            }
            Activity::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                record.elevation_gain_m = Some(elevation_gain_m);
                record.speed_km_per_h = Some(speed_km_per_h);
            }
        }

        record
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),
    #[error("{kind} record is missing {field}")]
    MissingField {
        kind: WorkoutKind,
        field: &'static str,
    },
    #[error("invalid {kind} record: {source}")]
    Invalid {
        kind: WorkoutKind,
        #[source]
        source: ValidationError,
    },
}

/// Rebuilds a live workout from its persisted record.
///
/// The variant is chosen from `type` and the derived metric is recomputed
/// from the stored inputs; stored derived values are ignored. Identity,
/// timestamp, description and interaction count are kept as stored.
impl TryFrom<WorkoutRecord> for Workout {
    type Error = RecordError;

    fn try_from(record: WorkoutRecord) -> Result<Self, Self::Error> {
        let kind: WorkoutKind = record.kind.parse()?;

        let extra = match kind {
            WorkoutKind::Running => record.cadence_spm.map(f64::from).ok_or(
                RecordError::MissingField {
                    kind,
                    field: "cadenceSpm",
                },
            )?,
            WorkoutKind::Cycling => record.elevation_gain_m.ok_or(RecordError::MissingField {
                kind,
                field: "elevationGainM",
            })?,
        };

        validate_coords(record.coordinates)
            .and_then(|()| validate(kind, record.distance_km, record.duration_min, extra))
            .map_err(|source| RecordError::Invalid { kind, source })?;

        let activity = Activity::for_kind(kind, record.distance_km, record.duration_min, extra);
        let mut workout = Self::assemble(
            record.id,
            record.created_at,
            record.coordinates,
            record.distance_km,
            record.duration_min,
            activity,
        );
        if !record.description.is_empty() {
            workout.description = record.description;
        }
        workout.interaction_count = record.interaction_count;

        Ok(workout)
    }
}
