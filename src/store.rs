use crate::dlog;
use crate::slot::Slot;
use crate::types::{Coords, UnknownKind, WorkoutKind, WorkoutRecord};
use crate::workout::{ValidationError, Workout, validate, validate_coords};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Slot key holding the serialized workout list.
pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid workout input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("encoding workouts")]
    Encode(#[from] serde_json::Error),

    #[error("accessing persisted slot {key:?}")]
    Slot {
        key: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Ordered workouts, mirrored to a single slot after every change.
#[derive(Debug)]
pub struct WorkoutStore<S> {
    slot: S,
    workouts: Vec<Workout>,
}

impl<S: Slot> WorkoutStore<S> {
    /// Wraps `slot` and loads whatever it already holds.
    pub fn open(slot: S) -> Self {
        let mut store = Self {
            slot,
            workouts: Vec::new(),
        };
        let loaded = store.rehydrate();
        tracing::info!(workouts = loaded, "workout store ready");
        store
    }

    /// Validate, construct, append and persist a workout.
    ///
    /// `kind` is the form tag (`"running"` or `"cycling"`); `extra` is the
    /// cadence for running and the elevation gain for cycling. Nothing
    /// changes when an error is returned.
    pub fn add_workout(
        &mut self,
        kind: &str,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        extra: f64,
    ) -> Result<&Workout, StoreError> {
        let kind: WorkoutKind = kind.parse()?;
        validate_coords(coords)?;
        validate(kind, distance_km, duration_min, extra)?;

        let workout = Workout::from_validated(kind, coords, distance_km, duration_min, extra);
        let index = self.workouts.len();
        self.workouts.push(workout);

        if let Err(e) = self.persist() {
            self.workouts.truncate(index);
            return Err(e);
        }

        let added = &self.workouts[index];
        tracing::info!(
            id = %added.id(),
            kind = %kind,
            at = %coords,
            distance_km,
            duration_min,
            "workout added"
        );
        Ok(added)
    }

    /// Oldest first.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// Bump the interaction counter of `id` and persist.
    ///
    /// Returns the new count, or `None` when no workout has that id.
    pub fn record_interaction(&mut self, id: Uuid) -> Result<Option<u32>, StoreError> {
        let Some(index) = self.workouts.iter().position(|w| w.id() == id) else {
            dlog!("record_interaction miss id={id}");
            return Ok(None);
        };
        let before = self.workouts[index].clone();
        let count = self.workouts[index].record_interaction();

        if let Err(e) = self.persist() {
            self.workouts[index] = before;
            return Err(e);
        }
        Ok(Some(count))
    }

    /// Overwrite the slot with the full list.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let records: Vec<WorkoutRecord> = self.workouts.iter().map(WorkoutRecord::from).collect();
        let text = serde_json::to_string(&records)?;
        self.slot
            .set(WORKOUTS_KEY, &text)
            .map_err(|source| StoreError::Slot {
                key: WORKOUTS_KEY,
                source,
            })?;
        dlog!("persisted workouts={} bytes={}", records.len(), text.len());
        Ok(())
    }

    /// Replace the in-memory list with the slot's contents.
    ///
    /// A missing, unreadable or corrupt slot yields an empty list. Records
    /// that cannot be rebuilt are skipped. Returns how many were loaded.
    pub fn rehydrate(&mut self) -> usize {
        self.workouts = match self.slot.get(WORKOUTS_KEY) {
            Ok(Some(text)) => decode_workouts(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(err = %e, key = WORKOUTS_KEY, "reading persisted workouts failed; starting empty");
                Vec::new()
            }
        };
        self.workouts.len()
    }

    /// Clear the slot, then the in-memory list.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.slot
            .remove(WORKOUTS_KEY)
            .map_err(|source| StoreError::Slot {
                key: WORKOUTS_KEY,
                source,
            })?;
        let dropped = self.workouts.len();
        self.workouts.clear();
        tracing::info!(dropped, "workouts reset");
        Ok(())
    }

    pub const fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }
}

fn decode_workouts(text: &str) -> Vec<Workout> {
    let values: Vec<JsonValue> = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(err = %e, key = WORKOUTS_KEY, "persisted workouts are not a JSON array; ignoring");
            return Vec::new();
        }
    };

    let mut seen = HashSet::with_capacity(values.len());
    let mut out = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let record: WorkoutRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(index, err = %e, "skipping malformed workout record");
                continue;
            }
        };

        let workout = match Workout::try_from(record) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(index, err = %e, "skipping workout record");
                continue;
            }
        };

        if !seen.insert(workout.id()) {
            tracing::warn!(index, id = %workout.id(), "skipping duplicate workout id");
            continue;
        }

        out.push(workout);
    }

    out
}
