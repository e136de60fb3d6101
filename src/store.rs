use crate::dlog;
use crate::error::{Error, Result};
use crate::types::{Coords, WorkoutKind};
use crate::workout::{Workout, WorkoutFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Relative tolerance when checking stored derived metrics against the
/// primitives they were computed from.
const DERIVED_TOLERANCE: f64 = 1e-9;

/// Persisted form of one workout.
///
/// `pace`/`speed`/`description` are written for readability but never
/// trusted on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(rename = "createdAtISO")]
    pub created_at_iso: String,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub kind: WorkoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        Self {
            id: w.id().to_string(),
            created_at_iso: w.created_at().to_rfc3339(),
            coords: w.coords(),
            distance: w.distance(),
            duration: w.duration(),
            kind: w.kind(),
            cadence: w.cadence().map(f64::from),
            elevation_gain: w.elevation_gain(),
            pace: w.pace(),
            speed: w.speed(),
            description: Some(w.description().to_string()),
        }
    }
}

impl WorkoutRecord {
    /// Rebuild the workout, recomputing every derived field.
    pub fn into_workout(self) -> Result<Workout> {
        let corrupt = |reason: String| Error::CorruptRecord {
            id: self.id.clone(),
            reason,
        };

        let created_at = DateTime::parse_from_rfc3339(&self.created_at_iso)
            .map_err(|e| corrupt(format!("bad createdAtISO {:?}: {e}", self.created_at_iso)))?
            .with_timezone(&Utc);

        let fields = match self.kind {
            WorkoutKind::Running => WorkoutFields::Running {
                distance: self.distance,
                duration: self.duration,
                cadence: self
                    .cadence
                    .ok_or_else(|| corrupt("running record without cadence".into()))?,
            },
            WorkoutKind::Cycling => WorkoutFields::Cycling {
                distance: self.distance,
                duration: self.duration,
                elevation: self
                    .elevation_gain
                    .ok_or_else(|| corrupt("cycling record without elevationGain".into()))?,
            },
        };

        let w = Workout::with_identity(self.id.clone(), created_at, self.coords, fields)
            .map_err(|e| corrupt(e.to_string()))?;

        check_derived("pace", self.pace, w.pace()).map_err(corrupt)?;
        check_derived("speed", self.speed, w.speed()).map_err(corrupt)?;

        Ok(w)
    }
}

fn check_derived(
    name: &str,
    stored: Option<f64>,
    computed: Option<f64>,
) -> std::result::Result<(), String> {
    let (Some(s), Some(c)) = (stored, computed) else {
        return Ok(());
    };
    if (s - c).abs() <= DERIVED_TOLERANCE * c.abs().max(1.0) {
        Ok(())
    } else {
        Err(format!("stored {name} {s} contradicts computed {c}"))
    }
}

/// Result of [`WorkoutStore::restore`]: the rebuilt store plus every record
/// that was skipped.
#[derive(Debug)]
pub struct Restored {
    pub store: WorkoutStore,
    pub rejected: Vec<Error>,
}

/// Ordered workouts; insertion order is display order (most recent last).
#[derive(Debug, Clone, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub const fn new() -> Self {
        Self {
            workouts: Vec::new(),
        }
    }

    pub fn add(&mut self, workout: Workout) -> Result<()> {
        if self.position(workout.id()).is_some() {
            return Err(Error::DuplicateId(workout.id().to_string()));
        }
        dlog!("store_add id={} kind={}", workout.id(), workout.kind());
        self.workouts.push(workout);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Workout> {
        self.position(id)
            .map(|i| &self.workouts[i])
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Substitute in place, keeping the ordinal position.
    pub fn replace(&mut self, id: &str, workout: Workout) -> Result<()> {
        let i = self
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        dlog!("store_replace id={id} kind={}", workout.kind());
        self.workouts[i] = workout;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Workout> {
        let i = self
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        dlog!("store_remove id={id}");
        Ok(self.workouts.remove(i))
    }

    pub fn clear(&mut self) -> Vec<Workout> {
        std::mem::take(&mut self.workouts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    pub fn snapshot(&self) -> Vec<WorkoutRecord> {
        self.workouts.iter().map(WorkoutRecord::from).collect()
    }

    /// Serialized slot contents: a JSON array of records.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Rebuild from records. Bad records are skipped and reported, never fatal.
    pub fn restore(records: impl IntoIterator<Item = WorkoutRecord>) -> Restored {
        let mut store = Self::new();
        let mut rejected = Vec::new();

        for rec in records {
            let id = rec.id.clone();
            let outcome = rec.into_workout().and_then(|w| {
                store.add(w).map_err(|e| Error::CorruptRecord {
                    id: id.clone(),
                    reason: e.to_string(),
                })
            });
            if let Err(e) = outcome {
                tracing::warn!(id = %id, err = %e, "skipping persisted workout");
                rejected.push(e);
            }
        }

        Restored { store, rejected }
    }

    /// Parse slot contents. Only a non-array payload fails the whole restore;
    /// individual records that don't deserialize are rejected one by one.
    pub fn restore_json(json: &str) -> Result<Restored> {
        let values: Vec<JsonValue> = serde_json::from_str(json)?;
        let mut rejected = Vec::new();
        let mut records = Vec::with_capacity(values.len());

        for (i, v) in values.into_iter().enumerate() {
            let id = v
                .get("id")
                .and_then(JsonValue::as_str)
                .map_or_else(|| format!("#{i}"), str::to_string);
            match serde_json::from_value::<WorkoutRecord>(v) {
                Ok(r) => records.push(r),
                Err(e) => {
                    let e = Error::CorruptRecord {
                        id,
                        reason: e.to_string(),
                    };
                    tracing::warn!(err = %e, "skipping unreadable persisted workout");
                    rejected.push(e);
                }
            }
        }

        let mut restored = Self::restore(records);
        rejected.append(&mut restored.rejected);
        restored.rejected = rejected;
        Ok(restored)
    }
}
