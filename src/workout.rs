use crate::error::ValidationError;
use crate::types::{Coords, FormValues, ListEntry, Popup, Stat, WorkoutKind};
use crate::utils::format_rate;
use chrono::{DateTime, Datelike, Local, Utc};
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

/// Unvalidated measurements for one workout kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutFields {
    Running {
        distance: f64,
        duration: f64,
        cadence: f64,
    },
    Cycling {
        distance: f64,
        duration: f64,
        elevation: f64,
    },
}

impl WorkoutFields {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Pick the inputs relevant to the selected kind.
    pub const fn from_form(v: &FormValues) -> Self {
        match v.kind {
            WorkoutKind::Running => Self::Running {
                distance: v.distance,
                duration: v.duration,
                cadence: v.cadence,
            },
            WorkoutKind::Cycling => Self::Cycling {
                distance: v.distance,
                duration: v.duration,
                elevation: v.elevation,
            },
        }
    }

    /// Validate without building a workout.
    pub fn check(self) -> Result<(), ValidationError> {
        self.validate().map(|_| ())
    }

    fn validate(self) -> Result<Measures, ValidationError> {
        match self {
            Self::Running {
                distance,
                duration,
                cadence,
            } => {
                finite("distance", distance)?;
                finite("duration", duration)?;
                finite("cadence", cadence)?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                positive("cadence", cadence)?;
                let cadence = whole_cadence(cadence)?;
                let pace = duration / distance;
                finite("pace", pace)?;
                Ok(Measures {
                    distance,
                    duration,
                    metrics: Metrics::Running { cadence, pace },
                })
            }
            // Elevation may be negative: only finiteness is checked.
            Self::Cycling {
                distance,
                duration,
                elevation,
            } => {
                finite("distance", distance)?;
                finite("duration", duration)?;
                finite("elevation", elevation)?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                let speed = distance / (duration / 60.0);
                finite("speed", speed)?;
                Ok(Measures {
                    distance,
                    duration,
                    metrics: Metrics::Cycling {
                        elevation_gain: elevation,
                        speed,
                    },
                })
            }
        }
    }
}

fn finite(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value: v })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_cadence(v: f64) -> Result<u32, ValidationError> {
    if v.fract() != 0.0 || v > f64::from(u32::MAX) {
        return Err(ValidationError::CadenceNotWhole { value: v });
    }
    Ok(v as u32)
}

struct Measures {
    distance: f64,
    duration: f64,
    metrics: Metrics,
}

/// Kind-specific intensity field plus its derived rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metrics {
    /// `pace` is min/km.
    Running { cadence: u32, pace: f64 },
    /// `speed` is km/h.
    Cycling { elevation_gain: f64, speed: f64 },
}

/// What an edit did to a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    SameKind,
    KindChanged { previous: WorkoutKind },
}

/// A logged running or cycling session.
///
/// Fields are read-only from outside; derived values (`pace`/`speed`,
/// `description`) are computed at construction and on every edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    metrics: Metrics,
}

impl Workout {
    pub fn running(
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(
            coords,
            WorkoutFields::Running {
                distance,
                duration,
                cadence,
            },
        )
    }

    pub fn cycling(
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(
            coords,
            WorkoutFields::Cycling {
                distance,
                duration,
                elevation,
            },
        )
    }

    /// New workout with a fresh id, stamped now.
    pub fn new(coords: Coords, fields: WorkoutFields) -> Result<Self, ValidationError> {
        Self::with_identity(Uuid::new_v4().to_string(), Utc::now(), coords, fields)
    }

    /// Build a workout around an existing identity (restore, replace).
    pub fn with_identity(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        fields: WorkoutFields,
    ) -> Result<Self, ValidationError> {
        let m = fields.validate()?;
        let description = describe(fields.kind(), created_at);
        Ok(Self {
            id,
            created_at,
            coords,
            distance: m.distance,
            duration: m.duration,
            description,
            metrics: m.metrics,
        })
    }

    /// Overwrite the measurements, keeping `id`, `created_at` and `coords`.
    ///
    /// On a validation error the workout is left untouched.
    pub fn apply_edit(&mut self, fields: WorkoutFields) -> Result<EditOutcome, ValidationError> {
        let m = fields.validate()?;
        let previous = self.kind();

        self.distance = m.distance;
        self.duration = m.duration;
        self.metrics = m.metrics;

        if previous == fields.kind() {
            return Ok(EditOutcome::SameKind);
        }
        self.description = describe(fields.kind(), self.created_at);
        Ok(EditOutcome::KindChanged { previous })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance(&self) -> f64 {
        self.distance
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.metrics {
            Metrics::Running { .. } => WorkoutKind::Running,
            Metrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { pace, .. } => Some(pace),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed, .. } => Some(speed),
            Metrics::Running { .. } => None,
        }
    }

    pub const fn cadence(&self) -> Option<u32> {
        match self.metrics {
            Metrics::Running { cadence, .. } => Some(cadence),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { elevation_gain, .. } => Some(elevation_gain),
            Metrics::Running { .. } => None,
        }
    }

    /// Current values, for pre-filling the edit form.
    pub fn form_values(&self) -> FormValues {
        let mut v = FormValues::empty(self.kind());
        v.distance = self.distance;
        v.duration = self.duration;
        match self.metrics {
            Metrics::Running { cadence, .. } => v.cadence = f64::from(cadence),
            Metrics::Cycling { elevation_gain, .. } => v.elevation = elevation_gain,
        }
        v
    }

    pub fn list_entry(&self) -> ListEntry {
        let kind = self.kind();
        let mut stats = vec![
            Stat {
                icon: kind.icon(),
                value: self.distance.to_string(),
                unit: "km",
            },
            Stat {
                icon: "⏱",
                value: self.duration.to_string(),
                unit: "min",
            },
        ];
        match self.metrics {
            Metrics::Running { cadence, pace } => {
                stats.push(Stat {
                    icon: "⚡️",
                    value: format_rate(pace),
                    unit: "min/km",
                });
                stats.push(Stat {
                    icon: "🦶🏼",
                    value: cadence.to_string(),
                    unit: "spm",
                });
            }
            Metrics::Cycling {
                elevation_gain,
                speed,
            } => {
                stats.push(Stat {
                    icon: "⚡️",
                    value: format_rate(speed),
                    unit: "km/h",
                });
                stats.push(Stat {
                    icon: "⛰",
                    value: elevation_gain.to_string(),
                    unit: "m",
                });
            }
        }

        ListEntry {
            id: self.id.clone(),
            kind,
            class: kind.entry_class(),
            title: self.description.clone(),
            stats,
        }
    }

    pub fn popup(&self) -> Popup {
        let kind = self.kind();
        Popup::sticky(
            format!("{} {}", kind.icon(), self.description),
            Some(kind.popup_class()),
        )
    }
}

/// `"<Kind> on <Month> <day>"`, dated in the local timezone.
pub fn describe(kind: WorkoutKind, at: DateTime<Utc>) -> String {
    describe_date(kind, &at.with_timezone(&Local))
}

fn describe_date(kind: WorkoutKind, date: &impl Datelike) -> String {
    format!("{} on {} {}", kind.label(), MONTHS[date.month0() as usize], date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    const HERE: Coords = Coords::new(10.0, 20.0);

    #[test]
    fn running_pace_is_duration_over_distance() {
        let w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        assert_eq!(w.pace(), Some(5.0));
        assert_eq!(w.cadence(), Some(178));
        assert_eq!(w.kind(), WorkoutKind::Running);

        let w = Workout::running(HERE, 3.7, 19.3, 160.0).unwrap();
        assert_eq!(w.pace(), Some(19.3 / 3.7));
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let w = Workout::cycling(HERE, 20.0, 60.0, 500.0).unwrap();
        assert_eq!(w.speed(), Some(20.0));

        let w = Workout::cycling(HERE, 27.0, 95.0, 120.0).unwrap();
        assert_eq!(w.speed(), Some(27.0 / (95.0 / 60.0)));
    }

    #[test]
    fn description_uses_creation_month_and_day() {
        let w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let local = w.created_at().with_timezone(&Local);
        assert_eq!(
            w.description(),
            format!("Running on {} {}", MONTHS[local.month0() as usize], local.day())
        );
    }

    #[test]
    fn description_follows_the_local_calendar_near_midnight() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 2, 0, 0).unwrap();

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            describe_date(WorkoutKind::Running, &at.with_timezone(&new_york)),
            "Running on March 6"
        );
        assert_eq!(
            describe_date(WorkoutKind::Running, &at),
            "Running on March 7"
        );

        let local = at.with_timezone(&Local).date_naive();
        assert_eq!(
            describe(WorkoutKind::Running, at),
            describe_date(WorkoutKind::Running, &local)
        );
    }

    #[test]
    fn rejects_metrics_that_overflow() {
        assert_eq!(
            Workout::running(HERE, 1e-320, 25.0, 178.0),
            Err(ValidationError::NotFinite { field: "pace" })
        );
        assert_eq!(
            Workout::cycling(HERE, f64::MAX, 1e-300, 0.0),
            Err(ValidationError::NotFinite { field: "speed" })
        );
    }

    #[test]
    fn rejects_non_finite_and_non_positive() {
        assert_eq!(
            Workout::running(HERE, f64::NAN, 25.0, 178.0),
            Err(ValidationError::NotFinite { field: "distance" })
        );
        assert_eq!(
            Workout::running(HERE, 5.0, 0.0, 178.0),
            Err(ValidationError::NotPositive {
                field: "duration",
                value: 0.0
            })
        );
        assert_eq!(
            Workout::running(HERE, 5.0, 25.0, -3.0),
            Err(ValidationError::NotPositive {
                field: "cadence",
                value: -3.0
            })
        );
        assert_eq!(
            Workout::running(HERE, 5.0, 25.0, 170.5),
            Err(ValidationError::CadenceNotWhole { value: 170.5 })
        );
        assert_eq!(
            Workout::cycling(HERE, 5.0, 25.0, f64::INFINITY),
            Err(ValidationError::NotFinite { field: "elevation" })
        );
    }

    #[test]
    fn cycling_allows_negative_elevation() {
        let w = Workout::cycling(HERE, 12.0, 40.0, -85.0).unwrap();
        assert_eq!(w.elevation_gain(), Some(-85.0));
    }

    #[test]
    fn same_kind_edit_recomputes_pace() {
        let mut w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let before = w.clone();

        let outcome = w
            .apply_edit(WorkoutFields::Running {
                distance: 10.0,
                duration: 25.0,
                cadence: 178.0,
            })
            .unwrap();

        assert_eq!(outcome, EditOutcome::SameKind);
        assert_eq!(w.id(), before.id());
        assert_eq!(w.created_at(), before.created_at());
        assert_eq!(w.coords(), before.coords());
        assert_eq!(w.cadence(), Some(178));
        assert_eq!(w.pace(), Some(2.5));
        assert_eq!(w.description(), before.description());
    }

    #[test]
    fn kind_change_edit_swaps_metrics() {
        let mut w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let id = w.id().to_string();

        let outcome = w
            .apply_edit(WorkoutFields::Cycling {
                distance: 20.0,
                duration: 60.0,
                elevation: 500.0,
            })
            .unwrap();

        assert_eq!(
            outcome,
            EditOutcome::KindChanged {
                previous: WorkoutKind::Running
            }
        );
        assert_eq!(w.id(), id);
        assert_eq!(w.cadence(), None);
        assert_eq!(w.pace(), None);
        assert_eq!(w.elevation_gain(), Some(500.0));
        assert_eq!(w.speed(), Some(20.0));
        assert!(w.description().starts_with("Cycling on "));
    }

    #[test]
    fn invalid_edit_leaves_workout_untouched() {
        let mut w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let before = w.clone();
        let err = w.apply_edit(WorkoutFields::Cycling {
            distance: -1.0,
            duration: 60.0,
            elevation: 0.0,
        });
        assert!(err.is_err());
        assert_eq!(w, before);
    }

    #[test]
    fn list_entry_and_popup_follow_kind() {
        let w = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let entry = w.list_entry();
        assert_eq!(entry.class, "workout--running");
        assert_eq!(entry.stats[0].value, "5");
        assert_eq!(entry.stats[2].value, "5.0");
        assert_eq!(entry.stats[2].unit, "min/km");
        assert_eq!(entry.stats[3].value, "178");

        let popup = w.popup();
        assert_eq!(popup.class.as_deref(), Some("running-popup"));
        assert!(popup.content.ends_with(w.description()));
    }

    #[test]
    fn form_values_round_trip_through_fields() {
        let w = Workout::cycling(HERE, 20.0, 60.0, 500.0).unwrap();
        let fields = WorkoutFields::from_form(&w.form_values());
        assert_eq!(
            fields,
            WorkoutFields::Cycling {
                distance: 20.0,
                duration: 60.0,
                elevation: 500.0
            }
        );
    }
}
