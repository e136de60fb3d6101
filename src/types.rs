use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude/longitude pair. Persisted as a two-element array.
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
        write!(f, "[{:.5}, {:.5}]", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase tag, used for persisted `kind` and CSS-like class names.
    pub const fn as_str(self) -> &'static str {
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

    pub fn entry_class(self) -> String {
        format!("workout--{}", self.as_str())
    }

    pub fn popup_class(self) -> String {
        format!("{}-popup", self.as_str())
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Focusable inputs of the workout form, in tab order.
///
/// `Intensity` is cadence for running and elevation gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Distance,
    Duration,
    Intensity,
}

impl FormField {
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Distance => Some(Self::Duration),
            Self::Duration => Some(Self::Intensity),
            Self::Intensity => None,
        }
    }
}

/// Raw values of a submitted form. Both intensity inputs are carried; only
/// the one matching `kind` is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormValues {
    pub kind: WorkoutKind,
    pub distance: f64,
    pub duration: f64,
    pub cadence: f64,
    pub elevation: f64,
}

impl FormValues {
    /// Blank form; unset numbers are NaN so they fail validation.
    pub const fn empty(kind: WorkoutKind) -> Self {
        Self {
            kind,
            distance: f64::NAN,
            duration: f64::NAN,
            cadence: f64::NAN,
            elevation: f64::NAN,
        }
    }
}

/// One icon/value/unit cell of a list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// Rendered content of a workout's list entry. `id` is the correlation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub class: String,
    pub title: String,
    pub stats: Vec<Stat>,
}

/// Popup bound to a map marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub class: Option<String>,
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Popup {
    pub fn sticky(content: impl Into<String>, class: Option<String>) -> Self {
        Self {
            content: content.into(),
            class,
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub animate: bool,
    pub pan_duration_secs: f64,
}
