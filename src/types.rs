use crate::error::InputError;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// indexed by zero-based month
pub const MONTHS: [&str; 12] = [
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

pub const RUNNER_EMOJI: &str = "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}";
pub const CYCLIST_EMOJI: &str = "\u{1F6B4}\u{200D}\u{2640}\u{FE0F}";

/// A point on the map. Serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

impl Coords {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both numbers finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lon]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

/// Accepts `LAT,LON` with optional whitespace around either number.
impl FromStr for Coords {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InputError::BadCoords(s.to_string());

        let (lat, lon) = s.split_once(',').ok_or_else(bad)?;
        let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
        let lon: f64 = lon.trim().parse().map_err(|_| bad())?;

        let coords = Self { lat, lon };
        if !coords.is_valid() {
            return Err(bad());
        }

        Ok(coords)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Running => RUNNER_EMOJI,
            Self::Cycling => CYCLIST_EMOJI,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was done, together with the metric that only makes sense for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    /// Steps per minute.
    Running { cadence: f64 },
    /// Meters climbed.
    Cycling { elevation_gain: f64 },
}

impl Activity {
    pub const fn kind(self) -> WorkoutType {
        match self {
            Self::Running { .. } => WorkoutType::Running,
            Self::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    pub const fn value(self) -> f64 {
        match self {
            Self::Running { cadence } => cadence,
            Self::Cycling { elevation_gain } => elevation_gain,
        }
    }

    pub const fn from_parts(kind: WorkoutType, value: f64) -> Self {
        match kind {
            WorkoutType::Running => Self::Running { cadence: value },
            WorkoutType::Cycling => Self::Cycling {
                elevation_gain: value,
            },
        }
    }
}

/// One logged activity. Never mutated once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    /// Kilometers.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    pub activity: Activity,
    pub date: DateTime<Utc>,
    pub coords: Coords,
}

impl Workout {
    pub const fn new(
        distance: f64,
        duration: f64,
        activity: Activity,
        date: DateTime<Utc>,
        coords: Coords,
    ) -> Self {
        Self {
            distance,
            duration,
            activity,
            date,
            coords,
        }
    }

    pub const fn kind(&self) -> WorkoutType {
        self.activity.kind()
    }

    pub const fn value(&self) -> f64 {
        self.activity.value()
    }

    /// e.g. `🏃‍♂️ Running on March 10`. The calendar day is taken in UTC.
    pub fn description(&self) -> String {
        let kind = self.kind();
        let month = MONTHS[self.date.month0() as usize];
        format!(
            "{} {} on {month} {}",
            kind.emoji(),
            kind.title(),
            self.date.day()
        )
    }

    /// Distance over duration, two decimals. Zero duration gives `inf`/`NaN`.
    pub fn average_speed(&self) -> String {
        format!("{:.2}", self.distance / self.duration)
    }

    /// The first numeric field that JSON cannot hold, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("distance", self.distance),
            ("duration", self.duration),
            ("value", self.value()),
            ("lat", self.coords.lat),
            ("lon", self.coords.lon),
        ]
        .into_iter()
        .find_map(|(name, v)| (!v.is_finite()).then_some(name))
    }

    pub fn to_record(&self) -> WorkoutRecord {
        WorkoutRecord {
            distance: self.distance,
            duration: self.duration,
            kind: self.kind(),
            value: self.value(),
            date: self.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            coords: self.coords,
        }
    }

    /// Rebuilds a workout from its stored record, parsing the ISO date.
    pub fn from_record(record: &WorkoutRecord) -> Result<Self, chrono::ParseError> {
        let date = DateTime::parse_from_rfc3339(&record.date)?.with_timezone(&Utc);
        Ok(Self {
            distance: record.distance,
            duration: record.duration,
            activity: Activity::from_parts(record.kind, record.value),
            date,
            coords: record.coords,
        })
    }
}

/// The stored shape of a workout: `type` + `value` instead of a tagged
/// activity, and the date as an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub distance: f64,
    pub duration: f64,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub value: f64,
    pub date: String,
    pub coords: Coords,
}
