use thiserror::Error;

/// Rejected form input. Nothing that fails here reaches the store.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("coordinates must look like LAT,LON, got {0:?}")]
    BadCoords(String),

    #[error("click on the map before submitting a workout")]
    NoLocation,

    #[error("no workout with id {0}")]
    UnknownWorkout(usize),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored value under {key:?} is not a valid workout list")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode workout list")]
    Encode(#[source] serde_json::Error),

    #[error("workout #{index} has an invalid date {raw:?}")]
    BadDate {
        index: usize,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("workout #{index} has a non-finite {field}")]
    NonFinite { index: usize, field: &'static str },

    #[error("key-value store failure")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
#[error("Could not load the map: {reason}")]
pub struct GeolocationError {
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("the map is not loaded")]
    MapNotLoaded,
}
