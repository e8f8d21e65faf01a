use crate::dlog;
use crate::error::{GeolocationError, InputError, PersistenceError, SessionError};
use crate::persistence::{KeyValueStore, PersistenceAdapter};
use crate::present::{self, ListItem, MapSurface, WORKOUT_ZOOM};
use crate::store::WorkoutStore;
use crate::types::{Activity, Coords, Workout, WorkoutType};
use chrono::{DateTime, SubsecRound, Utc};

/// Where the user is, for centering the map on startup.
pub trait Locator {
    fn locate(&self) -> Result<Coords, GeolocationError>;
}

/// A position known ahead of time, or none at all.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Option<Coords>);

impl Locator for FixedLocator {
    fn locate(&self) -> Result<Coords, GeolocationError> {
        self.0.ok_or_else(|| GeolocationError {
            reason: "position unavailable".to_string(),
        })
    }
}

/// Raw form fields, exactly as typed.
#[derive(Debug, Clone)]
pub struct WorkoutForm {
    pub kind: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl WorkoutForm {
    pub fn new(kind: WorkoutType) -> Self {
        Self {
            kind,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }

    /// Parses distance, duration and the field that matches `kind`.
    /// The other secondary field is ignored.
    pub fn validate(&self) -> Result<(f64, f64, Activity), InputError> {
        let distance = parse_positive("distance", &self.distance)?;
        let duration = parse_positive("duration", &self.duration)?;
        let activity = match self.kind {
            WorkoutType::Running => Activity::Running {
                cadence: parse_positive("cadence", &self.cadence)?,
            },
            WorkoutType::Cycling => Activity::Cycling {
                elevation_gain: parse_positive("elevation", &self.elevation)?,
            },
        };
        Ok((distance, duration, activity))
    }
}

fn parse_positive(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::MissingField { field });
    }

    let value = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            return Err(InputError::NotANumber {
                field,
                raw: raw.to_string(),
            });
        }
    };

    if value <= 0.0 {
        return Err(InputError::NotPositive { field, value });
    }
    Ok(value)
}

/// Everything one run of the app works on: the workouts, where they are
/// kept, the map, the rendered list and the last spot clicked on the map.
pub struct Session<K, M> {
    store: WorkoutStore,
    persistence: PersistenceAdapter<K>,
    map: Option<M>,
    list: Vec<ListItem>,
    pending: Option<Coords>,
}

impl<K: KeyValueStore, M: MapSurface> Session<K, M> {
    /// Restores stored workouts and renders them into the list.
    pub fn load(persistence: PersistenceAdapter<K>) -> Result<Self, PersistenceError> {
        let workouts = persistence.load_workouts()?;
        tracing::info!(workouts = workouts.len(), "loaded workouts");

        let mut store = WorkoutStore::new();
        store.replace_all(workouts);
        let list = present::render_list(store.all(), 0);

        Ok(Self {
            store,
            persistence,
            map: None,
            list,
            pending: None,
        })
    }

    /// Centers a new map on the user's position and puts every workout on
    /// it. Without a position there is no map and nothing can be placed.
    pub fn init_map<L, F>(&mut self, locator: &L, make_map: F) -> Result<(), GeolocationError>
    where
        L: Locator + ?Sized,
        F: FnOnce(Coords, u8) -> M,
    {
        let here = locator.locate().inspect_err(|e| {
            tracing::error!(err = %e, "geolocation failed");
        })?;

        let mut map = make_map(here, WORKOUT_ZOOM);
        present::render_markers(&mut map, self.store.all());
        dlog!("map ready center={here} markers={}", self.store.len());
        self.map = Some(map);
        Ok(())
    }

    /// A click on the map: remember where, and open an empty form.
    pub fn map_click(&mut self, coords: Coords) -> Result<(), SessionError> {
        if self.map.is_none() {
            return Err(SessionError::MapNotLoaded);
        }
        if !coords.is_valid() {
            return Err(InputError::BadCoords(format!("{},{}", coords.lat, coords.lon)).into());
        }
        dlog!("form opened at {coords}");
        self.pending = Some(coords);
        Ok(())
    }

    pub fn submit(&mut self, form: &WorkoutForm) -> Result<usize, SessionError> {
        self.submit_at(form, Utc::now())
    }

    /// Validates the form, stores the workout at the clicked spot, draws it,
    /// then saves the whole list. Returns the new workout's display id.
    ///
    /// Dates are kept to the millisecond so a reload gives back the same
    /// workout.
    ///
    /// The form is closed before saving. If the save fails the workout is
    /// still listed and drawn for this session, and submitting again needs a
    /// new map click.
    pub fn submit_at(
        &mut self,
        form: &WorkoutForm,
        date: DateTime<Utc>,
    ) -> Result<usize, SessionError> {
        let coords = self.pending.ok_or(InputError::NoLocation)?;
        let (distance, duration, activity) = form.validate().inspect_err(|e| {
            tracing::warn!(err = %e, "rejected workout form");
        })?;
        let map = self.map.as_mut().ok_or(SessionError::MapNotLoaded)?;

        let workout = Workout::new(distance, duration, activity, date.trunc_subsecs(3), coords);
        self.store.insert(workout);

        let id = self.store.len() - 1;
        let newest = self.store.last();
        present::render_markers(map, newest);
        self.list.extend(present::render_list(newest, id));

        present::recenter(map, coords);
        self.pending = None;
        self.persistence.save(self.store.all())?;

        tracing::info!(id, kind = %form.kind, "workout added");
        Ok(id)
    }

    /// Jumps the map to the workout behind a list item.
    pub fn go_to_workout(&mut self, display_id: usize) -> Result<Coords, SessionError> {
        let coords = self
            .store
            .get(display_id)
            .map(|w| w.coords)
            .ok_or(InputError::UnknownWorkout(display_id))?;
        let map = self.map.as_mut().ok_or(SessionError::MapNotLoaded)?;
        present::recenter(map, coords);
        Ok(coords)
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    /// Items rendered so far, in the order they were added to the list.
    pub fn list_view(&self) -> &[ListItem] {
        &self.list
    }

    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub const fn pending_location(&self) -> Option<Coords> {
        self.pending
    }

    pub const fn persistence(&self) -> &PersistenceAdapter<K> {
        &self.persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryKv;
    use crate::present::RecordingMap;
    use chrono::TimeZone;

    type TestSession = Session<MemoryKv, RecordingMap>;

    fn session() -> TestSession {
        let mut s = TestSession::load(PersistenceAdapter::new(MemoryKv::new())).unwrap();
        s.init_map(&FixedLocator(Some(Coords::new(40.4, -3.7))), RecordingMap::new)
            .unwrap();
        s
    }

    fn running_form(distance: &str, duration: &str, cadence: &str) -> WorkoutForm {
        WorkoutForm {
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            ..WorkoutForm::new(WorkoutType::Running)
        }
    }

    #[test]
    fn validate_rejects_bad_numbers() {
        assert_eq!(
            running_form("", "25", "180").validate(),
            Err(InputError::MissingField { field: "distance" })
        );
        assert_eq!(
            running_form("five", "25", "180").validate(),
            Err(InputError::NotANumber {
                field: "distance",
                raw: "five".into()
            })
        );
        assert_eq!(
            running_form("5", "0", "180").validate(),
            Err(InputError::NotPositive {
                field: "duration",
                value: 0.0
            })
        );
        assert!(matches!(
            running_form("5", "25", "NaN").validate(),
            Err(InputError::NotANumber { field: "cadence", .. })
        ));
    }

    #[test]
    fn validate_reads_field_for_the_chosen_type() {
        let form = WorkoutForm {
            distance: "12".into(),
            duration: "40".into(),
            cadence: "ignored".into(),
            elevation: " 250 ".into(),
            ..WorkoutForm::new(WorkoutType::Cycling)
        };
        assert_eq!(
            form.validate(),
            Ok((
                12.0,
                40.0,
                Activity::Cycling {
                    elevation_gain: 250.0
                }
            ))
        );
    }

    #[test]
    fn no_position_means_no_map() {
        let mut s = TestSession::load(PersistenceAdapter::new(MemoryKv::new())).unwrap();
        assert!(s.init_map(&FixedLocator(None), RecordingMap::new).is_err());
        assert!(s.map().is_none());
        assert!(matches!(
            s.map_click(Coords::new(1.0, 1.0)),
            Err(SessionError::MapNotLoaded)
        ));
    }

    #[test]
    fn submit_without_click_is_rejected() {
        let mut s = session();
        let err = s.submit(&running_form("5", "25", "180")).unwrap_err();
        assert!(matches!(err, SessionError::Input(InputError::NoLocation)));
        assert!(s.store().is_empty());
    }

    #[test]
    fn submit_inserts_renders_and_saves() {
        let mut s = session();
        let at = Coords::new(40.0, -3.0);
        s.map_click(at).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

        let id = s.submit_at(&running_form("5", "25", "180"), date).unwrap();

        assert_eq!(id, 0);
        assert_eq!(s.store().len(), 1);
        assert_eq!(s.list_view().len(), 1);
        assert!(s.list_view()[0].title.contains("March 10"));
        let map = s.map().unwrap();
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.center, at);
        assert!(s.pending_location().is_none());
        assert_eq!(s.persistence().load_workouts().unwrap(), s.store().all());
    }

    #[test]
    fn rejected_form_changes_nothing() {
        let mut s = session();
        s.map_click(Coords::new(40.0, -3.0)).unwrap();
        assert!(s.submit(&running_form("5", "-25", "180")).is_err());

        assert!(s.store().is_empty());
        assert!(s.list_view().is_empty());
        assert!(s.map().unwrap().markers.is_empty());
        assert!(s.persistence().load().unwrap().is_empty());
        assert!(s.pending_location().is_some());
    }

    #[test]
    fn go_to_workout_recenters_on_stored_coords() {
        let mut s = session();
        s.map_click(Coords::new(10.0, 10.0)).unwrap();
        s.submit(&running_form("5", "25", "180")).unwrap();
        s.map_click(Coords::new(20.0, 20.0)).unwrap();
        s.submit(&running_form("8", "45", "170")).unwrap();

        assert_eq!(s.go_to_workout(0).unwrap(), Coords::new(10.0, 10.0));
        assert_eq!(s.map().unwrap().center, Coords::new(10.0, 10.0));
        assert_eq!(s.map().unwrap().zoom, WORKOUT_ZOOM);
        assert!(matches!(
            s.go_to_workout(2),
            Err(SessionError::Input(InputError::UnknownWorkout(2)))
        ));
    }

    #[test]
    fn click_with_non_finite_coords_is_rejected() {
        let mut s = session();
        let err = s.map_click(Coords::new(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, SessionError::Input(InputError::BadCoords(_))));
        assert!(s.pending_location().is_none());
        assert!(matches!(
            s.submit(&running_form("5", "25", "180")),
            Err(SessionError::Input(InputError::NoLocation))
        ));
        assert!(s.persistence().load().unwrap().is_empty());
    }

    struct ReadOnlyKv;

    impl KeyValueStore for ReadOnlyKv {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Store(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn failed_save_closes_the_form() {
        let mut s: Session<ReadOnlyKv, RecordingMap> =
            Session::load(PersistenceAdapter::new(ReadOnlyKv)).unwrap();
        s.init_map(&FixedLocator(Some(Coords::new(0.0, 0.0))), RecordingMap::new)
            .unwrap();
        s.map_click(Coords::new(40.0, -3.0)).unwrap();

        let err = s.submit(&running_form("5", "25", "180")).unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert_eq!(s.store().len(), 1);
        assert!(s.pending_location().is_none());

        assert!(matches!(
            s.submit(&running_form("5", "25", "180")),
            Err(SessionError::Input(InputError::NoLocation))
        ));
        assert_eq!(s.store().len(), 1);
    }
}
