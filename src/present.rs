//! Projections of a workout slice onto the list view and the map.
//!
//! Both are read-only over the slice they are given. Callers pass either the
//! whole store (on load) or just the newest workout (after a submit).

use crate::types::{Coords, Workout, WorkoutType};
use std::fmt;

/// Zoom used when the map jumps to a workout.
pub const WORKOUT_ZOOM: u8 = 13;

/// The map widget, as far as the presenter cares.
pub trait MapSurface {
    fn add_marker(&mut self, coords: Coords, popup: &str);
    fn set_view(&mut self, coords: Coords, zoom: u8);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: String,
}

/// A map surface that only remembers what was drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMap {
    pub center: Coords,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

impl RecordingMap {
    pub const fn new(center: Coords, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            markers: Vec::new(),
        }
    }
}

impl MapSurface for RecordingMap {
    fn add_marker(&mut self, coords: Coords, popup: &str) {
        tracing::trace!(%coords, popup, "marker");
        self.markers.push(Marker {
            coords,
            popup: popup.to_string(),
        });
    }

    fn set_view(&mut self, coords: Coords, zoom: u8) {
        tracing::trace!(%coords, zoom, "set view");
        self.center = coords;
        self.zoom = zoom;
    }
}

/// One marker per workout, popup = description. No dedup.
pub fn render_markers<M: MapSurface + ?Sized>(map: &mut M, workouts: &[Workout]) {
    for w in workouts {
        map.add_marker(w.coords, &w.description());
    }
}

pub fn recenter<M: MapSurface + ?Sized>(map: &mut M, coords: Coords) {
    map.set_view(coords, WORKOUT_ZOOM);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: impl ToString, unit: &'static str) -> Self {
        Self {
            icon,
            value: value.to_string(),
            unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Index of the workout in the store.
    pub display_id: usize,
    pub kind: WorkoutType,
    pub title: String,
    pub details: Vec<Detail>,
}

impl ListItem {
    pub fn from_workout(display_id: usize, w: &Workout) -> Self {
        let kind = w.kind();
        let extra = match kind {
            WorkoutType::Cycling => Detail::new("\u{26F0}", w.value(), "m"),
            WorkoutType::Running => Detail::new("\u{1F9B6}\u{1F3FC}", w.value(), "spm"),
        };

        Self {
            display_id,
            kind,
            title: w.description(),
            details: vec![
                Detail::new(kind.emoji(), w.distance, "km"),
                Detail::new("\u{23F1}", w.duration, "min"),
                Detail::new("\u{26A1}\u{FE0F}", w.average_speed(), "km/min"),
                extra,
            ],
        }
    }

    pub fn class_name(&self) -> String {
        format!("workout--{}", self.kind)
    }

    /// The type-specific row (elevation or cadence).
    pub fn extra(&self) -> &Detail {
        &self.details[self.details.len() - 1]
    }

    pub fn to_html(&self) -> String {
        use std::fmt::Write;

        let mut html = format!(
            "<li class=\"workout {}\" data-workout-id=\"{}\">\n  <h2 class=\"workout__title\">{}</h2>\n",
            self.class_name(),
            self.display_id,
            self.title
        );
        for d in &self.details {
            let _ = write!(
                html,
                "  <div class=\"workout__details\">\n    <span class=\"workout__icon\">{}</span>\n    <span class=\"workout__value\">{}</span>\n    <span class=\"workout__unit\">{}</span>\n  </div>\n",
                d.icon, d.value, d.unit
            );
        }
        html.push_str("</li>");
        html
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.display_id, self.title)?;
        for d in &self.details {
            write!(f, " | {} {} {}", d.icon, d.value, d.unit)?;
        }
        Ok(())
    }
}

/// List items for `workouts`, where `workouts[0]` sits at `first_id` in the
/// store. Ids are positions, so they always index back into the store.
pub fn render_list(workouts: &[Workout], first_id: usize) -> Vec<ListItem> {
    workouts
        .iter()
        .enumerate()
        .map(|(i, w)| ListItem::from_workout(first_id + i, w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, CYCLIST_EMOJI, RUNNER_EMOJI};
    use chrono::{TimeZone, Utc};

    fn workouts() -> Vec<Workout> {
        let date = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap();
        vec![
            Workout::new(
                5.0,
                25.0,
                Activity::Running { cadence: 180.0 },
                date,
                Coords::new(40.0, -3.0),
            ),
            Workout::new(
                30.0,
                90.0,
                Activity::Cycling {
                    elevation_gain: 450.0,
                },
                date,
                Coords::new(41.0, -2.0),
            ),
        ]
    }

    #[test]
    fn list_items_carry_type_specific_rows() {
        let items = render_list(&workouts(), 0);

        let run = &items[0];
        assert_eq!(run.class_name(), "workout--running");
        assert_eq!(run.extra().icon, "\u{1F9B6}\u{1F3FC}");
        assert_eq!(run.extra().unit, "spm");
        assert_eq!(run.extra().value, "180");
        assert_eq!(run.details[0].icon, RUNNER_EMOJI);
        assert_eq!(run.details[0].value, "5");
        assert_eq!(run.details[1].value, "25");
        assert_eq!(run.details[2].value, "0.20");

        let ride = &items[1];
        assert_eq!(ride.class_name(), "workout--cycling");
        assert_eq!(ride.extra().icon, "\u{26F0}");
        assert_eq!(ride.extra().unit, "m");
        assert_eq!(ride.extra().value, "450");
        assert_eq!(ride.details[0].icon, CYCLIST_EMOJI);
    }

    #[test]
    fn display_ids_follow_store_positions_on_every_render() {
        let ws = workouts();
        for _ in 0..3 {
            let ids: Vec<usize> = render_list(&ws, 0).iter().map(|i| i.display_id).collect();
            assert_eq!(ids, vec![0, 1]);
        }
        let tail = render_list(&ws[1..], 1);
        assert_eq!(tail[0].display_id, 1);
    }

    #[test]
    fn markers_are_not_deduplicated() {
        let ws = workouts();
        let mut map = RecordingMap::new(Coords::new(0.0, 0.0), 13);
        render_markers(&mut map, &ws);
        render_markers(&mut map, &ws[..1]);

        assert_eq!(map.markers.len(), 3);
        assert_eq!(map.markers[0], map.markers[2]);
        assert_eq!(map.markers[1].coords, Coords::new(41.0, -2.0));
        assert!(map.markers[0].popup.contains("March 10"));
    }

    #[test]
    fn recenter_uses_workout_zoom() {
        let mut map = RecordingMap::new(Coords::new(0.0, 0.0), 5);
        recenter(&mut map, Coords::new(40.0, -3.0));
        assert_eq!(map.center, Coords::new(40.0, -3.0));
        assert_eq!(map.zoom, WORKOUT_ZOOM);
    }

    #[test]
    fn html_block_has_id_and_class() {
        let item = &render_list(&workouts(), 4)[1];
        let html = item.to_html();
        assert!(html.starts_with("<li class=\"workout workout--cycling\" data-workout-id=\"5\">"));
        assert!(html.contains("<span class=\"workout__unit\">m</span>"));
        assert!(html.ends_with("</li>"));
        assert_eq!(html.matches("workout__details").count(), 4);
    }

    #[test]
    fn display_line_lists_every_detail() {
        let item = &render_list(&workouts(), 0)[0];
        let line = item.to_string();
        assert!(line.starts_with("[0] "));
        assert!(line.contains("0.20 km/min"));
        assert!(line.ends_with("180 spm"));
    }
}
