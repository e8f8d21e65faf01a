use crate::types::Workout;

/// Workouts of the current session, in insertion order.
///
/// A workout's position is its display id. Ids are not persisted; they are
/// whatever the position is after the list is loaded.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    /// Drops everything held and takes `workouts` as the new sequence.
    pub fn replace_all(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }

    pub fn get(&self, display_id: usize) -> Option<&Workout> {
        self.workouts.get(display_id)
    }

    /// The newest workout as a one-element slice, or empty.
    pub fn last(&self) -> &[Workout] {
        let start = self.workouts.len().saturating_sub(1);
        &self.workouts[start..]
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}
