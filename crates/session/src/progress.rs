//! Per-session set bookkeeping.

use liftvox_workout::{Exercise, ExerciseOutcome, SetRecord};

/// Stable handle to an exercise in an [`ExerciseProgressStore`].
///
/// Equal to the exercise's declaration position; names are for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseId(usize);

impl ExerciseId {
    pub fn position(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    exercise: Exercise,
    sets: Vec<SetRecord>,
}

/// Sets recorded during the current session, one slot per exercise in
/// declaration order. Always starts empty, whatever earlier sessions did.
#[derive(Debug, Clone)]
pub struct ExerciseProgressStore {
    slots: Vec<Slot>,
}

impl ExerciseProgressStore {
    pub fn new(exercises: impl IntoIterator<Item = Exercise>) -> Self {
        Self {
            slots: exercises
                .into_iter()
                .map(|exercise| Slot {
                    exercise,
                    sets: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ExerciseId> + '_ {
        (0..self.slots.len()).map(ExerciseId)
    }

    pub fn find(&self, name: &str) -> Option<ExerciseId> {
        self.slots
            .iter()
            .position(|slot| slot.exercise.name == name)
            .map(ExerciseId)
    }

    pub fn exercise(&self, id: ExerciseId) -> &Exercise {
        &self.slots[id.0].exercise
    }

    pub fn name(&self, id: ExerciseId) -> &str {
        &self.slots[id.0].exercise.name
    }

    pub fn sets_for(&self, id: ExerciseId) -> &[SetRecord] {
        &self.slots[id.0].sets
    }

    /// Appends `record` and returns the new set count.
    ///
    /// No capacity check: callers consult [`Self::is_complete`] or
    /// [`Self::next_incomplete`] first.
    pub fn add_set(&mut self, id: ExerciseId, record: SetRecord) -> usize {
        let sets = &mut self.slots[id.0].sets;
        sets.push(record);
        sets.len()
    }

    pub fn is_complete(&self, id: ExerciseId) -> bool {
        let slot = &self.slots[id.0];
        slot.sets.len() >= slot.exercise.target_sets as usize
    }

    /// 1-based ordinal of the next set for `id`.
    pub fn next_set_number(&self, id: ExerciseId) -> u32 {
        self.slots[id.0].sets.len() as u32 + 1
    }

    /// First exercise in declaration order still short of its target.
    pub fn next_incomplete(&self) -> Option<ExerciseId> {
        self.ids().find(|&id| !self.is_complete(id))
    }

    pub fn all_complete(&self) -> bool {
        self.next_incomplete().is_none()
    }

    pub fn completion_percent(&self, id: ExerciseId) -> u8 {
        let slot = &self.slots[id.0];
        percent(slot.sets.len(), slot.exercise.target_sets as usize)
    }

    /// Recorded sets over targeted sets, with each exercise capped at its
    /// target so extra sets on one exercise do not mask missing ones.
    pub fn overall_completion_percent(&self) -> u8 {
        let (done, target) = self.slots.iter().fold((0, 0), |(done, target), slot| {
            let wanted = slot.exercise.target_sets as usize;
            (done + slot.sets.len().min(wanted), target + wanted)
        });
        percent(done, target)
    }

    /// Replaces the "last time" reference of `id`. Recorded sets are untouched.
    pub fn set_previous_sets(&mut self, id: ExerciseId, sets: Vec<SetRecord>) {
        self.slots[id.0].exercise.previous_sets = sets;
    }

    /// Progress merged with each exercise's target, in declaration order.
    pub fn snapshot(&self) -> Vec<ExerciseOutcome> {
        self.slots
            .iter()
            .map(|slot| ExerciseOutcome {
                name: slot.exercise.name.clone(),
                target_sets: slot.exercise.target_sets,
                recorded_sets: slot.sets.clone(),
            })
            .collect()
    }
}

fn percent(done: usize, target: usize) -> u8 {
    if target == 0 {
        return 100;
    }
    (done.min(target) * 100 / target) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(targets: &[(&str, u32)]) -> ExerciseProgressStore {
        ExerciseProgressStore::new(
            targets
                .iter()
                .map(|(name, sets)| Exercise::new(*name, *sets).unwrap()),
        )
    }

    fn set(weight: f64, reps: u32) -> SetRecord {
        SetRecord::new(weight, reps).unwrap()
    }

    #[test]
    fn test_complete_exercise_leaves_next_incomplete() {
        let mut store = store(&[("squat", 2), ("bench", 1)]);
        let squat = store.find("squat").unwrap();

        assert_eq!(store.next_incomplete(), Some(squat));
        store.add_set(squat, set(50.0, 5));
        assert_eq!(store.next_incomplete(), Some(squat));
        store.add_set(squat, set(50.0, 5));

        assert!(store.is_complete(squat));
        assert_eq!(store.next_incomplete(), store.find("bench"));
    }

    #[test]
    fn test_next_incomplete_follows_declaration_order() {
        let mut store = store(&[("a", 3), ("b", 1)]);
        let a = store.find("a").unwrap();
        store.add_set(a, set(10.0, 10));
        store.add_set(a, set(10.0, 10));

        // A at 2/3 still precedes B at 0/1
        assert_eq!(store.next_incomplete(), Some(a));
    }

    #[test]
    fn test_add_set_preserves_insertion_order() {
        let mut store = store(&[("row", 3)]);
        let row = store.find("row").unwrap();
        assert_eq!(store.add_set(row, set(40.0, 12)), 1);
        assert_eq!(store.add_set(row, set(45.0, 10)), 2);

        let reps: Vec<u32> = store.sets_for(row).iter().map(|s| s.reps()).collect();
        assert_eq!(reps, vec![12, 10]);
        assert_eq!(store.next_set_number(row), 3);
    }

    #[test]
    fn test_percentages() {
        let mut store = store(&[("a", 2), ("b", 2)]);
        let a = store.find("a").unwrap();
        assert_eq!(store.overall_completion_percent(), 0);

        store.add_set(a, set(0.0, 10));
        assert_eq!(store.completion_percent(a), 50);
        assert_eq!(store.overall_completion_percent(), 25);

        // over-recording caps at the target
        store.add_set(a, set(0.0, 10));
        store.add_set(a, set(0.0, 10));
        assert_eq!(store.completion_percent(a), 100);
        assert_eq!(store.overall_completion_percent(), 50);
    }

    #[test]
    fn test_snapshot_carries_targets() {
        let mut store = store(&[("squat", 3)]);
        let squat = store.find("squat").unwrap();
        store.add_set(squat, set(60.0, 5));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].target_sets, 3);
        assert_eq!(snapshot[0].recorded_sets, vec![set(60.0, 5)]);
        assert!(!snapshot[0].is_complete());
    }

    #[test]
    fn test_previous_sets_do_not_count() {
        let mut store = store(&[("squat", 1)]);
        let squat = store.find("squat").unwrap();
        store.set_previous_sets(squat, vec![set(50.0, 5)]);

        assert!(!store.is_complete(squat));
        assert_eq!(store.exercise(squat).previous_sets.len(), 1);
    }
}
