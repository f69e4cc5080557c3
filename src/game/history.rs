use super::error::HistoryError;
use super::sword::Sword;

/// Snapshots of the sword, one per stage reached. Never empty.
///
/// Append-only, except that the latest entry tracks the live sword and is
/// replaced in place when parts are swapped.
#[derive(Debug, Clone)]
pub struct StepHistory {
    steps: Vec<Sword>,
    selected: usize,
}

impl StepHistory {
    pub fn new(initial: Sword) -> Self {
        Self {
            steps: vec![initial],
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[Sword] {
        &self.steps
    }

    pub fn latest(&self) -> &Sword {
        // `steps` starts with one entry and never shrinks
        &self.steps[self.steps.len() - 1]
    }

    pub fn latest_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn is_viewing_latest(&self) -> bool {
        self.selected == self.latest_index()
    }

    /// The snapshot currently on display.
    pub fn selected(&self) -> &Sword {
        &self.steps[self.selected]
    }

    /// Display an earlier (or the latest) step. History contents are untouched.
    pub fn select(&mut self, index: usize) -> Result<&Sword, HistoryError> {
        if index >= self.steps.len() {
            return Err(HistoryError::OutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        self.selected = index;
        Ok(&self.steps[index])
    }

    /// Record a completed evolution and display it.
    pub fn push_evolution(&mut self, snapshot: Sword) {
        self.steps.push(snapshot);
        self.selected = self.latest_index();
    }

    /// Overwrite the latest entry after a part swap and display it.
    pub fn replace_latest(&mut self, snapshot: Sword) {
        let last = self.latest_index();
        self.steps[last] = snapshot;
        self.selected = last;
    }
}
