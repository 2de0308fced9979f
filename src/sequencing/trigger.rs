/// Fixed-length on/off step pattern with a playhead.
///
/// The playhead moves only when [`advance`](Self::advance) is called, which
/// the engine does once per clock tick. Step indices are checked: passing an
/// index past the end panics, so callers in the audio context validate first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSequencer {
    steps: Vec<bool>,
    current: usize,
}

impl TriggerSequencer {
    /// Create a sequencer with `steps` inactive steps and the playhead on step 0.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero.
    pub fn new(steps: usize) -> Self {
        assert!(steps > 0, "a trigger sequencer needs at least one step");
        Self {
            steps: vec![false; steps],
            current: 0,
        }
    }

    /// Build a sequencer from an explicit pattern.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    pub fn from_pattern(pattern: &[bool]) -> Self {
        assert!(!pattern.is_empty(), "a trigger sequencer needs at least one step");
        Self {
            steps: pattern.to_vec(),
            current: 0,
        }
    }

    /// Move the playhead one step, wrapping to 0 after the last step.
    #[inline]
    pub fn advance(&mut self) {
        self.current += 1;
        if self.current >= self.steps.len() {
            self.current = 0;
        }
    }

    /// Flip step `index` between active and inactive.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn toggle_step(&mut self, index: usize) {
        self.assert_index(index);
        self.steps[index] = !self.steps[index];
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_step(&mut self, index: usize, active: bool) {
        self.assert_index(index);
        self.steps[index] = active;
    }

    /// Move the playhead without advancing (transport start, cross-track reset).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_current_step(&mut self, index: usize) {
        self.assert_index(index);
        self.current = index;
    }

    /// Park the playhead on the last step so the next advance lands on step 0.
    pub fn rewind_to_end(&mut self) {
        self.current = self.steps.len() - 1;
    }

    pub fn clear(&mut self) {
        self.steps.iter_mut().for_each(|s| *s = false);
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn is_current_step_active(&self) -> bool {
        self.steps[self.current]
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn is_step_active(&self, index: usize) -> bool {
        self.assert_index(index);
        self.steps[index]
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn assert_index(&self, index: usize) {
        assert!(
            index < self.steps.len(),
            "step {index} out of range for a {}-step sequencer",
            self.steps.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_wraps() {
        let mut seq = TriggerSequencer::new(3);
        let visited: Vec<usize> = (0..7)
            .map(|_| {
                seq.advance();
                seq.current_step()
            })
            .collect();
        assert_eq!(visited, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn toggle_flips_one_step() {
        let mut seq = TriggerSequencer::new(8);
        seq.toggle_step(2);
        assert!(seq.is_step_active(2));
        assert_eq!(seq.steps().iter().filter(|&&s| s).count(), 1);
        seq.toggle_step(2);
        assert!(!seq.is_step_active(2));
    }

    #[test]
    fn rewind_lands_on_zero_after_advance() {
        let mut seq = TriggerSequencer::from_pattern(&[true, false, false, false, false]);
        seq.set_current_step(2);
        seq.rewind_to_end();
        assert_eq!(seq.current_step(), 4);
        seq.advance();
        assert_eq!(seq.current_step(), 0);
        assert!(seq.is_current_step_active());
    }

    #[test]
    fn single_step_always_on_zero() {
        let mut seq = TriggerSequencer::new(1);
        seq.advance();
        seq.advance();
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn toggle_out_of_range_panics() {
        let mut seq = TriggerSequencer::new(4);
        seq.toggle_step(4);
    }

    #[test]
    #[should_panic(expected = "at least one step")]
    fn empty_sequencer_panics() {
        TriggerSequencer::new(0);
    }
}
