use crate::{EditInstruction, SliderValues};

/// Undo/redo store for the session's edit list.
///
/// Snapshots are prefixes of a single append-only instruction arena, so the
/// undo and redo stacks only hold lengths. The current edit list is always
/// `arena[..current_len]`; applying after an undo truncates the abandoned
/// branch and clears the redo stack (linear history).
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    arena: Vec<EditInstruction>,
    current_len: usize,
    undo_lens: Vec<usize>,
    redo_lens: Vec<usize>,
    sliders: SliderValues,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of instructions as one history entry.
    ///
    /// An empty batch is a no-op: it pushes no snapshot and keeps the redo
    /// stack intact.
    pub fn apply(&mut self, edits: &[EditInstruction]) {
        if edits.is_empty() {
            return;
        }

        self.undo_lens.push(self.current_len);
        self.redo_lens.clear();
        self.arena.truncate(self.current_len);
        self.arena.extend_from_slice(edits);
        self.current_len = self.arena.len();
        self.resync();
    }

    pub fn apply_one(&mut self, edit: EditInstruction) {
        self.apply(std::slice::from_ref(&edit));
    }

    /// Step back one entry. Returns `false` (and changes nothing) when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous_len) = self.undo_lens.pop() else {
            return false;
        };
        self.redo_lens.push(self.current_len);
        self.current_len = previous_len;
        self.resync();
        true
    }

    /// Step forward one entry. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next_len) = self.redo_lens.pop() else {
            return false;
        };
        self.undo_lens.push(self.current_len);
        self.current_len = next_len;
        self.resync();
        true
    }

    pub fn edits(&self) -> &[EditInstruction] {
        &self.arena[..self.current_len]
    }

    pub fn slider_values(&self) -> SliderValues {
        self.sliders
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_lens.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_lens.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_lens.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_lens.len()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.current_len = 0;
        self.undo_lens.clear();
        self.redo_lens.clear();
        self.sliders.reset();
    }

    fn resync(&mut self) {
        self.sliders = SliderValues::replay(self.edits());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdjustmentKind;

    fn edit(kind: AdjustmentKind, value: f32) -> EditInstruction {
        EditInstruction { kind, value }
    }

    #[test]
    fn apply_then_undo_restores_original_state() {
        let mut history = EditHistory::new();
        for i in 0..5 {
            history.apply_one(edit(AdjustmentKind::Brightness, i as f32));
        }
        for _ in 0..5 {
            assert!(history.undo());
        }

        assert!(history.edits().is_empty());
        assert!(!history.can_undo());
        assert_eq!(history.redo_depth(), 5);
        assert!(history.slider_values().is_default());
    }

    #[test]
    fn undo_past_start_is_a_no_op() {
        let mut history = EditHistory::new();
        assert!(!history.undo());

        history.apply_one(edit(AdjustmentKind::Contrast, 10.0));
        assert!(history.undo());
        assert!(!history.undo());
        assert!(history.edits().is_empty());
    }

    #[test]
    fn redo_restores_exactly_the_pre_undo_list() {
        let mut history = EditHistory::new();
        history.apply_one(edit(AdjustmentKind::Brightness, 20.0));
        history.apply_one(edit(AdjustmentKind::Contrast, 10.0));

        let before_undo = history.edits().to_vec();
        assert!(history.undo());
        assert_eq!(history.edits().len(), 1);
        assert!(history.redo());
        assert_eq!(history.edits(), before_undo.as_slice());
        assert!(!history.redo());
    }

    #[test]
    fn apply_after_undo_discards_the_redo_branch() {
        let mut history = EditHistory::new();
        history.apply_one(edit(AdjustmentKind::Brightness, 20.0));
        history.apply_one(edit(AdjustmentKind::Contrast, 10.0));
        assert!(history.undo());
        assert!(history.can_redo());

        history.apply_one(edit(AdjustmentKind::Saturation, -30.0));
        assert!(!history.can_redo());
        assert_eq!(history.edits().len(), 2);
        assert_eq!(history.edits()[1].kind, AdjustmentKind::Saturation);
        assert_eq!(history.slider_values().saturation, -30.0);
        assert_eq!(history.slider_values().contrast, 0.0);
    }

    #[test]
    fn batch_apply_is_a_single_undo_step() {
        let mut history = EditHistory::new();
        history.apply(&[
            edit(AdjustmentKind::Temperature, 15.0),
            edit(AdjustmentKind::Saturation, 20.0),
        ]);
        assert_eq!(history.edits().len(), 2);
        assert_eq!(history.undo_depth(), 1);

        assert!(history.undo());
        assert!(history.edits().is_empty());
    }

    #[test]
    fn empty_batch_does_not_touch_the_stacks() {
        let mut history = EditHistory::new();
        history.apply_one(edit(AdjustmentKind::Brightness, 20.0));
        assert!(history.undo());
        assert!(history.can_redo());

        history.apply(&[]);
        assert!(history.can_redo());
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn repeated_edits_of_one_kind_append_instead_of_coalescing() {
        let mut history = EditHistory::new();
        history.apply_one(edit(AdjustmentKind::Brightness, 20.0));
        history.apply_one(edit(AdjustmentKind::Brightness, 40.0));

        assert_eq!(history.edits().len(), 2);
        assert_eq!(history.slider_values().brightness, 40.0);
        assert!(history.undo());
        assert_eq!(history.slider_values().brightness, 20.0);
    }

    #[test]
    fn end_to_end_example_matches_the_expected_cache() {
        let mut history = EditHistory::new();
        history.apply_one(edit(AdjustmentKind::Brightness, 20.0));
        history.apply_one(edit(AdjustmentKind::Contrast, 10.0));

        assert_eq!(history.edits().len(), 2);
        let values = history.slider_values();
        assert_eq!(values.brightness, 20.0);
        assert_eq!(values.contrast, 10.0);
        assert_eq!(values.saturation, 0.0);
        assert_eq!(values.temperature, 0.0);

        assert!(history.undo());
        assert_eq!(history.edits().len(), 1);
        assert_eq!(history.slider_values().brightness, 20.0);
        assert_eq!(history.slider_values().contrast, 0.0);
    }
}
