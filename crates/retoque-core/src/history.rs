//! Linear undo/redo over full editor-state snapshots.
//!
//! Both stacks are ordered oldest to newest and bounded; when a push would
//! exceed the capacity the oldest snapshot is dropped. Recording a new edit
//! discards everything that could have been redone.

use std::collections::VecDeque;

use tracing::debug;

use crate::buffer::{ImageBuffer, NaturalDimensions};
use crate::viewport::ViewportState;

/// Everything needed to put the editor back into an earlier state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub buffer: ImageBuffer,
    pub natural: NaturalDimensions,
    pub viewport: ViewportState,
}

impl Snapshot {
    pub fn new(buffer: ImageBuffer, viewport: ViewportState) -> Self {
        Self {
            natural: buffer.natural(),
            buffer,
            viewport,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
}

impl HistoryManager {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the state as it was before an edit. Clears the redo stack.
    pub fn save_snapshot(&mut self, snapshot: Snapshot) {
        push_bounded(&mut self.undo_stack, snapshot, self.capacity);
        self.redo_stack.clear();
        debug!(undo = self.undo_stack.len(), "history snapshot saved");
    }

    /// Step back one edit.
    ///
    /// `current` is the state being left; it goes onto the redo stack. The
    /// restored snapshot is passed to `on_restore` and returned. Returns
    /// `None` without calling the hook when there is nothing to undo.
    pub fn undo(
        &mut self,
        current: Snapshot,
        on_restore: impl FnOnce(&Snapshot),
    ) -> Option<Snapshot> {
        let restored = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current, self.capacity);
        on_restore(&restored);
        Some(restored)
    }

    /// Step forward one undone edit. Mirror image of [`undo`](Self::undo).
    pub fn redo(
        &mut self,
        current: Snapshot,
        on_restore: impl FnOnce(&Snapshot),
    ) -> Option<Snapshot> {
        let restored = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current, self.capacity);
        on_restore(&restored);
        Some(restored)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(crate::config::HISTORY_CAPACITY)
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;

    fn snapshot(width: u32, zoom: f64) -> Snapshot {
        let png = encode_png(&vec![0u8; (width * 2 * 4) as usize], width, 2).unwrap();
        let buffer = ImageBuffer::from_source(png, "image/png").unwrap();
        Snapshot::new(
            buffer,
            ViewportState {
                zoom,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        )
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = HistoryManager::new(10);
        let mut called = false;
        assert!(history.undo(snapshot(1, 1.0), |_| called = true).is_none());
        assert!(!called);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = HistoryManager::new(10);
        let before = snapshot(4, 0.5);
        let after = snapshot(8, 0.25);
        history.save_snapshot(before.clone());

        let mut restored_width = 0;
        let undone = history
            .undo(after.clone(), |s| restored_width = s.natural.width)
            .unwrap();
        assert_eq!(undone, before);
        assert_eq!(restored_width, 4);
        assert!(!history.can_undo());
        assert!(history.can_redo());

        let redone = history.redo(undone, |_| {}).unwrap();
        assert_eq!(redone, after);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_edit_discards_redo() {
        let mut history = HistoryManager::new(10);
        history.save_snapshot(snapshot(1, 1.0));
        history.undo(snapshot(2, 1.0), |_| {});
        assert_eq!(history.redo_len(), 1);

        history.save_snapshot(snapshot(3, 1.0));
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_redo_on_empty_keeps_lengths() {
        let mut history = HistoryManager::new(10);
        history.save_snapshot(snapshot(1, 1.0));
        for _ in 0..3 {
            assert!(history.redo(snapshot(2, 1.0), |_| {}).is_none());
        }
        assert_eq!((history.undo_len(), history.redo_len()), (1, 0));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = HistoryManager::new(2);
        for width in 1..=3 {
            history.save_snapshot(snapshot(width, 1.0));
        }
        assert_eq!(history.undo_len(), 2);

        let newest = history.undo(snapshot(9, 1.0), |_| {}).unwrap();
        assert_eq!(newest.natural.width, 3);
        let oldest = history.undo(newest, |_| {}).unwrap();
        assert_eq!(oldest.natural.width, 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryManager::default();
        assert_eq!(history.capacity(), 50);
        history.save_snapshot(snapshot(1, 1.0));
        history.undo(snapshot(2, 1.0), |_| {});
        history.save_snapshot(snapshot(3, 1.0));
        history.clear();
        assert!(!history.can_undo() && !history.can_redo());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Action {
        Save,
        Undo,
        Redo,
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        prop_oneof![Just(Action::Save), Just(Action::Undo), Just(Action::Redo)]
    }

    proptest! {
        /// Property: stacks never exceed capacity and undo+redo depth only
        /// grows through saves.
        #[test]
        fn prop_bounded(actions in prop::collection::vec(action_strategy(), 0..60), capacity in 1usize..8) {
            let png = crate::encode::encode_png(&[0u8; 4], 1, 1).unwrap();
            let buffer = ImageBuffer::from_source(png, "image/png").unwrap();
            let snap = Snapshot::new(buffer, ViewportState::default());
            let mut history = HistoryManager::new(capacity);

            for action in actions {
                let total = history.undo_len() + history.redo_len();
                match action {
                    Action::Save => history.save_snapshot(snap.clone()),
                    Action::Undo => {
                        history.undo(snap.clone(), |_| {});
                        prop_assert!(history.undo_len() + history.redo_len() <= total);
                    }
                    Action::Redo => {
                        history.redo(snap.clone(), |_| {});
                        prop_assert!(history.undo_len() + history.redo_len() <= total);
                    }
                }
                prop_assert!(history.undo_len() <= capacity);
                prop_assert!(history.redo_len() <= capacity);
            }
        }
    }
}
