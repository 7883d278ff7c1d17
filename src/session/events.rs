//! Change notification for session observers
//!
//! Every mutating reducer publishes an event after its state lands, so
//! render and UI layers re-read only what changed. Events carry ids and
//! counters, never references into live state.

use crate::voxel::chunk::ChunkCoord;
use crate::voxel::object::ObjectId;

/// Notification published after a session mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// Committed voxel data changed in the listed chunks
    ChunksChanged {
        object: ObjectId,
        chunks: Vec<ChunkCoord>,
    },
    /// An object's selection mask changed
    SelectionChanged { object: ObjectId },
    /// The tool preview or floating selection appeared, moved, or ended
    PreviewChanged,
    /// Objects were added, removed, reordered, renamed, or restored
    ObjectListChanged,
    /// The color palette changed
    PaletteChanged,
    /// Undo/redo availability changed
    HistoryChanged {
        undo_depth: usize,
        redo_depth: usize,
    },
}

/// Handle identifying a registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Subscribe/publish registry for session observers
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&EditorEvent)>)>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; the returned id unsubscribes it later
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener in subscription order
    pub fn emit(&mut self, event: &EditorEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
