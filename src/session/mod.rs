//! Session layer: scene state, compositing, events, and persistence

pub mod composite;
pub mod events;
pub mod project;
pub mod state;
pub mod sync;

pub use composite::Compositor;
pub use events::{EditorEvent, EventBus, ListenerId};
pub use project::{load_project, save_project};
pub use state::EditorSession;
pub use sync::{
    FramePayload, NullSink, ObjectSnapshot, RecordingSink, RemoteDiff, RemoteOp, SyncSink,
};
