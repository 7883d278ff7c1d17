//! Remote replication seam
//!
//! Local edits apply immediately and then mirror to the authoritative
//! store through a [`SyncSink`] without waiting for acknowledgement.
//! Inbound traffic reuses the same shapes: voxel diffs replay through
//! the history apply routine and full-object snapshots replace a store
//! wholesale. The transport itself lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::core::types::{IVec3, PaletteColor, Result, UVec3};
use crate::edit::preview::PreviewMode;
use crate::edit::tool::ToolKind;
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::{ObjectId, VoxelObject};
use crate::voxel::shape::FillShape;

/// Codec-compressed voxel frame for transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePayload {
    pub min_pos: [i32; 3],
    pub dims: [u32; 3],
    /// RLE then LZ4 compressed cell bytes
    pub data: Vec<u8>,
}

impl FramePayload {
    /// Compress a frame for transport
    pub fn from_frame(frame: &VoxelFrame) -> Self {
        Self {
            min_pos: frame.min_pos().to_array(),
            dims: frame.dims().to_array(),
            data: codec::compress(frame.as_bytes()),
        }
    }

    /// Decompress back into a frame, validating the cell count
    pub fn to_frame(&self) -> Result<VoxelFrame> {
        let dims = UVec3::from_array(self.dims);
        let volume = dims.x as usize * dims.y as usize * dims.z as usize;
        let bytes = codec::decompress_exact(&self.data, volume)?;
        VoxelFrame::from_bytes(IVec3::from_array(self.min_pos), dims, bytes)
    }
}

/// Voxel diff exchanged with the authoritative store.
///
/// Both frames follow the sparse convention: a cell zero on both sides
/// was never touched by the edit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteDiff {
    pub object: u32,
    pub before: FramePayload,
    pub after: FramePayload,
}

/// Full-object snapshot for restores and duplicate replication
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub object: u32,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub position: [i32; 3],
    pub dims: [u32; 3],
    /// One compressed frame per occupied chunk
    pub chunks: Vec<FramePayload>,
}

impl ObjectSnapshot {
    /// Capture an object's metadata and occupied chunks
    pub fn from_object(object: &VoxelObject) -> Self {
        let mut chunks = Vec::new();
        for coord in object.store().coords_sorted() {
            if let Some(chunk) = object.store().chunk(coord) {
                if !chunk.is_all_empty() {
                    chunks.push(FramePayload::from_frame(chunk.voxels()));
                }
            }
        }
        Self {
            object: object.id.0,
            name: object.name.clone(),
            visible: object.visible,
            locked: object.locked,
            position: object.position.to_array(),
            dims: object.dims().to_array(),
            chunks,
        }
    }

    /// Rebuild the object this snapshot was captured from
    pub fn to_object(&self) -> Result<VoxelObject> {
        let mut object = VoxelObject::new(
            ObjectId(self.object),
            self.name.clone(),
            UVec3::from_array(self.dims),
        );
        object.visible = self.visible;
        object.locked = self.locked;
        object.position = IVec3::from_array(self.position);
        for payload in &self.chunks {
            let frame = payload.to_frame()?;
            object.store_mut().blit(&frame);
        }
        object.store_mut().take_modified();
        Ok(object)
    }
}

/// One operation mirrored to the authoritative store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RemoteOp {
    /// Two-corner shape fill with structured parameters
    RectEdit {
        object: u32,
        tool: ToolKind,
        shape: FillShape,
        mode: PreviewMode,
        block: u8,
        start: [i32; 3],
        end: [i32; 3],
        rotation: u8,
    },
    /// Freeform edit carried as a compressed frame
    FrameEdit {
        object: u32,
        mode: PreviewMode,
        frame: FramePayload,
    },
    /// Raw voxel diff (undo/redo replication)
    Diff(RemoteDiff),
    /// Committed floating-selection move
    SelectionMove { object: u32, offset: [i32; 3] },
    ObjectAdd {
        object: u32,
        name: String,
        dims: [u32; 3],
    },
    ObjectDelete { object: u32 },
    ObjectRename { object: u32, name: String },
    ObjectReorder { from: usize, to: usize },
    /// Whole-object restore (undo of a delete, duplicates)
    Restore(Box<ObjectSnapshot>),
    PaletteSet { index: u8, color: PaletteColor },
    PaletteReplace { colors: Vec<PaletteColor> },
}

/// Outbound channel to the authoritative store.
///
/// Sends are fire-and-forget; the round trip is eventual confirmation,
/// never the gate for local visibility.
pub trait SyncSink {
    fn send(&mut self, op: RemoteOp);
}

/// Sink for offline sessions; drops every op
#[derive(Default)]
pub struct NullSink;

impl SyncSink for NullSink {
    fn send(&mut self, _op: RemoteOp) {}
}

/// Sink retaining every op in order, for tests and batching
#[derive(Default)]
pub struct RecordingSink {
    pub ops: Vec<RemoteOp>,
}

impl SyncSink for RecordingSink {
    fn send(&mut self, op: RemoteOp) {
        self.ops.push(op);
    }
}

impl SyncSink for std::rc::Rc<std::cell::RefCell<RecordingSink>> {
    fn send(&mut self, op: RemoteOp) {
        self.borrow_mut().ops.push(op);
    }
}
