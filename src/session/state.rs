//! Editor session state and reducers
//!
//! The session owns the scene: objects, palette, history, the active
//! gesture, and the composite view. All mutation goes through reducer
//! methods here, which apply the change locally, record it in history
//! when undoable, mirror it through the sync sink, and publish events.
//! Inbound remote changes reuse the same apply routines but skip both
//! history and the sink.

use std::path::Path;

use log::{debug, warn};

use crate::core::config::EditorConfig;
use crate::core::types::{IVec3, PaletteColor, Result, UVec3};
use crate::edit::history::{
    apply_voxel_diff, diff_frames, ApplyDirection, EditHistory, HistoryEntry,
};
use crate::edit::preview::{PreviewMode, PreviewOverlay};
use crate::edit::selection::FloatingSelection;
use crate::edit::tool::{self, ToolKind};
use crate::math::{wrap_to_dims, GridBounds, Ray};
use crate::mesh::atlas::AtlasMap;
use crate::voxel::chunk::{clamped_chunk_dims, ChunkCoord};
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::{ObjectId, VoxelObject};
use crate::voxel::octree::SparseVoxelOctree;
use crate::voxel::raycast::{raycast, RaycastHit};
use crate::voxel::shape::FillShape;
use crate::voxel::voxel::Voxel;

use super::composite::Compositor;
use super::events::{EditorEvent, EventBus, ListenerId};
use super::project;
use super::sync::{FramePayload, NullSink, ObjectSnapshot, RemoteDiff, RemoteOp, SyncSink};

/// One editing session over a scene of voxel objects
pub struct EditorSession {
    config: EditorConfig,
    objects: Vec<VoxelObject>,
    palette: Vec<PaletteColor>,
    atlas: AtlasMap,
    history: EditHistory,
    preview: Option<PreviewOverlay>,
    floating: Option<FloatingSelection>,
    compositor: Compositor,
    events: EventBus,
    sync: Box<dyn SyncSink>,
    next_object_id: u32,
}

impl EditorSession {
    /// Create an offline session; outbound ops are dropped
    pub fn new(config: EditorConfig) -> Self {
        Self::with_sink(config, Box::new(NullSink))
    }

    /// Create a session mirroring its edits through a sink
    pub fn with_sink(config: EditorConfig, sync: Box<dyn SyncSink>) -> Self {
        let dims = UVec3::from_array(config.default_dims);
        Self {
            atlas: AtlasMap::from_config(1, &config),
            history: EditHistory::new(config.history_capacity),
            compositor: Compositor::new(dims),
            config,
            objects: Vec::new(),
            palette: default_palette(),
            preview: None,
            floating: None,
            events: EventBus::new(),
            sync,
            next_object_id: 1,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Objects in stacking order; higher index composites on top
    pub fn objects(&self) -> &[VoxelObject] {
        &self.objects
    }

    /// Look up an object by id
    pub fn object(&self, id: ObjectId) -> Option<&VoxelObject> {
        self.object_index(id).map(|i| &self.objects[i])
    }

    /// Current color palette
    pub fn palette(&self) -> &[PaletteColor] {
        &self.palette
    }

    /// Atlas layout used for meshing
    pub fn atlas(&self) -> &AtlasMap {
        &self.atlas
    }

    /// Active tool preview, if a drag is in progress
    pub fn preview(&self) -> Option<&PreviewOverlay> {
        self.preview.as_ref()
    }

    /// Active floating selection, if one is lifted
    pub fn floating(&self) -> Option<&FloatingSelection> {
        self.floating.as_ref()
    }

    /// Check if an undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if a redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Register an event listener
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    /// Remove an event listener
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.events.unsubscribe(id)
    }

    // ---- objects ----

    /// Create an empty object at the top of the stack
    pub fn add_object(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.alloc_object_id();
        let name = name.into();
        let dims = UVec3::from_array(self.config.default_dims);
        let object = VoxelObject::new(id, name.clone(), dims);
        let index = self.objects.len();
        self.history.push(HistoryEntry::ObjectAdd {
            snapshot: Box::new(object.clone()),
            index,
        });
        self.objects.push(object);
        self.sync.send(RemoteOp::ObjectAdd {
            object: id.0,
            name,
            dims: dims.to_array(),
        });
        self.notify(EditorEvent::ObjectListChanged);
        self.notify_history();
        id
    }

    /// Remove an object, recording its full contents for undo
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        if self.floating.as_ref().is_some_and(|f| f.object == id) {
            self.cancel_selection();
        }
        if self.preview.as_ref().is_some_and(|p| p.object == id) {
            self.clear_preview();
        }
        let Some(index) = self.object_index(id) else {
            return false;
        };
        let object = self.objects.remove(index);
        self.compositor.mark_dirty_bounds(object.world_bounds());
        self.history.push(HistoryEntry::ObjectDelete {
            snapshot: Box::new(object),
            index,
        });
        self.sync.send(RemoteOp::ObjectDelete { object: id.0 });
        self.notify(EditorEvent::ObjectListChanged);
        self.notify_history();
        true
    }

    /// Rename an object
    pub fn rename_object(&mut self, id: ObjectId, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(index) = self.object_index(id) else {
            return false;
        };
        if self.objects[index].name == name {
            return false;
        }
        let before = std::mem::replace(&mut self.objects[index].name, name.clone());
        self.history.push(HistoryEntry::ObjectRename {
            object: id,
            before,
            after: name.clone(),
        });
        self.sync.send(RemoteOp::ObjectRename { object: id.0, name });
        self.notify(EditorEvent::ObjectListChanged);
        self.notify_history();
        true
    }

    /// Move an object to a new stacking index
    pub fn reorder_object(&mut self, from: usize, to: usize) -> bool {
        if from >= self.objects.len() || to >= self.objects.len() || from == to {
            return false;
        }
        let object = self.objects.remove(from);
        self.objects.insert(to, object);
        self.compositor.mark_all_dirty();
        self.history.push(HistoryEntry::ObjectReorder { from, to });
        self.sync.send(RemoteOp::ObjectReorder { from, to });
        self.notify(EditorEvent::ObjectListChanged);
        self.notify_history();
        true
    }

    /// Toggle visibility; view state, so neither undoable nor mirrored
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let Some(index) = self.object_index(id) else {
            return false;
        };
        if self.objects[index].visible == visible {
            return false;
        }
        self.objects[index].visible = visible;
        self.compositor
            .mark_dirty_bounds(self.objects[index].world_bounds());
        self.notify(EditorEvent::ObjectListChanged);
        true
    }

    /// Lock or unlock an object against voxel edits
    pub fn set_locked(&mut self, id: ObjectId, locked: bool) -> bool {
        let Some(index) = self.object_index(id) else {
            return false;
        };
        if self.objects[index].locked == locked {
            return false;
        }
        self.objects[index].locked = locked;
        self.notify(EditorEvent::ObjectListChanged);
        true
    }

    /// Move an object's origin on the world grid
    pub fn set_object_position(&mut self, id: ObjectId, position: IVec3) -> bool {
        let Some(index) = self.object_index(id) else {
            return false;
        };
        if self.objects[index].position == position {
            return false;
        }
        self.compositor
            .mark_dirty_bounds(self.objects[index].world_bounds());
        self.objects[index].position = position;
        self.compositor
            .mark_dirty_bounds(self.objects[index].world_bounds());
        self.notify(EditorEvent::ObjectListChanged);
        true
    }

    /// Duplicate an object, placing the copy just above the source.
    ///
    /// The copy runs through a sparse octree of the source so uniform
    /// regions transfer without visiting every cell.
    pub fn duplicate_object(&mut self, id: ObjectId) -> Option<ObjectId> {
        let index = self.object_index(id)?;
        let new_id = self.alloc_object_id();
        let source = &self.objects[index];
        let octree = SparseVoxelOctree::from_store(source.store());
        let mut copy = VoxelObject::new(new_id, format!("{} copy", source.name), source.dims());
        copy.position = source.position;
        octree.for_each_region(&mut |bounds, v| {
            for pos in bounds.iter() {
                copy.store_mut().set(pos, v);
            }
        });
        copy.store_mut().take_modified();

        let insert_at = index + 1;
        self.compositor.mark_dirty_bounds(copy.world_bounds());
        self.history.push(HistoryEntry::ObjectAdd {
            snapshot: Box::new(copy.clone()),
            index: insert_at,
        });
        self.sync
            .send(RemoteOp::Restore(Box::new(ObjectSnapshot::from_object(&copy))));
        self.objects.insert(insert_at, copy);
        self.notify(EditorEvent::ObjectListChanged);
        self.notify_history();
        Some(new_id)
    }

    // ---- palette ----

    /// Change one palette slot
    pub fn set_color(&mut self, index: u8, color: PaletteColor) -> bool {
        let Some(slot) = self.palette.get_mut(index as usize) else {
            return false;
        };
        if *slot == color {
            return false;
        }
        let before = std::mem::replace(slot, color);
        self.history.push(HistoryEntry::ColorChange {
            index,
            before,
            after: color,
        });
        self.sync.send(RemoteOp::PaletteSet { index, color });
        self.notify(EditorEvent::PaletteChanged);
        self.notify_history();
        true
    }

    /// Replace the whole palette
    pub fn replace_palette(&mut self, colors: Vec<PaletteColor>) -> bool {
        if self.palette == colors {
            return false;
        }
        let before = std::mem::replace(&mut self.palette, colors.clone());
        self.history.push(HistoryEntry::PaletteReplace {
            before,
            after: colors.clone(),
        });
        self.sync.send(RemoteOp::PaletteReplace { colors });
        self.notify(EditorEvent::PaletteChanged);
        self.notify_history();
        true
    }

    // ---- tool gestures ----

    /// Start or update a tool preview on an object
    pub fn set_preview(&mut self, object: ObjectId, mode: PreviewMode, frame: VoxelFrame) {
        let Some(position) = self.object_position(object) else {
            return;
        };
        self.mark_preview_region();
        self.compositor
            .mark_dirty_bounds(frame.bounds().translated(position));
        match &mut self.preview {
            Some(overlay) if overlay.object == object && overlay.mode == mode => {
                overlay.set_frame(frame)
            }
            _ => self.preview = Some(PreviewOverlay::new(object, mode, frame)),
        }
        self.notify(EditorEvent::PreviewChanged);
    }

    /// Discard the active preview without committing
    pub fn clear_preview(&mut self) -> bool {
        if self.preview.is_none() {
            return false;
        }
        self.mark_preview_region();
        self.preview = None;
        self.notify(EditorEvent::PreviewChanged);
        true
    }

    /// Commit the active preview into its object
    pub fn commit_preview(&mut self) -> bool {
        let Some(overlay) = self.preview.take() else {
            return false;
        };
        let id = overlay.object;
        if let Some(position) = self.object_position(id) {
            self.compositor
                .mark_dirty_bounds(overlay.frame().bounds().translated(position));
        }
        self.notify(EditorEvent::PreviewChanged);
        if self.is_locked(id) {
            return false;
        }
        let committed = self.commit_frame(id, overlay.mode, overlay.frame());
        if committed {
            self.sync.send(RemoteOp::FrameEdit {
                object: id.0,
                mode: overlay.mode,
                frame: FramePayload::from_frame(overlay.frame()),
            });
        }
        committed
    }

    /// Apply a two-corner shape fill in one step
    pub fn apply_rect_edit(
        &mut self,
        object: ObjectId,
        tool: ToolKind,
        shape: FillShape,
        mode: PreviewMode,
        block: Voxel,
        start: IVec3,
        end: IVec3,
        rotation: u8,
    ) -> bool {
        if self.is_locked(object) {
            debug!("rect edit rejected, {} is locked", object);
            return false;
        }
        let preview = tool::rect_preview(start, end, shape, rotation, block);
        let changed = self.commit_frame(object, mode, &preview);
        if changed {
            self.sync.send(RemoteOp::RectEdit {
                object: object.0,
                tool,
                shape,
                mode,
                block: block.block_type(),
                start: start.to_array(),
                end: end.to_array(),
                rotation,
            });
        }
        changed
    }

    /// Stamp a brush dab centered on a cell in one step
    pub fn apply_brush(
        &mut self,
        object: ObjectId,
        center: IVec3,
        radius: u32,
        shape: FillShape,
        mode: PreviewMode,
        block: Voxel,
    ) -> bool {
        if self.is_locked(object) {
            debug!("brush rejected, {} is locked", object);
            return false;
        }
        let preview = tool::brush_preview(center, radius, shape, block);
        let changed = self.commit_frame(object, mode, &preview);
        if changed {
            self.sync.send(RemoteOp::FrameEdit {
                object: object.0,
                mode,
                frame: FramePayload::from_frame(&preview),
            });
        }
        changed
    }

    /// Flood fill from a seed cell.
    ///
    /// Filling from a solid cell recolors its region; filling from air
    /// attaches into the empty pocket.
    pub fn apply_flood_fill(&mut self, object: ObjectId, seed: IVec3, block: Voxel) -> bool {
        if self.is_locked(object) {
            debug!("flood fill rejected, {} is locked", object);
            return false;
        }
        let Some(index) = self.object_index(object) else {
            return false;
        };
        let store = self.objects[index].store();
        let mode = if store.get(seed).is_visible() {
            PreviewMode::Paint
        } else {
            PreviewMode::Attach
        };
        let Some(preview) = tool::flood_fill_preview(store, seed, block) else {
            return false;
        };
        let changed = self.commit_frame(object, mode, &preview);
        if changed {
            self.sync.send(RemoteOp::FrameEdit {
                object: object.0,
                mode,
                frame: FramePayload::from_frame(&preview),
            });
        }
        changed
    }

    // ---- selection ----

    /// Select the cells of a box, replacing or extending the mask
    pub fn select_box(&mut self, object: ObjectId, a: IVec3, b: IVec3, additive: bool) -> bool {
        if self.floating.is_some() {
            return false;
        }
        let Some(index) = self.object_index(object) else {
            return false;
        };
        if !additive {
            self.objects[index].store_mut().clear_selection();
        }
        let bounds = GridBounds::from_corners(a, b).clamped_to_dims(self.objects[index].dims());
        for pos in bounds.iter() {
            self.objects[index].store_mut().set_selected(pos, true);
        }
        self.finish_selection_change(object);
        true
    }

    /// Drop an object's selection mask, cancelling any active float on it
    pub fn clear_selection(&mut self, object: ObjectId) -> bool {
        if self.floating.as_ref().is_some_and(|f| f.object == object) {
            self.cancel_selection();
        }
        let Some(index) = self.object_index(object) else {
            return false;
        };
        if !self.objects[index].has_selection() {
            return false;
        }
        self.objects[index].store_mut().clear_selection();
        self.finish_selection_change(object);
        true
    }

    /// Lift the selected cells off an object into a floating state
    pub fn lift_selection(&mut self, object: ObjectId) -> bool {
        if self.floating.is_some() || self.is_locked(object) {
            return false;
        }
        let Some(index) = self.object_index(object) else {
            return false;
        };
        let Some(floating) = FloatingSelection::lift(&mut self.objects[index]) else {
            return false;
        };
        self.objects[index].store_mut().take_modified();
        let position = self.objects[index].position;
        self.compositor
            .mark_dirty_bounds(floating.cells().bounds().translated(position));
        debug!("lifted {} cells from {}", floating.lifted_count(), object);
        self.floating = Some(floating);
        self.notify(EditorEvent::PreviewChanged);
        true
    }

    /// Set the floating selection's offset; purely a render change
    pub fn move_selection(&mut self, offset: IVec3) -> bool {
        let Some(floating) = &mut self.floating else {
            return false;
        };
        if floating.offset() == offset {
            return true;
        }
        floating.set_offset(offset);
        // Offsets wrap, so the ghost can resurface anywhere in the grid
        self.compositor.mark_all_dirty();
        self.notify(EditorEvent::PreviewChanged);
        true
    }

    /// Stamp the floating selection down at its current offset
    pub fn commit_selection(&mut self) -> bool {
        let Some(floating) = self.floating.take() else {
            return false;
        };
        let id = floating.object;
        let Some(index) = self.object_index(id) else {
            return false;
        };
        let offset = floating.offset();
        let dims = self.objects[index].dims();

        let mut touched = floating.cells().bounds();
        for (pos, _) in floating.cells().iter_non_empty() {
            touched.expand_to_include(wrap_to_dims(pos + offset, dims));
        }

        // Pre-gesture state: the store as it is now, with the lifted
        // cells put back at their sources
        let mut before = self.objects[index].store().extract(touched);
        for (pos, v) in floating.cells().iter_non_empty() {
            before.set(pos, v);
        }
        floating.commit(&mut self.objects[index]);
        let after = self.objects[index].store().extract(touched);
        let chunks = self.objects[index].store_mut().take_modified();
        self.compositor.mark_all_dirty();

        if let Some((before, after)) = diff_frames(&before, &after) {
            self.history.push(HistoryEntry::VoxelDiff {
                object: id,
                before,
                after,
            });
            self.sync.send(RemoteOp::SelectionMove {
                object: id.0,
                offset: offset.to_array(),
            });
            self.notify_history();
        }
        if !chunks.is_empty() {
            self.notify(EditorEvent::ChunksChanged { object: id, chunks });
        }
        self.notify(EditorEvent::SelectionChanged { object: id });
        self.notify(EditorEvent::PreviewChanged);
        true
    }

    /// Put the floating selection back where it was lifted from
    pub fn cancel_selection(&mut self) -> bool {
        let Some(floating) = self.floating.take() else {
            return false;
        };
        if let Some(index) = self.object_index(floating.object) {
            floating.cancel(&mut self.objects[index]);
            self.objects[index].store_mut().take_modified();
            self.compositor.mark_all_dirty();
        }
        self.notify(EditorEvent::PreviewChanged);
        true
    }

    // ---- history ----

    /// Revert the most recent applied entry
    pub fn undo(&mut self) -> bool {
        self.cancel_selection();
        self.clear_preview();
        let Some(entry) = self.history.undo_target().cloned() else {
            return false;
        };
        self.history.step_back();
        debug!("undo {:?}", entry_kind(&entry));
        self.apply_entry(&entry, ApplyDirection::Reverse);
        if let Some(op) = outbound_for(&entry, ApplyDirection::Reverse) {
            self.sync.send(op);
        }
        self.notify_history();
        true
    }

    /// Reapply the most recently undone entry
    pub fn redo(&mut self) -> bool {
        self.cancel_selection();
        self.clear_preview();
        let Some(entry) = self.history.redo_target().cloned() else {
            return false;
        };
        self.history.step_forward();
        debug!("redo {:?}", entry_kind(&entry));
        self.apply_entry(&entry, ApplyDirection::Forward);
        if let Some(op) = outbound_for(&entry, ApplyDirection::Forward) {
            self.sync.send(op);
        }
        self.notify_history();
        true
    }

    // ---- remote inbound ----

    /// Apply a voxel diff from the authoritative store.
    ///
    /// Remote changes are not undoable locally and are never echoed
    /// back through the sink. A diff for an unknown object is dropped.
    pub fn apply_remote_diff(&mut self, diff: &RemoteDiff) -> Result<()> {
        let id = ObjectId(diff.object);
        let Some(index) = self.object_index(id) else {
            warn!("remote diff for unknown {}", id);
            return Ok(());
        };
        let before = diff.before.to_frame()?;
        let after = diff.after.to_frame()?;
        apply_voxel_diff(
            self.objects[index].store_mut(),
            &before,
            &after,
            ApplyDirection::Forward,
        );
        self.finish_voxel_write(id);
        Ok(())
    }

    /// Replace or insert an object from a remote snapshot
    pub fn apply_remote_restore(&mut self, snapshot: &ObjectSnapshot) -> Result<()> {
        let object = snapshot.to_object()?;
        self.next_object_id = self.next_object_id.max(object.id.0 + 1);
        self.compositor.mark_dirty_bounds(object.world_bounds());
        match self.object_index(object.id) {
            Some(index) => {
                self.compositor
                    .mark_dirty_bounds(self.objects[index].world_bounds());
                self.objects[index] = object;
            }
            None => self.objects.push(object),
        }
        self.notify(EditorEvent::ObjectListChanged);
        Ok(())
    }

    // ---- composite and picking ----

    /// Bring the composite up to date; returns the recomputed chunks
    pub fn refresh_composite(&mut self) -> Vec<ChunkCoord> {
        self.compositor
            .rebuild(&self.objects, self.preview.as_ref(), self.floating.as_ref())
    }

    /// Read-only access to the composite view
    pub fn composite(&self) -> &Compositor {
        &self.compositor
    }

    /// Cast a pick ray through the up-to-date composite
    pub fn pick(&mut self, ray: Ray) -> Option<RaycastHit> {
        self.refresh_composite();
        let compositor = &self.compositor;
        raycast(ray, compositor.dims(), self.config.raycast_distance, |pos| {
            compositor.get(pos)
        })
    }

    // ---- persistence ----

    /// Save the scene to a project file
    pub fn save_project(&self, path: &Path) -> Result<()> {
        project::save_project(path, &self.objects, &self.palette)
    }

    /// Load a scene, replacing all session state
    pub fn load_project(&mut self, path: &Path) -> Result<()> {
        let (objects, palette) = project::load_project(path)?;
        self.floating = None;
        self.preview = None;
        self.history.clear();
        self.objects = objects;
        self.palette = palette;
        self.next_object_id = self
            .objects
            .iter()
            .map(|o| o.id.0 + 1)
            .max()
            .unwrap_or(1);
        self.compositor.mark_all_dirty();
        self.notify(EditorEvent::ObjectListChanged);
        self.notify(EditorEvent::PaletteChanged);
        self.notify(EditorEvent::PreviewChanged);
        self.notify_history();
        Ok(())
    }

    // ---- internals ----

    fn alloc_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    fn object_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn object_position(&self, id: ObjectId) -> Option<IVec3> {
        self.object_index(id).map(|i| self.objects[i].position)
    }

    fn is_locked(&self, id: ObjectId) -> bool {
        self.object_index(id)
            .map(|i| self.objects[i].locked)
            .unwrap_or(false)
    }

    fn notify(&mut self, event: EditorEvent) {
        self.events.emit(&event);
    }

    fn notify_history(&mut self) {
        let event = EditorEvent::HistoryChanged {
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
        };
        self.events.emit(&event);
    }

    /// Shared tail of every voxel write: dirty-mark and announce the
    /// chunks the store touched
    fn finish_voxel_write(&mut self, id: ObjectId) {
        let Some(index) = self.object_index(id) else {
            return;
        };
        let position = self.objects[index].position;
        let dims = self.objects[index].dims();
        let chunks = self.objects[index].store_mut().take_modified();
        if chunks.is_empty() {
            return;
        }
        for &coord in &chunks {
            let min = coord.min_pos();
            let bounds = GridBounds::from_min_size(min, clamped_chunk_dims(min, dims));
            self.compositor.mark_dirty_bounds(bounds.translated(position));
        }
        self.notify(EditorEvent::ChunksChanged { object: id, chunks });
    }

    fn finish_selection_change(&mut self, id: ObjectId) {
        let Some(index) = self.object_index(id) else {
            return;
        };
        let position = self.objects[index].position;
        let dims = self.objects[index].dims();
        let chunks = self.objects[index].store_mut().take_modified();
        for &coord in &chunks {
            let min = coord.min_pos();
            let bounds = GridBounds::from_min_size(min, clamped_chunk_dims(min, dims));
            self.compositor.mark_dirty_bounds(bounds.translated(position));
        }
        self.notify(EditorEvent::SelectionChanged { object: id });
    }

    fn mark_preview_region(&mut self) {
        if let Some(overlay) = &self.preview {
            if let Some(position) = self.object_position(overlay.object) {
                let bounds = overlay.frame().bounds().translated(position);
                self.compositor.mark_dirty_bounds(bounds);
            }
        }
    }

    /// Resolve a preview frame against an object and record the result
    fn commit_frame(&mut self, id: ObjectId, mode: PreviewMode, preview: &VoxelFrame) -> bool {
        let Some(index) = self.object_index(id) else {
            return false;
        };
        let Some((before, after)) = tool::build_diff(self.objects[index].store(), preview, mode)
        else {
            return false;
        };
        apply_voxel_diff(
            self.objects[index].store_mut(),
            &before,
            &after,
            ApplyDirection::Forward,
        );
        self.finish_voxel_write(id);
        self.history.push(HistoryEntry::VoxelDiff {
            object: id,
            before,
            after,
        });
        self.notify_history();
        true
    }

    /// Apply one history entry in the given direction
    fn apply_entry(&mut self, entry: &HistoryEntry, direction: ApplyDirection) {
        match entry {
            HistoryEntry::VoxelDiff {
                object,
                before,
                after,
            } => {
                if let Some(index) = self.object_index(*object) {
                    apply_voxel_diff(self.objects[index].store_mut(), before, after, direction);
                    self.finish_voxel_write(*object);
                }
            }
            HistoryEntry::ColorChange {
                index,
                before,
                after,
            } => {
                if let Some(slot) = self.palette.get_mut(*index as usize) {
                    *slot = side(direction, *before, *after);
                }
                self.notify(EditorEvent::PaletteChanged);
            }
            HistoryEntry::PaletteReplace { before, after } => {
                self.palette = side(direction, before, after).clone();
                self.notify(EditorEvent::PaletteChanged);
            }
            HistoryEntry::ObjectRename {
                object,
                before,
                after,
            } => {
                if let Some(index) = self.object_index(*object) {
                    self.objects[index].name = side(direction, before, after).clone();
                }
                self.notify(EditorEvent::ObjectListChanged);
            }
            HistoryEntry::ObjectAdd { snapshot, index } => match direction {
                ApplyDirection::Forward => self.insert_object((**snapshot).clone(), *index),
                ApplyDirection::Reverse => {
                    self.remove_object_at(*index);
                }
            },
            HistoryEntry::ObjectDelete { snapshot, index } => match direction {
                ApplyDirection::Forward => {
                    self.remove_object_at(*index);
                }
                ApplyDirection::Reverse => self.insert_object((**snapshot).clone(), *index),
            },
            HistoryEntry::ObjectReorder { from, to } => {
                let (a, b) = side(direction, (*to, *from), (*from, *to));
                if a < self.objects.len() {
                    let object = self.objects.remove(a);
                    self.objects.insert(b.min(self.objects.len()), object);
                    self.compositor.mark_all_dirty();
                }
                self.notify(EditorEvent::ObjectListChanged);
            }
        }
    }

    fn insert_object(&mut self, object: VoxelObject, index: usize) {
        self.next_object_id = self.next_object_id.max(object.id.0 + 1);
        self.compositor.mark_dirty_bounds(object.world_bounds());
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        self.notify(EditorEvent::ObjectListChanged);
    }

    fn remove_object_at(&mut self, index: usize) -> Option<VoxelObject> {
        if index >= self.objects.len() {
            return None;
        }
        let object = self.objects.remove(index);
        self.compositor.mark_dirty_bounds(object.world_bounds());
        self.notify(EditorEvent::ObjectListChanged);
        Some(object)
    }
}

/// Pick the side of a before/after pair for an apply direction
fn side<T>(direction: ApplyDirection, before: T, after: T) -> T {
    match direction {
        ApplyDirection::Forward => after,
        ApplyDirection::Reverse => before,
    }
}

/// Short tag for history log lines
fn entry_kind(entry: &HistoryEntry) -> &'static str {
    match entry {
        HistoryEntry::VoxelDiff { .. } => "voxel diff",
        HistoryEntry::ColorChange { .. } => "color change",
        HistoryEntry::PaletteReplace { .. } => "palette replace",
        HistoryEntry::ObjectRename { .. } => "rename",
        HistoryEntry::ObjectAdd { .. } => "object add",
        HistoryEntry::ObjectDelete { .. } => "object delete",
        HistoryEntry::ObjectReorder { .. } => "reorder",
    }
}

/// Mirror of a history step for the authoritative store.
///
/// Voxel diffs go out with their sides swapped on reverse, so the
/// remote always applies what it receives forward.
fn outbound_for(entry: &HistoryEntry, direction: ApplyDirection) -> Option<RemoteOp> {
    match entry {
        HistoryEntry::VoxelDiff {
            object,
            before,
            after,
        } => {
            let (b, a) = side(direction, (after, before), (before, after));
            Some(RemoteOp::Diff(RemoteDiff {
                object: object.0,
                before: FramePayload::from_frame(b),
                after: FramePayload::from_frame(a),
            }))
        }
        HistoryEntry::ColorChange {
            index,
            before,
            after,
        } => Some(RemoteOp::PaletteSet {
            index: *index,
            color: *side(direction, before, after),
        }),
        HistoryEntry::PaletteReplace { before, after } => Some(RemoteOp::PaletteReplace {
            colors: side(direction, before, after).clone(),
        }),
        HistoryEntry::ObjectRename {
            object,
            before,
            after,
        } => Some(RemoteOp::ObjectRename {
            object: object.0,
            name: side(direction, before, after).clone(),
        }),
        HistoryEntry::ObjectAdd { snapshot, .. } => match direction {
            ApplyDirection::Forward => Some(RemoteOp::Restore(Box::new(
                ObjectSnapshot::from_object(snapshot),
            ))),
            ApplyDirection::Reverse => Some(RemoteOp::ObjectDelete {
                object: snapshot.id.0,
            }),
        },
        HistoryEntry::ObjectDelete { snapshot, .. } => match direction {
            ApplyDirection::Forward => Some(RemoteOp::ObjectDelete {
                object: snapshot.id.0,
            }),
            ApplyDirection::Reverse => Some(RemoteOp::Restore(Box::new(
                ObjectSnapshot::from_object(snapshot),
            ))),
        },
        HistoryEntry::ObjectReorder { from, to } => {
            let (f, t) = side(direction, (*to, *from), (*from, *to));
            Some(RemoteOp::ObjectReorder { from: f, to: t })
        }
    }
}

/// Default 16-color palette; slot 0 is the background
fn default_palette() -> Vec<PaletteColor> {
    vec![
        [0, 0, 0],
        [29, 43, 83],
        [126, 37, 83],
        [0, 135, 81],
        [171, 82, 54],
        [95, 87, 79],
        [194, 195, 199],
        [255, 241, 232],
        [255, 0, 77],
        [255, 163, 0],
        [255, 236, 39],
        [0, 228, 54],
        [41, 173, 255],
        [131, 118, 156],
        [255, 119, 168],
        [255, 204, 170],
    ]
}
