//! Project file persistence
//!
//! A project file is a small binary container: magic and version, a
//! JSON header describing the palette and every object, then one
//! codec-compressed blob per occupied chunk in header order. The
//! header records each blob's byte length, so readers never have to
//! parse voxel data to walk the file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::core::error::Error;
use crate::core::types::{IVec3, PaletteColor, Result, UVec3};
use crate::voxel::chunk::{clamped_chunk_dims, ChunkCoord};
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::{ObjectId, VoxelObject};

const MAGIC: &[u8; 4] = b"VXFP";
const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ProjectHeader {
    palette: Vec<PaletteColor>,
    objects: Vec<ObjectMeta>,
}

#[derive(Serialize, Deserialize)]
struct ObjectMeta {
    id: u32,
    name: String,
    visible: bool,
    locked: bool,
    position: [i32; 3],
    dims: [u32; 3],
    chunks: Vec<ChunkMeta>,
}

#[derive(Serialize, Deserialize)]
struct ChunkMeta {
    coord: [i32; 3],
    len: u32,
}

/// Save a scene to a project file
pub fn save_project(path: &Path, objects: &[VoxelObject], palette: &[PaletteColor]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_project(&mut writer, objects, palette)?;
    writer.flush()?;
    info!(
        "saved project with {} objects to {}",
        objects.len(),
        path.display()
    );
    Ok(())
}

/// Load a scene from a project file
pub fn load_project(path: &Path) -> Result<(Vec<VoxelObject>, Vec<PaletteColor>)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let loaded = read_project(&mut reader)?;
    info!(
        "loaded project with {} objects from {}",
        loaded.0.len(),
        path.display()
    );
    Ok(loaded)
}

/// Write a scene to any writer
pub fn write_project(
    writer: &mut impl Write,
    objects: &[VoxelObject],
    palette: &[PaletteColor],
) -> Result<()> {
    let mut blobs: Vec<Vec<u8>> = Vec::new();
    let mut metas = Vec::with_capacity(objects.len());
    for object in objects {
        let mut chunks = Vec::new();
        for coord in object.store().coords_sorted() {
            let Some(chunk) = object.store().chunk(coord) else {
                continue;
            };
            if chunk.is_all_empty() {
                continue;
            }
            let blob = codec::compress(chunk.voxels().as_bytes());
            chunks.push(ChunkMeta {
                coord: [coord.x, coord.y, coord.z],
                len: blob.len() as u32,
            });
            blobs.push(blob);
        }
        metas.push(ObjectMeta {
            id: object.id.0,
            name: object.name.clone(),
            visible: object.visible,
            locked: object.locked,
            position: object.position.to_array(),
            dims: object.dims().to_array(),
            chunks,
        });
    }
    let header = ProjectHeader {
        palette: palette.to_vec(),
        objects: metas,
    };
    let json = serde_json::to_vec(&header).map_err(|e| Error::Project(e.to_string()))?;

    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(json.len() as u32).to_le_bytes())?;
    writer.write_all(&json)?;
    for blob in &blobs {
        writer.write_all(blob)?;
    }
    Ok(())
}

/// Read a scene from any reader
pub fn read_project(reader: &mut impl Read) -> Result<(Vec<VoxelObject>, Vec<PaletteColor>)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::Project("invalid magic bytes".into()));
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != VERSION {
        return Err(Error::Project(format!("unsupported version: {version}")));
    }

    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let mut json = vec![0u8; header_len];
    reader.read_exact(&mut json)?;
    let header: ProjectHeader =
        serde_json::from_slice(&json).map_err(|e| Error::Project(e.to_string()))?;

    let mut objects = Vec::with_capacity(header.objects.len());
    for meta in &header.objects {
        let dims = UVec3::from_array(meta.dims);
        let mut object = VoxelObject::new(ObjectId(meta.id), meta.name.clone(), dims);
        object.visible = meta.visible;
        object.locked = meta.locked;
        object.position = IVec3::from_array(meta.position);
        for chunk_meta in &meta.chunks {
            let min = ChunkCoord::new(chunk_meta.coord[0], chunk_meta.coord[1], chunk_meta.coord[2])
                .min_pos();
            let chunk_dims = clamped_chunk_dims(min, dims);
            let volume = chunk_dims.x as usize * chunk_dims.y as usize * chunk_dims.z as usize;
            if volume == 0 {
                return Err(Error::Project(format!(
                    "chunk at {min} lies outside its object grid"
                )));
            }
            let mut blob = vec![0u8; chunk_meta.len as usize];
            reader.read_exact(&mut blob)?;
            let bytes = codec::decompress_exact(&blob, volume)?;
            let frame = VoxelFrame::from_bytes(min, chunk_dims, bytes)?;
            object.store_mut().blit(&frame);
        }
        object.store_mut().take_modified();
        objects.push(object);
    }
    Ok((objects, header.palette))
}
