//! Chunk space snapshots.
//!
//! Binary layout (little-endian):
//!
//! | field        | type       |
//! |--------------|------------|
//! | magic        | `b"PFVX"`  |
//! | version      | `u16`      |
//! | chunk size   | `u16`      |
//! | chunk count  | `u32`      |
//!
//! followed by one record per chunk, in chunk coordinate order:
//!
//! | field        | type                                   |
//! |--------------|----------------------------------------|
//! | coordinate   | 3 × `i32`                              |
//! | dirty        | `u8`                                   |
//! | payload len  | `u32`                                  |
//! | payload      | LZ4 (size prepended) voxel array image |

use std::io::{Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress};

use crate::chunk::{validate_chunk_size, ChunkCoord, VoxelChunk};
use crate::error::{CoreError, CoreResult};
use crate::space::ChunkSpace;
use crate::voxel::Voxel;

/// Snapshot magic bytes.
pub const MAGIC: [u8; 4] = *b"PFVX";

/// Current snapshot format version.
pub const FORMAT_VERSION: u16 = 1;

/// Encodes every chunk of a space into a snapshot.
#[must_use]
pub fn encode_space(space: &ChunkSpace) -> Vec<u8> {
    let mut chunks: Vec<&VoxelChunk> = space.iter().map(|(_, chunk)| chunk).collect();
    chunks.sort_unstable_by_key(|chunk| chunk.coord());

    let mut out = Vec::with_capacity(12 + chunks.len() * 64);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(space.chunk_size() as u16).to_le_bytes());
    out.extend_from_slice(&(chunks.len() as u32).to_le_bytes());

    for chunk in chunks {
        let coord = chunk.coord();
        let payload = compress_prepend_size(chunk.as_bytes());
        out.extend_from_slice(&coord.x.to_le_bytes());
        out.extend_from_slice(&coord.y.to_le_bytes());
        out.extend_from_slice(&coord.z.to_le_bytes());
        out.push(u8::from(chunk.is_dirty()));
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
    }
    out
}

/// Decodes a snapshot into a new space.
///
/// # Errors
///
/// Returns the specific [`CoreError`] for bad magic, unknown version, an
/// invalid chunk size, truncation, a payload that fails to decompress or has
/// the wrong size, an ill-formed voxel, a duplicated chunk coordinate, or
/// bytes after the last record.
pub fn decode_space(bytes: &[u8]) -> CoreResult<ChunkSpace> {
    let mut reader = Reader::new(bytes);

    if reader.take(4)? != MAGIC {
        return Err(CoreError::BadMagic);
    }
    let version = reader.u16()?;
    if version != FORMAT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    let chunk_size = validate_chunk_size(usize::from(reader.u16()?))?;
    let count = reader.u32()?;

    let mut space = ChunkSpace::new(chunk_size)?;
    let expected = chunk_size * chunk_size * chunk_size * Voxel::SIZE;

    for _ in 0..count {
        let coord = ChunkCoord::new(reader.i32()?, reader.i32()?, reader.i32()?);
        let dirty = reader.u8()? != 0;
        let len = reader.u32()? as usize;
        let payload = reader.take(len)?;

        // Check the declared size before decompressing allocates it.
        let (prefix, block) = payload.split_at(payload.len().min(4));
        let declared = <[u8; 4]>::try_from(prefix)
            .map(u32::from_le_bytes)
            .map_err(|_| CoreError::Truncated(reader.pos - payload.len() + prefix.len()))?
            as usize;
        if declared != expected {
            return Err(CoreError::PayloadSizeMismatch {
                expected,
                actual: declared,
            });
        }

        let raw = decompress(block, expected).map_err(|e| CoreError::Decompress(e.to_string()))?;
        if raw.len() != expected {
            return Err(CoreError::PayloadSizeMismatch {
                expected,
                actual: raw.len(),
            });
        }
        // Decompressed buffers carry no alignment guarantee.
        let cells: Box<[Voxel]> = raw
            .chunks_exact(Voxel::SIZE)
            .map(bytemuck::pod_read_unaligned::<Voxel>)
            .collect();

        let chunk = VoxelChunk::from_cells(coord, chunk_size, cells, dirty)?;
        space.insert_chunk(chunk)?;
    }

    if reader.remaining() != 0 {
        return Err(CoreError::TrailingBytes(reader.remaining()));
    }

    tracing::debug!(chunks = count, chunk_size, "snapshot decoded");
    Ok(space)
}

/// Writes a snapshot of a space to a file.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if file operations fail.
pub fn save_space(space: &ChunkSpace, path: &Path) -> CoreResult<()> {
    let bytes = encode_space(space);
    let mut file = std::fs::File::create(path)?;
    file.write_all(&bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}

/// Reads a snapshot file into a new space.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if file operations fail, otherwise as
/// [`decode_space`].
pub fn load_space(path: &Path) -> CoreResult<ChunkSpace> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    decode_space(&bytes)
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CoreResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CoreError::Truncated(self.pos));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CoreResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> CoreResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> CoreResult<u16> {
        self.array().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> CoreResult<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> CoreResult<i32> {
        self.array().map(i32::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::LocalPos;
    use crate::voxel::{FaceDirection, MaterialId, SurfaceId, VoxelKind};

    fn sample_space() -> ChunkSpace {
        let mut space = ChunkSpace::new(4).unwrap();
        let a = space.create_chunk(ChunkCoord::new(0, 0, 0));
        let mut voxel = Voxel::with_appearance(MaterialId::new(3), SurfaceId::new(8));
        voxel.set_face_hidden(FaceDirection::Up, true);
        space.set_voxel(a, LocalPos::new(1, 1, 1), voxel);
        space.set_voxel(a, LocalPos::new(-1, 0, 0), Voxel::solid(VoxelKind::CornerConcave2m));
        space.chunk_mut(a).unwrap().clear_dirty();
        space
    }

    #[test]
    fn test_roundtrip_preserves_state() {
        let space = sample_space();
        let restored = decode_space(&encode_space(&space)).unwrap();

        assert_eq!(restored.chunk_size(), 4);
        assert_eq!(restored.len(), 2);
        for (_, chunk) in space.iter() {
            let other = restored.chunk_at(chunk.coord()).unwrap();
            assert_eq!(other.cells(), chunk.cells());
            assert_eq!(other.is_dirty(), chunk.is_dirty());
            assert_eq!(other.solid_count(), chunk.solid_count());
        }
    }

    #[test]
    fn test_rejects_corrupt_headers() {
        let bytes = encode_space(&sample_space());

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert_eq!(decode_space(&bad_magic).unwrap_err(), CoreError::BadMagic);

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        assert_eq!(
            decode_space(&bad_version).unwrap_err(),
            CoreError::UnsupportedVersion(9)
        );

        assert!(matches!(
            decode_space(&bytes[..bytes.len() - 3]),
            Err(CoreError::Truncated(_))
        ));
    }

    #[test]
    fn test_rejects_corrupt_voxel() {
        // A single cell with a garbage kind byte.
        let mut image = vec![0u8; Voxel::SIZE];
        image[49] = 0xEE;
        let bytes = single_record(&compress_prepend_size(&image));

        assert_eq!(
            decode_space(&bytes).unwrap_err(),
            CoreError::CorruptVoxel { index: 0 }
        );
    }

    /// Header plus one record for a single-cell chunk carrying `payload`.
    fn single_record(payload: &[u8]) -> Vec<u8> {
        let mut space = ChunkSpace::new(1).unwrap();
        space.create_chunk(ChunkCoord::default());
        let mut bytes = encode_space(&space);
        bytes.truncate(12 + 13);
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_rejects_oversized_declared_payload() {
        // Claims a 4 GiB image; must fail before any allocation of that size.
        let bytes = single_record(&[0xFF, 0xFF, 0xFF, 0xFF, 0x10, 0x00]);
        assert_eq!(
            decode_space(&bytes).unwrap_err(),
            CoreError::PayloadSizeMismatch {
                expected: Voxel::SIZE,
                actual: u32::MAX as usize,
            }
        );
    }

    #[test]
    fn test_rejects_missing_size_prefix() {
        let bytes = single_record(&[0x34, 0x00]);
        assert!(matches!(decode_space(&bytes), Err(CoreError::Truncated(_))));
    }

    #[test]
    fn test_rejects_undecodable_payload() {
        // Correct size prefix, then a literal-length token with no data.
        let mut payload = (Voxel::SIZE as u32).to_le_bytes().to_vec();
        payload.push(0xFF);
        let bytes = single_record(&payload);
        assert!(matches!(decode_space(&bytes), Err(CoreError::Decompress(_))));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = encode_space(&sample_space());
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(decode_space(&bytes).unwrap_err(), CoreError::TrailingBytes(3));
    }

    #[test]
    fn test_file_roundtrip() {
        let space = sample_space();
        let path = std::env::temp_dir().join("panelforge_persistence_test.pfvx");
        save_space(&space, &path).unwrap();
        let restored = load_space(&path).unwrap();
        assert_eq!(restored.len(), space.len());
        std::fs::remove_file(&path).ok();
    }
}
