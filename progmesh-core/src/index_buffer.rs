//! Triangle index buffers with a fixed 16- or 32-bit element width

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Element width of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Number of vertices from which 32-bit indices are required
    pub const U32_THRESHOLD: usize = 65536;

    /// Narrowest width able to address `vertex_count` vertices
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count >= Self::U32_THRESHOLD {
            IndexWidth::U32
        } else {
            IndexWidth::U16
        }
    }

    /// Size of one index in bytes
    pub fn byte_size(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }
}

/// A flat triangle list, three indices per triangle.
///
/// The width is a property of the buffer itself and is never inferred from
/// the values it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Create an empty buffer with room for `capacity` indices
    pub fn with_capacity(width: IndexWidth, capacity: usize) -> Self {
        match width {
            IndexWidth::U16 => IndexBuffer::U16(Vec::with_capacity(capacity)),
            IndexWidth::U32 => IndexBuffer::U32(Vec::with_capacity(capacity)),
        }
    }

    /// Build a buffer of `width` from 32-bit index values
    pub fn from_indices(width: IndexWidth, indices: &[u32]) -> Result<Self> {
        let mut buffer = Self::with_capacity(width, indices.len());
        for &index in indices {
            buffer.push(index)?;
        }
        Ok(buffer)
    }

    /// Build a buffer from triangle faces, picking the width from `vertex_count`
    pub fn from_faces(faces: &[[usize; 3]], vertex_count: usize) -> Result<Self> {
        let width = IndexWidth::for_vertex_count(vertex_count);
        let mut buffer = Self::with_capacity(width, faces.len() * 3);
        for face in faces {
            for &index in face {
                let index = u32::try_from(index).map_err(|_| {
                    Error::Unsupported(format!("index {} exceeds the 32-bit range", index))
                })?;
                buffer.push(index)?;
            }
        }
        Ok(buffer)
    }

    pub fn width(&self) -> IndexWidth {
        match self {
            IndexBuffer::U16(_) => IndexWidth::U16,
            IndexBuffer::U32(_) => IndexWidth::U32,
        }
    }

    /// Number of indices (not triangles)
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(data) => data.len(),
            IndexBuffer::U32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn triangle_count(&self) -> usize {
        self.len() / 3
    }

    /// Index at position `i`, widened to 32 bits
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexBuffer::U16(data) => data.get(i).map(|&v| v as u32),
            IndexBuffer::U32(data) => data.get(i).copied(),
        }
    }

    /// Append one index, failing if it does not fit the buffer's width
    pub fn push(&mut self, index: u32) -> Result<()> {
        match self {
            IndexBuffer::U16(data) => {
                let narrow = u16::try_from(index).map_err(|_| {
                    Error::InvalidData(format!(
                        "index {} cannot be stored in a 16-bit index buffer",
                        index
                    ))
                })?;
                data.push(narrow);
            }
            IndexBuffer::U32(data) => data.push(index),
        }
        Ok(())
    }

    /// Iterate over all indices, widened to 32 bits
    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            IndexBuffer::U16(data) => Box::new(data.iter().map(|&v| v as u32)),
            IndexBuffer::U32(data) => Box::new(data.iter().copied()),
        }
    }

    /// Iterate over complete triangles; a trailing partial triangle is ignored
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let base = t * 3;
            [
                self.get(base).unwrap_or(0),
                self.get(base + 1).unwrap_or(0),
                self.get(base + 2).unwrap_or(0),
            ]
        })
    }

    /// Largest index in the buffer
    pub fn max_index(&self) -> Option<u32> {
        self.iter().max()
    }

    /// Raw bytes for upload into a GPU index buffer
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(data) => bytemuck::cast_slice(data),
            IndexBuffer::U32(data) => bytemuck::cast_slice(data),
        }
    }
}
