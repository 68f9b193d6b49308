use super::Vertex;

/// Fixed-capacity vertex storage for one batch.
///
/// Storage is reserved once in `new` and reused across flushes; `clear` keeps the
/// allocation. `push_slice` is all-or-nothing: it never writes past `capacity`.
#[derive(Debug, Clone)]
pub struct VertexBatch<V: Vertex> {
    vertices: Vec<V>,
    capacity: usize,
}

impl<V: Vertex> VertexBatch<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.vertices.len()
    }

    /// Returns true if `count` more vertices fit without a flush.
    #[inline]
    pub fn fits(&self, count: usize) -> bool {
        count <= self.remaining()
    }

    /// Appends `vertices` if they all fit.
    ///
    /// On overflow nothing is written and the number of missing slots is returned.
    pub fn push_slice(&mut self, vertices: &[V]) -> Result<(), usize> {
        if !self.fits(vertices.len()) {
            return Err(vertices.len() - self.remaining());
        }
        self.vertices.extend_from_slice(vertices);
        Ok(())
    }

    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Used region as raw bytes, ready for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}
