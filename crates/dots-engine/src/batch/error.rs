use std::fmt;

/// Primitive kinds with their own vertex budget.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrimitiveKind {
    Triangles,
    Lines,
    LineLoop,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Triangles => "triangle",
            PrimitiveKind::Lines => "line",
            PrimitiveKind::LineLoop => "line-loop",
        };
        f.write_str(name)
    }
}

/// Out-of-order `begin` / `end` / append.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StateViolation {
    /// `begin()` while a frame is already open.
    AlreadyDrawing,
    /// `end()` or an append without an open frame.
    NotDrawing,
    /// `begin()` after `dispose()` released the buffers.
    Disposed,
}

impl fmt::Display for StateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateViolation::AlreadyDrawing => f.write_str("renderer is already drawing"),
            StateViolation::NotDrawing => f.write_str("renderer isn't drawing"),
            StateViolation::Disposed => f.write_str("renderer has been disposed"),
        }
    }
}

/// Errors reported by the batch accumulator.
///
/// Neither kind is recoverable mid-frame. A full buffer is not an error: the
/// accumulator flushes and continues.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BatchError {
    /// Caller bug; the current frame should be aborted.
    #[error("invalid batch state: {0}")]
    InvalidState(StateViolation),

    /// A single primitive needs more vertices than its buffer can ever hold.
    #[error("{kind} primitive needs {required} vertices but capacity is {capacity}")]
    CapacityExceeded {
        kind: PrimitiveKind,
        required: usize,
        capacity: usize,
    },

    /// A buffer capacity that wastes slots at every flush or cannot be drawn in one call.
    #[error(
        "{kind} capacity {capacity} must be a multiple of {per_primitive} vertices and at most {max}",
        max = u32::MAX
    )]
    InvalidCapacity {
        kind: PrimitiveKind,
        capacity: usize,
        per_primitive: usize,
    },
}

impl BatchError {
    #[inline]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, BatchError::InvalidState(_))
    }
}
