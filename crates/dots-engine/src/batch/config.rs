use std::f32::consts::TAU;

use super::{BatchError, ColorVertex, PrimitiveKind, TexturedVertex, Vertex};

/// Float budget of each vertex buffer in the default configuration.
const DEFAULT_BUFFER_FLOATS: usize = 4096;

/// Largest line loop the tessellator will ever emit.
const MAX_LOOP_VERTICES: usize = 1 << 24;

/// Vertices per quad / square (two triangles).
pub(crate) const QUAD_VERTICES: usize = 6;

/// Vertices per line segment.
pub(crate) const LINE_VERTICES: usize = 2;

/// Buffer capacities and tessellation settings for `BatchAccumulator`.
///
/// Capacities are in vertices. The defaults give every buffer the same
/// 4096-float budget, so the wider textured layout holds fewer vertices.
/// Batch capacities are whole numbers of primitives, so every flush but the
/// last one of a frame sends a full buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Triangle batch size (`TexturedVertex`).
    pub triangle_capacity: usize,

    /// Line batch size (`ColorVertex`).
    pub line_capacity: usize,

    /// Largest single line loop (`ColorVertex`).
    pub immediate_capacity: usize,

    /// Angular step used by `draw_circle`, in radians.
    pub circle_step: f32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            triangle_capacity: whole_primitives(
                DEFAULT_BUFFER_FLOATS / TexturedVertex::FLOATS,
                QUAD_VERTICES,
            ),
            line_capacity: whole_primitives(
                DEFAULT_BUFFER_FLOATS / ColorVertex::FLOATS,
                LINE_VERTICES,
            ),
            immediate_capacity: DEFAULT_BUFFER_FLOATS / ColorVertex::FLOATS,
            circle_step: 0.075,
        }
    }
}

impl BatchConfig {
    /// Checks that every buffer holds at least one of its primitives, a whole
    /// number of them, and no more vertices than one draw call can address.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.triangle_capacity < QUAD_VERTICES {
            return Err(BatchError::CapacityExceeded {
                kind: PrimitiveKind::Triangles,
                required: QUAD_VERTICES,
                capacity: self.triangle_capacity,
            });
        }
        if self.line_capacity < LINE_VERTICES {
            return Err(BatchError::CapacityExceeded {
                kind: PrimitiveKind::Lines,
                required: LINE_VERTICES,
                capacity: self.line_capacity,
            });
        }

        for (kind, capacity, per_primitive) in [
            (PrimitiveKind::Triangles, self.triangle_capacity, QUAD_VERTICES),
            (PrimitiveKind::Lines, self.line_capacity, LINE_VERTICES),
            (PrimitiveKind::LineLoop, self.immediate_capacity, 1),
        ] {
            if capacity % per_primitive != 0 || u32::try_from(capacity).is_err() {
                return Err(BatchError::InvalidCapacity {
                    kind,
                    capacity,
                    per_primitive,
                });
            }
        }

        let required = circle_vertex_count(self.circle_step).unwrap_or(usize::MAX);
        if required > self.immediate_capacity {
            return Err(BatchError::CapacityExceeded {
                kind: PrimitiveKind::LineLoop,
                required,
                capacity: self.immediate_capacity,
            });
        }

        Ok(())
    }
}

const fn whole_primitives(vertices: usize, per_primitive: usize) -> usize {
    vertices - vertices % per_primitive
}

/// Number of vertices `k * step` (k = 0, 1, ..) strictly below one full turn.
///
/// Returns `None` when `step` is not a positive finite number or the loop would
/// exceed `MAX_LOOP_VERTICES`.
pub(crate) fn circle_vertex_count(step: f32) -> Option<usize> {
    if !(step.is_finite() && step > 0.0) {
        return None;
    }

    let estimate = (f64::from(TAU) / f64::from(step)).ceil();
    if estimate > MAX_LOOP_VERTICES as f64 {
        return None;
    }

    // Settle on the exact count under f32 angle arithmetic.
    let mut n = estimate as usize;
    while n > 0 && (n - 1) as f32 * step >= TAU {
        n -= 1;
    }
    while (n as f32) * step < TAU {
        n += 1;
    }
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_config_is_valid() {
        let cfg = BatchConfig::default();
        assert_eq!(cfg.triangle_capacity, 582);
        assert_eq!(cfg.line_capacity, 818);
        assert_eq!(cfg.immediate_capacity, 819);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_primitive_capacity_is_rejected() {
        let cfg = BatchConfig { triangle_capacity: 585, ..BatchConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(BatchError::InvalidCapacity {
                kind: PrimitiveKind::Triangles,
                capacity: 585,
                per_primitive: 6,
            })
        );

        let cfg = BatchConfig { line_capacity: 819, ..BatchConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(BatchError::InvalidCapacity { kind: PrimitiveKind::Lines, .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn capacity_beyond_one_draw_call_is_rejected() {
        let too_big = u32::MAX as usize + 1;
        let cfg = BatchConfig { line_capacity: too_big, ..BatchConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(BatchError::InvalidCapacity {
                kind: PrimitiveKind::Lines,
                capacity: too_big,
                per_primitive: 2,
            })
        );
    }

    #[test]
    fn triangle_capacity_below_one_quad_is_rejected() {
        let cfg = BatchConfig { triangle_capacity: 5, ..BatchConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(BatchError::CapacityExceeded {
                kind: PrimitiveKind::Triangles,
                required: 6,
                capacity: 5,
            })
        );
    }

    #[test]
    fn line_capacity_below_one_segment_is_rejected() {
        let cfg = BatchConfig { line_capacity: 1, ..BatchConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(BatchError::CapacityExceeded { kind: PrimitiveKind::Lines, .. })
        ));
    }

    #[test]
    fn default_circle_must_fit_immediate_buffer() {
        let cfg = BatchConfig { immediate_capacity: 10, ..BatchConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(BatchError::CapacityExceeded {
                kind: PrimitiveKind::LineLoop,
                required: 84,
                capacity: 10,
            })
        );
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let cfg = BatchConfig { circle_step: 0.0, ..BatchConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn circle_counts() {
        assert_eq!(circle_vertex_count(FRAC_PI_2), Some(4));
        assert_eq!(circle_vertex_count(0.075), Some(84));
        assert_eq!(circle_vertex_count(10.0), Some(1));
        assert_eq!(circle_vertex_count(f32::NAN), None);
        assert_eq!(circle_vertex_count(-1.0), None);
        assert_eq!(circle_vertex_count(1e-12), None);
    }
}
