//! Chain shapes: an open or looped polyline of one-sided segments, each
//! attached to its own fixture, with ghost vertices at the neighboring
//! points so the narrow phase can suppress spurious internal-vertex
//! collisions ("ghost collisions" in Box2D parlance).

use smallvec::SmallVec;

use crate::types::{Real, Vec2};

/// One edge of a chain, carrying the vertices one step before and after
/// it so collision code can compute smooth normals across the joint
/// between consecutive segments.
#[derive(Copy, Clone, Debug)]
pub struct ChainSegment {
    pub ghost1: Vec2,
    pub point1: Vec2,
    pub point2: Vec2,
    pub ghost2: Vec2,
}

/// A chain of connected segments. Construction validates that consecutive
/// points are not coincident; `loop_closed` wraps the last point back to
/// the first instead of leaving two open ends.
#[derive(Clone, Debug)]
pub struct ChainShape {
    points: Vec<Vec2>,
    loop_closed: bool,
}

impl ChainShape {
    pub fn new(points: Vec<Vec2>, loop_closed: bool) -> Option<Self> {
        if points.len() < 3 && !(points.len() == 2 && !loop_closed) {
            return None;
        }
        for w in points.windows(2) {
            if (w[1] - w[0]).length_squared() < Real::EPSILON {
                return None;
            }
        }
        Some(Self {
            points,
            loop_closed,
        })
    }

    pub fn segment_count(&self) -> usize {
        if self.loop_closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Ghost-aware view of edge `i`, for `0 <= i < segment_count()`.
    pub fn segment(&self, i: usize) -> ChainSegment {
        let n = self.points.len();
        let idx = |k: isize| -> Vec2 {
            let m = n as isize;
            let wrapped = ((k % m) + m) % m;
            self.points[wrapped as usize]
        };

        if self.loop_closed {
            let ii = i as isize;
            ChainSegment {
                ghost1: idx(ii - 1),
                point1: idx(ii),
                point2: idx(ii + 1),
                ghost2: idx(ii + 2),
            }
        } else {
            let point1 = self.points[i];
            let point2 = self.points[i + 1];
            let ghost1 = if i == 0 { point1 } else { self.points[i - 1] };
            let ghost2 = if i + 2 < n { self.points[i + 2] } else { point2 };
            ChainSegment {
                ghost1,
                point1,
                point2,
                ghost2,
            }
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_loop(&self) -> bool {
        self.loop_closed
    }
}

impl ChainSegment {
    pub fn to_vertices(&self) -> SmallVec<[Vec2; 2]> {
        let mut v = SmallVec::new();
        v.push(self.point1);
        v.push(self.point2);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_chain_has_n_minus_one_segments() {
        let chain = ChainShape::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(3.0, 0.0),
            ],
            false,
        )
        .unwrap();
        assert_eq!(chain.segment_count(), 3);
        let first = chain.segment(0);
        assert_eq!(first.ghost1, first.point1);
    }

    #[test]
    fn looped_chain_wraps_ghost_vertices() {
        let chain = ChainShape::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            true,
        )
        .unwrap();
        assert_eq!(chain.segment_count(), 4);
        let seg = chain.segment(0);
        assert_eq!(seg.ghost1, Vec2::new(0.0, 1.0));
        assert_eq!(seg.ghost2, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn rejects_degenerate_coincident_points() {
        let chain = ChainShape::new(
            vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)],
            false,
        );
        assert!(chain.is_none());
    }
}
