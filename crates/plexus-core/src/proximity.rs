use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use tracing::warn;

use crate::grid::{CellCoord, SpatialGrid};
use crate::math::{strength, DistanceMetric};

/// A connection between two particles closer than the connection radius.
///
/// `a < b` always holds. `strength` is in `(0, 1]` and is meant to be used
/// directly as line opacity.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub strength: f32,
}

/// Offsets of the neighbor cells each home cell is responsible for.
///
/// Together with their mirror images (owned by the neighbor) these cover all
/// 8 adjacencies, so every pair of distinct adjacent cells is visited once.
const FORWARD: [(i32, i32); 4] = [(0, 1), (1, 0), (1, -1), (1, 1)];

/// With fewer than 3 cells per axis the forward offsets alias each other.
const MIN_FORWARD_SIDE: u32 = 3;

/// Test one pair and build the edge if it is within the radius.
#[inline]
fn connect(
    i: u32,
    j: u32,
    positions: &[Vec2],
    radius_sq: f32,
    metric: DistanceMetric,
) -> Option<Edge> {
    let d2 = metric.distance_sq(positions[i as usize], positions[j as usize]);
    if d2 >= radius_sq {
        return None;
    }
    let (a, b) = if i < j { (i, j) } else { (j, i) };
    Some(Edge {
        a,
        b,
        strength: strength(d2, radius_sq).max(f32::MIN_POSITIVE),
    })
}

/// Enumerates every particle pair within the connection radius exactly once.
///
/// Each pass visits every cell: particles in the same cell are paired with
/// `i < j`, and each particle is tested against the particles of the 4
/// forward neighbor cells. Pairs in non-adjacent cells are skipped, which is
/// only sound on grids accepted by [`supports`](Self::supports). Any other
/// grid is handled by pairing every cell with every other one.
pub struct ProximityGraphBuilder {
    radius: f32,
    radius_sq: f32,
    metric: DistanceMetric,
    edges: Vec<Edge>,
    pairs_tested: usize,
    warned_unsupported: bool,
}

impl ProximityGraphBuilder {
    pub fn new(radius: f32, metric: DistanceMetric) -> Self {
        Self {
            radius,
            radius_sq: radius * radius,
            metric,
            edges: Vec::new(),
            pairs_tested: 0,
            warned_unsupported: false,
        }
    }

    /// Whether no pair within the radius can span non-adjacent cells of `grid`.
    ///
    /// Cells must be at least one radius wide. Under the toroidal metric the
    /// seam is crossed too, so a narrow last column is not allowed either.
    pub fn supports(&self, grid: &SpatialGrid) -> bool {
        grid.cell_size() >= self.radius
            && match self.metric {
                DistanceMetric::Euclidean => true,
                DistanceMetric::Toroidal => grid.tiles_evenly(),
            }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Edges produced by the last [`build`](Self::build).
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of candidate pairs whose distance was computed in the last build.
    pub fn pairs_tested(&self) -> usize {
        self.pairs_tested
    }

    /// Recompute the edge list from the grid. `positions` is indexed by the
    /// particle indices stored in the grid.
    pub fn build(&mut self, grid: &SpatialGrid, positions: &[Vec2]) -> &[Edge] {
        self.edges.clear();
        self.pairs_tested = 0;

        let side = grid.side();
        let forward = side >= MIN_FORWARD_SIDE && self.supports(grid);
        if side >= MIN_FORWARD_SIDE && !forward && !self.warned_unsupported {
            warn!(
                radius = self.radius,
                cell_size = grid.cell_size(),
                side,
                metric = ?self.metric,
                "grid does not match the connection radius, testing all cell pairs"
            );
            self.warned_unsupported = true;
        }

        for cy in 0..side {
            for cx in 0..side {
                let home = CellCoord::new(cx, cy);
                let members = grid.cell(home);
                if members.is_empty() {
                    continue;
                }

                for (k, &i) in members.iter().enumerate() {
                    for &j in &members[k + 1..] {
                        self.test(i, j, positions);
                    }
                }

                if forward {
                    for (dx, dy) in FORWARD {
                        let other = grid.cell(grid.neighbor(home, dx, dy));
                        self.test_across(members, other, positions);
                    }
                }
            }
        }

        if !forward {
            // Every cell may hold a neighbor: visit each distinct cell pair once.
            let cells: Vec<&[u32]> = grid.cells().map(|(_, members)| members).collect();
            for (k, first) in cells.iter().enumerate() {
                for second in &cells[k + 1..] {
                    self.test_across(first, second, positions);
                }
            }
        }

        &self.edges
    }

    #[inline]
    fn test_across(&mut self, first: &[u32], second: &[u32], positions: &[Vec2]) {
        for &i in first {
            for &j in second {
                self.test(i, j, positions);
            }
        }
    }

    #[inline]
    fn test(&mut self, i: u32, j: u32, positions: &[Vec2]) {
        self.pairs_tested += 1;
        if let Some(edge) = connect(i, j, positions, self.radius_sq, self.metric) {
            self.edges.push(edge);
        }
    }
}

/// O(N²) reference: every unordered pair checked directly, in `(a, b)` order.
pub fn brute_force_edges(positions: &[Vec2], radius: f32, metric: DistanceMetric) -> Vec<Edge> {
    let radius_sq = radius * radius;
    let n = positions.len() as u32;
    let mut edges = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            if let Some(edge) = connect(i, j, positions, radius_sq, metric) {
                edges.push(edge);
            }
        }
    }
    edges
}
