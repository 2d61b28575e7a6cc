use glam::Vec2;

use crate::error::GridError;

/// Largest number of cells allowed along one axis.
pub const MAX_SIDE: u32 = 4096;

/// Integer cell coordinate in `[0, side)²`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Uniform square grid over the world, maintained incrementally.
///
/// Each cell holds the indices of the particles whose position falls inside
/// it. Particles are inserted once and then moved between cells with
/// [`relocate`](Self::relocate) as they travel, so a frame costs O(N) plus
/// the number of particles that actually changed cell.
///
/// Indices wrap at the edges (cell `side - 1` is adjacent to cell `0`),
/// mirroring the wraparound of the world itself.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    world_min: f32,
    cell_size: f32,
    side: u32,
    /// `side` cells of `cell_size` span the world width exactly.
    tiles_evenly: bool,
    /// Row-major: `cells[y * side + x]`.
    cells: Vec<Vec<u32>>,
}

impl SpatialGrid {
    /// Grid with cells of exactly `cell_size`; `side = ceil(world_width / cell_size)`.
    /// The last row and column may be narrower than `cell_size`.
    pub fn new(world_min: f32, world_width: f32, cell_size: f32) -> Result<Self, GridError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if !(world_width.is_finite() && world_width > 0.0) {
            return Err(GridError::InvalidWorldWidth(world_width));
        }
        let span = world_width / cell_size;
        let side = span.ceil().max(1.0);
        if side > MAX_SIDE as f32 {
            return Err(GridError::TooManyCells {
                side: side as u64,
                max: MAX_SIDE,
            });
        }
        Ok(Self::allocate(world_min, cell_size, side as u32, span == side))
    }

    /// Grid with exactly `side` equal cells per axis tiling the world.
    pub fn with_side(world_min: f32, world_width: f32, side: u32) -> Result<Self, GridError> {
        if !(world_width.is_finite() && world_width > 0.0) {
            return Err(GridError::InvalidWorldWidth(world_width));
        }
        if side > MAX_SIDE {
            return Err(GridError::TooManyCells {
                side: side as u64,
                max: MAX_SIDE,
            });
        }
        let side = side.max(1);
        Ok(Self::allocate(world_min, world_width / side as f32, side, true))
    }

    fn allocate(world_min: f32, cell_size: f32, side: u32, tiles_evenly: bool) -> Self {
        let total = side as usize * side as usize;
        Self {
            world_min,
            cell_size,
            side,
            tiles_evenly,
            cells: vec![Vec::new(); total],
        }
    }

    /// Number of cells along each axis.
    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// `false` when the last row and column are narrower than the others.
    #[inline]
    pub fn tiles_evenly(&self) -> bool {
        self.tiles_evenly
    }

    /// Cell containing `pos`, clamped into the grid.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> CellCoord {
        CellCoord::new(self.axis_index(pos.x), self.axis_index(pos.y))
    }

    #[inline]
    fn axis_index(&self, c: f32) -> u32 {
        let i = ((c - self.world_min) / self.cell_size).floor();
        if i.is_nan() || i <= 0.0 {
            return 0;
        }
        (i as u32).min(self.side - 1)
    }

    #[inline]
    fn slot(&self, c: CellCoord) -> usize {
        c.y as usize * self.side as usize + c.x as usize
    }

    /// Cell reached from `c` by moving `(dx, dy)` cells, wrapping at the edges.
    #[inline]
    pub fn neighbor(&self, c: CellCoord, dx: i32, dy: i32) -> CellCoord {
        let side = self.side as i64;
        let x = (c.x as i64 + dx as i64).rem_euclid(side);
        let y = (c.y as i64 + dy as i64).rem_euclid(side);
        CellCoord::new(x as u32, y as u32)
    }

    /// Particle indices currently in cell `c`, in no particular order.
    #[inline]
    pub fn cell(&self, c: CellCoord) -> &[u32] {
        &self.cells[self.slot(c)]
    }

    /// Every cell with its members, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &[u32])> + '_ {
        let side = self.side;
        self.cells.iter().enumerate().map(move |(slot, members)| {
            let slot = slot as u32;
            (CellCoord::new(slot % side, slot / side), members.as_slice())
        })
    }

    /// Add particle `index` at `pos`. Returns the cell to cache on the particle.
    pub fn insert(&mut self, index: u32, pos: Vec2) -> CellCoord {
        let c = self.cell_of(pos);
        let slot = self.slot(c);
        self.cells[slot].push(index);
        c
    }

    /// Move particle `index` to the cell matching its new position.
    ///
    /// `cached` must be the cell the grid currently holds the particle in; it
    /// is updated in place. Returns `true` if the particle changed cell.
    pub fn relocate(&mut self, index: u32, pos: Vec2, cached: &mut CellCoord) -> bool {
        let next = self.cell_of(pos);
        if next == *cached {
            return false;
        }
        let old = self.slot(*cached);
        let members = &mut self.cells[old];
        match members.iter().position(|&p| p == index) {
            Some(k) => {
                members.swap_remove(k);
            }
            None => debug_assert!(false, "particle {index} missing from cell {cached:?}"),
        }
        let new = self.slot(next);
        self.cells[new].push(index);
        *cached = next;
        true
    }

    pub fn clear(&mut self) {
        for members in self.cells.iter_mut() {
            members.clear();
        }
    }

    /// Drop all members and insert every particle again, refreshing `cells`.
    pub fn rebuild(&mut self, positions: &[Vec2], cells: &mut [CellCoord]) {
        self.clear();
        for (i, (pos, cached)) in positions.iter().zip(cells.iter_mut()).enumerate() {
            *cached = self.insert(i as u32, *pos);
        }
    }

    /// Total number of particle references held.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|m| !m.is_empty()).count()
    }

    pub fn max_occupancy(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}
