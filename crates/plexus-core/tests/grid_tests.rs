use glam::Vec2;
use plexus_core::error::GridError;
use plexus_core::grid::{CellCoord, SpatialGrid, MAX_SIDE};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Every particle is in exactly one cell, and it is the cell it has cached.
fn assert_grid_invariant(grid: &SpatialGrid, cached: &[CellCoord]) {
    let mut seen = vec![0u32; cached.len()];
    for (coord, members) in grid.cells() {
        for &m in members {
            seen[m as usize] += 1;
            assert_eq!(
                cached[m as usize], coord,
                "particle {} cached {:?} but held by {:?}",
                m, cached[m as usize], coord
            );
        }
    }
    for (i, &n) in seen.iter().enumerate() {
        assert_eq!(n, 1, "particle {} appears {} times in the grid", i, n);
    }
    assert_eq!(grid.len(), cached.len());
}

#[test]
fn test_grid_side_from_cell_size() {
    let grid = SpatialGrid::new(-1.0, 2.0, 0.25).unwrap();
    assert_eq!(grid.side(), 8);
    assert_eq!(grid.cell_size(), 0.25);
    assert!(grid.tiles_evenly());

    let grid = SpatialGrid::new(-1.0, 2.0, 0.3).unwrap();
    assert_eq!(grid.side(), 7, "partial last cell rounds up");
    assert!(!grid.tiles_evenly(), "last column is narrower than the rest");

    let grid = SpatialGrid::new(-1.0, 2.0, 5.0).unwrap();
    assert_eq!(grid.side(), 1);
    assert!(!grid.tiles_evenly());
}

#[test]
fn test_grid_with_side_tiles_world() {
    let grid = SpatialGrid::with_side(-1.0, 2.0, 6).unwrap();
    assert_eq!(grid.side(), 6);
    assert!((grid.cell_size() - 2.0 / 6.0).abs() < 1e-6);
    assert_eq!(grid.cell_of(Vec2::new(1.0, 1.0)), CellCoord::new(5, 5));
    assert!(grid.tiles_evenly());
}

#[test]
fn test_cell_of_and_clamping() {
    let grid = SpatialGrid::new(-1.0, 2.0, 0.25).unwrap();

    assert_eq!(grid.cell_of(Vec2::new(-1.0, -1.0)), CellCoord::new(0, 0));
    assert_eq!(grid.cell_of(Vec2::new(0.0, 0.0)), CellCoord::new(4, 4));
    assert_eq!(grid.cell_of(Vec2::new(-0.8, 0.55)), CellCoord::new(0, 6));
    // The upper boundary belongs to the last cell
    assert_eq!(grid.cell_of(Vec2::new(1.0, 1.0)), CellCoord::new(7, 7));
    // Out-of-range and garbage coordinates are clamped, never out of bounds
    assert_eq!(grid.cell_of(Vec2::new(-3.0, 42.0)), CellCoord::new(0, 7));
    assert_eq!(grid.cell_of(Vec2::new(f32::NAN, 0.1)), CellCoord::new(0, 4));
    assert_eq!(
        grid.cell_of(Vec2::new(f32::INFINITY, f32::NEG_INFINITY)),
        CellCoord::new(7, 0)
    );
}

#[test]
fn test_neighbor_wraps() {
    let grid = SpatialGrid::new(-1.0, 2.0, 0.25).unwrap();
    let c = CellCoord::new(7, 3);
    assert_eq!(grid.neighbor(c, 1, 0), CellCoord::new(0, 3));
    assert_eq!(grid.neighbor(CellCoord::new(0, 0), 1, -1), CellCoord::new(1, 7));
    assert_eq!(grid.neighbor(CellCoord::new(7, 7), 1, 1), CellCoord::new(0, 0));
    assert_eq!(grid.neighbor(CellCoord::new(2, 2), 0, 0), CellCoord::new(2, 2));
}

#[test]
fn test_insert_and_relocate() {
    let mut grid = SpatialGrid::new(-1.0, 2.0, 0.25).unwrap();
    let mut cached = vec![
        grid.insert(0, Vec2::new(0.1, 0.1)),
        grid.insert(1, Vec2::new(0.2, 0.1)),
    ];
    assert_eq!(cached[0], cached[1]);
    assert_eq!(grid.cell(cached[0]).len(), 2);

    // Small move inside the same cell: no-op
    let moved = grid.relocate(0, Vec2::new(0.12, 0.13), &mut cached[0]);
    assert!(!moved);
    assert_eq!(grid.cell(cached[0]).len(), 2);

    // Move across the cell boundary
    let old = cached[1];
    let moved = grid.relocate(1, Vec2::new(0.3, 0.1), &mut cached[1]);
    assert!(moved);
    assert_eq!(cached[1], CellCoord::new(5, 4));
    assert_eq!(grid.cell(old), &[0]);
    assert_eq!(grid.cell(cached[1]), &[1]);
    assert_grid_invariant(&grid, &cached);
}

#[test]
fn test_grid_invalid_cell_size() {
    for bad in [0.0, -0.1, f32::NAN, f32::INFINITY] {
        let err = SpatialGrid::new(-1.0, 2.0, bad).unwrap_err();
        assert!(
            matches!(err, GridError::InvalidCellSize(_)),
            "cell size {} gave {:?}",
            bad,
            err
        );
    }
    assert_eq!(
        SpatialGrid::new(-1.0, 0.0, 0.2).unwrap_err(),
        GridError::InvalidWorldWidth(0.0)
    );
}

#[test]
fn test_grid_too_many_cells() {
    let err = SpatialGrid::new(-1.0, 2.0, 1.0e-5).unwrap_err();
    assert!(matches!(err, GridError::TooManyCells { max: MAX_SIDE, .. }));
    assert!(SpatialGrid::with_side(-1.0, 2.0, MAX_SIDE + 1).is_err());
}

#[test]
fn test_grid_rebuild() {
    let mut grid = SpatialGrid::new(-1.0, 2.0, 0.25).unwrap();
    let positions = vec![Vec2::new(-0.9, -0.9), Vec2::new(0.9, 0.9), Vec2::ZERO];
    let mut cached = vec![CellCoord::default(); 3];
    grid.rebuild(&positions, &mut cached);
    assert_grid_invariant(&grid, &cached);

    let positions = vec![Vec2::ZERO, Vec2::new(-0.9, -0.9), Vec2::new(0.9, 0.9)];
    grid.rebuild(&positions, &mut cached);
    assert_grid_invariant(&grid, &cached);
    assert_eq!(cached[0], CellCoord::new(4, 4));
    assert_eq!(grid.occupied_cells(), 3);
    assert_eq!(grid.max_occupancy(), 1);
}

#[test]
fn test_grid_empty() {
    let mut grid = SpatialGrid::new(-1.0, 2.0, 0.2).unwrap();
    let mut cached: Vec<CellCoord> = vec![];
    grid.rebuild(&[], &mut cached);
    assert!(grid.is_empty());
    assert_eq!(grid.len(), 0);
    assert_eq!(grid.max_occupancy(), 0);
}

#[test]
fn test_invariant_under_random_motion() {
    let mut rng = SmallRng::seed_from_u64(7);
    let radius = 0.2;
    let mut grid = SpatialGrid::new(-1.0, 2.0, radius).unwrap();

    let n = 500;
    let mut positions: Vec<Vec2> = (0..n)
        .map(|_| Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();
    let mut cached = vec![CellCoord::default(); n];
    grid.rebuild(&positions, &mut cached);

    let side = grid.side();
    for _tick in 0..100 {
        for i in 0..n {
            let jitter = Vec2::new(rng.gen_range(-0.1..0.1), rng.gen_range(-0.1..0.1));
            positions[i] = (positions[i] + jitter).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
            grid.relocate(i as u32, positions[i], &mut cached[i]);
        }
        assert_grid_invariant(&grid, &cached);

        for i in 0..n {
            let expect = |c: f32| (((c + 1.0) / radius).floor().max(0.0) as u32).min(side - 1);
            assert_eq!(
                cached[i],
                CellCoord::new(expect(positions[i].x), expect(positions[i].y)),
                "particle {} at {:?} cached in the wrong cell",
                i,
                positions[i]
            );
        }
    }
}
