use std::collections::HashSet;

use patchgrid::{CompactGrid, SparseGrid, is_adjacent, is_connected};
use rand::Rng;
use rand::SeedableRng;

/// Fill an arbitrary square pixel-by-pixel so tests can place geometry that
/// straddles tile boundaries (the store API itself only takes within-tile
/// squares).
fn fill_square(grid: &mut SparseGrid, x: u32, y: u32, side: u32) {
    for dy in 0..side {
        for dx in 0..side {
            grid.set(x + dx, y + dy, 1).unwrap();
        }
    }
}

fn fill_square_compact(grid: &mut CompactGrid, x: u32, y: u32, side: u32) {
    for dy in 0..side {
        for dx in 0..side {
            grid.set(x + dx, y + dy, 1).unwrap();
        }
    }
}

fn collect_pixels(grid: &SparseGrid) -> HashSet<(u32, u32)> {
    let mut out = HashSet::new();
    for entry in grid.entries() {
        let (ox, oy) = entry.coord().origin();
        for ly in 0..16 {
            for lx in 0..16 {
                if entry.tile().contains_pixel(lx, ly) {
                    out.insert((ox + lx, oy + ly));
                }
            }
        }
    }
    out
}

/// Reference connectivity: plain breadth-first search over the pixel set.
fn naive_is_connected(pixels: &HashSet<(u32, u32)>) -> bool {
    let Some(&start) = pixels.iter().next() else {
        return true;
    };
    let mut seen = HashSet::new();
    let mut queue = vec![start];
    seen.insert(start);
    while let Some((x, y)) = queue.pop() {
        let mut visit = |nx: u32, ny: u32| {
            if pixels.contains(&(nx, ny)) && seen.insert((nx, ny)) {
                queue.push((nx, ny));
            }
        };
        visit(x + 1, y);
        visit(x, y + 1);
        if x > 0 {
            visit(x - 1, y);
        }
        if y > 0 {
            visit(x, y - 1);
        }
    }
    seen.len() == pixels.len()
}

#[test]
fn empty_stores_are_vacuously_connected() {
    assert!(is_connected(&SparseGrid::new()));
    assert!(is_connected(&CompactGrid::new(4, 4)));
    assert!(is_connected(&CompactGrid::new(0, 0)));
}

#[test]
fn single_square_is_connected_however_it_straddles() {
    // Inside one tile.
    let mut one = SparseGrid::new();
    fill_square(&mut one, 0, 0, 10);
    assert_eq!(one.len(), 1);
    assert!(is_connected(&one));

    // Straddling x = 16: two tiles.
    let mut two = SparseGrid::new();
    fill_square(&mut two, 11, 3, 10);
    assert_eq!(two.len(), 2);
    assert!(is_connected(&two));

    // Straddling both axes: four tiles.
    let mut four = SparseGrid::new();
    fill_square(&mut four, 11, 11, 10);
    assert_eq!(four.len(), 4);
    assert!(is_connected(&four));
}

#[test]
fn two_far_squares_are_not_connected() {
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 8, 8, 6);
    fill_square(&mut grid, 36, 36, 6);
    assert!(!is_connected(&grid));
}

#[test]
fn diagonal_touch_is_not_connected() {
    // Corners meet at (7,7)/(8,8): 8-connected but not 4-connected.
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 4, 4, 4);
    fill_square(&mut grid, 8, 8, 4);
    assert!(!is_connected(&grid));

    // One bridging pixel makes it connected.
    grid.set(8, 7, 1).unwrap();
    assert!(is_connected(&grid));
}

#[test]
fn four_full_tiles_form_one_region() {
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 0, 0, 32);
    assert_eq!(grid.len(), 4);
    assert!(is_connected(&grid));

    // Remove one column of one tile; the block stays connected.
    for y in 0..16 {
        grid.clear(20, y, 1).unwrap();
    }
    assert!(is_connected(&grid));
}

#[test]
fn edge_contact_across_a_tile_boundary_connects() {
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 12, 0, 4); // right edge at x=15
    fill_square(&mut grid, 16, 0, 4); // left edge at x=16
    assert_eq!(grid.len(), 2);
    assert!(is_connected(&grid));

    // Shifted down one pixel they still share an edge column.
    let mut shifted = SparseGrid::new();
    fill_square(&mut shifted, 12, 0, 4);
    fill_square(&mut shifted, 16, 3, 4);
    assert!(is_connected(&shifted));

    // With a gap row they do not.
    let mut gap = SparseGrid::new();
    fill_square(&mut gap, 12, 0, 4);
    fill_square(&mut gap, 16, 4, 4);
    assert!(!is_connected(&gap));
}

#[test]
fn compact_store_scenarios_match_sparse() {
    let mut grid = CompactGrid::new(4, 4);
    assert!(is_connected(&grid));

    fill_square_compact(&mut grid, 11, 11, 10);
    assert!(is_connected(&grid));

    fill_square_compact(&mut grid, 40, 40, 6);
    assert!(!is_connected(&grid));
}

#[test]
fn is_adjacent_detects_overlap_and_edge_contact() {
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 8, 8, 6);

    // Overlapping placement.
    assert!(is_adjacent(&grid, 10, 10, 2).unwrap());
    // Edge contact within the tile.
    assert!(is_adjacent(&grid, 8, 14, 2).unwrap());
    // Edge contact from the neighboring tile across x=16.
    let mut edge = SparseGrid::new();
    fill_square(&mut edge, 12, 0, 4);
    assert!(is_adjacent(&edge, 16, 0, 4).unwrap());
    assert!(is_adjacent(&edge, 16, 3, 4).unwrap());
    // Separated by one empty column.
    assert!(!is_adjacent(&edge, 17, 0, 4).unwrap());
}

#[test]
fn is_adjacent_rejects_diagonal_contact() {
    let mut grid = SparseGrid::new();
    fill_square(&mut grid, 4, 4, 4);
    assert!(!is_adjacent(&grid, 8, 8, 4).unwrap());

    // Same situation straddling a tile corner.
    let mut corner = SparseGrid::new();
    fill_square(&mut corner, 12, 12, 4); // bottom-right pixel (15,15)
    assert!(!is_adjacent(&corner, 16, 16, 4).unwrap());
    assert!(is_adjacent(&corner, 16, 12, 4).unwrap());
}

#[test]
fn is_adjacent_propagates_rect_validation() {
    let grid = SparseGrid::new();
    assert!(is_adjacent(&grid, 0, 0, 0).is_err());
    assert!(is_adjacent(&grid, 0, 0, 17).is_err());
    // Crossing a tile boundary is a caller error, not a false.
    assert!(is_adjacent(&grid, 14, 0, 4).is_err());
    // Valid probe against an empty store is simply false.
    assert!(!is_adjacent(&grid, 0, 0, 4).unwrap());
}

#[test]
fn matches_naive_bfs_on_random_regions() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for case in 0..40 {
        let mut grid = SparseGrid::new();
        let blobs = rng.random_range(1..4usize);
        for _ in 0..blobs {
            let mut x = rng.random_range(8..56u32);
            let mut y = rng.random_range(8..56u32);
            let steps = rng.random_range(1..60usize);
            for _ in 0..steps {
                grid.set(x, y, 1).unwrap();
                match rng.random_range(0..4u8) {
                    0 => x += 1,
                    1 => x = x.saturating_sub(1),
                    2 => y += 1,
                    _ => y = y.saturating_sub(1),
                }
            }
            grid.set(x, y, 1).unwrap();
        }
        let pixels = collect_pixels(&grid);
        assert_eq!(
            is_connected(&grid),
            naive_is_connected(&pixels),
            "case {case} disagrees with naive BFS ({} pixels)",
            pixels.len()
        );
    }
}

#[test]
fn seed_choice_does_not_affect_the_result() {
    // The same geometry through both store kinds picks different seeds
    // (sparse: first entry; compact: first non-empty slot) and must agree.
    let mut sparse = SparseGrid::new();
    fill_square(&mut sparse, 40, 40, 6); // inserted first, seeds the fill
    fill_square(&mut sparse, 11, 11, 10);

    let mut compact = CompactGrid::new(4, 4);
    compact.set_from(&sparse).unwrap();

    assert_eq!(is_connected(&sparse), is_connected(&compact));
    assert!(!is_connected(&sparse));
}
