use diskgas::error::Result;
use diskgas::{AddRequest, Cell, Field, PlacementMode};
use std::collections::HashMap;

fn count_occupied_cells(field: &Field) -> HashMap<u32, usize> {
    let grid = field.grid();
    let mut counts = HashMap::new();
    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            if let Cell::Occupied(id) = grid.cell(x, y) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// After placement every particle owns exactly its full footprint: no two
/// stamped footprints share a cell.
#[test]
fn placement_never_overlaps_footprints() -> Result<()> {
    let mut field = Field::new(200, 200, 5, Some(99))?;
    field.fill(30, PlacementMode::Random, 4, 1.0, 1.0)?;

    let counts = count_occupied_cells(&field);
    assert_eq!(counts.len(), 30);
    for p in field.particles() {
        assert_eq!(
            counts.get(&p.id).copied().unwrap_or(0),
            p.footprint.len(),
            "particle {} does not own its full footprint",
            p.id
        );
    }

    // Paused ticks (unstamp/restamp in place) must preserve the invariant.
    for _ in 0..5 {
        field.step();
    }
    let counts = count_occupied_cells(&field);
    for p in field.particles() {
        assert_eq!(counts.get(&p.id).copied().unwrap_or(0), p.footprint.len());
    }
    Ok(())
}

/// Particles stay within the walled interior for the whole run, up to the
/// discrete detection slack of the footprint rounding.
#[test]
fn wall_containment_over_many_ticks() -> Result<()> {
    let mut field = Field::new(120, 120, 4, Some(31))?;
    field.fill(20, PlacementMode::Random, 3, 1.0, 1.0)?;
    field.toggle_running();

    let b = field.grid().interior(3);
    let slack = 2.0;
    for tick in 0..600 {
        field.step();
        if tick % 10 != 0 {
            continue;
        }
        for p in field.particles() {
            assert!(
                p.x >= b.min_x - slack && p.x <= b.max_x + slack,
                "particle {} escaped in x at tick {tick}: {}",
                p.id,
                p.x
            );
            assert!(
                p.y >= b.min_y - slack && p.y <= b.max_y + slack,
                "particle {} escaped in y at tick {tick}: {}",
                p.id,
                p.y
            );
        }
    }
    Ok(())
}

/// A field with room for only one disk: the first placement succeeds, any
/// further one fails after the attempt budget and leaves the population
/// unchanged.
#[test]
fn packed_field_placement_fails() -> Result<()> {
    // Interior spans x, y in [13, 16] for radius 8: any two centers are
    // within 3 cells and their footprints must collide.
    let mut field = Field::new(30, 30, 5, Some(4))?;
    field.fill(1, PlacementMode::Random, 8, 1.0, 0.5)?;
    assert_eq!(field.len(), 1);

    let err = field.fill(1, PlacementMode::Random, 8, 1.0, 0.5).unwrap_err();
    assert!(matches!(err, diskgas::Error::PlacementFailed { .. }));
    assert_eq!(field.len(), 1);

    // The queued path drops the request instead of failing the tick.
    field.enqueue_add(AddRequest {
        x: 15.0,
        y: 15.0,
        radius: 8,
        mass: 1.0,
        direction: 0.0,
        speed: 0.5,
    })?;
    field.step();
    assert_eq!(field.len(), 1);
    assert!(field.tracked().is_none());
    Ok(())
}

/// The pending queue is drained newest-first, one request per tick.
#[test]
fn pending_queue_is_lifo_one_per_tick() -> Result<()> {
    let mut field = Field::new(300, 300, 5, Some(8))?;
    field.enqueue_add(AddRequest {
        x: 60.0,
        y: 60.0,
        radius: 3,
        mass: 1.0,
        direction: 0.0,
        speed: 0.1,
    })?;
    field.enqueue_add(AddRequest {
        x: 200.0,
        y: 200.0,
        radius: 4,
        mass: 1.0,
        direction: 0.0,
        speed: 0.1,
    })?;

    field.step();
    assert_eq!(field.len(), 1);
    assert_eq!(field.particle(1).expect("placed").radius, 4);
    assert_eq!(field.tracked().expect("tracked").id, 1);

    field.step();
    assert_eq!(field.len(), 2);
    assert_eq!(field.particle(2).expect("placed").radius, 3);
    assert_eq!(field.tracked().expect("tracked").id, 2);
    Ok(())
}

/// Negative time rates keep the engine moving (reversed headings against
/// the walls) and containment still holds.
#[test]
fn negative_time_rate_runs_in_reverse() -> Result<()> {
    let mut field = Field::new(150, 150, 5, Some(21))?;
    field.fill(8, PlacementMode::Random, 3, 1.0, 0.8)?;
    field.toggle_running();
    for _ in 0..50 {
        field.step();
    }
    let mid: Vec<(f64, f64)> = field.particles().iter().map(|p| (p.x, p.y)).collect();

    field.adjust_time_rate(-2.0);
    assert_eq!(field.time_rate(), -1.0);
    for _ in 0..50 {
        field.step();
    }
    let after: Vec<(f64, f64)> = field.particles().iter().map(|p| (p.x, p.y)).collect();
    assert_ne!(mid, after, "particles should keep moving under reversed time");

    let b = field.grid().interior(3);
    for p in field.particles() {
        assert!(p.x >= b.min_x - 2.0 && p.x <= b.max_x + 2.0);
        assert!(p.y >= b.min_y - 2.0 && p.y <= b.max_y + 2.0);
    }
    Ok(())
}

/// Grid point queries resolve pick interactions to the particle id.
#[test]
fn particle_at_finds_disk_under_point() -> Result<()> {
    let mut field = Field::new(200, 200, 5, Some(17))?;
    field.enqueue_add(AddRequest {
        x: 100.0,
        y: 80.0,
        radius: 6,
        mass: 1.0,
        direction: 0.0,
        speed: 0.0,
    })?;
    field.step();

    assert_eq!(field.particle_at(100, 80), Some(1));
    assert_eq!(field.particle_at(103, 80), Some(1));
    assert_eq!(field.particle_at(150, 150), None);
    assert_eq!(field.particle_at(0, 0), None); // wall
    Ok(())
}
