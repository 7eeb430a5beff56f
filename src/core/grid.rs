use crate::core::particle::ParticleId;
use crate::error::{Error, Result};
use rand::Rng;

/// Ownership of a single grid cell.
///
/// A tagged variant instead of numeric sentinels, so the wall marker does
/// not impose a ceiling on particle ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    Occupied(ParticleId),
}

/// Disk-shaped stencil of relative cell offsets for a given radius.
///
/// The stencil is a discretized disk of diameter `2 * radius - 1` centered
/// on the particle: offsets `(dx, dy)` with
/// `round(dx^2 + dy^2) <= ((2 * radius - 1) / 2)^2`. It is independent of
/// position and is translated to the particle's rounded center whenever the
/// particle is stamped, unstamped, or queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    radius: u32,
    offsets: Vec<(i32, i32)>,
}

impl Footprint {
    pub fn new(radius: u32) -> Self {
        let r = radius as i32;
        let limit = ((2.0 * radius as f64 - 1.0) / 2.0).powi(2);
        let mut offsets = Vec::new();
        for dy in (1 - r)..r {
            for dx in (1 - r)..r {
                if ((dx * dx + dy * dy) as f64).round() <= limit {
                    offsets.push((dx, dy));
                }
            }
        }
        Self { radius, offsets }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline]
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Number of cells the stencil covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Distinct non-empty cell values intersected by a footprint at a queried
/// position. Particle ids are deduplicated and ascending, which fixes the
/// order in which simultaneous impacts are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlap {
    pub wall: bool,
    pub ids: Vec<ParticleId>,
}

impl Overlap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.wall && self.ids.is_empty()
    }
}

/// Dense cell-to-owner map over the field, with a permanently stamped wall
/// border of fixed thickness. Collision detection scans a footprint's cells
/// instead of doing O(n^2) pairwise distance checks.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    wall: usize,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Create a grid of `width x height` cells with a `wall`-thick border.
    pub fn new(width: usize, height: usize, wall: usize) -> Result<Self> {
        if wall == 0 {
            return Err(Error::InvalidParam("wall thickness must be >= 1".into()));
        }
        if width <= 2 * wall + 1 || height <= 2 * wall + 1 {
            return Err(Error::InvalidParam(
                "field must be larger than twice the wall thickness".into(),
            ));
        }
        let mut cells = vec![Cell::Empty; width * height];
        for y in 0..height {
            for x in 0..width {
                if x < wall || x >= width - wall || y < wall || y >= height - wall {
                    cells[y * width + x] = Cell::Wall;
                }
            }
        }
        Ok(Self {
            width,
            height,
            wall,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn wall(&self) -> usize {
        self.wall
    }

    /// Area of the walled interior, used by the mean-free-path formula.
    #[inline]
    pub fn working_area(&self) -> f64 {
        ((self.width - 2 * self.wall) * (self.height - 2 * self.wall)) as f64
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Cell value at integer coordinates; out-of-range reads as `Wall`.
    #[inline]
    pub fn cell(&self, x: i64, y: i64) -> Cell {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => Cell::Wall,
        }
    }

    /// Interior position bounds for a disk of the given radius:
    /// `(min, max)` per axis such that the disk's stamped footprint stays
    /// clear of the wall border.
    pub fn interior(&self, radius: u32) -> Bounds {
        let r = radius as f64;
        let w = self.wall as f64;
        Bounds {
            min_x: r + w,
            max_x: self.width as f64 - r - w - 1.0,
            min_y: r + w,
            max_y: self.height as f64 - r - w - 1.0,
        }
    }

    /// Write the particle's id into every footprint cell at the rounded
    /// position. Wall cells are never overwritten; where two footprints
    /// transiently overlap, the last stamper owns the contested cell.
    pub fn stamp(&mut self, id: ParticleId, footprint: &Footprint, x: f64, y: f64) {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        for &(dx, dy) in footprint.offsets() {
            if let Some(i) = self.index(cx + dx as i64, cy + dy as i64) {
                if self.cells[i] != Cell::Wall {
                    self.cells[i] = Cell::Occupied(id);
                }
            }
        }
    }

    /// Clear the footprint cells currently owned by `id` at the rounded
    /// position. Cells claimed by another particle in the meantime are left
    /// untouched, so a stale unstamp cannot erase live occupancy.
    pub fn unstamp(&mut self, id: ParticleId, footprint: &Footprint, x: f64, y: f64) {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        for &(dx, dy) in footprint.offsets() {
            if let Some(i) = self.index(cx + dx as i64, cy + dy as i64) {
                if self.cells[i] == Cell::Occupied(id) {
                    self.cells[i] = Cell::Empty;
                }
            }
        }
    }

    /// Distinct non-empty cell values intersected by the footprint at a
    /// candidate position; detects wall and particle collisions in one scan.
    pub fn overlaps(&self, footprint: &Footprint, x: f64, y: f64) -> Overlap {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        let mut out = Overlap::default();
        for &(dx, dy) in footprint.offsets() {
            match self.cell(cx + dx as i64, cy + dy as i64) {
                Cell::Empty => {}
                Cell::Wall => out.wall = true,
                Cell::Occupied(id) => out.ids.push(id),
            }
        }
        out.ids.sort_unstable();
        out.ids.dedup();
        out
    }

    /// Point query for pick interactions: id of the particle occupying the
    /// given cell, if any.
    pub fn occupant_at(&self, x: i64, y: i64) -> Option<ParticleId> {
        match self.cell(x, y) {
            Cell::Occupied(id) => Some(id),
            _ => None,
        }
    }

    /// Find a non-overlapping position for a disk of the footprint's radius.
    ///
    /// The preferred position is first clamped inside the walled interior;
    /// while the footprint overlaps any non-empty cell, a uniformly random
    /// interior position is resampled, up to `max_attempts` tries.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the disk cannot fit the interior at all.
    /// - `Error::PlacementFailed` when the attempt budget is exhausted.
    pub fn place_without_overlap(
        &self,
        footprint: &Footprint,
        preferred: (f64, f64),
        max_attempts: usize,
        rng: &mut impl Rng,
    ) -> Result<(f64, f64)> {
        let b = self.interior(footprint.radius());
        if b.max_x < b.min_x || b.max_y < b.min_y {
            return Err(Error::InvalidParam(
                "radius too large for the walled interior".into(),
            ));
        }
        let mut x = preferred.0.clamp(b.min_x, b.max_x);
        let mut y = preferred.1.clamp(b.min_y, b.max_y);
        for _ in 0..max_attempts {
            if self.overlaps(footprint, x, y).is_empty() {
                return Ok((x, y));
            }
            x = rng.random_range(b.min_x as i64..=b.max_x as i64) as f64;
            y = rng.random_range(b.min_y as i64..=b.max_y as i64) as f64;
        }
        Err(Error::PlacementFailed {
            attempts: max_attempts,
        })
    }
}

/// Axis-aligned interior bounds for a disk center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn footprint_radius_one_is_single_cell() {
        let fp = Footprint::new(1);
        assert_eq!(fp.offsets(), &[(0, 0)]);
    }

    #[test]
    fn footprint_is_symmetric_disk() {
        let fp = Footprint::new(3);
        // 5x5 stencil minus corners outside the disk
        assert!(fp.offsets().contains(&(0, 0)));
        assert!(fp.offsets().contains(&(2, 0)));
        assert!(fp.offsets().contains(&(0, -2)));
        for &(dx, dy) in fp.offsets() {
            assert!(fp.offsets().contains(&(-dx, -dy)), "stencil not symmetric");
            assert!(dx.abs() < 3 && dy.abs() < 3);
        }
    }

    #[test]
    fn wall_border_is_stamped() -> crate::error::Result<()> {
        let g = OccupancyGrid::new(20, 10, 2)?;
        assert_eq!(g.cell(0, 0), Cell::Wall);
        assert_eq!(g.cell(19, 9), Cell::Wall);
        assert_eq!(g.cell(1, 5), Cell::Wall);
        assert_eq!(g.cell(2, 5), Cell::Empty);
        assert_eq!(g.cell(17, 5), Cell::Empty);
        assert_eq!(g.cell(18, 5), Cell::Wall);
        // Out-of-range reads as wall
        assert_eq!(g.cell(-1, 5), Cell::Wall);
        assert_eq!(g.cell(5, 100), Cell::Wall);
        Ok(())
    }

    #[test]
    fn stamp_query_unstamp_roundtrip() -> crate::error::Result<()> {
        let mut g = OccupancyGrid::new(40, 40, 2)?;
        let fp = Footprint::new(3);
        g.stamp(7, &fp, 20.0, 20.0);
        assert_eq!(g.occupant_at(20, 20), Some(7));
        assert_eq!(g.occupant_at(22, 20), Some(7));
        assert_eq!(g.occupant_at(25, 20), None);

        let hit = g.overlaps(&fp, 24.0, 20.0);
        assert!(!hit.wall);
        assert_eq!(hit.ids, vec![7]);

        g.unstamp(7, &fp, 20.0, 20.0);
        assert!(g.overlaps(&fp, 20.0, 20.0).is_empty());
        Ok(())
    }

    #[test]
    fn unstamp_leaves_other_owners_cells() -> crate::error::Result<()> {
        let mut g = OccupancyGrid::new(40, 40, 2)?;
        let fp = Footprint::new(2);
        g.stamp(1, &fp, 20.0, 20.0);
        g.stamp(2, &fp, 21.0, 20.0); // overwrites the contested cells
        g.unstamp(1, &fp, 20.0, 20.0);
        assert_eq!(g.occupant_at(21, 20), Some(2));
        Ok(())
    }

    #[test]
    fn overlap_ids_are_distinct_ascending() -> crate::error::Result<()> {
        let mut g = OccupancyGrid::new(60, 60, 2)?;
        let fp = Footprint::new(2);
        g.stamp(9, &fp, 30.0, 28.0);
        g.stamp(4, &fp, 30.0, 32.0);
        let hit = g.overlaps(&Footprint::new(3), 30.0, 30.0);
        assert_eq!(hit.ids, vec![4, 9]);
        Ok(())
    }

    #[test]
    fn wall_overlap_detected_beyond_interior() -> crate::error::Result<()> {
        let g = OccupancyGrid::new(30, 30, 3)?;
        let fp = Footprint::new(2);
        let hit = g.overlaps(&fp, 26.0, 15.0);
        assert!(hit.wall);
        Ok(())
    }

    #[test]
    fn placement_clamps_preferred_position() -> crate::error::Result<()> {
        let g = OccupancyGrid::new(50, 50, 3)?;
        let fp = Footprint::new(4);
        let mut rng = StdRng::seed_from_u64(1);
        let (x, y) = g.place_without_overlap(&fp, (0.0, 1000.0), 10, &mut rng)?;
        let b = g.interior(4);
        assert_eq!(x, b.min_x);
        assert_eq!(y, b.max_y);
        Ok(())
    }

    #[test]
    fn placement_fails_when_packed() -> crate::error::Result<()> {
        let mut g = OccupancyGrid::new(30, 30, 5)?;
        let fp = Footprint::new(8);
        let mut rng = StdRng::seed_from_u64(2);
        let (x, y) = g.place_without_overlap(&fp, (15.0, 15.0), 100, &mut rng)?;
        g.stamp(1, &fp, x, y);
        // Interior is too small for a second disk of this radius anywhere.
        let err = g
            .place_without_overlap(&fp, (15.0, 15.0), 100, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::PlacementFailed { attempts: 100 }
        ));
        Ok(())
    }
}
