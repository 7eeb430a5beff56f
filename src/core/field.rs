use crate::core::collide::{self, Kinematics};
use crate::core::grid::OccupancyGrid;
use crate::core::particle::{Color, Particle, ParticleId};
use crate::core::stats::{self, SummaryStatistics};
use crate::error::{Error, Result};
use log::{debug, warn};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Fixed simulated time step per tick; wall-clock pacing is the consumer's
/// concern, not the engine's.
pub const DELTA_T: f64 = 1.0;

/// Time-scale multiplier is clamped to this magnitude.
pub const TIME_RATE_LIMIT: f64 = 2.0;

/// Attempt budget for non-overlapping placement.
pub const MAX_PLACE_ATTEMPTS: usize = 10_000;

/// Center spacing of the diagonal used by line fills.
const LINE_SPACING: f64 = 20.0;

/// Bulk-population layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Uniformly random interior positions.
    Random,
    /// A diagonal line of evenly spaced preferred positions.
    Line,
}

/// A particle insertion request; queued requests are applied by the stepper
/// at one well-defined point per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddRequest {
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    pub mass: f64,
    pub direction: f64,
    pub speed: f64,
}

impl AddRequest {
    /// Boundary validation: malformed inputs are rejected here, never deep
    /// inside the resolver.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(Error::InvalidParam("radius must be >= 1".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
        }
        if !self.x.is_finite() || !self.y.is_finite() || !self.direction.is_finite() {
            return Err(Error::InvalidParam(
                "position and direction must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Read-only view of one particle for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub id: ParticleId,
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    pub color: Color,
    pub speed: f64,
}

impl ParticleView {
    fn of(p: &Particle) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            radius: p.radius,
            color: p.color,
            speed: p.speed,
        }
    }
}

/// The walled field and its particle population, advanced one discrete tick
/// at a time.
///
/// The field owns all mutable simulation state: the particle arena (id =
/// slot + 1), the occupancy grid, and the pending-add queue. Each tick runs
/// the strict unstamp -> project -> resolve -> advance -> stamp sequence
/// atomically per particle, in id order; a particle late in the iteration
/// sees the already-updated state of earlier ones.
#[derive(Debug)]
pub struct Field {
    grid: OccupancyGrid,
    particles: Vec<Particle>,
    pending: Vec<AddRequest>,
    time_rate: f64,
    running: bool,
    tracked: Option<ParticleId>,
    tick: u64,
    rng: StdRng,
}

impl Field {
    /// One-time setup of a `width x height` field with a `wall`-thick rigid
    /// border. `seed` fixes the RNG for reproducible runs; `None` draws a
    /// nondeterministic seed.
    pub fn new(width: usize, height: usize, wall: usize, seed: Option<u64>) -> Result<Self> {
        let grid = OccupancyGrid::new(width, height, wall)?;
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Ok(Self {
            grid,
            particles: Vec::new(),
            pending: Vec::new(),
            time_rate: 1.0,
            running: false,
            tracked: None,
            tick: 0,
            rng,
        })
    }

    /// Bulk-populate the field with `count` particles of identical radius
    /// and mass. Speeds are `speed_scale` times a uniform draw from [0, 1);
    /// headings are uniform over the circle.
    pub fn fill(
        &mut self,
        count: usize,
        mode: PlacementMode,
        radius: u32,
        mass: f64,
        speed_scale: f64,
    ) -> Result<()> {
        if radius == 0 {
            return Err(Error::InvalidParam("radius must be >= 1".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !speed_scale.is_finite() || speed_scale < 0.0 {
            return Err(Error::InvalidParam(
                "speed_scale must be finite and >= 0".into(),
            ));
        }
        let b = self.grid.interior(radius);
        for i in 0..count {
            let preferred = match mode {
                PlacementMode::Line => (i as f64 * LINE_SPACING, i as f64 * LINE_SPACING),
                PlacementMode::Random => (
                    self.rng.random_range(b.min_x as i64..=b.max_x as i64) as f64,
                    self.rng.random_range(b.min_y as i64..=b.max_y as i64) as f64,
                ),
            };
            let direction = self.rng.random_range(0..360) as f64;
            let speed = speed_scale * self.rng.random::<f64>();
            self.add_particle(preferred, radius, mass, direction, speed, Color::BLACK)?;
        }
        Ok(())
    }

    /// Request a particle insertion; applied by the stepper next tick.
    /// Malformed requests are rejected here.
    pub fn enqueue_add(&mut self, req: AddRequest) -> Result<()> {
        req.validate()?;
        self.pending.push(req);
        Ok(())
    }

    /// Nudge the time-scale multiplier; the result is clamped to
    /// [-TIME_RATE_LIMIT, TIME_RATE_LIMIT]. Negative rates run time in
    /// reverse. Non-finite deltas are ignored.
    pub fn adjust_time_rate(&mut self, delta: f64) {
        if delta.is_finite() {
            self.time_rate = (self.time_rate + delta).clamp(-TIME_RATE_LIMIT, TIME_RATE_LIMIT);
        }
    }

    /// Toggle between `Paused` and `Running`; returns the new state. While
    /// paused the stepper keeps ticking with zero displacement, so collision
    /// bookkeeping still runs. Intentional: downstream statistics rely on
    /// impacts registering while paused.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Advance the whole population by exactly one tick, then apply at most
    /// one queued insertion (the most recently queued).
    pub fn step(&mut self) {
        let dt = DELTA_T * self.time_rate * if self.running { 1.0 } else { 0.0 };
        let sign = collide::time_sign(self.time_rate);

        for i in 0..self.particles.len() {
            {
                let p = &self.particles[i];
                self.grid.unstamp(p.id, &p.footprint, p.x, p.y);
            }

            let mut next = self.particles[i].project(dt);
            let mut overlap = {
                let p = &self.particles[i];
                self.grid.overlaps(&p.footprint, next.0, next.1)
            };

            if overlap.wall {
                let bounds = self.grid.interior(self.particles[i].radius);
                if collide::reflect_walls(&mut self.particles[i], next, &bounds, sign) {
                    next = self.particles[i].project(dt);
                }
                let p = &self.particles[i];
                overlap = self.grid.overlaps(&p.footprint, next.0, next.1);
            }

            for id in overlap.ids {
                let j = id as usize - 1;
                if j != i && j < self.particles.len() {
                    self.resolve_impact(i, j);
                }
            }

            self.particles[i].advance(dt);
            let p = &self.particles[i];
            self.grid.stamp(p.id, &p.footprint, p.x, p.y);
        }

        if let Some(req) = self.pending.pop() {
            match self.add_particle(
                (req.x, req.y),
                req.radius,
                req.mass,
                req.direction,
                req.speed,
                Color::RED,
            ) {
                Ok(id) => {
                    self.tracked = Some(id);
                    debug!("queued particle placed as id {id}");
                }
                Err(e) => warn!("dropping queued particle: {e}"),
            }
        }

        self.tick = self.tick.wrapping_add(1);
    }

    /// Resolve one two-body elastic impact between arena slots `i` and `j`.
    /// Both record the impact with their pre-collision speeds before the
    /// velocity exchange is written back.
    fn resolve_impact(&mut self, i: usize, j: usize) {
        let theta = (self.particles[j].y - self.particles[i].y)
            .atan2(self.particles[j].x - self.particles[i].x);
        self.particles[i].record_impact();
        self.particles[j].record_impact();

        let (m1, k1) = (self.particles[i].mass, Kinematics::of(&self.particles[i]));
        let (m2, k2) = (self.particles[j].mass, Kinematics::of(&self.particles[j]));
        let (n1, n2) = collide::elastic_impact(theta, m1, k1, m2, k2);

        self.particles[i].speed = n1.speed;
        self.particles[i].direction = n1.direction;
        self.particles[j].speed = n2.speed;
        self.particles[j].direction = n2.direction;
    }

    fn add_particle(
        &mut self,
        preferred: (f64, f64),
        radius: u32,
        mass: f64,
        direction: f64,
        speed: f64,
        color: Color,
    ) -> Result<ParticleId> {
        let id = self.particles.len() as ParticleId + 1;
        let mut p = Particle::new(id, preferred.0, preferred.1, radius, mass, direction, speed, color)?;
        let (x, y) =
            self.grid
                .place_without_overlap(&p.footprint, preferred, MAX_PLACE_ATTEMPTS, &mut self.rng)?;
        p.x = x;
        p.y = y;
        self.grid.stamp(id, &p.footprint, x, y);
        self.particles.push(p);
        Ok(id)
    }

    /// Point query via the grid for pick interactions.
    pub fn particle_at(&self, x: i64, y: i64) -> Option<ParticleId> {
        self.grid
            .occupant_at(x, y)
            .filter(|&id| (id as usize) <= self.particles.len())
    }

    /// Select the tracked particle. Ids outside [1, count] (or any id on an
    /// empty field) clear the selection and return `None` instead of
    /// erroring.
    pub fn track(&mut self, id: ParticleId) -> Option<ParticleId> {
        if id >= 1 && (id as usize) <= self.particles.len() {
            self.tracked = Some(id);
        } else {
            self.tracked = None;
        }
        self.tracked
    }

    /// The tracked particle, if a valid one is selected.
    pub fn tracked(&self) -> Option<&Particle> {
        self.tracked
            .and_then(|id| self.particles.get(id as usize - 1))
    }

    /// Render views of all particles, in id order.
    pub fn snapshot_particles(&self) -> Vec<ParticleView> {
        self.particles.iter().map(ParticleView::of).collect()
    }

    /// Derived macroscopic statistics; `None` for a degenerate population.
    pub fn snapshot_statistics(&self) -> Option<SummaryStatistics> {
        stats::summarize(&self.particles, self.grid.working_area())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        if id == 0 {
            return None;
        }
        self.particles.get(id as usize - 1)
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn time_rate(&self) -> f64 {
        self.time_rate
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total kinetic energy of the population (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }
}
