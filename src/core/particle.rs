use crate::core::grid::Footprint;
use crate::error::{Error, Result};

/// Identifier of a live particle. Ids start at 1; 0 is never issued.
pub type ParticleId = u32;

/// RGB render color carried through to snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const RED: Color = Color(255, 0, 0);
}

/// A gas particle: a hard disk confined to the 2D field.
///
/// Fields:
/// - `id`: stable identifier (>= 1)
/// - `x`, `y`: center position
/// - `radius`: disk radius in cells (>= 1, fixed for the particle's lifetime)
/// - `mass`: particle mass (> 0)
/// - `direction`: heading in degrees (converted to radians for trig)
/// - `speed`: velocity magnitude (>= 0)
/// - `footprint`: precomputed occupancy stencil for the radius
/// - `free_path_length`: running average distance between successive impacts
/// - `free_path_timer`: simulated time since the last impact
/// - `impact_count`: number of realized particle-particle impacts
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    pub mass: f64,
    pub direction: f64,
    pub speed: f64,
    pub color: Color,
    pub footprint: Footprint,
    pub free_path_length: f64,
    pub free_path_timer: f64,
    pub impact_count: u64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is 0, `mass` is non-positive, or
    ///   any floating-point component is NaN/inf (speed must also be >= 0).
    pub fn new(
        id: ParticleId,
        x: f64,
        y: f64,
        radius: u32,
        mass: f64,
        direction: f64,
        speed: f64,
        color: Color,
    ) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidParam("particle id must be >= 1".into()));
        }
        if radius == 0 {
            return Err(Error::InvalidParam("radius must be >= 1".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !direction.is_finite() {
            return Err(Error::InvalidParam("direction must be finite".into()));
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
        }
        Ok(Self {
            id,
            x,
            y,
            radius,
            mass,
            direction,
            speed,
            color,
            footprint: Footprint::new(radius),
            free_path_length: 0.0,
            free_path_timer: 0.0,
            impact_count: 0,
        })
    }

    /// Velocity components (speed resolved along the heading).
    #[inline]
    pub fn velocity(&self) -> (f64, f64) {
        let rad = self.direction.to_radians();
        (self.speed * rad.cos(), self.speed * rad.sin())
    }

    /// Candidate next position after `dt` of linear motion, without mutating state.
    #[inline]
    pub fn project(&self, dt: f64) -> (f64, f64) {
        let (vx, vy) = self.velocity();
        (self.x + vx * dt, self.y + vy * dt)
    }

    /// Integrate position by `dt` and accumulate the free-path timer.
    pub fn advance(&mut self, dt: f64) {
        let (vx, vy) = self.velocity();
        self.x += vx * dt;
        self.y += vy * dt;
        self.free_path_timer += dt;
    }

    /// Register a realized impact, folding the distance traveled since the
    /// previous impact (timer x pre-collision speed) into the running
    /// free-path average, then resetting the timer.
    ///
    /// Must be called before the post-collision velocity is written so the
    /// path segment is weighted by the speed it was traveled at.
    pub fn record_impact(&mut self) {
        let n = self.impact_count as f64;
        self.free_path_length =
            (self.free_path_length * n + self.free_path_timer * self.speed) / (n + 1.0);
        self.impact_count = self.impact_count.saturating_add(1);
        self.free_path_timer = 0.0;
    }

    /// Kinetic energy: 1/2 m v^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.speed * self.speed
    }
}
