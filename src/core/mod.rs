//! Core simulation data structures: the particle, the occupancy grid used
//! for collision detection, the pure collision resolver, the per-tick
//! stepper, and the statistics aggregator.

pub mod collide;
pub mod field;
pub mod grid;
pub mod particle;
pub mod stats;

pub use field::{AddRequest, Field, ParticleView, PlacementMode};
pub use grid::{Cell, Footprint, OccupancyGrid, Overlap};
pub use particle::{Color, Particle, ParticleId};
pub use stats::SummaryStatistics;
