//! diskgas: a 2D gas of colliding hard disks confined by rigid walls.
//!
//! The engine advances particle positions and velocities under elastic
//! collision dynamics on a fixed time step, using a dense occupancy grid
//! for O(footprint) collision detection instead of O(n^2) pairwise checks,
//! and derives kinetic-theory statistics (mean free path, speed histogram,
//! Maxwell distribution overlay) from the population each tick.
//!
//! Two ways to drive it:
//! - [`Field`] directly, one [`Field::step`] per tick, single-threaded;
//! - [`engine::Engine`], which runs the stepper on a background thread and
//!   publishes immutable [`engine::Snapshot`]s for a rendering layer to
//!   sample at its own pace.
//!
//! Rendering, input handling and widget layout are deliberately out of
//! scope; consumers interact only through snapshots and the command
//! surface.

pub mod core;
pub mod engine;
pub mod error;

pub use crate::core::{
    AddRequest, Cell, Color, Field, Footprint, OccupancyGrid, Particle, ParticleId, ParticleView,
    PlacementMode, SummaryStatistics,
};
pub use engine::{Command, Engine, Snapshot};
pub use error::{Error, Result};
