//! Background stepper and snapshot publication.
//!
//! The stepper thread exclusively owns the mutable `Field`; consumers only
//! ever see immutable `Snapshot` copies published once per tick. External
//! control (adds, time-scale, tracking, picks) flows through a command
//! queue the stepper drains at one well-defined point per tick. The loop
//! runs as fast as possible; frame pacing belongs to the consumer.

use crate::core::field::{AddRequest, Field, ParticleView};
use crate::core::particle::ParticleId;
use crate::core::stats::SummaryStatistics;
use crate::error::{Error, Result};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Control requests accepted by the stepper, applied before the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Add(AddRequest),
    AdjustTimeRate(f64),
    ToggleRunning,
    Track(ParticleId),
    /// Pick the particle under the given cell; a hit becomes tracked.
    Pick(i64, i64),
}

/// Immutable per-tick copy of everything a consumer may want to draw.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tick: u64,
    pub time_rate: f64,
    pub running: bool,
    pub tracked: Option<ParticleView>,
    pub particles: Vec<ParticleView>,
    pub statistics: Option<SummaryStatistics>,
}

impl Snapshot {
    fn of(field: &Field) -> Self {
        Self {
            tick: field.tick(),
            time_rate: field.time_rate(),
            running: field.is_running(),
            tracked: field.tracked().map(|p| ParticleView {
                id: p.id,
                x: p.x,
                y: p.y,
                radius: p.radius,
                color: p.color,
                speed: p.speed,
            }),
            particles: field.snapshot_particles(),
            statistics: field.snapshot_statistics(),
        }
    }
}

struct Shared {
    alive: AtomicBool,
    commands: Mutex<Vec<Command>>,
    latest: RwLock<Snapshot>,
}

/// Handle to a running simulation engine.
///
/// Spawning takes ownership of the field; shutdown is cooperative and
/// checked once per tick (there is no mid-tick cancellation point).
pub struct Engine {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Engine {
    /// Start the stepper thread on a prepared field.
    pub fn spawn(mut field: Field) -> Result<Engine> {
        let shared = Arc::new(Shared {
            alive: AtomicBool::new(true),
            commands: Mutex::new(Vec::new()),
            latest: RwLock::new(Snapshot::of(&field)),
        });

        let worker = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("diskgas-stepper".into())
            .spawn(move || {
                info!("stepper started: {} particles", field.len());
                while worker.alive.load(Ordering::Relaxed) {
                    let drained: Vec<Command> = worker.commands.lock().drain(..).collect();
                    for cmd in drained {
                        apply(&mut field, cmd);
                    }
                    field.step();
                    *worker.latest.write() = Snapshot::of(&field);
                }
                info!("stepper shut down at tick {}", field.tick());
            })
            .map_err(|e| Error::Engine(format!("failed to spawn stepper thread: {e}")))?;

        Ok(Engine {
            shared,
            handle: Some(handle),
        })
    }

    /// Clone of the most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.latest.read().clone()
    }

    /// Queue a control command for the next tick.
    pub fn send(&self, cmd: Command) {
        self.shared.commands.lock().push(cmd);
    }

    pub fn enqueue_add(&self, req: AddRequest) {
        self.send(Command::Add(req));
    }

    pub fn adjust_time_rate(&self, delta: f64) {
        self.send(Command::AdjustTimeRate(delta));
    }

    pub fn toggle_running(&self) {
        self.send(Command::ToggleRunning);
    }

    pub fn track(&self, id: ParticleId) {
        self.send(Command::Track(id));
    }

    pub fn pick(&self, x: i64, y: i64) {
        self.send(Command::Pick(x, y));
    }

    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::Relaxed)
    }

    /// Stop the stepper and wait for it to finish the current tick.
    pub fn shutdown(&mut self) -> Result<()> {
        self.shared.alive.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| Error::Engine("stepper thread panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.shutdown().is_err() {
            warn!("stepper thread did not shut down cleanly");
        }
    }
}

fn apply(field: &mut Field, cmd: Command) {
    match cmd {
        Command::Add(req) => {
            if let Err(e) = field.enqueue_add(req) {
                warn!("rejected add request: {e}");
            }
        }
        Command::AdjustTimeRate(delta) => field.adjust_time_rate(delta),
        Command::ToggleRunning => {
            field.toggle_running();
        }
        Command::Track(id) => {
            field.track(id);
        }
        Command::Pick(x, y) => {
            if let Some(id) = field.particle_at(x, y) {
                field.track(id);
            }
        }
    }
}
