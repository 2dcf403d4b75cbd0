use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use sim_core::SimStats;
use tracing::{debug, warn};
use types::{ControlCommand, SettingsUpdate};

use crate::controller::{ControlError, Frame, Simulation};
use crate::timing::BASE_TICK;

/// Generations buffered on the stats stream before new ones are dropped.
pub const STATS_BACKLOG: usize = 4096;

/// State the worker publishes and handles read.
struct Published {
    /// Latest frame, replaced wholesale by the worker.
    frame: Mutex<Option<Arc<Frame>>>,
    frames: AtomicU64,
    can_reconfigure: AtomicBool,
}

impl Published {
    fn slot(&self) -> MutexGuard<'_, Option<Arc<Frame>>> {
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, frame: Frame) {
        self.can_reconfigure.store(frame.can_reconfigure, Ordering::Release);
        *self.slot() = Some(Arc::new(frame));
        self.frames.fetch_add(1, Ordering::AcqRel);
    }
}

/// Cloneable control surface for a running [`Driver`].
#[derive(Clone)]
pub struct DriverHandle {
    tx: Sender<ControlCommand>,
    published: Arc<Published>,
}

impl DriverHandle {
    pub fn send(&self, command: ControlCommand) -> Result<(), ControlError> {
        self.tx.send(command).map_err(|_| ControlError::Disconnected)
    }

    pub fn start(&self) -> Result<(), ControlError> {
        self.send(ControlCommand::Start)
    }

    pub fn stop(&self) -> Result<(), ControlError> {
        self.send(ControlCommand::Stop)
    }

    pub fn pause(&self) -> Result<(), ControlError> {
        self.send(ControlCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), ControlError> {
        self.send(ControlCommand::Resume)
    }

    pub fn supernova(&self) -> Result<(), ControlError> {
        self.send(ControlCommand::Supernova)
    }

    pub fn configure(&self, update: SettingsUpdate) -> Result<(), ControlError> {
        self.send(ControlCommand::Configure(update))
    }

    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.published.slot().clone()
    }

    /// Frames published so far; lets pollers skip frames they have seen.
    pub fn frames_published(&self) -> u64 {
        self.published.frames.load(Ordering::Acquire)
    }

    /// Whether structural settings would be accepted right now.
    pub fn can_reconfigure(&self) -> bool {
        self.published.can_reconfigure.load(Ordering::Acquire)
    }
}

/// Runs a [`Simulation`] on a dedicated worker thread, ticking every
/// [`BASE_TICK`] and applying queued commands between ticks.
pub struct Driver {
    handle: DriverHandle,
    stats: Option<Receiver<SimStats>>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<Simulation>>,
}

impl Driver {
    pub fn spawn(sim: Simulation) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<ControlCommand>();
        let (stats_tx, stats_rx) = mpsc::sync_channel::<SimStats>(STATS_BACKLOG);
        let published = Arc::new(Published {
            frame: Mutex::new(Some(Arc::new(sim.frame()))),
            frames: AtomicU64::new(1),
            can_reconfigure: AtomicBool::new(sim.can_reconfigure()),
        });
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            sim,
            rx,
            stats_tx,
            published: Arc::clone(&published),
            shutdown: Arc::clone(&shutdown),
        };
        let join = thread::Builder::new()
            .name("sim-worker".into())
            .spawn(move || worker.run())?;

        Ok(Self {
            handle: DriverHandle { tx, published },
            stats: Some(stats_rx),
            shutdown,
            worker: Some(join),
        })
    }

    pub fn handle(&self) -> DriverHandle {
        self.handle.clone()
    }

    /// Stats of every generation, in order. Only one receiver exists; later
    /// calls return `None`. Once [`STATS_BACKLOG`] entries are unread, new
    /// generations are not queued.
    pub fn take_stats(&mut self) -> Option<Receiver<SimStats>> {
        self.stats.take()
    }

    /// Stop the worker and take the simulation back.
    pub fn shutdown(mut self) -> Option<Simulation> {
        self.join()
    }

    fn join(&mut self) -> Option<Simulation> {
        self.shutdown.store(true, Ordering::Release);
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(sim) => Some(sim),
            Err(_) => {
                warn!("simulation worker panicked");
                None
            }
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.join();
    }
}

struct Worker {
    sim: Simulation,
    rx: Receiver<ControlCommand>,
    stats_tx: SyncSender<SimStats>,
    published: Arc<Published>,
    shutdown: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self) -> Simulation {
        debug!("simulation worker started");
        let mut next_tick = Instant::now() + BASE_TICK;
        while !self.shutdown.load(Ordering::Acquire) {
            self.drain_commands();
            if let Some(frame) = self.sim.tick() {
                // Full backlog or no reader: the frame slot still has it.
                let _ = self.stats_tx.try_send(frame.stats.clone());
                self.published.store(frame);
            }
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            }
            next_tick = next_tick.max(now) + BASE_TICK;
        }
        // Commands sent right before shutdown still apply.
        self.drain_commands();
        debug!(generation = self.sim.generation(), "simulation worker stopped");
        self.sim
    }

    /// Apply every queued command.
    fn drain_commands(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            let name = command.name();
            let result = match command {
                ControlCommand::Start => self.sim.start().map(drop),
                ControlCommand::Stop => self.sim.stop().map(drop),
                ControlCommand::Pause => self.sim.pause().map(drop),
                ControlCommand::Resume => self.sim.resume().map(drop),
                ControlCommand::Supernova => self.sim.trigger_supernova().map(drop),
                ControlCommand::Configure(update) => self.sim.configure(update).map(drop),
            };
            match result {
                Ok(()) => self.published.store(self.sim.frame()),
                Err(err) => warn!(command = name, error = %err, "command rejected"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::controller::RunState;
    use types::Settings;

    fn test_sim() -> Simulation {
        Simulation::new(Settings {
            speed_ms: 10,
            mutation_chance: 0.0,
            rng_seed: Some(3),
            ..Default::default()
        })
        .expect("valid settings")
    }

    fn wait_for(handle: &DriverHandle, pred: impl Fn(&Frame) -> bool) -> Arc<Frame> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(frame) = handle.latest_frame() {
                if pred(&frame) {
                    return frame;
                }
            }
            assert!(Instant::now() < deadline, "timed out waiting for frame");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn idle_frame_is_available_immediately() {
        let driver = Driver::spawn(test_sim()).unwrap();
        let frame = driver.handle().latest_frame().expect("initial frame");
        assert_eq!(frame.state, RunState::Idle);
        assert!(driver.handle().can_reconfigure());
    }

    #[test]
    fn runs_generations_until_stopped() {
        let driver = Driver::spawn(test_sim()).unwrap();
        let handle = driver.handle();
        handle.start().unwrap();
        let frame = wait_for(&handle, |f| f.stats.generation >= 3);
        assert_eq!(frame.state, RunState::Running);
        assert!(!handle.can_reconfigure());

        handle.stop().unwrap();
        wait_for(&handle, |f| f.state == RunState::Idle);
        assert!(handle.can_reconfigure());

        let sim = driver.shutdown().expect("worker returns simulation");
        assert_eq!(sim.state(), RunState::Idle);
        assert!(sim.generation() >= 3);
    }

    #[test]
    fn locked_configure_is_rejected_while_running() {
        let driver = Driver::spawn(test_sim()).unwrap();
        let handle = driver.handle();
        handle.start().unwrap();
        handle
            .configure(SettingsUpdate { cell_size: Some(4), ..Default::default() })
            .unwrap();
        wait_for(&handle, |f| f.stats.generation >= 1);
        let sim = driver.shutdown().unwrap();
        assert_eq!(sim.settings().cell_size, 5);
        assert_eq!(sim.grid().size(), 60);
    }

    #[test]
    fn commands_queued_before_shutdown_are_applied() {
        let driver = Driver::spawn(test_sim()).unwrap();
        driver
            .handle()
            .configure(SettingsUpdate { cell_size: Some(3), ..Default::default() })
            .unwrap();
        let sim = driver.shutdown().unwrap();
        assert_eq!(sim.grid().size(), 100);
    }

    #[test]
    fn handle_reports_disconnect_after_shutdown() {
        let driver = Driver::spawn(test_sim()).unwrap();
        let handle = driver.handle();
        drop(driver);
        assert_eq!(handle.start(), Err(ControlError::Disconnected));
    }

    #[test]
    fn stats_stream_carries_every_generation() {
        let mut driver = Driver::spawn(test_sim()).unwrap();
        let stats = driver.take_stats().expect("first take yields the receiver");
        assert!(driver.take_stats().is_none());
        driver.handle().start().unwrap();
        let generations: Vec<u64> = (0..20)
            .map(|_| {
                stats
                    .recv_timeout(Duration::from_secs(5))
                    .expect("generation stats")
                    .generation
            })
            .collect();
        assert_eq!(generations, (1..=20).collect::<Vec<_>>());
        let _ = driver.shutdown();
    }
}
