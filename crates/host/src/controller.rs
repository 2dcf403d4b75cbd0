use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use renderer::{generate_palette, Palette, PixelBuffer, Renderer};
use sim_core::{Event, EventKind, EventLog, SimEngine, SimStats};
use types::{
    validate_cell_size, validate_growth_rate, validate_mutation_chance, validate_speed,
    ConfigError, Grid, Settings, SettingsUpdate,
};

use crate::timing::GenerationClock;

/// Phase advance per generation.
pub const CYCLE_STEP: f64 = 0.05;
/// How strongly the average age shifts the palette phase.
pub const AGE_PHASE_WEIGHT: f64 = 0.1;
/// Density above which a periodic alert is logged.
pub const DENSITY_ALERT: f64 = 0.9;
/// Generations between density alerts.
pub const DENSITY_ALERT_PERIOD: u64 = 50;

// Mixed into the seed so the cosmetic stream is independent of the
// simulation stream.
const COSMETIC_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

const IDLE_STATUS: &str = "Empty grid - Press Start to begin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl RunState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("cannot {command} while {state}")]
    InvalidTransition { command: &'static str, state: RunState },
    #[error("structural settings are locked while {0}")]
    ConfigLocked(RunState),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("simulation worker is not running")]
    Disconnected,
}

/// Result of a lifecycle operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: RunState,
    pub event: Option<Event>,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub stats: SimStats,
    pub palette: Palette,
    pub pixels: PixelBuffer,
    /// Last three events, most recent first.
    pub recent_events: Vec<String>,
    pub status: String,
    pub stats_text: String,
    pub state: RunState,
    pub can_reconfigure: bool,
}

fn seeded_rngs(seed: Option<u64>) -> (SmallRng, SmallRng) {
    let seed = seed.unwrap_or_else(rand::random);
    (
        SmallRng::seed_from_u64(seed),
        SmallRng::seed_from_u64(seed ^ COSMETIC_STREAM),
    )
}

pub fn stats_summary(stats: &SimStats) -> String {
    format!(
        "Population: {}\nDensity: {:.1}%\nAvg age: {:.1}\nEntropy: {:.3}",
        stats.population,
        stats.density * 100.0,
        stats.avg_age,
        stats.entropy
    )
}

/// Lifecycle state machine that owns the grid and composes evolution,
/// statistics, palette and rendering once per generation.
pub struct Simulation {
    settings: Settings,
    state: RunState,
    engine: SimEngine,
    renderer: Renderer,
    clock: GenerationClock,
    log: EventLog,
    palette: Palette,
    stats: SimStats,
    cycle: f64,
    status: String,
    sim_rng: SmallRng,
    cosmetic_rng: SmallRng,
}

impl Simulation {
    pub fn new(settings: Settings) -> Result<Self, ControlError> {
        settings.validate()?;
        let (sim_rng, mut cosmetic_rng) = seeded_rngs(settings.rng_seed);
        let engine = SimEngine::new(settings.grid_size());
        let palette = generate_palette(&mut cosmetic_rng, 0.0, settings.palette_mode);
        let stats = engine.stats();
        Ok(Self {
            renderer: Renderer::new(settings.cell_size, settings.bloom),
            clock: GenerationClock::new(settings.speed_ms),
            state: RunState::Idle,
            log: EventLog::new(),
            cycle: 0.0,
            status: IDLE_STATUS.to_owned(),
            engine,
            palette,
            stats,
            settings,
            sim_rng,
            cosmetic_rng,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    pub fn generation(&self) -> u64 {
        self.engine.generation()
    }

    /// Whether grid size, speed and the rule knobs may be changed now.
    pub fn can_reconfigure(&self) -> bool {
        !self.state.is_active()
    }

    fn record(&mut self, kind: EventKind, message: impl Into<String>) -> Event {
        self.log.record(self.engine.generation(), kind, message)
    }

    pub fn start(&mut self) -> Result<Transition, ControlError> {
        if self.state.is_active() {
            return Err(ControlError::InvalidTransition { command: "start", state: self.state });
        }
        let placed = self.engine.seed(&mut self.sim_rng);
        self.cycle = 0.0;
        self.palette = generate_palette(&mut self.cosmetic_rng, 0.0, self.settings.palette_mode);
        self.stats = self.engine.stats();
        self.clock.reset();
        self.state = RunState::Running;
        self.status = "Simulation running...".to_owned();

        let message = format!(
            "Simulation started (growth={:.2}, mutation={:.3})",
            self.settings.growth_rate, self.settings.mutation_chance
        );
        let event = self.record(EventKind::Start, message);
        info!(
            placed,
            grid_size = self.engine.grid_size(),
            growth_rate = self.settings.growth_rate,
            mutation_chance = self.settings.mutation_chance,
            "simulation started"
        );
        Ok(Transition { state: self.state, event: Some(event) })
    }

    pub fn stop(&mut self) -> Result<Transition, ControlError> {
        if !self.state.is_active() {
            return Err(ControlError::InvalidTransition { command: "stop", state: self.state });
        }
        self.state = RunState::Idle;
        self.clock.set_paused(false);
        self.status = "Simulation stopped".to_owned();
        let event = self.record(EventKind::Stop, "Simulation stopped");
        info!(generation = self.engine.generation(), "simulation stopped");
        Ok(Transition { state: self.state, event: Some(event) })
    }

    pub fn pause(&mut self) -> Result<Transition, ControlError> {
        if self.state != RunState::Running {
            return Err(ControlError::InvalidTransition { command: "pause", state: self.state });
        }
        self.state = RunState::Paused;
        self.clock.set_paused(true);
        self.status = "Simulation paused".to_owned();
        let event = self.record(EventKind::Pause, "Simulation paused");
        info!(generation = self.engine.generation(), "simulation paused");
        Ok(Transition { state: self.state, event: Some(event) })
    }

    pub fn resume(&mut self) -> Result<Transition, ControlError> {
        if self.state != RunState::Paused {
            return Err(ControlError::InvalidTransition { command: "resume", state: self.state });
        }
        self.state = RunState::Running;
        self.clock.set_paused(false);
        self.status = "Simulation running...".to_owned();
        let event = self.record(EventKind::Resume, "Simulation resumed");
        info!(generation = self.engine.generation(), "simulation resumed");
        Ok(Transition { state: self.state, event: Some(event) })
    }

    pub fn trigger_supernova(&mut self) -> Result<Transition, ControlError> {
        if self.state != RunState::Running {
            return Err(ControlError::InvalidTransition { command: "supernova", state: self.state });
        }
        let blast = self.engine.supernova(&mut self.sim_rng);
        let message = format!(
            "Explosion at ({},{}) radius {}",
            blast.center.x, blast.center.y, blast.radius
        );
        let event = self.record(EventKind::Supernova, message);
        Ok(Transition { state: self.state, event: Some(event) })
    }

    /// Apply a partial settings change. Cosmetic knobs are always accepted;
    /// the rest only when [`Self::can_reconfigure`]. The update is validated
    /// as a whole before anything changes.
    pub fn configure(&mut self, update: SettingsUpdate) -> Result<Transition, ControlError> {
        if update.touches_locked() && !self.can_reconfigure() {
            return Err(ControlError::ConfigLocked(self.state));
        }
        if let Some(rate) = update.growth_rate {
            validate_growth_rate(rate)?;
        }
        if let Some(chance) = update.mutation_chance {
            validate_mutation_chance(chance)?;
        }
        if let Some(cell_size) = update.cell_size {
            validate_cell_size(cell_size)?;
        }
        if let Some(speed) = update.speed_ms {
            validate_speed(speed)?;
        }

        if let Some(rate) = update.growth_rate {
            self.settings.growth_rate = rate;
        }
        if let Some(chance) = update.mutation_chance {
            self.settings.mutation_chance = chance;
        }
        if let Some(speed) = update.speed_ms {
            self.settings.speed_ms = speed;
            self.clock.set_speed(speed);
        }
        if let Some(bloom) = update.bloom {
            self.settings.bloom = bloom;
            self.renderer.set_bloom(bloom);
        }
        if let Some(mode) = update.palette_mode {
            self.settings.palette_mode = mode;
            if !self.state.is_active() {
                self.palette = generate_palette(&mut self.cosmetic_rng, 0.0, mode);
            }
        }

        let mut event = None;
        if let Some(cell_size) = update.cell_size.filter(|&c| c != self.settings.cell_size) {
            self.settings.cell_size = cell_size;
            let grid_size = self.settings.grid_size();
            self.engine.resize(grid_size);
            self.renderer.set_cell_size(cell_size);
            self.stats = self.engine.stats();
            let max = self.settings.max_population();
            debug!(cell_size, grid_size, "grid resized");
            event = Some(self.record(
                EventKind::Config,
                format!("Grid resized: {grid_size}x{grid_size} cells ({max} max)"),
            ));
        }
        Ok(Transition { state: self.state, event })
    }

    /// Advance one base tick; runs a generation when the clock says so.
    pub fn tick(&mut self) -> Option<Frame> {
        if self.state != RunState::Running || !self.clock.generation_due() {
            return None;
        }
        Some(self.advance())
    }

    /// Run one generation unconditionally.
    pub fn advance(&mut self) -> Frame {
        let settings = self.settings.clone();
        self.cycle += CYCLE_STEP;

        // 1. Random mutation on the current grid
        if self.sim_rng.gen::<f64>() < settings.mutation_chance {
            self.engine.mutate(&mut self.sim_rng);
            self.record(EventKind::Mutation, "Genetic mutations detected");
        }

        // 2. Evolve + stats
        self.engine.step(&mut self.sim_rng, settings.growth_rate);
        self.stats = self.engine.stats();

        // 3. Palette tracks elapsed time and population maturity
        let phase = self.cycle + self.stats.avg_age * AGE_PHASE_WEIGHT;
        self.palette = generate_palette(&mut self.cosmetic_rng, phase, settings.palette_mode);

        // 4. Rasterize + bloom
        let pixels = self.renderer.render_frame(self.engine.grid(), &self.palette);

        let generation = self.stats.generation;
        let total = settings.max_population();
        if self.stats.population >= total {
            self.record(EventKind::End, "Maximum population reached");
            self.status = format!("COMPLETED - Generation {generation} - Grid filled!");
            self.engine.reset_generation();
            self.state = RunState::Completed;
            info!(generation, population = self.stats.population, "grid filled");
        } else {
            if self.stats.density > DENSITY_ALERT && generation % DENSITY_ALERT_PERIOD == 0 {
                let message = format!("Critical density: {:.1}%", self.stats.density * 100.0);
                self.record(EventKind::Density, message);
            }
            self.status = format!(
                "Gen {} - Pop {}/{} ({:.1}%) - Avg age: {:.1} - Entropy: {:.3}",
                generation,
                self.stats.population,
                total,
                self.stats.density * 100.0,
                self.stats.avg_age,
                self.stats.entropy
            );
        }

        self.build_frame(pixels)
    }

    /// Render the current grid without advancing.
    pub fn frame(&self) -> Frame {
        let pixels = self.renderer.render_frame(self.engine.grid(), &self.palette);
        self.build_frame(pixels)
    }

    fn build_frame(&self, pixels: PixelBuffer) -> Frame {
        Frame {
            stats: self.stats.clone(),
            palette: self.palette.clone(),
            pixels,
            recent_events: self.log.recent_lines(),
            status: self.status.clone(),
            stats_text: stats_summary(&self.stats),
            state: self.state,
            can_reconfigure: self.can_reconfigure(),
        }
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        self.engine.grid_mut()
    }
}
