pub mod config;
pub mod controller;
pub mod driver;
pub mod timing;

pub use config::{load_settings, save_settings};
pub use controller::{stats_summary, ControlError, Frame, RunState, Simulation, Transition};
pub use driver::{Driver, DriverHandle};
pub use timing::{GenerationClock, BASE_TICK};
