use serde::{Deserialize, Serialize};

use crate::params::PaletteMode;

/// Partial settings change. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub growth_rate: Option<f64>,
    pub mutation_chance: Option<f64>,
    pub palette_mode: Option<PaletteMode>,
    pub bloom: Option<bool>,
    pub cell_size: Option<u32>,
    pub speed_ms: Option<u32>,
}

impl SettingsUpdate {
    /// True if the update touches a knob that is locked while running.
    pub fn touches_locked(&self) -> bool {
        self.growth_rate.is_some()
            || self.mutation_chance.is_some()
            || self.cell_size.is_some()
            || self.speed_ms.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Requests sent from the control surface to the simulation worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    Start,
    Stop,
    Pause,
    Resume,
    Supernova,
    Configure(SettingsUpdate),
}

impl ControlCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Supernova => "supernova",
            Self::Configure(_) => "configure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmetic_update_is_not_locked() {
        let update = SettingsUpdate {
            palette_mode: Some(PaletteMode::Ocean),
            bloom: Some(false),
            ..Default::default()
        };
        assert!(!update.touches_locked());
        assert!(!update.is_empty());
    }

    #[test]
    fn structural_update_is_locked() {
        let update = SettingsUpdate { cell_size: Some(4), ..Default::default() };
        assert!(update.touches_locked());
    }

    #[test]
    fn command_json_is_tagged() {
        let cmd: ControlCommand = serde_json::from_str(r#"{"type":"supernova"}"#)
            .expect("command should parse");
        assert_eq!(cmd, ControlCommand::Supernova);
        assert_eq!(cmd.name(), "supernova");
    }
}
