use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square display in pixels. The grid is
/// `DISPLAY_SIZE / cell_size` cells across.
pub const DISPLAY_SIZE: u32 = 300;

pub const GROWTH_RATE_RANGE: (f64, f64) = (0.05, 0.5);
pub const MUTATION_CHANCE_RANGE: (f64, f64) = (0.0, 0.1);
pub const CELL_SIZE_RANGE: (u32, u32) = (2, 8);
pub const SPEED_MS_RANGE: (u32, u32) = (10, 200);

/// Color generation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    #[default]
    Original,
    Rainbow,
    Ocean,
    Fire,
}

impl PaletteMode {
    pub const ALL: [PaletteMode; 4] = [
        PaletteMode::Original,
        PaletteMode::Rainbow,
        PaletteMode::Ocean,
        PaletteMode::Fire,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Rainbow => "Rainbow",
            Self::Ocean => "Ocean",
            Self::Fire => "Fire",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }
}

/// Errors raised when validating simulation settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("growth rate {0} outside [0.05, 0.5]")]
    GrowthRate(f64),
    #[error("mutation chance {0} outside [0, 0.1]")]
    MutationChance(f64),
    #[error("cell size {0} outside [2, 8]")]
    CellSizeRange(u32),
    #[error("cell size {cell_size} does not evenly divide the {display}px display")]
    CellSizeDivisor { cell_size: u32, display: u32 },
    #[error("speed {0}ms outside [10, 200]")]
    Speed(u32),
}

/// User-tunable simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub growth_rate: f64,
    pub mutation_chance: f64,
    pub palette_mode: PaletteMode,
    pub bloom: bool,
    /// Pixels per cell side.
    pub cell_size: u32,
    /// Milliseconds between generations.
    pub speed_ms: u32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            growth_rate: 0.05,
            mutation_chance: 0.01,
            palette_mode: PaletteMode::Original,
            bloom: true,
            cell_size: 5,
            speed_ms: 50,
            rng_seed: None,
        }
    }
}

impl Settings {
    pub fn grid_size(&self) -> u32 {
        DISPLAY_SIZE / self.cell_size.max(1)
    }

    /// Maximum population for the current grid.
    pub fn max_population(&self) -> usize {
        let gs = self.grid_size() as usize;
        gs * gs
    }

    /// Clamp the continuous knobs into range. Cell size is left alone since
    /// no clamped value is guaranteed to divide the display.
    pub fn sanitize(&mut self) {
        self.growth_rate = self.growth_rate.clamp(GROWTH_RATE_RANGE.0, GROWTH_RATE_RANGE.1);
        self.mutation_chance = self
            .mutation_chance
            .clamp(MUTATION_CHANCE_RANGE.0, MUTATION_CHANCE_RANGE.1);
        self.speed_ms = self.speed_ms.clamp(SPEED_MS_RANGE.0, SPEED_MS_RANGE.1);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_growth_rate(self.growth_rate)?;
        validate_mutation_chance(self.mutation_chance)?;
        validate_cell_size(self.cell_size)?;
        validate_speed(self.speed_ms)?;
        Ok(())
    }
}

pub fn validate_growth_rate(rate: f64) -> Result<(), ConfigError> {
    if !(GROWTH_RATE_RANGE.0..=GROWTH_RATE_RANGE.1).contains(&rate) {
        return Err(ConfigError::GrowthRate(rate));
    }
    Ok(())
}

pub fn validate_mutation_chance(chance: f64) -> Result<(), ConfigError> {
    if !(MUTATION_CHANCE_RANGE.0..=MUTATION_CHANCE_RANGE.1).contains(&chance) {
        return Err(ConfigError::MutationChance(chance));
    }
    Ok(())
}

pub fn validate_cell_size(cell_size: u32) -> Result<(), ConfigError> {
    if !(CELL_SIZE_RANGE.0..=CELL_SIZE_RANGE.1).contains(&cell_size) {
        return Err(ConfigError::CellSizeRange(cell_size));
    }
    if DISPLAY_SIZE % cell_size != 0 {
        return Err(ConfigError::CellSizeDivisor {
            cell_size,
            display: DISPLAY_SIZE,
        });
    }
    Ok(())
}

pub fn validate_speed(speed_ms: u32) -> Result<(), ConfigError> {
    if !(SPEED_MS_RANGE.0..=SPEED_MS_RANGE.1).contains(&speed_ms) {
        return Err(ConfigError::Speed(speed_ms));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert_eq!(s.validate(), Ok(()));
        assert_eq!(s.grid_size(), 60);
        assert_eq!(s.max_population(), 3600);
    }

    #[test]
    fn cell_size_must_divide_display() {
        assert_eq!(validate_cell_size(6), Ok(()));
        assert_eq!(
            validate_cell_size(7),
            Err(ConfigError::CellSizeDivisor { cell_size: 7, display: 300 })
        );
        assert_eq!(validate_cell_size(1), Err(ConfigError::CellSizeRange(1)));
        assert_eq!(validate_cell_size(9), Err(ConfigError::CellSizeRange(9)));
    }

    #[test]
    fn sanitize_clamps_continuous_knobs() {
        let mut s = Settings {
            growth_rate: 2.0,
            mutation_chance: -1.0,
            speed_ms: 5,
            ..Default::default()
        };
        s.sanitize();
        assert_eq!(s.growth_rate, 0.5);
        assert_eq!(s.mutation_chance, 0.0);
        assert_eq!(s.speed_ms, 10);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"palette_mode":"fire","cell_size":4}"#)
            .expect("settings should parse");
        assert_eq!(s.palette_mode, PaletteMode::Fire);
        assert_eq!(s.cell_size, 4);
        assert_eq!(s.speed_ms, 50);
    }

    #[test]
    fn palette_mode_names_roundtrip() {
        for mode in PaletteMode::ALL {
            assert_eq!(PaletteMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(PaletteMode::from_name("ocean"), Some(PaletteMode::Ocean));
        assert_eq!(PaletteMode::from_name("plasma"), None);
    }
}
