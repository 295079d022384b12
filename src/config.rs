use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::InitError;

/// Number of radial ticks drawn per frame.
pub const TICK_COUNT: usize = 200;
/// Resting tick length in pixels.
pub const TICK_SIZE: f32 = 10.0;
/// Displacement tuning constant shared by tick deltas and scale samples.
pub const DELTA_COEF: f32 = 0.8;

/// RGBA stroke color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);
}

impl FromStr for Color {
    type Err = InitError;

    /// Parses a `#RRGGBB` hex literal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or_else(|| InitError::Color(s.into()))?;
        if hex.len() != 6 {
            return Err(InitError::Color(s.into()));
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| InitError::Color(s.into()))?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| InitError::Color(s.into()))?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| InitError::Color(s.into()))?;
        Ok(Color([r, g, b, 255]))
    }
}

/// Static visual parameters, immutable after construction.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Canvas edge length in pixels (the surface is square).
    pub size: u32,
    /// Thickness of the tick band in pixels.
    pub wave_length: u32,
    /// Stroke color for the ticks.
    pub color: Color,
    /// Height of the hosting viewport, feeding `scale_coef`. Defaults to
    /// `size` when the host has no meaningful viewport.
    pub viewport_height: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            size: 560,
            wave_length: 78,
            color: Color::WHITE,
            viewport_height: 560,
        }
    }
}

/// Constants derived from a [`VisualizerConfig`], fixed at engine construction.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub radius: f32,
    /// Shared x/y center coordinate: `radius + wave_length`.
    pub center: f32,
    pub tick_count: usize,
    pub tick_size: f32,
    pub delta_coef: f32,
    pub scale_coef: f32,
}

impl Geometry {
    pub fn derive(cfg: &VisualizerConfig) -> Result<Self, InitError> {
        let diameter = cfg.size as i64 - 2 * cfg.wave_length as i64;
        if diameter <= 0 {
            return Err(InitError::Geometry {
                size: cfg.size,
                wave_length: cfg.wave_length,
            });
        }
        if cfg.viewport_height == 0 {
            return Err(InitError::Viewport);
        }
        let radius = diameter as f32 / 2.0;
        Ok(Self {
            radius,
            center: radius + cfg.wave_length as f32,
            tick_count: TICK_COUNT,
            tick_size: TICK_SIZE,
            delta_coef: DELTA_COEF,
            scale_coef: (cfg.size as f32 / cfg.viewport_height as f32) * DELTA_COEF,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_wave_length")]
    pub wave_length: u32,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            wave_length: default_wave_length(),
            color: default_color(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

fn default_size() -> u32 { 560 }
fn default_wave_length() -> u32 { 78 }
fn default_color() -> String { "#FFFFFF".into() }
fn default_fps() -> u32 { 60 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
