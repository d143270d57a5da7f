use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::algorithms::{AlgorithmId, InArgs};
use crate::dispatch::{FrameGeometry, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};

const DEFAULT_ALGORITHM: AlgorithmId = AlgorithmId::Motion;
const DEFAULT_TARGET_FPS: u32 = 15;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SensorConfigFile {
    algorithm: Option<String>,
    frame: Option<FrameConfigFile>,
    args: Option<InArgs>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FrameConfigFile {
    width: Option<usize>,
    height: Option<usize>,
    fps: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub algorithm: AlgorithmId,
    pub geometry: FrameGeometry,
    pub target_fps: u32,
    pub args: InArgs,
}

impl SensorConfig {
    /// File named by `SENSOR_CONFIG` (optional), then environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENSOR_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SensorConfigFile) -> Result<Self> {
        let algorithm = match file.algorithm.as_deref() {
            Some(name) => name.parse()?,
            None => DEFAULT_ALGORITHM,
        };
        let frame = file.frame.unwrap_or_default();
        let geometry = FrameGeometry::new(
            frame.width.unwrap_or(DEFAULT_FRAME_WIDTH),
            frame.height.unwrap_or(DEFAULT_FRAME_HEIGHT),
        );
        Ok(Self {
            algorithm,
            geometry,
            target_fps: frame.fps.unwrap_or(DEFAULT_TARGET_FPS),
            args: file.args.unwrap_or_default(),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(name) = std::env::var("SENSOR_ALGORITHM") {
            if !name.trim().is_empty() {
                self.algorithm = name.parse()?;
            }
        }
        if let Ok(width) = std::env::var("SENSOR_FRAME_WIDTH") {
            self.geometry.width = width
                .trim()
                .parse()
                .map_err(|_| anyhow!("SENSOR_FRAME_WIDTH must be a pixel count"))?;
        }
        if let Ok(height) = std::env::var("SENSOR_FRAME_HEIGHT") {
            self.geometry.height = height
                .trim()
                .parse()
                .map_err(|_| anyhow!("SENSOR_FRAME_HEIGHT must be a pixel count"))?;
        }
        if let Ok(threshold) = std::env::var("SENSOR_MOTION_THRESHOLD") {
            self.args.motion_threshold = threshold
                .trim()
                .parse()
                .map_err(|_| anyhow!("SENSOR_MOTION_THRESHOLD must be 0..=255"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let FrameGeometry { width, height } = self.geometry;
        if width == 0 || height == 0 {
            return Err(anyhow!("frame {}x{} has no pixels", width, height));
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(anyhow!("frame {}x{} must have even dimensions", width, height));
        }
        if self.target_fps == 0 {
            return Err(anyhow!("frame fps must be greater than zero"));
        }
        self.args.validate().context("invalid [args]")?;
        Ok(())
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM,
            geometry: FrameGeometry::default(),
            target_fps: DEFAULT_TARGET_FPS,
            args: InArgs::default(),
        }
    }
}

fn read_config_file(path: &Path) -> Result<SensorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
