//! Per-frame argument records.

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Largest MxN grid side.
pub const MXN_MAX_DIM: u8 = 8;

/// Cells in the largest MxN grid.
pub const MXN_MAX_CELLS: usize = MXN_MAX_DIM as usize * MXN_MAX_DIM as usize;

/// Tunables supplied with every frame.
///
/// Hue is in degrees (`0..=359`, `from > to` wraps through red), saturation
/// and value in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InArgs {
    pub detect_hue_from: u16,
    pub detect_hue_to: u16,
    pub detect_sat_from: u8,
    pub detect_sat_to: u8,
    pub detect_val_from: u8,
    pub detect_val_to: u8,
    /// Derive the HSV window from the centre of this frame instead.
    pub auto_detect_hsv: bool,
    pub motion_threshold: u8,
    pub edge_threshold: u8,
    pub line_threshold: u8,
    pub mxn_cols: u8,
    pub mxn_rows: u8,
}

impl Default for InArgs {
    fn default() -> Self {
        Self {
            detect_hue_from: 340,
            detect_hue_to: 20,
            detect_sat_from: 40,
            detect_sat_to: 100,
            detect_val_from: 30,
            detect_val_to: 100,
            auto_detect_hsv: false,
            motion_threshold: 12,
            edge_threshold: 40,
            line_threshold: 96,
            mxn_cols: 3,
            mxn_rows: 3,
        }
    }
}

impl InArgs {
    pub fn validate(&self) -> Result<(), SensorError> {
        if self.detect_hue_from >= 360 || self.detect_hue_to >= 360 {
            return Err(SensorError::InvalidArgument("hue must be below 360"));
        }
        if self.detect_sat_to > 100 || self.detect_val_to > 100 {
            return Err(SensorError::InvalidArgument(
                "saturation and value are percentages",
            ));
        }
        if self.detect_sat_from > self.detect_sat_to || self.detect_val_from > self.detect_val_to
        {
            return Err(SensorError::InvalidArgument("empty saturation or value window"));
        }
        if !(1..=MXN_MAX_DIM).contains(&self.mxn_cols) || !(1..=MXN_MAX_DIM).contains(&self.mxn_rows)
        {
            return Err(SensorError::InvalidArgument("mxn grid must be 1..=8 per side"));
        }
        Ok(())
    }
}

/// Detection results written by a successful `run`.
///
/// Target coordinates span `-100..=100` with the frame centre at 0, right
/// and down positive. `target_mass` is the percentage of the evaluated area
/// that matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutArgs {
    pub target_x: i32,
    pub target_y: i32,
    pub target_mass: u32,
    /// Line sensor: a band row was covered across most of its width.
    pub cross_detected: bool,
    pub detected_hue_from: u16,
    pub detected_hue_to: u16,
    pub detected_sat_from: u8,
    pub detected_sat_to: u8,
    pub detected_val_from: u8,
    pub detected_val_to: u8,
    /// Average colour per MxN cell, row-major, `0x00RRGGBB`.
    pub mxn_colors: [u32; MXN_MAX_CELLS],
}

impl Default for OutArgs {
    fn default() -> Self {
        Self {
            target_x: 0,
            target_y: 0,
            target_mass: 0,
            cross_detected: false,
            detected_hue_from: 0,
            detected_hue_to: 0,
            detected_sat_from: 0,
            detected_sat_to: 0,
            detected_val_from: 0,
            detected_val_to: 0,
            mxn_colors: [0; MXN_MAX_CELLS],
        }
    }
}

/// Map a pixel position onto `-100..=100`.
#[inline]
pub(crate) fn normalize_coord(pos: usize, extent: usize) -> i32 {
    let span = extent.saturating_sub(1).max(1) as i64;
    ((pos as i64 * 200) / span - 100).clamp(-100, 100) as i32
}

/// Share of `part` in `whole` in whole percent.
#[inline]
pub(crate) fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as u64 * 100) / whole as u64).min(100) as u32
}
