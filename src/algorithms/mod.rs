//! Sensor algorithm contract and its five variants.
//!
//! Every variant follows the same two-phase lifecycle:
//!
//! - `setup` validates geometry and formats, partitions the shared scratch
//!   arena for its private buffers and resets cross-frame state.
//! - `run` consumes one input frame, rewrites the whole output frame and
//!   fills `OutArgs`. All checks happen before the first output byte is
//!   written, so a failed run leaves the caller's buffers untouched.
//!
//! Variants own no memory beyond geometry, region handles and an
//! `ArenaToken`. Nothing in `run` allocates.

mod args;
mod edge_line;
mod line;
mod motion;
mod mxn;
pub mod overlay;
mod object;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arena::{ArenaToken, ScratchArena, ScratchLayout};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc, VideoFormat};

pub use args::{InArgs, OutArgs, MXN_MAX_CELLS, MXN_MAX_DIM};
pub use edge_line::EdgeLineSensor;
pub use line::LineSensor;
pub use motion::MotionSensor;
pub use mxn::MxnSensor;
pub use object::ObjectSensor;

pub(crate) use args::{normalize_coord, percent};

/// Stable identifiers for the variants. Discriminants are the raw ids
/// accepted by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmId {
    Motion = 0,
    EdgeLine = 1,
    Object = 2,
    Line = 3,
    Mxn = 4,
}

/// Number of variants.
pub const ALGORITHM_COUNT: usize = 5;

impl AlgorithmId {
    pub const ALL: [AlgorithmId; ALGORITHM_COUNT] = [
        AlgorithmId::Motion,
        AlgorithmId::EdgeLine,
        AlgorithmId::Object,
        AlgorithmId::Line,
        AlgorithmId::Mxn,
    ];

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(AlgorithmId::Motion),
            1 => Some(AlgorithmId::EdgeLine),
            2 => Some(AlgorithmId::Object),
            3 => Some(AlgorithmId::Line),
            4 => Some(AlgorithmId::Mxn),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        self as i32
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmId::Motion => "motion",
            AlgorithmId::EdgeLine => "edge-line",
            AlgorithmId::Object => "object",
            AlgorithmId::Line => "line",
            AlgorithmId::Mxn => "mxn",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        AlgorithmId::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown sensor algorithm '{}'", s))
    }
}

/// Setup/Run contract shared by all variants.
pub trait SensorAlgorithm: Send {
    fn id(&self) -> AlgorithmId;

    /// Validate geometry, partition `arena`, reset cross-frame state.
    ///
    /// On failure the variant is inactive and the arena is unchanged.
    fn setup(
        &mut self,
        in_desc: &ImageDesc,
        out_desc: &ImageDesc,
        arena: &mut ScratchArena,
    ) -> Result<(), SensorError>;

    /// Process one frame. Requires a prior successful `setup` whose arena
    /// partition is still current.
    fn run(
        &mut self,
        input: ImageBuffer<'_>,
        output: ImageBufferMut<'_>,
        arena: &mut ScratchArena,
        in_args: &InArgs,
        out_args: &mut OutArgs,
    ) -> Result<(), SensorError>;

    /// Whether `run` against `arena` would get past the activation check:
    /// set up, and not since displaced by another partition of `arena`.
    fn is_active(&self, arena: &ScratchArena) -> bool;
}

/// What a variant keeps after a successful `setup`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Activation {
    pub in_desc: ImageDesc,
    pub out_desc: ImageDesc,
    pub token: ArenaToken,
    pub layout: ScratchLayout,
}

/// Formats every variant accepts: YUYV in, RGB565X out, same extent, even width.
pub(crate) fn check_formats(in_desc: &ImageDesc, out_desc: &ImageDesc) -> Result<(), SensorError> {
    if in_desc.format() != VideoFormat::Yuv422 || out_desc.format() != VideoFormat::Rgb565X {
        return Err(SensorError::UnsupportedFormat);
    }
    if !in_desc.same_extent(out_desc) || in_desc.width() % 2 != 0 {
        return Err(SensorError::UnsupportedGeometry);
    }
    Ok(())
}

pub(crate) fn holds_arena(state: &Option<Activation>, arena: &ScratchArena) -> bool {
    state.is_some_and(|act| arena.validate(&act.token).is_ok())
}

/// Every check `run` needs before it may touch the output.
pub(crate) fn begin_run(
    state: &Option<Activation>,
    arena: &ScratchArena,
    input: &ImageBuffer<'_>,
    output: &ImageBufferMut<'_>,
    in_args: &InArgs,
) -> Result<Activation, SensorError> {
    let act = state.ok_or(SensorError::NotInitialized)?;
    arena.validate(&act.token)?;
    input.check(&act.in_desc)?;
    output.check(&act.out_desc)?;
    in_args.validate()?;
    Ok(act)
}

/// Build one instance of every variant, indexed by `AlgorithmId::index`.
pub fn all_variants() -> [Box<dyn SensorAlgorithm>; ALGORITHM_COUNT] {
    [
        Box::new(MotionSensor::new()),
        Box::new(EdgeLineSensor::new()),
        Box::new(ObjectSensor::new()),
        Box::new(LineSensor::new()),
        Box::new(MxnSensor::new()),
    ]
}
