//! Id-indexed dispatch over the sensor variants.
//!
//! The dispatcher owns the shared scratch arena and one instance of every
//! variant. Selecting an id the table does not know is a neutral no-op, so a
//! capture loop can forward whatever id its control channel carries.

use crate::algorithms::{all_variants, AlgorithmId, InArgs, OutArgs, SensorAlgorithm, ALGORITHM_COUNT};
use crate::arena::ScratchArena;
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc, VideoFormat};

pub const DEFAULT_FRAME_WIDTH: usize = 320;
pub const DEFAULT_FRAME_HEIGHT: usize = 240;

/// Capture geometry shared by input and output frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl FrameGeometry {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// YUYV capture descriptor, two bytes per pixel.
    pub fn input_desc(&self) -> Result<ImageDesc, SensorError> {
        ImageDesc::new(self.width, self.height, self.width * 2, VideoFormat::Yuv422)
    }

    /// RGB565X display descriptor, two bytes per pixel.
    pub fn output_desc(&self) -> Result<ImageDesc, SensorError> {
        ImageDesc::new(self.width, self.height, self.width * 2, VideoFormat::Rgb565X)
    }

    pub fn input_len(&self) -> usize {
        self.width * self.height * 2
    }

    pub fn output_len(&self) -> usize {
        self.width * self.height * 2
    }
}

/// Map a dispatcher result onto the integer status contract.
pub fn status(result: Result<i32, SensorError>) -> i32 {
    result.unwrap_or_else(|e| e.status())
}

pub struct Dispatcher {
    geometry: FrameGeometry,
    arena: ScratchArena,
    variants: [Box<dyn SensorAlgorithm>; ALGORITHM_COUNT],
    active: Option<AlgorithmId>,
}

impl Dispatcher {
    pub fn new(geometry: FrameGeometry) -> Self {
        Self {
            geometry,
            arena: ScratchArena::new(),
            variants: all_variants(),
            active: None,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Variant that holds the arena, if any.
    pub fn active(&self) -> Option<AlgorithmId> {
        self.active
    }

    pub fn arena(&self) -> &ScratchArena {
        &self.arena
    }

    /// Set up the variant with raw id `raw`. Unknown ids return `Ok(0)`
    /// and leave every variant and the arena as they were.
    pub fn init_algorithm(&mut self, raw: i32) -> Result<i32, SensorError> {
        match AlgorithmId::from_raw(raw) {
            Some(id) => self.init(id).map(|()| 0),
            None => {
                log::debug!("init: ignoring unknown algorithm id {}", raw);
                Ok(0)
            }
        }
    }

    pub fn init(&mut self, id: AlgorithmId) -> Result<(), SensorError> {
        let in_desc = self.geometry.input_desc()?;
        let out_desc = self.geometry.output_desc()?;

        let variant = &mut self.variants[id.index()];
        match variant.setup(&in_desc, &out_desc, &mut self.arena) {
            Ok(()) => {
                self.active = Some(id);
                log::info!(
                    "sensor {} ready: {}x{}, scratch {}/{} bytes",
                    id,
                    self.geometry.width,
                    self.geometry.height,
                    self.arena.used(),
                    self.arena.capacity()
                );
                Ok(())
            }
            Err(e) => {
                // A failed setup never touches the arena, so another active
                // variant keeps its partition.
                if self.active == Some(id) {
                    self.active = None;
                }
                log::warn!(
                    "sensor {} setup failed for {}x{}: {}",
                    id,
                    self.geometry.width,
                    self.geometry.height,
                    e
                );
                Err(e)
            }
        }
    }

    /// Run one frame through the variant with raw id `raw`. Unknown ids
    /// return `Ok(0)` without writing `output` or `out_args`.
    pub fn run_algorithm(
        &mut self,
        raw: i32,
        input: &[u8],
        output: &mut [u8],
        in_args: &InArgs,
        out_args: &mut OutArgs,
    ) -> Result<i32, SensorError> {
        match AlgorithmId::from_raw(raw) {
            Some(id) => self.run(id, input, output, in_args, out_args).map(|()| 0),
            None => {
                log::debug!("run: ignoring unknown algorithm id {}", raw);
                Ok(0)
            }
        }
    }

    pub fn run(
        &mut self,
        id: AlgorithmId,
        input: &[u8],
        output: &mut [u8],
        in_args: &InArgs,
        out_args: &mut OutArgs,
    ) -> Result<(), SensorError> {
        self.variants[id.index()].run(
            ImageBuffer::new(input),
            ImageBufferMut::new(output),
            &mut self.arena,
            in_args,
            out_args,
        )?;
        log::debug!(
            "sensor {}: target ({}, {}) mass {}",
            id,
            out_args.target_x,
            out_args.target_y,
            out_args.target_mass
        );
        Ok(())
    }

    /// Drop the active partition. Every variant needs a new setup afterwards.
    pub fn release(&mut self) {
        self.arena.release();
        self.active = None;
    }
}
