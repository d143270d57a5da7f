//! Motion sensor: block-wise luma change against the previous frame.
//!
//! The frame is reduced to a fixed 32×24 grid of mean-luma cells. Each run
//! thresholds the absolute change against the previous grid, dilates the
//! resulting binary cell mask once, and reports the centroid and share of
//! active cells. The previous grid is the only cross-frame state and lives
//! in the scratch partition.
//!
//! Border policy: the cell mask is written into a 34×26 plane whose outer
//! ring stays zero, so dilation sees "no motion" beyond the frame edge and
//! its valid-region output is exactly 32×24.

use crate::arena::{RegionRequest, ScratchArena};
use crate::color::{put_gray565x, put_rgb565x, yuyv_luma};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc};
use crate::kernels::{dilate_binary, threshold_le2min, StructuringElement};

use super::overlay::{self, YELLOW};
use super::{
    begin_run, check_formats, holds_arena, normalize_coord, percent, Activation, AlgorithmId,
    InArgs, OutArgs, SensorAlgorithm,
};

pub const GRID_W: usize = 32;
pub const GRID_H: usize = 24;
const CELLS: usize = GRID_W * GRID_H;
const PAD_W: usize = GRID_W + 2;
const PAD_H: usize = GRID_H + 2;

const LAYOUT: [RegionRequest; 5] = [
    RegionRequest::bytes("reference", CELLS),
    RegionRequest::bytes("current", CELLS),
    RegionRequest::bytes("difference", CELLS),
    RegionRequest::bytes("bordered", PAD_W * PAD_H),
    RegionRequest::bytes("dilated", CELLS),
];

pub struct MotionSensor {
    state: Option<Activation>,
    has_reference: bool,
}

impl MotionSensor {
    pub fn new() -> Self {
        Self {
            state: None,
            has_reference: false,
        }
    }
}

impl Default for MotionSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorAlgorithm for MotionSensor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Motion
    }

    fn setup(
        &mut self,
        in_desc: &ImageDesc,
        out_desc: &ImageDesc,
        arena: &mut ScratchArena,
    ) -> Result<(), SensorError> {
        self.state = None;
        self.has_reference = false;

        check_formats(in_desc, out_desc)?;
        if in_desc.width() % GRID_W != 0 || in_desc.height() % GRID_H != 0 {
            return Err(SensorError::UnsupportedGeometry);
        }

        let (token, layout) = arena.partition(&LAYOUT)?;
        self.state = Some(Activation {
            in_desc: *in_desc,
            out_desc: *out_desc,
            token,
            layout,
        });
        Ok(())
    }

    fn run(
        &mut self,
        input: ImageBuffer<'_>,
        mut output: ImageBufferMut<'_>,
        arena: &mut ScratchArena,
        in_args: &InArgs,
        out_args: &mut OutArgs,
    ) -> Result<(), SensorError> {
        let act = begin_run(&self.state, arena, &input, &output, in_args)?;
        let [reference, current, difference, bordered, dilated] =
            arena.regions_mut::<5>(&act.token, &act.layout)?;

        let desc = &act.in_desc;
        let cell_w = desc.width() / GRID_W;
        let cell_h = desc.height() / GRID_H;
        let cell_area = (cell_w * cell_h) as u32;

        // Mean luma per cell, one band of cell rows at a time.
        for gy in 0..GRID_H {
            let mut sums = [0u32; GRID_W];
            for y in gy * cell_h..(gy + 1) * cell_h {
                let row = input.row(desc, y);
                for (gx, sum) in sums.iter_mut().enumerate() {
                    for x in gx * cell_w..(gx + 1) * cell_w {
                        *sum += yuyv_luma(row, x) as u32;
                    }
                }
            }
            for (gx, sum) in sums.iter().enumerate() {
                current[gy * GRID_W + gx] = (sum / cell_area) as u8;
            }
        }

        if self.has_reference {
            for ((d, c), r) in difference.iter_mut().zip(current.iter()).zip(reference.iter()) {
                *d = c.abs_diff(*r);
            }
        } else {
            difference.fill(0);
        }

        // `dilated` doubles as the threshold target before the mask is built.
        threshold_le2min(difference, dilated, in_args.motion_threshold);
        for gy in 0..GRID_H {
            let src = &dilated[gy * GRID_W..(gy + 1) * GRID_W];
            let dst = &mut bordered[(gy + 1) * PAD_W + 1..(gy + 1) * PAD_W + 1 + GRID_W];
            for (d, s) in dst.iter_mut().zip(src) {
                *d = if *s != 0 { 255 } else { 0 };
            }
        }
        dilate_binary(
            bordered,
            dilated,
            PAD_W,
            PAD_H,
            &StructuringElement::EIGHT_CONNECTED,
        );

        let mut active = 0usize;
        let mut sum_x = 0usize;
        let mut sum_y = 0usize;
        for (i, cell) in dilated.iter().enumerate() {
            if *cell != 0 {
                active += 1;
                sum_x += i % GRID_W;
                sum_y += i / GRID_W;
            }
        }

        reference.copy_from_slice(current);
        self.has_reference = true;

        let out_desc = &act.out_desc;
        for y in 0..desc.height() {
            let in_row = input.row(desc, y);
            let out_row = output.row_mut(out_desc, y);
            let mask_row = &dilated[(y / cell_h) * GRID_W..(y / cell_h + 1) * GRID_W];
            for x in 0..desc.width() {
                let luma = yuyv_luma(in_row, x);
                if mask_row[x / cell_w] != 0 {
                    put_rgb565x(out_row, x, luma / 2 + 127, luma / 2, luma / 2);
                } else {
                    put_gray565x(out_row, x, luma, 0);
                }
            }
        }

        let mut result = OutArgs {
            target_mass: percent(active, CELLS),
            ..OutArgs::default()
        };
        if active > 0 {
            let px = (sum_x * cell_w) / active + cell_w / 2;
            let py = (sum_y * cell_h) / active + cell_h / 2;
            result.target_x = normalize_coord(px, desc.width());
            result.target_y = normalize_coord(py, desc.height());
            overlay::crosshair(&mut output, out_desc, px, py, cell_w.max(4), YELLOW);
        }
        *out_args = result;

        log::debug!(
            "motion: {} active cells, target ({}, {})",
            active,
            out_args.target_x,
            out_args.target_y
        );
        Ok(())
    }

    fn is_active(&self, arena: &ScratchArena) -> bool {
        holds_arena(&self.state, arena)
    }
}
