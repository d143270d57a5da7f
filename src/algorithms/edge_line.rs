//! Edge-line sensor: strongest vertical edge line in the frame.
//!
//! Each interior row is correlated with a horizontal Sobel mask over a
//! rolling three-row luma window. Gradient magnitudes above the edge
//! threshold vote for their column; the vote-weighted mean column is the
//! reported line position.
//!
//! Border policy: the top and bottom rows and the first and last column
//! have no full 3×3 window. They are never classified as edges.

use crate::arena::{cast_region, RegionRequest, ScratchArena};
use crate::color::{put_gray565x, put_rgb565x, yuyv_luma};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc};
use crate::kernels::{correlate_3x3, threshold_le2min, threshold_len, SOBEL_X};

use super::overlay::{self, GREEN, YELLOW};
use super::{
    begin_run, check_formats, holds_arena, normalize_coord, percent, Activation, AlgorithmId,
    InArgs, OutArgs, SensorAlgorithm,
};

/// Widest frame whose row buffers fit the scratch arena.
pub const EDGE_MAX_WIDTH: usize = 320;

pub struct EdgeLineSensor {
    state: Option<Activation>,
}

impl EdgeLineSensor {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for EdgeLineSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorAlgorithm for EdgeLineSensor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::EdgeLine
    }

    fn setup(
        &mut self,
        in_desc: &ImageDesc,
        out_desc: &ImageDesc,
        arena: &mut ScratchArena,
    ) -> Result<(), SensorError> {
        self.state = None;
        check_formats(in_desc, out_desc)?;
        let w = in_desc.width();
        if !(8..=EDGE_MAX_WIDTH).contains(&w) || in_desc.height() < 3 {
            return Err(SensorError::UnsupportedGeometry);
        }

        let cols = w - 2;
        let (token, layout) = arena.partition(&[
            RegionRequest::bytes("window", 3 * w),
            RegionRequest::of::<i32>("gradient", cols),
            RegionRequest::bytes("magnitude", threshold_len(cols)),
            RegionRequest::bytes("strong", threshold_len(cols)),
            RegionRequest::of::<u16>("votes", w),
        ])?;
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
        let [window, gradient, magnitude, strong, votes] =
            arena.regions_mut::<5>(&act.token, &act.layout)?;
        let gradient = cast_region::<i32>(gradient);
        let votes = cast_region::<u16>(votes);

        let desc = &act.in_desc;
        let out_desc = &act.out_desc;
        let (w, h) = (desc.width(), desc.height());
        let cols = w - 2;
        votes.fill(0);

        let load = |dst: &mut [u8], y: usize| {
            let row = input.row(desc, y);
            for (x, d) in dst.iter_mut().enumerate() {
                *d = yuyv_luma(row, x);
            }
        };
        load(&mut window[w..2 * w], 0);
        load(&mut window[2 * w..3 * w], 1);

        let mut edge_pixels = 0usize;
        let mut edge_rows = 0usize;
        let mut sum_y = 0usize;

        for y in 0..h {
            let in_row = input.row(desc, y);
            let out_row = output.row_mut(out_desc, y);
            for x in 0..w {
                put_gray565x(out_row, x, yuyv_luma(in_row, x), 0);
            }
            if y == 0 || y == h - 1 {
                continue;
            }

            window.copy_within(w..3 * w, 0);
            load(&mut window[2 * w..3 * w], y + 1);

            correlate_3x3(window, gradient, cols, w, &SOBEL_X);
            for (m, g) in magnitude.iter_mut().zip(gradient.iter()) {
                *m = (g.unsigned_abs() / 4).min(255) as u8;
            }
            threshold_le2min(magnitude, strong, in_args.edge_threshold);

            let mut row_hits = 0usize;
            for (i, s) in strong[..cols].iter().enumerate() {
                if *s != 0 {
                    let x = i + 1;
                    votes[x] = votes[x].saturating_add(1);
                    row_hits += 1;
                    put_rgb565x(out_row, x, GREEN.0, GREEN.1, GREEN.2);
                }
            }
            if row_hits > 0 {
                edge_rows += 1;
                edge_pixels += row_hits;
                sum_y += y * row_hits;
            }
        }

        let mut result = OutArgs {
            target_mass: percent(edge_rows, h - 2),
            ..OutArgs::default()
        };
        if edge_pixels > 0 {
            let weighted: usize = votes.iter().enumerate().map(|(x, v)| x * *v as usize).sum();
            let cx = weighted / edge_pixels;
            let cy = sum_y / edge_pixels;
            result.target_x = normalize_coord(cx, w);
            result.target_y = normalize_coord(cy, h);
            overlay::vline(&mut output, out_desc, cx, 0, h - 1, YELLOW);
        }
        *out_args = result;
        Ok(())
    }

    fn is_active(&self, arena: &ScratchArena) -> bool {
        holds_arena(&self.state, arena)
    }
}
