//! Line sensor: dark guide line on a light floor.
//!
//! Only the lower third of the frame (the band) is evaluated. Band rows are
//! inverted so the line is bright, smoothed with a 5×5 binomial kernel over
//! a rolling five-row window and thresholded. Surviving samples vote into a
//! per-column histogram whose weighted centre is the line position. A band
//! row covered across most of the frame width reports a crossing.
//!
//! Border policy: the two outermost columns on each side and the first and
//! last two band rows have no full 5×5 window and are never classified.

use crate::arena::{cast_region, RegionRequest, ScratchArena};
use crate::color::{put_gray565x, put_rgb565x, yuyv_luma};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc};
use crate::kernels::{convolve_5x5, threshold_le2min, threshold_len, BINOMIAL_5X5};

use super::overlay::{self, BLUE, RED, YELLOW};
use super::{
    begin_run, check_formats, holds_arena, normalize_coord, percent, Activation, AlgorithmId,
    InArgs, OutArgs, SensorAlgorithm,
};

pub const LINE_MAX_WIDTH: usize = 320;
/// A band row this much covered (percent of evaluated width) is a crossing.
pub const CROSS_COVERAGE: usize = 70;

const SMOOTH_SHIFT: u32 = 8;

/// First frame row of the evaluated band.
fn band_start(height: usize) -> usize {
    height - height / 3
}

pub struct LineSensor {
    state: Option<Activation>,
}

impl LineSensor {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for LineSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorAlgorithm for LineSensor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Line
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
        // The band needs at least five rows for one full window.
        if !(16..=LINE_MAX_WIDTH).contains(&w) || in_desc.height() < 15 {
            return Err(SensorError::UnsupportedGeometry);
        }

        let cols = w - 4;
        let (token, layout) = arena.partition(&[
            RegionRequest::bytes("window", 5 * w),
            RegionRequest::bytes("smooth", threshold_len(cols)),
            RegionRequest::bytes("line", threshold_len(cols)),
            RegionRequest::of::<u16>("columns", w),
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
        let [window, smooth, line, columns] = arena.regions_mut::<4>(&act.token, &act.layout)?;
        let columns = cast_region::<u16>(columns);

        let desc = &act.in_desc;
        let out_desc = &act.out_desc;
        let (w, h) = (desc.width(), desc.height());
        let cols = w - 4;
        let band_y0 = band_start(h);
        columns.fill(0);

        let mut line_pixels = 0usize;
        let mut sum_y = 0usize;
        let mut rows_evaluated = 0usize;
        let mut cross = false;

        for y in 0..h {
            let in_row = input.row(desc, y);
            let out_row = output.row_mut(out_desc, y);
            for x in 0..w {
                put_gray565x(out_row, x, yuyv_luma(in_row, x), 0);
            }
            if y < band_y0 {
                continue;
            }

            window.copy_within(w..5 * w, 0);
            for (x, d) in window[4 * w..5 * w].iter_mut().enumerate() {
                *d = 255 - yuyv_luma(in_row, x);
            }
            if y < band_y0 + 4 {
                continue;
            }

            // The window now holds rows y-4..=y; classify its centre row.
            let cy = y - 2;
            convolve_5x5(window, smooth, cols, w, &BINOMIAL_5X5, SMOOTH_SHIFT);
            threshold_le2min(smooth, line, in_args.line_threshold);
            rows_evaluated += 1;

            let centre_row = output.row_mut(out_desc, cy);
            let mut row_hits = 0usize;
            for (i, s) in line[..cols].iter().enumerate() {
                if *s != 0 {
                    let x = i + 2;
                    columns[x] = columns[x].saturating_add(1);
                    row_hits += 1;
                    put_rgb565x(centre_row, x, BLUE.0, BLUE.1, BLUE.2);
                }
            }
            if row_hits * 100 >= cols * CROSS_COVERAGE {
                cross = true;
            }
            line_pixels += row_hits;
            sum_y += cy * row_hits;
        }

        overlay::hline(&mut output, out_desc, band_y0, 0, w - 1, RED);

        let mut result = OutArgs {
            target_mass: percent(line_pixels, rows_evaluated * cols),
            cross_detected: cross,
            ..OutArgs::default()
        };
        if line_pixels > 0 {
            let weighted: usize = columns.iter().enumerate().map(|(x, c)| x * *c as usize).sum();
            let cx = weighted / line_pixels;
            result.target_x = normalize_coord(cx, w);
            result.target_y = normalize_coord(sum_y / line_pixels, h);
            overlay::vline(&mut output, out_desc, cx, band_y0, h - 1, YELLOW);
        }
        *out_args = result;

        log::debug!(
            "line: x {} mass {} cross {}",
            out_args.target_x,
            out_args.target_mass,
            out_args.cross_detected
        );
        Ok(())
    }

    fn is_active(&self, arena: &ScratchArena) -> bool {
        holds_arena(&self.state, arena)
    }
}
