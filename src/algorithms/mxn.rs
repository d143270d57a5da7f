//! MxN sensor: average colour per cell of a coarse grid.
//!
//! Pixel `x` belongs to grid column `x * cols / width` (rows likewise), so
//! cell sizes differ by at most one pixel when the frame does not divide
//! evenly.

use crate::arena::{cast_region, RegionRequest, ScratchArena};
use crate::color::{pack_rgb888, put_rgb565x, yuyv_rgb};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc};

use super::overlay::{self, WHITE};
use super::{
    begin_run, check_formats, holds_arena, Activation, AlgorithmId, InArgs, OutArgs,
    SensorAlgorithm, MXN_MAX_CELLS,
};

pub struct MxnSensor {
    state: Option<Activation>,
}

impl MxnSensor {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for MxnSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// First pixel of cell `k` when `extent` pixels are split into `n` cells.
#[inline]
fn cell_start(k: usize, extent: usize, n: usize) -> usize {
    (k * extent + n - 1) / n
}

impl SensorAlgorithm for MxnSensor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Mxn
    }

    fn setup(
        &mut self,
        in_desc: &ImageDesc,
        out_desc: &ImageDesc,
        arena: &mut ScratchArena,
    ) -> Result<(), SensorError> {
        self.state = None;
        check_formats(in_desc, out_desc)?;
        if in_desc.width() < 8 || in_desc.height() < 8 {
            return Err(SensorError::UnsupportedGeometry);
        }

        let (token, layout) = arena.partition(&[
            RegionRequest::of::<u64>("sums", MXN_MAX_CELLS * 3),
            RegionRequest::of::<u64>("counts", MXN_MAX_CELLS),
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
        let [sums, counts] = arena.regions_mut::<2>(&act.token, &act.layout)?;
        // 64-bit so a single cell can cover any addressable frame.
        let sums = cast_region::<u64>(sums);
        let counts = cast_region::<u64>(counts);

        let desc = &act.in_desc;
        let out_desc = &act.out_desc;
        let (w, h) = (desc.width(), desc.height());
        let (cols, rows) = (in_args.mxn_cols as usize, in_args.mxn_rows as usize);
        sums.fill(0);
        counts.fill(0);

        for y in 0..h {
            let row = input.row(desc, y);
            let cy = y * rows / h;
            for x in 0..w {
                let cell = cy * cols + x * cols / w;
                let (r, g, b) = yuyv_rgb(row, x);
                sums[cell * 3] += u64::from(r);
                sums[cell * 3 + 1] += u64::from(g);
                sums[cell * 3 + 2] += u64::from(b);
                counts[cell] += 1;
            }
        }

        let mut result = OutArgs::default();
        for (cell, colour) in result.mxn_colors[..cols * rows].iter_mut().enumerate() {
            let n = counts[cell].max(1);
            let avg = |c: usize| (sums[cell * 3 + c] / n) as u8;
            *colour = pack_rgb888(avg(0), avg(1), avg(2));
        }

        for y in 0..h {
            let cy = y * rows / h;
            let out_row = output.row_mut(out_desc, y);
            for x in 0..w {
                let [_, r, g, b] = result.mxn_colors[cy * cols + x * cols / w].to_be_bytes();
                put_rgb565x(out_row, x, r, g, b);
            }
        }
        for k in 1..cols {
            overlay::vline(&mut output, out_desc, cell_start(k, w, cols), 0, h - 1, WHITE);
        }
        for k in 1..rows {
            overlay::hline(&mut output, out_desc, cell_start(k, h, rows), 0, w - 1, WHITE);
        }

        *out_args = result;
        Ok(())
    }

    fn is_active(&self, arena: &ScratchArena) -> bool {
        holds_arena(&self.state, arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{get_rgb565x, rgb_to_yuv};
    use crate::image::VideoFormat;

    const W: usize = 32;
    const H: usize = 16;

    fn setup() -> (MxnSensor, ScratchArena) {
        let i = ImageDesc::packed(W, H, VideoFormat::Yuv422).unwrap();
        let o = ImageDesc::packed(W, H, VideoFormat::Rgb565X).unwrap();
        let mut arena = ScratchArena::new();
        let mut sensor = MxnSensor::new();
        sensor.setup(&i, &o, &mut arena).unwrap();
        (sensor, arena)
    }

    /// Left half `left`, right half `right`.
    fn split_frame(left: (u8, u8, u8), right: (u8, u8, u8)) -> Vec<u8> {
        let mut f = vec![0u8; W * H * 2];
        for y in 0..H {
            for pair in 0..W / 2 {
                let x = pair * 2;
                let c = if x < W / 2 { left } else { right };
                let (yy, u, v) = rgb_to_yuv(c.0, c.1, c.2);
                let o = (y * W + x) * 2;
                f[o..o + 4].copy_from_slice(&[yy, u, yy, v]);
            }
        }
        f
    }

    fn channels(c: u32) -> (u8, u8, u8) {
        let [_, r, g, b] = c.to_be_bytes();
        (r, g, b)
    }

    #[test]
    fn two_cells_report_their_colours() {
        let (mut sensor, mut arena) = setup();
        let input = split_frame((200, 30, 30), (30, 30, 200));
        let mut out = vec![0u8; W * H * 2];
        let mut result = OutArgs::default();
        let args = InArgs {
            mxn_cols: 2,
            mxn_rows: 1,
            ..InArgs::default()
        };
        sensor
            .run(
                ImageBuffer::new(&input),
                ImageBufferMut::new(&mut out),
                &mut arena,
                &args,
                &mut result,
            )
            .unwrap();

        let (r, _, b) = channels(result.mxn_colors[0]);
        assert!(r > 150 && b < 80);
        let (r, _, b) = channels(result.mxn_colors[1]);
        assert!(b > 150 && r < 80);
        assert!(result.mxn_colors[2..].iter().all(|c| *c == 0));

        // Cell interiors are filled, the boundary column is a grid line.
        let (r, _, _) = get_rgb565x(&out[(4 * W) * 2..], 4);
        assert!(r > 150);
        assert_eq!(get_rgb565x(&out[(4 * W) * 2..], W / 2), (248, 252, 248));
    }

    #[test]
    fn grid_larger_than_limit_is_rejected_before_output() {
        let (mut sensor, mut arena) = setup();
        let input = vec![0u8; W * H * 2];
        let mut out = vec![7u8; W * H * 2];
        let mut result = OutArgs::default();
        let args = InArgs {
            mxn_cols: 9,
            ..InArgs::default()
        };
        let err = sensor
            .run(
                ImageBuffer::new(&input),
                ImageBufferMut::new(&mut out),
                &mut arena,
                &args,
                &mut result,
            )
            .unwrap_err();
        assert!(matches!(err, SensorError::InvalidArgument(_)));
        assert!(out.iter().all(|b| *b == 7));
    }

    #[test]
    fn single_cell_sums_do_not_wrap_on_large_frames() {
        // 4608 x 4096 white pixels: 255 * 18.9M overflows a 32-bit sum.
        let (w, h) = (4608, 4096);
        let i = ImageDesc::packed(w, h, VideoFormat::Yuv422).unwrap();
        let o = ImageDesc::packed(w, h, VideoFormat::Rgb565X).unwrap();
        let mut arena = ScratchArena::new();
        let mut sensor = MxnSensor::new();
        sensor.setup(&i, &o, &mut arena).unwrap();

        let input = [255u8, 128].repeat(w * h);
        let mut out = vec![0u8; w * h * 2];
        let mut result = OutArgs::default();
        let args = InArgs {
            mxn_cols: 1,
            mxn_rows: 1,
            ..InArgs::default()
        };
        sensor
            .run(
                ImageBuffer::new(&input),
                ImageBufferMut::new(&mut out),
                &mut arena,
                &args,
                &mut result,
            )
            .unwrap();

        let (r, g, b) = channels(result.mxn_colors[0]);
        assert!(r >= 250 && g >= 250 && b >= 250, "got {r} {g} {b}");
    }

    #[test]
    fn uneven_split_assigns_every_pixel() {
        assert_eq!(cell_start(1, 32, 3), 11);
        assert_eq!(cell_start(2, 32, 3), 22);
        // Pixel 10 is the last of cell 0, 11 the first of cell 1.
        assert_eq!(10 * 3 / 32, 0);
        assert_eq!(11 * 3 / 32, 1);
    }
}
