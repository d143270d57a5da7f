//! Object sensor: colour blob tracking by HSV window.
//!
//! Every pixel is classified against the HSV window from `InArgs` (or one
//! derived from the centre of the frame when `auto_detect_hsv` is set).
//! Classified rows go through a three-row rolling mask that is dilated one
//! row behind the classifier, closing single-pixel gaps in the blob. The
//! centroid, share and bounding box of the dilated hits are reported.
//!
//! Border policy: the rolling mask carries a zero column on both sides and
//! zero rows above the first and below the last frame row, so the dilated
//! output covers the full frame.

use crate::arena::{cast_region, RegionRequest, ScratchArena};
use crate::color::{hue_in_range, put_gray565x, put_rgb565x, rgb_to_hsv, yuyv_luma, yuyv_rgb, Hsv};
use crate::error::SensorError;
use crate::image::{ImageBuffer, ImageBufferMut, ImageDesc};
use crate::kernels::{dilate_binary, StructuringElement};

use super::overlay::{self, WHITE, YELLOW};
use super::{
    begin_run, check_formats, holds_arena, normalize_coord, percent, Activation, AlgorithmId,
    InArgs, OutArgs, SensorAlgorithm,
};

pub const OBJECT_MAX_WIDTH: usize = 320;
const HUE_BINS: usize = 36;
/// Pixels below this saturation carry no usable hue.
const MIN_AUTO_SATURATION: u8 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HsvWindow {
    hue_from: u16,
    hue_to: u16,
    sat_from: u8,
    sat_to: u8,
    val_from: u8,
    val_to: u8,
}

impl HsvWindow {
    fn from_args(args: &InArgs) -> Self {
        Self {
            hue_from: args.detect_hue_from,
            hue_to: args.detect_hue_to,
            sat_from: args.detect_sat_from,
            sat_to: args.detect_sat_to,
            val_from: args.detect_val_from,
            val_to: args.detect_val_to,
        }
    }

    #[inline]
    fn contains(&self, hsv: Hsv) -> bool {
        hue_in_range(hsv.h, self.hue_from, self.hue_to)
            && (self.sat_from..=self.sat_to).contains(&hsv.s)
            && (self.val_from..=self.val_to).contains(&hsv.v)
    }
}

pub struct ObjectSensor {
    state: Option<Activation>,
}

impl ObjectSensor {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for ObjectSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive an HSV window from the centre quarter of the frame.
///
/// The hue window is the most populated 10° bin widened by one bin each
/// side; saturation and value take the observed minimum among pixels in
/// that hue window, minus a margin, up to 100.
fn auto_window(input: &ImageBuffer<'_>, desc: &ImageDesc, hist: &mut [u16]) -> HsvWindow {
    let (w, h) = (desc.width(), desc.height());
    let (x0, x1) = (w * 3 / 8, w * 5 / 8);
    let (y0, y1) = (h * 3 / 8, h * 5 / 8);

    hist.fill(0);
    for y in y0..y1 {
        let row = input.row(desc, y);
        for x in x0..x1 {
            let (r, g, b) = yuyv_rgb(row, x);
            let hsv = rgb_to_hsv(r, g, b);
            if hsv.s >= MIN_AUTO_SATURATION {
                let bin = hsv.h as usize / 10;
                hist[bin] = hist[bin].saturating_add(1);
            }
        }
    }

    let (peak, count) = hist
        .iter()
        .enumerate()
        .fold((0usize, 0u16), |best, (i, c)| if *c > best.1 { (i, *c) } else { best });
    if count == 0 {
        // Nothing saturated in view: fall back to a window that matches nothing.
        return HsvWindow {
            hue_from: 0,
            hue_to: 0,
            sat_from: 100,
            sat_to: 100,
            val_from: 100,
            val_to: 100,
        };
    }

    let hue_from = ((peak + HUE_BINS - 1) % HUE_BINS * 10) as u16;
    let hue_to = (((peak + 1) % HUE_BINS) * 10 + 9) as u16;

    let mut sat_min = 100u8;
    let mut val_min = 100u8;
    for y in y0..y1 {
        let row = input.row(desc, y);
        for x in x0..x1 {
            let (r, g, b) = yuyv_rgb(row, x);
            let hsv = rgb_to_hsv(r, g, b);
            if hsv.s >= MIN_AUTO_SATURATION && hue_in_range(hsv.h, hue_from, hue_to) {
                sat_min = sat_min.min(hsv.s);
                val_min = val_min.min(hsv.v);
            }
        }
    }

    HsvWindow {
        hue_from,
        hue_to,
        sat_from: sat_min.saturating_sub(10),
        sat_to: 100,
        val_from: val_min.saturating_sub(10),
        val_to: 100,
    }
}

impl SensorAlgorithm for ObjectSensor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::Object
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
        if !(8..=OBJECT_MAX_WIDTH).contains(&w) || in_desc.height() < 8 {
            return Err(SensorError::UnsupportedGeometry);
        }

        let (token, layout) = arena.partition(&[
            RegionRequest::bytes("mask", 3 * (w + 2)),
            RegionRequest::bytes("dilated", w),
            RegionRequest::of::<u16>("hue_hist", HUE_BINS),
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
        let [mask, dilated, hist] = arena.regions_mut::<3>(&act.token, &act.layout)?;
        let hist = cast_region::<u16>(hist);

        let desc = &act.in_desc;
        let out_desc = &act.out_desc;
        let (w, h) = (desc.width(), desc.height());
        let pad_w = w + 2;

        let window = if in_args.auto_detect_hsv {
            auto_window(&input, desc, hist)
        } else {
            HsvWindow::from_args(in_args)
        };

        mask.fill(0);
        let mut hits = 0usize;
        let mut sum_x = 0usize;
        let mut sum_y = 0usize;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0usize, 0usize);

        // Classify row `y` into the bottom mask slot, then dilate row `y - 1`.
        for y in 0..=h {
            mask.copy_within(pad_w..3 * pad_w, 0);
            let slot = &mut mask[2 * pad_w..3 * pad_w];
            if y < h {
                let row = input.row(desc, y);
                for x in 0..w {
                    let (r, g, b) = yuyv_rgb(row, x);
                    slot[x + 1] = if window.contains(rgb_to_hsv(r, g, b)) { 255 } else { 0 };
                }
            } else {
                slot.fill(0);
            }
            if y == 0 {
                continue;
            }

            let ty = y - 1;
            dilate_binary(mask, dilated, pad_w, 3, &StructuringElement::EIGHT_CONNECTED);

            let in_row = input.row(desc, ty);
            let out_row = output.row_mut(out_desc, ty);
            for (x, d) in dilated.iter().enumerate() {
                if *d != 0 {
                    hits += 1;
                    sum_x += x;
                    sum_y += ty;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(ty);
                    max_y = max_y.max(ty);
                    let (r, g, b) = yuyv_rgb(in_row, x);
                    put_rgb565x(out_row, x, r, g, b);
                } else {
                    put_gray565x(out_row, x, yuyv_luma(in_row, x), 4);
                }
            }
        }

        let mut result = OutArgs {
            target_mass: percent(hits, w * h),
            detected_hue_from: window.hue_from,
            detected_hue_to: window.hue_to,
            detected_sat_from: window.sat_from,
            detected_sat_to: window.sat_to,
            detected_val_from: window.val_from,
            detected_val_to: window.val_to,
            ..OutArgs::default()
        };
        if hits > 0 {
            let cx = sum_x / hits;
            let cy = sum_y / hits;
            result.target_x = normalize_coord(cx, w);
            result.target_y = normalize_coord(cy, h);
            overlay::rect(&mut output, out_desc, min_x, min_y, max_x, max_y, WHITE);
            overlay::crosshair(&mut output, out_desc, cx, cy, 4, YELLOW);
        }
        *out_args = result;
        Ok(())
    }

    fn is_active(&self, arena: &ScratchArena) -> bool {
        holds_arena(&self.state, arena)
    }
}
