//! Deterministic YUYV frame generator standing in for a camera.
//!
//! The scene is a light checkered floor with a dark guide line that sways
//! left and right, and a red block that slides across the upper half. Luma
//! noise comes from a seeded `StdRng`, so two sources built with the same
//! seed produce byte-identical frame sequences.

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::rgb_to_yuv;
use crate::dispatch::FrameGeometry;

const FLOOR_LUMA: u8 = 175;
const CHECKER_STEP: u8 = 16;
const LINE_LUMA: u8 = 25;
const BLOCK_RGB: (u8, u8, u8) = (210, 30, 30);
const NOISE: i16 = 4;
/// Frames per full sway of the guide line.
const SWAY_PERIOD: u64 = 64;

pub struct SyntheticSource {
    geometry: FrameGeometry,
    rng: StdRng,
    frame_count: u64,
    block_yuv: (u8, u8, u8),
}

impl SyntheticSource {
    pub fn new(geometry: FrameGeometry, seed: u64) -> Self {
        Self {
            geometry,
            rng: StdRng::seed_from_u64(seed),
            frame_count: 0,
            block_yuv: rgb_to_yuv(BLOCK_RGB.0, BLOCK_RGB.1, BLOCK_RGB.2),
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn frames_generated(&self) -> u64 {
        self.frame_count
    }

    /// Render the next frame into a caller buffer of `geometry.input_len()` bytes.
    pub fn fill_next(&mut self, frame: &mut [u8]) -> Result<()> {
        let (w, h) = (self.geometry.width, self.geometry.height);
        if w < 2 || w % 2 != 0 || h == 0 {
            return Err(anyhow!("synthetic source needs an even width, got {}x{}", w, h));
        }
        let needed = self.geometry.input_len();
        if frame.len() < needed {
            return Err(anyhow!(
                "frame buffer holds {} bytes, synthetic frame needs {}",
                frame.len(),
                needed
            ));
        }

        let t = self.frame_count;
        self.frame_count += 1;

        // Guide line: triangle-wave sway around the centre column.
        let phase = (t % SWAY_PERIOD) as i64;
        let half = (SWAY_PERIOD / 2) as i64;
        let tri = if phase < half { phase } else { SWAY_PERIOD as i64 - phase };
        let sway = tri - half / 2;
        let line_half = (w / 40).max(2) as i64;
        let line_x = w as i64 / 2 + sway * w as i64 / (4 * half);

        // Block: slides right along the upper half, wrapping at the edge.
        let block_w = (w / 8).max(2);
        let block_h = (h / 6).max(2);
        let travel = w.saturating_sub(block_w).max(1);
        let block_x = (t as usize * 4) % travel;
        let block_y = h / 4;

        for y in 0..h {
            let row = &mut frame[y * w * 2..(y + 1) * w * 2];
            for pair in 0..w / 2 {
                let x0 = pair * 2;
                let in_block =
                    (block_x..block_x + block_w).contains(&x0) && (block_y..block_y + block_h).contains(&y);
                let (u, v) = if in_block {
                    (self.block_yuv.1, self.block_yuv.2)
                } else {
                    (128, 128)
                };
                for dx in 0..2 {
                    let x = x0 + dx;
                    let base = if in_block {
                        self.block_yuv.0
                    } else if (x as i64 - line_x).abs() <= line_half {
                        LINE_LUMA
                    } else if (x / 16 + y / 16) % 2 == 0 {
                        FLOOR_LUMA
                    } else {
                        FLOOR_LUMA + CHECKER_STEP
                    };
                    let noise = self.rng.gen_range(-NOISE..=NOISE);
                    row[x * 2] = (base as i16 + noise).clamp(0, 255) as u8;
                }
                row[x0 * 2 + 1] = u;
                row[x0 * 2 + 3] = v;
            }
        }
        Ok(())
    }

    /// Allocate and render the next frame.
    pub fn next_frame(&mut self) -> Result<Vec<u8>> {
        let mut frame = vec![0u8; self.geometry.input_len()];
        self.fill_next(&mut frame)?;
        Ok(frame)
    }
}
