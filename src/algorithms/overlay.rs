//! Annotation primitives drawn into RGB565X output frames.

use crate::color::put_rgb565x;
use crate::image::{ImageBufferMut, ImageDesc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const RED: Rgb = Rgb(255, 0, 0);
pub const GREEN: Rgb = Rgb(0, 255, 0);
pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const YELLOW: Rgb = Rgb(255, 255, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

pub fn hline(out: &mut ImageBufferMut<'_>, desc: &ImageDesc, y: usize, x0: usize, x1: usize, c: Rgb) {
    if y >= desc.height() {
        return;
    }
    let x1 = x1.min(desc.width().saturating_sub(1));
    let row = out.row_mut(desc, y);
    for x in x0..=x1 {
        put_rgb565x(row, x, c.0, c.1, c.2);
    }
}

pub fn vline(out: &mut ImageBufferMut<'_>, desc: &ImageDesc, x: usize, y0: usize, y1: usize, c: Rgb) {
    if x >= desc.width() {
        return;
    }
    let y1 = y1.min(desc.height().saturating_sub(1));
    for y in y0..=y1 {
        put_rgb565x(out.row_mut(desc, y), x, c.0, c.1, c.2);
    }
}

/// Crosshair with arms of `arm` pixels, clipped to the frame.
pub fn crosshair(out: &mut ImageBufferMut<'_>, desc: &ImageDesc, x: usize, y: usize, arm: usize, c: Rgb) {
    hline(out, desc, y, x.saturating_sub(arm), x + arm, c);
    vline(out, desc, x, y.saturating_sub(arm), y + arm, c);
}

/// Rectangle outline with inclusive corners.
pub fn rect(out: &mut ImageBufferMut<'_>, desc: &ImageDesc, x0: usize, y0: usize, x1: usize, y1: usize, c: Rgb) {
    hline(out, desc, y0, x0, x1, c);
    hline(out, desc, y1, x0, x1, c);
    vline(out, desc, x0, y0, y1, c);
    vline(out, desc, x1, y0, y1, c);
}
