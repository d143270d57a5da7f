//! Fixed-point colour conversions used by the sensor variants.
//!
//! YUV ↔ RGB follows the integer BT.601 studio-swing formulas. Output
//! pixels are RGB565 stored high byte first (the `X` in `Rgb565X`).

/// Hue in degrees (0..360), saturation and value in percent (0..=100).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hsv {
    pub h: u16,
    pub s: u8,
    pub v: u8,
}

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    let r = clamp_u8((298 * c + 409 * e + 128) >> 8);
    let g = clamp_u8((298 * c - 100 * d - 208 * e + 128) >> 8);
    let b = clamp_u8((298 * c + 516 * d + 128) >> 8);
    (r, g, b)
}

#[inline]
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (clamp_u8(y), clamp_u8(u), clamp_u8(v))
}

pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (ri, gi, bi) = (r as i32, g as i32, b as i32);
    let max = ri.max(gi).max(bi);
    let min = ri.min(gi).min(bi);
    let delta = max - min;

    let v = (max * 100 / 255) as u8;
    let s = if max == 0 { 0 } else { (delta * 100 / max) as u8 };
    let h = if delta == 0 {
        0
    } else if max == ri {
        60 * (gi - bi) / delta
    } else if max == gi {
        120 + 60 * (bi - ri) / delta
    } else {
        240 + 60 * (ri - gi) / delta
    };
    Hsv {
        h: h.rem_euclid(360) as u16,
        s,
        v,
    }
}

/// Hue window test. `from > to` wraps through 0°.
#[inline]
pub fn hue_in_range(h: u16, from: u16, to: u16) -> bool {
    if from <= to {
        h >= from && h <= to
    } else {
        h >= from || h <= to
    }
}

#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

#[inline]
pub fn pack_rgb888(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

// ----------------------------------------------------------------------------
// Row accessors
// ----------------------------------------------------------------------------

/// Luma of pixel `x` in a YUYV row.
#[inline]
pub fn yuyv_luma(row: &[u8], x: usize) -> u8 {
    row[x * 2]
}

/// `(y, u, v)` of pixel `x` in a YUYV row. Chroma is shared per pixel pair.
#[inline]
pub fn yuyv_pixel(row: &[u8], x: usize) -> (u8, u8, u8) {
    let pair = (x & !1) * 2;
    (row[x * 2], row[pair + 1], row[pair + 3])
}

#[inline]
pub fn yuyv_rgb(row: &[u8], x: usize) -> (u8, u8, u8) {
    let (y, u, v) = yuyv_pixel(row, x);
    yuv_to_rgb(y, u, v)
}

#[inline]
pub fn put_rgb565x(row: &mut [u8], x: usize, r: u8, g: u8, b: u8) {
    let [hi, lo] = pack_rgb565(r, g, b).to_be_bytes();
    row[x * 2] = hi;
    row[x * 2 + 1] = lo;
}

/// Gray RGB565X pixel from a luma sample, optionally scaled down by `dim` (0..=8 eighths).
#[inline]
pub fn put_gray565x(row: &mut [u8], x: usize, luma: u8, dim: u8) {
    let l = ((luma as u16 * (8 - dim.min(8)) as u16) / 8) as u8;
    put_rgb565x(row, x, l, l, l);
}

/// Reads back an RGB565X pixel as 8-bit channels (low bits zero).
#[inline]
pub fn get_rgb565x(row: &[u8], x: usize) -> (u8, u8, u8) {
    let v = u16::from_be_bytes([row[x * 2], row[x * 2 + 1]]);
    let r = ((v >> 11) & 0x1f) as u8;
    let g = ((v >> 5) & 0x3f) as u8;
    let b = (v & 0x1f) as u8;
    (r << 3, g << 2, b << 3)
}
