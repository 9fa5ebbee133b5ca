pub mod present;

use crate::game::colors::Color;
use image::RgbaImage;

/// Fixed-size raster target. One frame per simulation instance, sized from
/// the track configuration and scaled for display by the presenter.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.0);
    }

    #[inline(always)]
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color.0;
        }
    }

    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Fills one horizontal span, clamped to the frame.
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 || y as u32 >= self.height {
            return;
        }
        let lo = x0.max(0) as usize;
        let hi = (x1.min(self.width as i32 - 1)) as i32;
        if hi < lo as i32 {
            return;
        }
        let row = y as usize * self.width as usize;
        self.pixels[row + lo..=row + hi as usize].fill(color.0);
    }

    /// Axis-aligned filled rectangle; `y1`/`x1` are exclusive.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        for y in y0.max(0)..y1.min(self.height as i32) {
            self.fill_span(y, x0, x1 - 1, color);
        }
    }

    /// The road-portion primitive: a quad between two horizontal delta
    /// ranges projected at two depths. `y_top < y_bot`; centers and half
    /// widths interpolate linearly over the rows.
    pub fn fill_trapezoid(
        &mut self,
        y_top: i32,
        y_bot: i32,
        center_top: f64,
        half_top: f64,
        center_bot: f64,
        half_bot: f64,
        color: Color,
    ) {
        if y_bot <= y_top {
            return;
        }
        let rows = (y_bot - y_top) as f64;
        for y in y_top.max(0)..y_bot.min(self.height as i32) {
            let t = (y - y_top) as f64 / rows;
            let center = center_top + (center_bot - center_top) * t;
            let half = half_top + (half_bot - half_top) * t;
            self.fill_span(y, (center - half) as i32, (center + half) as i32, color);
        }
    }

    /// Filled triangle via half-space tests over the bounding box. Only used
    /// for the HUD guide arrow, so brute force is fine.
    pub fn fill_triangle(&mut self, p0: (i32, i32), p1: (i32, i32), p2: (i32, i32), color: Color) {
        let min_x = p0.0.min(p1.0).min(p2.0).max(0);
        let max_x = p0.0.max(p1.0).max(p2.0).min(self.width as i32 - 1);
        let min_y = p0.1.min(p1.1).min(p2.1).max(0);
        let max_y = p0.1.max(p1.1).max(p2.1).min(self.height as i32 - 1);

        let edge = |a: (i32, i32), b: (i32, i32), x: i32, y: i32| -> i64 {
            (b.0 - a.0) as i64 * (y - a.1) as i64 - (b.1 - a.1) as i64 * (x - a.0) as i64
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let e0 = edge(p0, p1, x, y);
                let e1 = edge(p1, p2, x, y);
                let e2 = edge(p2, p0, x, y);
                if (e0 >= 0 && e1 >= 0 && e2 >= 0) || (e0 <= 0 && e1 <= 0 && e2 <= 0) {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Nearest-neighbor billboard blit from an RGBA atlas. The destination
    /// is anchored at bottom-center, alpha-tested, and clamped so no row at
    /// or below `y_max` is touched (road drawn nearer already owns those).
    #[allow(clippy::too_many_arguments)]
    pub fn blit_scaled(
        &mut self,
        atlas: &RgbaImage,
        src: (u32, u32, u32, u32),
        anchor_x: i32,
        bottom_y: i32,
        dst_w: i32,
        dst_h: i32,
        y_max: i32,
    ) {
        let (sx, sy, sw, sh) = src;
        if dst_w <= 0 || dst_h <= 0 || sw == 0 || sh == 0 {
            return;
        }
        let x0 = anchor_x - dst_w / 2;
        let y0 = bottom_y - dst_h;
        let y_end = (y0 + dst_h).min(y_max).min(self.height as i32);

        for y in y0.max(0)..y_end {
            let v = (y - y0) as u32 * sh / dst_h as u32;
            for x in x0.max(0)..(x0 + dst_w).min(self.width as i32) {
                let u = (x - x0) as u32 * sw / dst_w as u32;
                let px = atlas.get_pixel(sx + u, sy + v).0;
                if px[3] >= 128 {
                    let packed = ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32;
                    self.put(x, y, Color(packed));
                }
            }
        }
    }
}
