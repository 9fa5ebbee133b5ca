use crate::assets::LoadedAssets;
use crate::core::gfx::Frame;
use crate::game::colors::{Color, ColorScheme};
use crate::game::control::Direction;
use crate::game::projection::{FrameGeometry, QuadParams, ROAD_RELATIVE_HALF_WIDTH, SpriteAnchor};
use crate::game::track::Track;
use smallvec::SmallVec;

// Horizontal delta ranges, in units of the projected half road width.
const OUTBORDER_RANGE: (f64, f64) = (1.1, 1.3);
const BORDER_RANGE: (f64, f64) = (1.0, 1.1);
// Divider positions for the fixed two-stripe layout used up to three lanes.
const LANE_FIXED: f64 = 1.0 / 3.0;
// Stripe count across the start/finish segment.
const FINISH_BANDS: u32 = 8;

#[derive(Debug, Clone, Copy)]
pub struct LaneSettings {
    pub num_lanes: u32,
    /// Stripe half-thickness in half-road units.
    pub lane_width: f64,
}

/// Billboard compositing buffer. Pushed far-side-last during the segment
/// walk and popped afterwards, so LIFO order is back-to-front by
/// construction and no sort is needed.
#[derive(Debug, Default)]
pub struct SpriteBuffer {
    stack: SmallVec<[SpriteAnchor; 64]>,
}

impl SpriteBuffer {
    pub fn push(&mut self, anchor: SpriteAnchor) {
        self.stack.push(anchor);
    }

    pub fn pop(&mut self) -> Option<SpriteAnchor> {
        self.stack.pop()
    }
}

/// One trapezoid portion of a segment quad. `lo`/`hi` pick the horizontal
/// delta range; the same two scale/offset pairs serve every portion.
fn portion(frame: &mut Frame, quad: &QuadParams, road_half: f64, lo: f64, hi: f64, color: Color) {
    let center = (lo + hi) * 0.5;
    let half = (hi - lo) * 0.5;
    let near_half = quad.scale1 * road_half;
    let far_half = quad.scale2 * road_half;
    frame.fill_trapezoid(
        quad.y2,
        quad.y1,
        quad.offset2 + center * far_half,
        half * far_half,
        quad.offset1 + center * near_half,
        half * near_half,
        color,
    );
}

fn draw_lanes(
    frame: &mut Frame,
    quad: &QuadParams,
    road_half: f64,
    lanes: &LaneSettings,
    color: Color,
) {
    let lw = lanes.lane_width;
    if lanes.num_lanes <= 3 {
        for center in [-LANE_FIXED, LANE_FIXED] {
            portion(frame, quad, road_half, center - lw, center + lw, color);
        }
    } else {
        let alpha = 1.10 / lanes.num_lanes as f64;
        for j in 1..lanes.num_lanes {
            let center = 2.0 * alpha * j as f64 - 1.1;
            portion(frame, quad, road_half, center - lw, center + lw, color);
        }
    }
}

fn draw_finish_surface(frame: &mut Frame, quad: &QuadParams, road_half: f64, scheme: &ColorScheme) {
    let band = 2.0 / FINISH_BANDS as f64;
    for i in 0..FINISH_BANDS {
        let lo = -1.0 + band * i as f64;
        let color = if i % 2 == 0 {
            scheme.finish_road
        } else {
            scheme.finish_lane
        };
        portion(frame, quad, road_half, lo, lo + band, color);
    }
}

/// Directional guide triangle at a fixed HUD position, shown while the
/// start/finish segment is in view.
pub fn draw_guide_arrow(frame: &mut Frame, direction: Direction, color: Color) {
    let cx = frame.width() as i32 / 2;
    let cy = frame.height() as i32 / 5;
    match direction {
        Direction::Left => frame.fill_triangle((cx - 10, cy), (cx + 6, cy - 8), (cx + 6, cy + 8), color),
        Direction::Right => frame.fill_triangle((cx + 10, cy), (cx - 6, cy - 8), (cx - 6, cy + 8), color),
        Direction::Straight => frame.fill_triangle((cx, cy - 10), (cx - 8, cy + 6), (cx + 8, cy + 6), color),
    }
}

/// Draws every visible segment front to back: full-width grass between the
/// projected y-levels, then the road portions from the same quad.
pub fn render_segments(
    frame: &mut Frame,
    geometry: &FrameGeometry,
    scheme: &ColorScheme,
    lanes: &LaneSettings,
    sprites: &mut SpriteBuffer,
) {
    let road_half = frame.width() as f64 * ROAD_RELATIVE_HALF_WIDTH;
    for seg in &geometry.segments {
        let palette = scheme.palette(seg.band);
        let quad = &seg.quad;

        frame.fill_rect(0, quad.y2, frame.width() as i32, quad.y1, palette.grass);

        let outborder = if seg.finish {
            scheme.finish_outborder
        } else {
            palette.outborder
        };
        portion(frame, quad, road_half, -OUTBORDER_RANGE.1, -OUTBORDER_RANGE.0, outborder);
        portion(frame, quad, road_half, OUTBORDER_RANGE.0, OUTBORDER_RANGE.1, outborder);
        portion(frame, quad, road_half, -BORDER_RANGE.1, -BORDER_RANGE.0, palette.border);
        portion(frame, quad, road_half, BORDER_RANGE.0, BORDER_RANGE.1, palette.border);

        if seg.finish {
            draw_finish_surface(frame, quad, road_half, scheme);
        } else {
            portion(frame, quad, road_half, -1.0, 1.0, palette.road);
            draw_lanes(frame, quad, road_half, lanes, palette.lane);
        }
    }

    for anchor in &geometry.sprites {
        sprites.push(*anchor);
    }
}

/// Pops and draws the buffered billboards; LIFO pop yields farthest first.
pub fn render_sprites(
    frame: &mut Frame,
    sprites: &mut SpriteBuffer,
    track: &Track,
    assets: &LoadedAssets,
) {
    while let Some(anchor) = sprites.pop() {
        let Some(sprite) = &track.segment(anchor.segment as isize).sprite else {
            continue;
        };
        let Some(rect) = assets.atlas.lookup(&sprite.name) else {
            continue;
        };
        let dst_w = (rect.w as f64 * anchor.scale) as i32;
        let dst_h = (rect.h as f64 * anchor.scale) as i32;
        frame.blit_scaled(
            &assets.image,
            (rect.x, rect.y, rect.w, rect.h),
            anchor.x,
            anchor.y,
            dst_w,
            dst_h,
            anchor.ymax,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(segment: usize) -> SpriteAnchor {
        SpriteAnchor {
            segment,
            x: 0,
            y: 0,
            scale: 1.0,
            ymax: 0,
        }
    }

    #[test]
    fn buffer_pops_in_reverse_push_order() {
        // S1 far, S2 near, pushed in that order: draw order must be S2, S1.
        let mut buffer = SpriteBuffer::default();
        buffer.push(anchor(1));
        buffer.push(anchor(2));
        assert_eq!(buffer.pop().map(|a| a.segment), Some(2));
        assert_eq!(buffer.pop().map(|a| a.segment), Some(1));
        assert!(buffer.pop().is_none());
    }

    #[test]
    fn lane_divider_positions() {
        // Up to three lanes: two fixed stripes. Beyond: numLanes spacing
        // from alpha = 1.10 / numLanes, symmetric around the centerline.
        let alpha = 1.10 / 4.0;
        let centers: Vec<f64> = (1..4).map(|j| 2.0 * alpha * j as f64 - 1.1).collect();
        assert!((centers[0] + 0.55).abs() < 1e-9);
        assert!(centers[1].abs() < 1e-9);
        assert!((centers[2] - 0.55).abs() < 1e-9);
    }
}
