use crate::config::RenderSettings;
use crate::game::track::Track;

// Projection scale constant k is the camera distance itself, so scale is 1.0
// at the camera plane and road geometry maps through one relative width.
pub const ROAD_RELATIVE_HALF_WIDTH: f64 = 0.5;

// Segments closer than this to the eye are skipped instead of dividing by a
// vanishing depth.
const MIN_PROJECTION_DEPTH: f64 = 1.0;

// The walk starts two segments behind the vehicle so the near road reaches
// below the bottom edge of the frame.
const SEGMENTS_BEHIND: isize = 2;

/// Screen-space description of one road segment, the renderer's only input:
/// two projected y-levels with their scale and horizontal center.
#[derive(Debug, Clone, Copy)]
pub struct QuadParams {
    /// Near edge, the larger y (screen y grows downward).
    pub y1: i32,
    /// Far edge.
    pub y2: i32,
    pub scale1: f64,
    pub scale2: f64,
    pub offset1: f64,
    pub offset2: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectedSegment {
    pub index: usize,
    pub band: bool,
    pub finish: bool,
    pub quad: QuadParams,
}

/// Billboard anchor for a segment sprite: bottom-center screen position, the
/// scale at its depth, and the clip row established by nearer road already
/// drawn (sprites must not bleed below it).
#[derive(Debug, Clone, Copy)]
pub struct SpriteAnchor {
    pub segment: usize,
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub ymax: i32,
}

#[derive(Debug, Clone)]
pub struct FrameGeometry {
    pub segments: Vec<ProjectedSegment>,
    /// Push order is near to far; the renderer pops for back-to-front draw.
    pub sprites: Vec<SpriteAnchor>,
    pub last_delta: f64,
    pub finish_visible: bool,
}

#[inline(always)]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Banding parity: the counter cycles modulo `2 * per_color`, selecting
/// palette A for the first half of each cycle and B for the second.
#[inline(always)]
pub fn band_parity(index: usize, per_color: u32) -> bool {
    let k = per_color.max(1) as usize;
    index % (2 * k) >= k
}

/// Baseline horizontal offset at a longitudinal position: the curve of the
/// vehicle's segment blended toward the next by the fractional position.
pub fn base_offset_at(track: &Track, segment_size: f64, position: f64) -> f64 {
    let exact = position / segment_size;
    let base = exact.floor() as isize;
    let frac = exact - exact.floor();
    lerp(
        track.segment(base).curve,
        track.segment(base + 1).curve,
        frac,
    )
}

/// The vehicle's deviation from the ideal line, fed to the off-track rule.
pub fn last_delta(track: &Track, segment_size: f64, position: f64, posx: f64) -> f64 {
    posx - 2.0 * base_offset_at(track, segment_size, position)
}

#[inline(always)]
fn project_point(
    player_height: f64,
    segment_height: f64,
    distance: f64,
    rc: &RenderSettings,
) -> (i32, f64) {
    let depth = (rc.camera_distance + distance).max(MIN_PROJECTION_DEPTH);
    let projected = ((player_height - segment_height) * rc.camera_distance / depth).floor();
    let y = rc.height as i32 / 2 + projected as i32;
    (y, rc.camera_distance / depth)
}

/// Walks `depth_of_field` segments starting two behind the vehicle and emits
/// the visible quads front to back, raising the clip row as it goes. Sprite
/// anchors are recorded with the clip row seen before their segment drew.
pub fn project_frame(
    track: &Track,
    rc: &RenderSettings,
    segment_size: f64,
    per_color: u32,
    position: f64,
    posx: f64,
) -> FrameGeometry {
    let exact = position / segment_size;
    let base = exact.floor() as isize;
    let frac = exact - exact.floor();

    let near_height = track.segment(base).height;
    let far_height = track.segment(base + 1).height;
    let player_height = rc.camera_height + lerp(near_height, far_height, frac);
    let base_offset = lerp(track.segment(base).curve, track.segment(base + 1).curve, frac);

    let half_w = rc.width as f64 * 0.5;
    let mut segments = Vec::with_capacity(rc.depth_of_field);
    let mut sprites = Vec::new();
    let mut finish_visible = false;

    // Clip row: the highest (smallest-y) road row drawn so far.
    let mut current_height = rc.height as i32;
    // Curvature accumulators, world units.
    let mut x = 0.0_f64;
    let mut dx = -(track.segment(base).curve * frac);
    // Distance of the current segment's near edge from the camera plane.
    let mut dist = -((SEGMENTS_BEHIND as f64 + frac) * segment_size);

    for i in 0..rc.depth_of_field {
        let walk = base - SEGMENTS_BEHIND + i as isize;
        let index = track.wrap(walk);
        let near = track.segment(walk);
        let far = track.segment(walk + 1);

        let d1 = dist;
        let d2 = dist + segment_size;
        let x1 = x;
        let x2 = x + dx;

        dist = d2;
        x = x2;
        dx += near.curve;

        if rc.camera_distance + d2 < MIN_PROJECTION_DEPTH {
            continue;
        }

        let (y1, scale1) = project_point(player_height, near.height, d1, rc);
        let (y2, scale2) = project_point(player_height, far.height, d2, rc);

        let offset1 = half_w + (x1 - posx) * scale1;
        let offset2 = half_w + (x2 - posx) * scale2;

        if let Some(sprite) = &near.sprite {
            let d = d1 + sprite.pos * segment_size;
            if rc.camera_distance + d >= MIN_PROJECTION_DEPTH {
                let height = lerp(near.height, far.height, sprite.pos);
                let (y, scale) = project_point(player_height, height, d, rc);
                let cx = lerp(offset1, offset2, sprite.pos);
                sprites.push(SpriteAnchor {
                    segment: index,
                    x: cx as i32,
                    y,
                    scale,
                    ymax: current_height,
                });
            }
        }

        // Back-face culling: only rows above everything drawn so far.
        if current_height <= y2 {
            continue;
        }

        let finish = track.is_finish(index, rc.depth_of_field);
        finish_visible |= finish;
        segments.push(ProjectedSegment {
            index,
            band: band_parity(index, per_color),
            finish,
            quad: QuadParams {
                y1: y1.min(current_height),
                y2,
                scale1,
                scale2,
                offset1,
                offset2,
            },
        });
        current_height = y2;
    }

    FrameGeometry {
        segments,
        sprites,
        last_delta: posx - 2.0 * base_offset,
        finish_visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentDef;

    fn rc() -> RenderSettings {
        RenderSettings {
            width: 320,
            height: 240,
            depth_of_field: 20,
            camera_distance: 30.0,
            camera_height: 100.0,
        }
    }

    fn flat_track(len: usize) -> Track {
        let defs: Vec<SegmentDef> = (0..len)
            .map(|_| SegmentDef {
                height: 0.0,
                curve: 0.0,
                sprite: None,
            })
            .collect();
        Track::from_defs(&defs)
    }

    #[test]
    fn band_parity_repeats_every_two_k_segments() {
        let k = 4;
        for i in 0..64 {
            assert_eq!(band_parity(i, k), band_parity(i + 2 * k as usize, k));
        }
        // First k segments take palette A, the next k palette B.
        assert!(!band_parity(0, k));
        assert!(!band_parity(3, k));
        assert!(band_parity(4, k));
        assert!(band_parity(7, k));
        assert!(!band_parity(8, k));
    }

    #[test]
    fn base_offset_interpolates_within_the_segment() {
        let defs = vec![
            SegmentDef { height: 0.0, curve: 2.0, sprite: None },
            SegmentDef { height: 0.0, curve: 6.0, sprite: None },
            SegmentDef { height: 0.0, curve: 0.0, sprite: None },
            SegmentDef { height: 0.0, curve: 0.0, sprite: None },
        ];
        let track = Track::from_defs(&defs);
        assert_eq!(base_offset_at(&track, 5.0, 0.0), 2.0);
        assert_eq!(base_offset_at(&track, 5.0, 2.5), 4.0);
        // lastDelta = posx - 2 * baseOffset
        assert_eq!(last_delta(&track, 5.0, 2.5, 10.0), 2.0);
    }

    #[test]
    fn flat_track_emits_monotonically_rising_quads() {
        let track = flat_track(100);
        let geometry = project_frame(&track, &rc(), 5.0, 4, 50.0, 0.0);
        assert!(!geometry.segments.is_empty());
        assert!(geometry.segments.len() <= rc().depth_of_field);
        let mut clip = rc().height as i32;
        for seg in &geometry.segments {
            assert!(seg.quad.y2 < seg.quad.y1, "quad must have positive height");
            assert!(seg.quad.y2 < clip, "culling must only emit rows above the clip");
            clip = seg.quad.y2;
        }
    }

    #[test]
    fn hills_occlude_the_road_behind_them() {
        let mut defs: Vec<SegmentDef> = (0..100)
            .map(|_| SegmentDef { height: 0.0, curve: 0.0, sprite: None })
            .collect();
        // A wall right in front of the camera hides everything past it.
        for def in defs.iter_mut().skip(14).take(4) {
            def.height = 90.0;
        }
        let track = Track::from_defs(&defs);
        let flat = project_frame(&flat_track(100), &rc(), 5.0, 4, 50.0, 0.0);
        let hilly = project_frame(&track, &rc(), 5.0, 4, 50.0, 0.0);
        assert!(hilly.segments.len() < flat.segments.len());
    }

    #[test]
    fn sprite_anchor_takes_the_clip_before_its_segment() {
        let mut defs: Vec<SegmentDef> = (0..100)
            .map(|_| SegmentDef { height: 0.0, curve: 0.0, sprite: None })
            .collect();
        defs[15].sprite = Some(crate::config::SpriteDef {
            name: "tree".into(),
            pos: 0.0,
            obstacle: false,
        });
        let track = Track::from_defs(&defs);
        let geometry = project_frame(&track, &rc(), 5.0, 4, 50.0, 0.0);
        let anchor = geometry.sprites.first().expect("sprite visible");
        assert_eq!(anchor.segment, 15);
        // Five segments of road drew before it, so the clip sits above the
        // bottom edge already.
        assert!(anchor.ymax < rc().height as i32);
        assert!(anchor.y <= anchor.ymax);
    }

    #[test]
    fn walk_covers_the_configured_window() {
        let track = flat_track(100);
        let geometry = project_frame(&track, &rc(), 5.0, 4, 50.0, 0.0);
        // position 50 / segment 5 = index 10; the walk starts two behind, and
        // the first of the two behind-segments projects below the frame and
        // is culled.
        assert_eq!(geometry.segments.first().map(|s| s.index), Some(9));
    }

    #[test]
    fn finish_flag_surfaces_when_the_line_is_in_view() {
        let track = flat_track(100);
        // Vehicle approaching segment 2 from behind the wrap point.
        let geometry = project_frame(&track, &rc(), 5.0, 4, 0.0, 0.0);
        assert!(geometry.finish_visible);
    }
}
