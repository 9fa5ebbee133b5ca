use crate::config::SegmentDef;

/// One longitudinal slice of the track: elevation, horizontal curvature
/// contribution, and an optional billboard.
#[derive(Debug, Clone)]
pub struct Segment {
    pub height: f64,
    pub curve: f64,
    pub sprite: Option<SegmentSprite>,
}

#[derive(Debug, Clone)]
pub struct SegmentSprite {
    pub name: String,
    pub pos: f64,
    pub obstacle: bool,
}

/// Ordered segment list. The length is the wrap-around modulus for every
/// index lookup, so callers can walk past the end freely.
#[derive(Debug, Clone)]
pub struct Track {
    segments: Vec<Segment>,
}

impl Track {
    pub fn from_defs(defs: &[SegmentDef]) -> Self {
        let segments = defs
            .iter()
            .map(|d| Segment {
                height: d.height,
                curve: d.curve,
                sprite: d.sprite.as_ref().map(|s| SegmentSprite {
                    name: s.name.clone(),
                    pos: s.pos.clamp(0.0, 1.0),
                    obstacle: s.obstacle,
                }),
            })
            .collect();
        Self { segments }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Wrapping index. Negative indices wrap from the end.
    #[inline(always)]
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.segments.len() as isize) as usize
    }

    #[inline(always)]
    pub fn segment(&self, index: isize) -> &Segment {
        &self.segments[self.wrap(index)]
    }

    /// The start/finish line occupies two special indices: segment 2 and the
    /// segment one depth-of-field window before the end of the track.
    #[inline(always)]
    pub fn is_finish(&self, index: usize, depth_of_field: usize) -> bool {
        index == 2 || index == self.segments.len().saturating_sub(depth_of_field)
    }

    /// Segment index of a longitudinal position, before wrapping.
    #[inline(always)]
    pub fn absolute_index(position: f64, segment_size: f64) -> usize {
        (position / segment_size).floor().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_of(len: usize) -> Track {
        let defs: Vec<SegmentDef> = (0..len)
            .map(|i| SegmentDef {
                height: i as f64,
                curve: 0.0,
                sprite: None,
            })
            .collect();
        Track::from_defs(&defs)
    }

    #[test]
    fn wrapping_lookup_is_idempotent_modulo_length() {
        let track = track_of(7);
        for i in 0..30isize {
            let a = track.wrap(i + track.len() as isize);
            let b = track.wrap(i % track.len() as isize);
            assert_eq!(a, b);
            assert_eq!(track.segment(i).height, track.segment(i + 7).height);
        }
    }

    #[test]
    fn negative_indices_wrap_from_the_end() {
        let track = track_of(5);
        assert_eq!(track.wrap(-1), 4);
        assert_eq!(track.wrap(-5), 0);
        assert_eq!(track.wrap(-6), 4);
    }

    #[test]
    fn finish_line_indices() {
        let track = track_of(40);
        assert!(track.is_finish(2, 15));
        assert!(track.is_finish(25, 15));
        assert!(!track.is_finish(3, 15));
        assert!(!track.is_finish(24, 15));
    }

    #[test]
    fn absolute_index_floors_by_segment_size() {
        assert_eq!(Track::absolute_index(0.0, 5.0), 0);
        assert_eq!(Track::absolute_index(4.99, 5.0), 0);
        assert_eq!(Track::absolute_index(5.0, 5.0), 1);
        assert_eq!(Track::absolute_index(127.3, 5.0), 25);
    }
}
