use crate::config::TrackColors;
use std::error::Error;

/// Packed 0RGB pixel, the frame buffer's native format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0x00ff_ffff);

    pub fn from_hex(text: &str) -> Result<Self, Box<dyn Error>> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 {
            return Err(format!("expected #rrggbb, got {text:?}").into());
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|e| format!("bad color {text:?}: {e}"))?;
        Ok(Self(value))
    }

    /// Scale each channel toward black. `factor` in [0, 1].
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u32| ((c as f64 * (1.0 - factor)) as u32).min(255);
        let r = scale((self.0 >> 16) & 0xff);
        let g = scale((self.0 >> 8) & 0xff);
        let b = scale(self.0 & 0xff);
        Self((r << 16) | (g << 8) | b)
    }
}

/// Colors for one drawn segment: which member of each banding pair applies
/// is decided by the banding counter before the renderer sees it.
#[derive(Debug, Clone, Copy)]
pub struct SegmentPalette {
    pub grass: Color,
    pub border: Color,
    pub outborder: Color,
    pub road: Color,
    pub lane: Color,
}

/// All track colors resolved from the configuration document. Each pair is
/// [palette A, palette B]; the second grass/outborder variant is derived by
/// darkening since the document only names the base color.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    grass: [Color; 2],
    border: [Color; 2],
    outborder: [Color; 2],
    road: [Color; 2],
    lane: [Color; 2],
    pub lane_arrow: Color,
    pub finish_road: Color,
    pub finish_lane: Color,
    pub finish_outborder: Color,
}

const BAND_DARKEN: f64 = 0.18;

impl ColorScheme {
    pub fn from_doc(doc: &TrackColors) -> Result<Self, Box<dyn Error>> {
        let grass = Color::from_hex(&doc.grass1)?;
        let outborder = Color::from_hex(&doc.outborder1)?;
        let road = Color::from_hex(&doc.track_segment1)?;
        Ok(Self {
            grass: [grass, grass.darken(BAND_DARKEN)],
            border: [Color::from_hex(&doc.border1)?, Color::from_hex(&doc.border2)?],
            outborder: [outborder, outborder.darken(BAND_DARKEN)],
            road: [road, road],
            lane: [Color::from_hex(&doc.lane1)?, Color::from_hex(&doc.lane2)?],
            lane_arrow: Color::from_hex(&doc.lane_arrow1)?,
            finish_road: Color::from_hex(&doc.track_segment_end)?,
            finish_lane: Color::from_hex(&doc.lane_end)?,
            finish_outborder: Color::from_hex(&doc.outborder_end1)?,
        })
    }

    #[inline(always)]
    pub fn palette(&self, band: bool) -> SegmentPalette {
        let i = usize::from(band);
        SegmentPalette {
            grass: self.grass[i],
            border: self.border[i],
            outborder: self.outborder[i],
            road: self.road[i],
            lane: self.lane[i],
        }
    }
}
