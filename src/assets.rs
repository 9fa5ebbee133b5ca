use crate::game::vehicle::Facing;
use image::RgbaImage;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::sync::Mutex;

// --- Sprite atlas document ---
//
// { "frames": [ { "filename": "tree.png", "frame": { "x": .., "y": .., "w": .., "h": .. } } ] }
// Sprite identity is the filename stem.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDoc {
    pub frames: Vec<FrameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEntry {
    pub filename: String,
    pub frame: SpriteRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Name -> rectangle mapping, resolved once at load time.
#[derive(Debug, Default)]
pub struct SpriteAtlas {
    rects: FxHashMap<String, SpriteRect>,
    missing: Mutex<FxHashSet<String>>,
}

impl SpriteAtlas {
    pub fn from_doc(doc: &AtlasDoc) -> Self {
        let mut rects = FxHashMap::default();
        for entry in &doc.frames {
            let stem = entry
                .filename
                .rsplit_once('.')
                .map_or(entry.filename.as_str(), |(stem, _)| stem);
            rects.insert(stem.to_string(), entry.frame);
        }
        Self {
            rects,
            missing: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<SpriteRect> {
        self.rects.get(name).copied()
    }

    /// Lookup that records a one-shot diagnostic for unknown names; the
    /// caller renders nothing, which is the intended degradation.
    pub fn lookup(&self, name: &str) -> Option<SpriteRect> {
        let rect = self.get(name);
        if rect.is_none()
            && let Ok(mut missing) = self.missing.lock()
            && missing.insert(name.to_string())
        {
            warn!("sprite {name:?} not present in the atlas; drawing nothing");
        }
        rect
    }

    /// Ordered fallback chain: the first candidate present in the atlas
    /// wins. Candidates are plain strings built ahead of time, not patterns
    /// matched at runtime.
    pub fn resolve<I, S>(&self, candidates: I) -> Option<(String, SpriteRect)>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for candidate in candidates {
            let name = candidate.into();
            if let Some(rect) = self.get(&name) {
                return Some((name, rect));
            }
        }
        None
    }

    fn bounds_check(&self, image: &RgbaImage) -> Result<(), Box<dyn Error>> {
        for (name, rect) in &self.rects {
            if rect.x + rect.w > image.width() || rect.y + rect.h > image.height() {
                return Err(format!("atlas frame {name:?} exceeds the sheet bounds").into());
            }
        }
        Ok(())
    }
}

#[inline(always)]
const fn facing_suffix(facing: Facing) -> &'static str {
    match facing {
        Facing::Front => "front",
        Facing::Left => "left",
        Facing::Right => "right",
    }
}

/// Candidate keys for the controllable vehicle's billboard, most specific
/// first: indexed realistic skin, realistic skin, generic car, then the
/// vehicle-type default.
pub fn vehicle_sprite_candidates(kind: &str, index: u32, facing: Facing) -> [String; 4] {
    let side = facing_suffix(facing);
    [
        format!("car{index:02}_{side}_realistic"),
        format!("car_{side}_realistic"),
        format!("car_{side}"),
        format!("{kind}_{side}"),
    ]
}

/// Everything the renderer needs once loading has finished: the parsed
/// atlas and its backing image.
pub struct LoadedAssets {
    pub atlas: SpriteAtlas,
    pub image: RgbaImage,
}

impl LoadedAssets {
    pub fn vehicle_sprite(&self, kind: &str, index: u32, facing: Facing) -> Option<SpriteRect> {
        self.atlas
            .resolve(vehicle_sprite_candidates(kind, index, facing))
            .map(|(_, rect)| rect)
    }
}

pub fn load_atlas<P: AsRef<Path>>(
    doc_path: P,
    image_path: P,
) -> Result<LoadedAssets, Box<dyn Error>> {
    let text = std::fs::read_to_string(doc_path.as_ref())?;
    let doc: AtlasDoc = serde_json::from_str(&text)?;
    if doc.frames.is_empty() {
        return Err("sprite atlas lists no frames".into());
    }
    let image = image::ImageReader::open(image_path.as_ref())?
        .decode()?
        .to_rgba8();
    let atlas = SpriteAtlas::from_doc(&doc);
    atlas.bounds_check(&image)?;
    Ok(LoadedAssets { atlas, image })
}
