use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

pub const DEFAULT_TRACK_PATH: &str = "assets/track.json";
pub const DEFAULT_ATLAS_PATH: &str = "assets/sprites.json";
pub const DEFAULT_ATLAS_IMAGE_PATH: &str = "assets/sprites.png";

// --- Track configuration document ---
//
// Field names mirror the external JSON document verbatim; serde renames cover
// the places where Rust naming differs. Numeric fields stay f64 so a parsed
// document re-serializes without precision loss.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    pub controllable_vehicle: VehicleTuning,
    #[serde(rename = "laneWidth")]
    pub lane_width: f64,
    #[serde(rename = "numLanes")]
    pub num_lanes: u32,
    #[serde(rename = "numberOfSegmentPerColor")]
    pub number_of_segment_per_color: u32,
    pub render: RenderSettings,
    #[serde(rename = "trackParam")]
    pub track_param: TrackParam,
    #[serde(rename = "trackSegmentSize")]
    pub track_segment_size: f64,
    #[serde(rename = "trackColors")]
    pub track_colors: TrackColors,
    pub track: Vec<SegmentDef>,
    /// Target lap count; 0 means run forever.
    #[serde(rename = "lapNumber", default)]
    pub lap_number: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleTuning {
    pub position: f64,
    pub speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub breaking: f64,
    pub turning: f64,
    pub posx: f64,
    #[serde(rename = "maxSpeed")]
    pub max_speed: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Number of segments projected per frame; must stay below track length.
    #[serde(rename = "depthOfField")]
    pub depth_of_field: usize,
    pub camera_distance: f64,
    pub camera_height: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackParam {
    #[serde(rename = "numZones")]
    pub num_zones: u32,
    #[serde(rename = "zoneSize", default)]
    pub zone_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackColors {
    pub grass1: String,
    pub border1: String,
    pub border2: String,
    pub outborder1: String,
    pub outborder_end1: String,
    pub track_segment1: String,
    pub lane1: String,
    pub lane2: String,
    #[serde(rename = "laneArrow1")]
    pub lane_arrow1: String,
    pub track_segment_end: String,
    pub lane_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDef {
    pub height: f64,
    pub curve: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<SpriteDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDef {
    pub name: String,
    /// Longitudinal offset within the segment, in [0, 1).
    pub pos: f64,
    #[serde(default)]
    pub obstacle: bool,
}

pub fn load_track_config<P: AsRef<Path>>(path: P) -> Result<TrackConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config: TrackConfig = serde_json::from_str(&text)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &TrackConfig) -> Result<(), Box<dyn Error>> {
    if config.track.is_empty() {
        return Err("track document contains no segments".into());
    }
    if config.render.depth_of_field >= config.track.len() {
        return Err(format!(
            "depthOfField ({}) must be smaller than the track length ({})",
            config.render.depth_of_field,
            config.track.len()
        )
        .into());
    }
    if config.render.width == 0 || config.render.height == 0 {
        return Err("render viewport must be non-empty".into());
    }
    if config.track_segment_size <= 0.0 {
        return Err("trackSegmentSize must be positive".into());
    }
    let zones = config.track_param.num_zones as usize * config.track_param.zone_size as usize;
    if zones != 0 && zones != config.track.len() {
        // Not fatal; the wrap modulus always derives from the segment list.
        warn!(
            "trackParam ({} zones x {}) disagrees with the segment list ({})",
            config.track_param.num_zones,
            config.track_param.zone_size,
            config.track.len()
        );
    }
    Ok(())
}

/// Vehicle defaults are usable when the document gives the car a positive
/// speed range and sane tuning constants.
pub fn vehicle_defaults_ready(tuning: &VehicleTuning) -> bool {
    tuning.max_speed > 0.0
        && tuning.acceleration >= 0.0
        && tuning.deceleration >= 0.0
        && tuning.breaking >= 0.0
        && tuning.turning >= 0.0
}

/// Flat 100-segment test track shared by the simulation unit tests.
#[cfg(test)]
pub fn sample_config(lap_number: u32) -> TrackConfig {
    TrackConfig {
        controllable_vehicle: VehicleTuning {
            position: 10.0,
            speed: 0.0,
            acceleration: 1.0,
            deceleration: 0.5,
            breaking: 2.0,
            turning: 6.0,
            posx: 0.0,
            max_speed: 15.0,
        },
        lane_width: 0.02,
        num_lanes: 3,
        number_of_segment_per_color: 4,
        render: RenderSettings {
            width: 320,
            height: 240,
            depth_of_field: 19,
            camera_distance: 30.0,
            camera_height: 100.0,
        },
        track_param: TrackParam {
            num_zones: 10,
            zone_size: 10,
        },
        track_segment_size: 5.0,
        track_colors: TrackColors {
            grass1: "#00ab25".into(),
            border1: "#ffffff".into(),
            border2: "#ee0000".into(),
            outborder1: "#b49074".into(),
            outborder_end1: "#78573d".into(),
            track_segment1: "#6e6e6e".into(),
            lane1: "#ffffff".into(),
            lane2: "#6e6e6e".into(),
            lane_arrow1: "#ffff00".into(),
            track_segment_end: "#000000".into(),
            lane_end: "#ffffff".into(),
        },
        track: (0..100)
            .map(|_| SegmentDef {
                height: 0.0,
                curve: 0.0,
                sprite: None,
            })
            .collect(),
        lap_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> String {
        r##"{
            "controllable_vehicle": {
                "position": 10, "speed": 0, "acceleration": 0.75,
                "deceleration": 0.5, "breaking": 1.5, "turning": 5.5,
                "posx": 0, "maxSpeed": 15.25
            },
            "laneWidth": 0.02,
            "numLanes": 3,
            "numberOfSegmentPerColor": 4,
            "render": {
                "width": 320, "height": 240, "depthOfField": 20,
                "camera_distance": 30, "camera_height": 100
            },
            "trackParam": { "numZones": 4, "zoneSize": 10 },
            "trackSegmentSize": 5,
            "trackColors": {
                "grass1": "#00ab25", "border1": "#ffffff", "border2": "#ee0000",
                "outborder1": "#b49074", "outborder_end1": "#78573d",
                "track_segment1": "#6e6e6e", "lane1": "#ffffff", "lane2": "#6e6e6e",
                "laneArrow1": "#ffff00", "track_segment_end": "#000000",
                "lane_end": "#ffffff"
            },
            "track": [
                { "height": 0, "curve": 0 },
                { "height": 0.5, "curve": -1.25,
                  "sprite": { "name": "tree", "pos": 0.5, "obstacle": true } },
                { "height": -12.75, "curve": 3 }
            ],
            "lapNumber": 2
        }"##
        .to_string()
    }

    #[test]
    fn parses_the_documented_field_names() {
        let config: TrackConfig = serde_json::from_str(&sample_document()).unwrap();
        assert_eq!(config.num_lanes, 3);
        assert_eq!(config.render.depth_of_field, 20);
        assert_eq!(config.controllable_vehicle.max_speed, 15.25);
        assert_eq!(config.track.len(), 3);
        let sprite = config.track[1].sprite.as_ref().unwrap();
        assert_eq!(sprite.name, "tree");
        assert!(sprite.obstacle);
        assert_eq!(config.lap_number, 2);
    }

    #[test]
    fn round_trip_preserves_numeric_fields_exactly() {
        let config: TrackConfig = serde_json::from_str(&sample_document()).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        let again: TrackConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(again.controllable_vehicle.acceleration, 0.75);
        assert_eq!(again.controllable_vehicle.max_speed, 15.25);
        assert_eq!(again.track[1].height, 0.5);
        assert_eq!(again.track[1].curve, -1.25);
        assert_eq!(again.track[2].height, -12.75);
        assert_eq!(again.track_segment_size, 5.0);
        // The rename surface survives the round trip too.
        assert!(text.contains("\"maxSpeed\""));
        assert!(text.contains("\"depthOfField\""));
        assert!(text.contains("\"laneArrow1\""));
    }

    #[test]
    fn rejects_depth_of_field_not_below_track_length() {
        let mut config: TrackConfig = serde_json::from_str(&sample_document()).unwrap();
        config.render.depth_of_field = config.track.len();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn optional_fields_default() {
        let mut doc: serde_json::Value = serde_json::from_str(&sample_document()).unwrap();
        doc.as_object_mut().unwrap().remove("lapNumber");
        let config: TrackConfig = serde_json::from_value(doc).unwrap();
        assert_eq!(config.lap_number, 0);
        assert!(config.track[0].sprite.is_none());
    }
}
