use log::debug;
use serde_json::Value;

// --- Typed control surface ---
//
// The simulation consumes exactly one ControlSignal per tick. Local keyboard
// state and the external state vector both reduce to this type, so the core
// never sees the upstream protocol's field names.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlAction {
    Accelerate,
    Brake,
    #[default]
    Idle,
    Quit,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    Right,
    #[default]
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundToggle {
    Mute,
    Unmute,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControlSignal {
    pub action: ControlAction,
    pub direction: Direction,
    pub sound: Option<SoundToggle>,
    /// Numeric overrides. None means "no new value, keep the last one".
    pub speed: Option<f64>,
    pub position: Option<f64>,
    pub posx: Option<f64>,
}

// --- External adapter ---

/// Logical role -> external attribute name. Upstream producers disagree on
/// naming, so the mapping is data, not code.
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub action: String,
    pub direction: String,
    pub sound: String,
    pub speed: String,
    pub position: String,
    pub posx: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            action: "action".into(),
            direction: "direction".into(),
            sound: "sound".into(),
            speed: "speed".into(),
            position: "position".into(),
            posx: "posx".into(),
        }
    }
}

/// Maps a dynamically-shaped external payload into a ControlSignal once per
/// tick. Unknown or malformed fields degrade to the signal's defaults.
#[derive(Debug, Clone, Default)]
pub struct ExternalAdapter {
    pub fields: FieldMap,
}

impl ExternalAdapter {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    pub fn adapt(&self, raw: &Value) -> ControlSignal {
        let field = |name: &str| raw.get(name);
        let action = match field(&self.fields.action).and_then(Value::as_str) {
            Some("accelerate") => ControlAction::Accelerate,
            Some("brake") => ControlAction::Brake,
            Some("quit") => ControlAction::Quit,
            Some("pause") => ControlAction::Pause,
            Some("resume") => ControlAction::Resume,
            _ => ControlAction::Idle,
        };
        let direction = match field(&self.fields.direction).and_then(Value::as_str) {
            Some("left") => Direction::Left,
            Some("right") => Direction::Right,
            _ => Direction::Straight,
        };
        let sound = match field(&self.fields.sound).and_then(Value::as_str) {
            Some("mute") => Some(SoundToggle::Mute),
            Some("unmute") => Some(SoundToggle::Unmute),
            _ => None,
        };
        ControlSignal {
            action,
            direction,
            sound,
            speed: field(&self.fields.speed).and_then(numeric_field),
            position: field(&self.fields.position).and_then(numeric_field),
            posx: field(&self.fields.posx).and_then(numeric_field),
        }
    }
}

/// Numeric field decoding for the external feed: plain JSON numbers, numeric
/// strings, and fraction strings ("n/d", ceiled). Null, empty, the "nop"
/// sentinel and anything malformed all mean "no new value".
fn numeric_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("nop") {
                return None;
            }
            if let Some(v) = parse_fraction(s) {
                return Some(v);
            }
            match s.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    debug!("ignoring malformed numeric field {s:?}");
                    None
                }
            }
        }
        _ => None,
    }
}

/// Parses "n/d" with integer parts and returns ceil(n/d). A zero denominator
/// is malformed, not infinity.
pub fn parse_fraction(text: &str) -> Option<f64> {
    let (num, den) = text.split_once('/')?;
    let num: i64 = num.trim().parse().ok()?;
    let den: i64 = den.trim().parse().ok()?;
    if den == 0 {
        return None;
    }
    Some((num as f64 / den as f64).ceil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fractions_parse_and_ceil() {
        assert_eq!(parse_fraction("7/2"), Some(4.0));
        assert_eq!(parse_fraction("6/2"), Some(3.0));
        assert_eq!(parse_fraction("-7/2"), Some(-3.0));
        assert_eq!(parse_fraction("10/0"), None);
        assert_eq!(parse_fraction("x/2"), None);
        assert_eq!(parse_fraction("12"), None);
    }

    #[test]
    fn sentinel_and_malformed_values_keep_last_value() {
        assert_eq!(numeric_field(&json!(null)), None);
        assert_eq!(numeric_field(&json!("")), None);
        assert_eq!(numeric_field(&json!("nop")), None);
        assert_eq!(numeric_field(&json!("NOP")), None);
        assert_eq!(numeric_field(&json!("3/oops")), None);
        assert_eq!(numeric_field(&json!(true)), None);
    }

    #[test]
    fn numbers_and_numeric_strings_pass_through() {
        assert_eq!(numeric_field(&json!(4.5)), Some(4.5));
        assert_eq!(numeric_field(&json!("4.5")), Some(4.5));
        assert_eq!(numeric_field(&json!("9/4")), Some(3.0));
    }

    #[test]
    fn adapter_honors_the_field_map() {
        let adapter = ExternalAdapter::new(FieldMap {
            action: "a".into(),
            direction: "dir".into(),
            sound: "snd".into(),
            speed: "v".into(),
            position: "p".into(),
            posx: "x".into(),
        });
        let signal = adapter.adapt(&json!({
            "a": "accelerate",
            "dir": "left",
            "snd": "mute",
            "v": "15/4",
            "p": "nop",
            "x": -3
        }));
        assert_eq!(signal.action, ControlAction::Accelerate);
        assert_eq!(signal.direction, Direction::Left);
        assert_eq!(signal.sound, Some(SoundToggle::Mute));
        assert_eq!(signal.speed, Some(4.0));
        assert_eq!(signal.position, None);
        assert_eq!(signal.posx, Some(-3.0));
    }

    #[test]
    fn unknown_action_degrades_to_idle() {
        let adapter = ExternalAdapter::default();
        let signal = adapter.adapt(&json!({ "action": "teleport" }));
        assert_eq!(signal.action, ControlAction::Idle);
        assert_eq!(signal.direction, Direction::Straight);
    }
}
