use crate::assets::LoadedAssets;
use crate::config::TrackConfig;
use crate::core::gfx::Frame;
use crate::core::input::{HeldKeys, InputEvent, VirtualAction};
use crate::game::colors::Color;
use crate::game::context::{SimulationContext, TickResult};
use crate::game::control::{ControlAction, ControlSignal, Direction};
use crate::game::projection;
use crate::game::road::{self, SpriteBuffer};
use crate::screens::{Screen, ScreenAction};
use crate::ui::font;
use log::info;
use serde_json::Value;
use std::error::Error;

const SKY: Color = Color(0x0041_8edc);
const HUD: Color = Color::WHITE;
const HUD_SHADOW: Color = Color(0x0020_2020);

// Which atlas skin the controllable vehicle uses when no indexed variant
// matches; see assets::vehicle_sprite_candidates.
const VEHICLE_KIND: &str = "sedan";
const VEHICLE_INDEX: u32 = 1;
const VEHICLE_BOTTOM_MARGIN: i32 = 6;

/// Active simulation. Owns the context and the two control sources: held
/// local keys and the shared external state slot (last write wins, no
/// queue; a value replaced between ticks is simply lost).
pub struct State {
    pub ctx: SimulationContext,
    pub keys: HeldKeys,
    /// Set when the lap target was reached, as opposed to a quit signal.
    pub finished: bool,
    external: Option<Value>,
    adapter: crate::game::control::ExternalAdapter,
}

pub fn init(config: TrackConfig) -> Result<State, Box<dyn Error>> {
    Ok(State {
        ctx: SimulationContext::new(config)?,
        keys: HeldKeys::default(),
        finished: false,
        external: None,
        adapter: crate::game::control::ExternalAdapter::default(),
    })
}

/// Restart from the end screen: configured vehicle defaults, lap one.
pub fn restart(state: &mut State) {
    state.ctx.restart();
    state.finished = false;
    state.keys = HeldKeys::default();
    state.external = None;
}

/// Replaces the shared external control state between ticks.
pub fn submit_external(state: &mut State, value: Value) {
    state.external = Some(value);
}

/// The local keyboard reduced to the same signal type the external feed
/// produces. Accelerate wins over brake when both are held.
pub fn local_signal(keys: &HeldKeys) -> ControlSignal {
    let action = if keys.accelerate {
        ControlAction::Accelerate
    } else if keys.brake {
        ControlAction::Brake
    } else {
        ControlAction::Idle
    };
    let direction = match (keys.left, keys.right) {
        (true, false) => Direction::Left,
        (false, true) => Direction::Right,
        _ => Direction::Straight,
    };
    ControlSignal {
        action,
        direction,
        ..ControlSignal::default()
    }
}

pub fn handle_input(state: &mut State, ev: &InputEvent) -> ScreenAction {
    state.keys.apply(ev);
    if !ev.pressed {
        return ScreenAction::None;
    }
    match ev.action {
        VirtualAction::Pause => ScreenAction::Navigate(Screen::Paused),
        // A quit signal ends the race rather than killing the process.
        VirtualAction::Quit => ScreenAction::Navigate(Screen::Ended),
        VirtualAction::Mute => {
            state.ctx.muted = !state.ctx.muted;
            ScreenAction::None
        }
        _ => ScreenAction::None,
    }
}

pub fn update(state: &mut State, ticks: u32) -> ScreenAction {
    for _ in 0..ticks {
        let signal = match &state.external {
            Some(raw) => state.adapter.adapt(raw),
            None => local_signal(&state.keys),
        };
        match state.ctx.step(&signal) {
            TickResult::Continue => {}
            TickResult::Pause => return ScreenAction::Navigate(Screen::Paused),
            TickResult::Quit => return ScreenAction::Navigate(Screen::Ended),
            TickResult::RaceOver => {
                info!("lap target reached; simulation stopping");
                state.finished = true;
                return ScreenAction::Navigate(Screen::Ended);
            }
        }
        for event in state.ctx.drain_events() {
            // Delivery is the embedder's concern; surface it in the log.
            info!("outbound event {:?} lap={}", event.name, event.lap);
        }
    }
    ScreenAction::None
}

fn draw_hud(state: &State, frame: &mut Frame) {
    let ctx = &state.ctx;
    let lap_text = if ctx.lap.lap_target == 0 {
        format!("LAP {}", ctx.lap.current_lap)
    } else {
        format!("LAP {}/{}", ctx.lap.current_lap, ctx.lap.lap_target)
    };
    font::draw_text(frame, 5, 6, 1, HUD_SHADOW, &lap_text);
    font::draw_text(frame, 4, 5, 1, HUD, &lap_text);

    let percent = format!("{:.0}%", ctx.lap.percent);
    font::draw_text(frame, 4, 15, 1, HUD, &percent);

    let speed = format!("SPEED {:.0}", ctx.vehicle.speed);
    let w = font::measure(&speed, 1);
    font::draw_text(frame, frame.width() as i32 - w - 4, 5, 1, HUD, &speed);

    if ctx.muted {
        font::draw_text(frame, 4, frame.height() as i32 - 12, 1, HUD, "MUTED");
    }
}

pub fn draw(state: &State, frame: &mut Frame, assets: &LoadedAssets) {
    let ctx = &state.ctx;
    frame.clear(SKY);

    let geometry = projection::project_frame(
        &ctx.track,
        &ctx.config.render,
        ctx.config.track_segment_size,
        ctx.config.number_of_segment_per_color,
        ctx.vehicle.position,
        ctx.vehicle.posx,
    );

    let mut sprites = SpriteBuffer::default();
    road::render_segments(frame, &geometry, &ctx.scheme, &ctx.lanes, &mut sprites);
    road::render_sprites(frame, &mut sprites, &ctx.track, assets);

    if geometry.finish_visible {
        road::draw_guide_arrow(frame, ctx.direction, ctx.scheme.lane_arrow);
    }

    // The controllable vehicle, fixed at bottom center; lateral deviation is
    // already expressed by the road shifting underneath it.
    if let Some(rect) = assets.vehicle_sprite(VEHICLE_KIND, VEHICLE_INDEX, ctx.vehicle.facing) {
        frame.blit_scaled(
            &assets.image,
            (rect.x, rect.y, rect.w, rect.h),
            frame.width() as i32 / 2,
            frame.height() as i32 - VEHICLE_BOTTOM_MARGIN,
            rect.w as i32,
            rect.h as i32,
            frame.height() as i32,
        );
    }

    draw_hud(state, frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sample_config;
    use serde_json::json;

    #[test]
    fn external_state_drives_the_simulation() {
        let mut state = init(sample_config(2)).unwrap();
        submit_external(
            &mut state,
            json!({ "action": "accelerate", "direction": "left" }),
        );
        assert_eq!(update(&mut state, 5), ScreenAction::None);
        assert!(state.ctx.vehicle.speed > 0.0);
        assert!(state.ctx.vehicle.posx < 0.0);

        // Last write wins: the replacement value governs later ticks.
        submit_external(&mut state, json!({ "action": "pause" }));
        assert_eq!(update(&mut state, 1), ScreenAction::Navigate(Screen::Paused));
    }

    #[test]
    fn external_numeric_overrides_reach_the_vehicle() {
        let mut state = init(sample_config(2)).unwrap();
        submit_external(
            &mut state,
            json!({ "action": "idle", "speed": "25/2", "posx": "nop" }),
        );
        update(&mut state, 1);
        // ceil(25/2) = 13, minus one tick of idle deceleration.
        assert_eq!(state.ctx.vehicle.speed, 13.0 - 0.5);
        assert_eq!(state.ctx.vehicle.posx, 0.0);
    }

    #[test]
    fn quit_signal_ends_the_race() {
        let mut state = init(sample_config(2)).unwrap();
        submit_external(&mut state, json!({ "action": "quit" }));
        assert_eq!(update(&mut state, 1), ScreenAction::Navigate(Screen::Ended));
        assert!(!state.finished);
    }

    #[test]
    fn local_signal_reduces_held_keys() {
        let keys = HeldKeys {
            accelerate: true,
            brake: true,
            left: false,
            right: true,
        };
        let signal = local_signal(&keys);
        assert_eq!(signal.action, ControlAction::Accelerate);
        assert_eq!(signal.direction, Direction::Right);
        assert!(signal.speed.is_none() && signal.position.is_none() && signal.posx.is_none());

        let signal = local_signal(&HeldKeys::default());
        assert_eq!(signal.action, ControlAction::Idle);
        assert_eq!(signal.direction, Direction::Straight);
    }

    #[test]
    fn opposed_steering_cancels_out() {
        let keys = HeldKeys {
            accelerate: false,
            brake: false,
            left: true,
            right: true,
        };
        assert_eq!(local_signal(&keys).direction, Direction::Straight);
    }
}
