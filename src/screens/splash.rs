use crate::assets::{self, LoadedAssets};
use crate::config::{self, TrackConfig};
use crate::core::gfx::Frame;
use crate::core::input::{InputEvent, VirtualAction};
use crate::game::colors::Color;
use crate::screens::{Screen, ScreenAction};
use crate::ui::font;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

const BG: Color = Color(0x0010_1418);
const TITLE: Color = Color(0x00ff_d24a);
const TEXT: Color = Color(0x00c8_d2dc);
const DIM: Color = Color(0x0078_8690);

// Blink period for the start prompt, in ticks.
const BLINK_PERIOD: u32 = 24;

enum LoadMsg {
    Track(Box<TrackConfig>),
    Atlas(Box<LoadedAssets>),
    TrackFailed(String),
    AtlasFailed(String),
}

/// Splash screen plus the asset loader. Loading happens off-thread before
/// the first simulation tick; the engine only leaves this screen when all
/// three readiness flags are up. A failed load leaves its flag down forever
/// and the screen keeps rendering the loading placeholder.
pub struct State {
    rx: mpsc::Receiver<LoadMsg>,
    track: Option<TrackConfig>,
    assets: Option<LoadedAssets>,
    track_ready: bool,
    atlas_ready: bool,
    vehicle_ready: bool,
    ticks: u32,
}

pub fn init(track_path: PathBuf, atlas_path: PathBuf, image_path: PathBuf) -> State {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        match config::load_track_config(&track_path) {
            Ok(cfg) => {
                info!(
                    "track configuration loaded: {} segments, {}x{} viewport",
                    cfg.track.len(),
                    cfg.render.width,
                    cfg.render.height
                );
                let _ = tx.send(LoadMsg::Track(Box::new(cfg)));
            }
            Err(e) => {
                let _ = tx.send(LoadMsg::TrackFailed(e.to_string()));
            }
        }
        match assets::load_atlas(&atlas_path, &image_path) {
            Ok(loaded) => {
                info!("sprite atlas loaded: {} frames", loaded.atlas.len());
                let _ = tx.send(LoadMsg::Atlas(Box::new(loaded)));
            }
            Err(e) => {
                let _ = tx.send(LoadMsg::AtlasFailed(e.to_string()));
            }
        }
    });
    State {
        rx,
        track: None,
        assets: None,
        track_ready: false,
        atlas_ready: false,
        vehicle_ready: false,
        ticks: 0,
    }
}

pub fn update(state: &mut State, ticks: u32) -> ScreenAction {
    state.ticks = state.ticks.wrapping_add(ticks);
    while let Ok(msg) = state.rx.try_recv() {
        match msg {
            LoadMsg::Track(cfg) => {
                state.track_ready = true;
                state.vehicle_ready = config::vehicle_defaults_ready(&cfg.controllable_vehicle);
                if !state.vehicle_ready {
                    error!("controllable_vehicle defaults are unusable; staying on splash");
                }
                state.track = Some(*cfg);
            }
            LoadMsg::Atlas(loaded) => {
                state.atlas_ready = true;
                state.assets = Some(*loaded);
            }
            LoadMsg::TrackFailed(e) => error!("track configuration failed to load: {e}"),
            LoadMsg::AtlasFailed(e) => error!("sprite atlas failed to load: {e}"),
        }
    }
    ScreenAction::None
}

/// All three readiness flags, combined with AND.
pub fn ready(state: &State) -> bool {
    state.track_ready && state.atlas_ready && state.vehicle_ready
}

pub fn handle_input(state: &State, ev: &InputEvent) -> ScreenAction {
    if !ev.pressed {
        return ScreenAction::None;
    }
    match ev.action {
        VirtualAction::Start if ready(state) => ScreenAction::Navigate(Screen::Running),
        VirtualAction::Quit => ScreenAction::Exit,
        _ => ScreenAction::None,
    }
}

/// Hands the loaded documents to the shell on the Splash -> Running edge.
pub fn take_loaded(state: &mut State) -> Option<(TrackConfig, LoadedAssets)> {
    match (state.track.take(), state.assets.take()) {
        (Some(track), Some(assets)) => Some((track, assets)),
        (track, assets) => {
            state.track = track;
            state.assets = assets;
            None
        }
    }
}

pub fn draw(state: &State, frame: &mut Frame) {
    frame.clear(BG);
    let cx = frame.width() as i32 / 2;
    let h = frame.height() as i32;

    font::draw_text_centered(frame, cx, h / 5, 3, TITLE, "OVERDRIVE");
    font::draw_text_centered(frame, cx, h * 2 / 5, 1, TEXT, "ARROWS OR WASD TO DRIVE");
    font::draw_text_centered(frame, cx, h * 2 / 5 + 12, 1, TEXT, "P PAUSE   M MUTE   ESC QUIT");

    if ready(state) {
        // Blinking start prompt.
        if state.ticks % BLINK_PERIOD < BLINK_PERIOD / 2 + BLINK_PERIOD / 4 {
            font::draw_text_centered(frame, cx, h * 3 / 4, 2, TEXT, "PRESS ENTER");
        }
    } else {
        let dots = (state.ticks / 8 % 4) as usize;
        let text = format!("LOADING{}", ".".repeat(dots));
        font::draw_text_centered(frame, cx, h * 3 / 4, 2, DIM, &text);
    }
}
