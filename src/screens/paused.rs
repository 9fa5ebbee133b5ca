use crate::assets::LoadedAssets;
use crate::core::gfx::Frame;
use crate::core::input::{InputEvent, VirtualAction};
use crate::game::colors::Color;
use crate::screens::{Screen, ScreenAction, running};
use crate::ui::font;

const BAND: Color = Color(0x0010_1418);
const TEXT: Color = Color::WHITE;

pub fn handle_input(ev: &InputEvent) -> ScreenAction {
    if !ev.pressed {
        return ScreenAction::None;
    }
    match ev.action {
        VirtualAction::Pause | VirtualAction::Start => ScreenAction::Navigate(Screen::Running),
        VirtualAction::Quit => ScreenAction::Navigate(Screen::Ended),
        _ => ScreenAction::None,
    }
}

/// The paused frame is the last simulation view with a banner over it; the
/// running state stays alive untouched underneath.
pub fn draw(running_state: &running::State, frame: &mut Frame, assets: &LoadedAssets) {
    running::draw(running_state, frame, assets);

    let cy = frame.height() as i32 / 2;
    frame.fill_rect(0, cy - 16, frame.width() as i32, cy + 16, BAND);
    font::draw_text_centered(frame, frame.width() as i32 / 2, cy - 10, 2, TEXT, "PAUSED");
    font::draw_text_centered(
        frame,
        frame.width() as i32 / 2,
        cy + 8,
        1,
        TEXT,
        "P TO RESUME",
    );
}
