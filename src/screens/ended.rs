use crate::core::gfx::Frame;
use crate::core::input::{InputEvent, VirtualAction};
use crate::game::colors::Color;
use crate::screens::{Screen, ScreenAction};
use crate::ui::font;

const BG: Color = Color(0x0010_1418);
const TITLE: Color = Color(0x00ff_d24a);
const TEXT: Color = Color(0x00c8_d2dc);

// After a finished race the process exits on its own, the stand-in for the
// original's full page reload. ~15 seconds at the 30ms tick.
const EXIT_AFTER_TICKS: u32 = 500;

pub struct State {
    laps_completed: u32,
    quit_requested: bool,
    ticks: u32,
}

pub fn init(laps_completed: u32, quit_requested: bool) -> State {
    State {
        laps_completed,
        quit_requested,
        ticks: 0,
    }
}

pub fn update(state: &mut State, ticks: u32) -> ScreenAction {
    state.ticks = state.ticks.saturating_add(ticks);
    if !state.quit_requested && state.ticks >= EXIT_AFTER_TICKS {
        return ScreenAction::Exit;
    }
    ScreenAction::None
}

pub fn handle_input(ev: &InputEvent) -> ScreenAction {
    if !ev.pressed {
        return ScreenAction::None;
    }
    match ev.action {
        // Restart reinitializes the vehicle to its configured defaults.
        VirtualAction::Start => ScreenAction::Navigate(Screen::Running),
        VirtualAction::Quit => ScreenAction::Exit,
        _ => ScreenAction::None,
    }
}

pub fn draw(state: &State, frame: &mut Frame) {
    frame.clear(BG);
    let cx = frame.width() as i32 / 2;
    let h = frame.height() as i32;

    let title = if state.quit_requested {
        "RACE ABANDONED"
    } else {
        "RACE COMPLETE"
    };
    font::draw_text_centered(frame, cx, h / 4, 2, TITLE, title);
    font::draw_text_centered(
        frame,
        cx,
        h / 2,
        1,
        TEXT,
        &format!("LAPS COMPLETED: {}", state.laps_completed),
    );
    font::draw_text_centered(frame, cx, h * 3 / 4, 1, TEXT, "ENTER RESTART   ESC QUIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_race_exits_after_the_fixed_delay() {
        let mut state = init(2, false);
        assert_eq!(update(&mut state, EXIT_AFTER_TICKS - 1), ScreenAction::None);
        assert_eq!(update(&mut state, 1), ScreenAction::Exit);
    }

    #[test]
    fn abandoned_race_waits_for_input() {
        let mut state = init(0, true);
        assert_eq!(update(&mut state, EXIT_AFTER_TICKS * 10), ScreenAction::None);
    }
}
