use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Logical actions the local keyboard can produce. The external state feed
/// bypasses this entirely and speaks ControlSignal directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualAction {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    Start,
    Pause,
    Quit,
    Mute,
}

#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    pub action: VirtualAction,
    pub pressed: bool,
}

/// Maps a winit key event to a logical action. OS auto-repeat is ignored so
/// held keys read as one continuous press.
pub fn map_key_event(ev: &KeyEvent) -> Option<InputEvent> {
    if ev.state == ElementState::Pressed && ev.repeat {
        return None;
    }
    let PhysicalKey::Code(code) = ev.physical_key else {
        return None;
    };
    let action = match code {
        KeyCode::ArrowUp | KeyCode::KeyW => VirtualAction::Accelerate,
        KeyCode::ArrowDown | KeyCode::KeyS => VirtualAction::Brake,
        KeyCode::ArrowLeft | KeyCode::KeyA => VirtualAction::SteerLeft,
        KeyCode::ArrowRight | KeyCode::KeyD => VirtualAction::SteerRight,
        KeyCode::Enter | KeyCode::Space => VirtualAction::Start,
        KeyCode::KeyP => VirtualAction::Pause,
        KeyCode::Escape => VirtualAction::Quit,
        KeyCode::KeyM => VirtualAction::Mute,
        _ => return None,
    };
    Some(InputEvent {
        action,
        pressed: ev.state == ElementState::Pressed,
    })
}

/// Held key state the running screen samples once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn apply(&mut self, ev: &InputEvent) {
        match ev.action {
            VirtualAction::Accelerate => self.accelerate = ev.pressed,
            VirtualAction::Brake => self.brake = ev.pressed,
            VirtualAction::SteerLeft => self.left = ev.pressed,
            VirtualAction::SteerRight => self.right = ev.pressed,
            _ => {}
        }
    }
}
