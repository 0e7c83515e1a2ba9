use rotary_core::{Action, BoundSide, FrameInput, SMOOTHING_PRESETS};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// What a key press asks the application to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyCommand {
    Scene(Action),
    NextPort,
    Quit,
}

pub fn command_for_key(code: KeyCode) -> Option<KeyCommand> {
    let cmd = match code {
        KeyCode::KeyR => KeyCommand::Scene(Action::Recalibrate),
        KeyCode::KeyI => KeyCommand::Scene(Action::ToggleInvert),
        KeyCode::BracketRight => KeyCommand::Scene(Action::SmoothingUp),
        KeyCode::BracketLeft => KeyCommand::Scene(Action::SmoothingDown),
        KeyCode::KeyC => KeyCommand::Scene(Action::ClearCustomBounds),
        KeyCode::KeyB => KeyCommand::Scene(Action::ToggleCustomBounds),
        KeyCode::KeyZ => adjust(BoundSide::Left, false),
        KeyCode::KeyX => adjust(BoundSide::Left, true),
        KeyCode::KeyN => adjust(BoundSide::Right, false),
        KeyCode::KeyM => adjust(BoundSide::Right, true),
        KeyCode::KeyV => KeyCommand::Scene(Action::CycleBoundStep),
        KeyCode::Digit1 => smoothing_preset(0),
        KeyCode::Digit2 => smoothing_preset(1),
        KeyCode::Digit3 => smoothing_preset(2),
        KeyCode::Digit4 => smoothing_preset(3),
        KeyCode::Digit5 => smoothing_preset(4),
        KeyCode::KeyT => KeyCommand::Scene(Action::CycleIdleTime),
        KeyCode::KeyF => KeyCommand::Scene(Action::CycleFadeIn),
        KeyCode::KeyG => KeyCommand::Scene(Action::CycleFadeOut),
        KeyCode::KeyS => KeyCommand::Scene(Action::ReportSettings),
        KeyCode::KeyP => KeyCommand::NextPort,
        KeyCode::Escape => KeyCommand::Quit,
        _ => return None,
    };
    Some(cmd)
}

fn adjust(side: BoundSide, raise: bool) -> KeyCommand {
    KeyCommand::Scene(Action::AdjustBound { side, raise })
}

fn smoothing_preset(index: usize) -> KeyCommand {
    KeyCommand::Scene(Action::SmoothingPreset(SMOOTHING_PRESETS[index]))
}

/// Input gathered from window events between two frames.
#[derive(Default, Debug)]
pub struct InputState {
    pub cursor_px: [f32; 2],
    pub left_held: bool,
    pub right_held: bool,
    buttons_down: u8,
    click_px: Option<[f32; 2]>,
    actions: Vec<Action>,
    next_port: bool,
}

impl InputState {
    pub fn on_mouse(&mut self, state: ElementState, button: MouseButton) {
        let bit = match button {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
            _ => return,
        };
        match state {
            ElementState::Pressed => self.buttons_down |= bit,
            ElementState::Released => {
                self.buttons_down &= !bit;
                if button == MouseButton::Left {
                    self.click_px = Some(self.cursor_px);
                }
            }
        }
    }

    /// Track held arrow keys; returns the command for a fresh press.
    pub fn on_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) -> Option<KeyCommand> {
        let pressed = state == ElementState::Pressed;
        match code {
            KeyCode::ArrowLeft => self.left_held = pressed,
            KeyCode::ArrowRight => self.right_held = pressed,
            _ => {}
        }
        if !pressed || repeat {
            return None;
        }
        let cmd = command_for_key(code)?;
        match cmd {
            KeyCommand::Scene(action) => self.actions.push(action),
            KeyCommand::NextPort => self.next_port = true,
            KeyCommand::Quit => {}
        }
        Some(cmd)
    }

    pub fn move_axis(&self) -> f32 {
        match (self.left_held, self.right_held) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn take_next_port(&mut self) -> bool {
        std::mem::take(&mut self.next_port)
    }

    /// Build this frame's input and clear the one-shot events.
    pub fn take_frame(
        &mut self,
        dt_sec: f32,
        time_sec: f32,
        to_world: impl Fn([f32; 2]) -> glam::Vec2,
    ) -> FrameInput {
        FrameInput {
            dt_sec,
            time_sec,
            pointer_down: self.buttons_down != 0,
            click: self.click_px.take().map(to_world),
            move_axis: self.move_axis(),
            actions: std::mem::take(&mut self.actions),
        }
    }
}
