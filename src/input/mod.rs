use rustc_hash::FxHashSet;

/// Mouse buttons reported by the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MousePressed(MouseButton),
    MouseReleased(MouseButton),
    /// Relative motion in pixels
    MouseMoved { dx: f32, dy: f32 },
    Resized { width: u32, height: u32 },
}

#[derive(Debug, Default)]
pub struct InputState {
    mouse_buttons_pressed: FxHashSet<MouseButton>,
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::MousePressed(button) => {
                self.mouse_buttons_pressed.insert(button);
            }
            InputEvent::MouseReleased(button) => {
                self.mouse_buttons_pressed.remove(&button);
            }
            InputEvent::MouseMoved { dx, dy } => {
                self.mouse_delta.0 += dx;
                self.mouse_delta.1 += dy;
            }
            InputEvent::Resized { .. } => {}
        }
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    pub fn get_mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Return and reset the accumulated motion
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_and_motion_accumulate() {
        let mut input = InputState::new();
        input.process(&InputEvent::MousePressed(MouseButton::Middle));
        input.process(&InputEvent::MouseMoved { dx: 2.0, dy: -1.0 });
        input.process(&InputEvent::MouseMoved { dx: 1.0, dy: 0.5 });

        assert!(input.is_mouse_button_pressed(MouseButton::Middle));
        assert_eq!(input.take_mouse_delta(), (3.0, -0.5));
        assert_eq!(input.get_mouse_delta(), (0.0, 0.0));

        input.process(&InputEvent::MouseReleased(MouseButton::Middle));
        assert!(!input.is_mouse_button_pressed(MouseButton::Middle));
    }
}
