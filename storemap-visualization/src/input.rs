//! Mouse state for driving the orbit controls

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a precise scroll that count as one wheel step
const PIXELS_PER_STEP: f32 = 100.0;

/// What a pointer drag should do to the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragAction {
    Rotate { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
}

/// Tracks held buttons and the last cursor position between events
#[derive(Debug, Default)]
pub struct PointerState {
    rotating: bool,
    panning: bool,
    last_position: Option<PhysicalPosition<f64>>,
}

impl PointerState {
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right | MouseButton::Middle => self.panning = pressed,
            _ => {}
        }
    }

    /// Record a cursor move and report the drag it produces, if any
    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<DragAction> {
        let last = self.last_position.replace(position)?;
        let dx = (position.x - last.x) as f32;
        let dy = (position.y - last.y) as f32;

        if self.rotating {
            Some(DragAction::Rotate { dx, dy })
        } else if self.panning {
            Some(DragAction::Pan { dx, dy })
        } else {
            None
        }
    }

    /// Forget the cursor and release buttons, e.g. when it leaves the window
    pub fn on_cursor_left(&mut self) {
        self.last_position = None;
        self.rotating = false;
        self.panning = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.rotating || self.panning
    }
}

/// Convert a wheel event into zoom steps; positive means towards the target
pub fn scroll_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_STEP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_only_records_position() {
        let mut pointer = PointerState::default();
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(pointer.on_cursor_moved(PhysicalPosition::new(10.0, 10.0)), None);
        assert_eq!(
            pointer.on_cursor_moved(PhysicalPosition::new(15.0, 7.0)),
            Some(DragAction::Rotate { dx: 5.0, dy: -3.0 })
        );
    }

    #[test]
    fn test_right_button_pans() {
        let mut pointer = PointerState::default();
        pointer.on_cursor_moved(PhysicalPosition::new(0.0, 0.0));
        pointer.on_button(MouseButton::Right, ElementState::Pressed);
        assert_eq!(
            pointer.on_cursor_moved(PhysicalPosition::new(4.0, 2.0)),
            Some(DragAction::Pan { dx: 4.0, dy: 2.0 })
        );

        pointer.on_button(MouseButton::Right, ElementState::Released);
        assert!(!pointer.is_dragging());
        assert_eq!(pointer.on_cursor_moved(PhysicalPosition::new(8.0, 2.0)), None);
    }

    #[test]
    fn test_cursor_left_releases_drag() {
        let mut pointer = PointerState::default();
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        pointer.on_cursor_moved(PhysicalPosition::new(1.0, 1.0));
        pointer.on_cursor_left();
        assert!(!pointer.is_dragging());
        assert_eq!(pointer.on_cursor_moved(PhysicalPosition::new(2.0, 2.0)), None);
    }

    #[test]
    fn test_scroll_steps() {
        assert_eq!(scroll_steps(MouseScrollDelta::LineDelta(0.0, 1.0)), 1.0);
        assert_eq!(scroll_steps(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
        assert_eq!(
            scroll_steps(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 50.0))),
            0.5
        );
    }
}
