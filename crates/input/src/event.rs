use glam::Vec2;

/// Pointer buttons the controls distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keys the controls react to. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// A host-neutral input event.
///
/// The desktop app maps winit events onto these; tests and headless tools
/// synthesise them directly.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A pointer button went down at `position` (pixels, origin top-left).
    PointerDown { button: PointerButton, position: Vec2 },
    /// The pointer moved to `position`.
    PointerMove { position: Vec2 },
    /// A pointer button was released.
    PointerUp { button: PointerButton },
    /// Scroll wheel. Positive values scroll down (away from the user).
    Wheel { delta: f32 },
    /// A key changed state.
    Key { key: Key, pressed: bool },
}

impl InputEvent {
    /// Press-and-drag from `from` to `to` with `button`, as three events.
    pub fn drag(button: PointerButton, from: Vec2, to: Vec2) -> [Self; 3] {
        [
            Self::PointerDown {
                button,
                position: from,
            },
            Self::PointerMove { position: to },
            Self::PointerUp { button },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_expands_to_down_move_up() {
        let events = InputEvent::drag(PointerButton::Primary, Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!(matches!(events[0], InputEvent::PointerDown { .. }));
        assert_eq!(
            events[1],
            InputEvent::PointerMove {
                position: Vec2::new(10.0, 0.0)
            }
        );
        assert!(matches!(
            events[2],
            InputEvent::PointerUp {
                button: PointerButton::Primary
            }
        ));
    }

    #[test]
    fn key_event_is_constructible() {
        let e = InputEvent::Key {
            key: Key::ArrowLeft,
            pressed: true,
        };
        assert!(matches!(e, InputEvent::Key { pressed: true, .. }));
    }
}
