//! Input events routed from the UI layer into a capture session

use crate::domain::MarkKind;

/// Pointer event in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Primary button pressed
    Down { x: i32, y: i32 },
    /// Pointer moved with the primary button held
    Drag { x: i32, y: i32 },
    /// Pointer moved with no button held (hover)
    Move { x: i32, y: i32 },
    /// Primary button released
    Up { x: i32, y: i32 },
    /// Primary button double-clicked
    DoubleClick { x: i32, y: i32 },
    /// Secondary button pressed
    RightDown { x: i32, y: i32 },
}

impl PointerEvent {
    pub fn position(&self) -> (i32, i32) {
        match *self {
            PointerEvent::Down { x, y }
            | PointerEvent::Drag { x, y }
            | PointerEvent::Move { x, y }
            | PointerEvent::Up { x, y }
            | PointerEvent::DoubleClick { x, y }
            | PointerEvent::RightDown { x, y } => (x, y),
        }
    }
}

/// Non-printable keys a text mark reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Backspace,
    Tab,
    Enter,
    /// Any other non-printable key, ignored
    Other,
}

/// Keyboard event, routed only while a text mark is in edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Special(SpecialKey),
}

/// Draw action routed to the annotation engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawMsg {
    /// Start a mark of the given kind
    Begin { kind: MarkKind, x: f32, y: f32 },
    /// Drag the current mark
    Update { x: f32, y: f32 },
    /// Pointer released
    Commit,
    /// Keystroke for the text mark in edit
    Key(KeyInput),
    /// Finish the text mark in edit
    FinishText,
    Undo,
}
