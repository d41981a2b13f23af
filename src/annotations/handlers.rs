//! Annotation message handlers
//!
//! Handles DrawMsg for all annotation drawing operations.

use super::AnnotationEngine;
use crate::session::messages::DrawMsg;

/// Handle a DrawMsg, modifying the engine
///
/// Returns true if the committed mark list changed.
pub fn handle_draw_msg(engine: &mut AnnotationEngine, msg: DrawMsg) -> bool {
    match msg {
        DrawMsg::Begin { kind, x, y } => {
            let before = engine.marks().len();
            engine.begin_mark(kind, x, y);
            engine.marks().len() != before
        }
        DrawMsg::Update { x, y } => {
            engine.update_mark(x, y);
            false
        }
        DrawMsg::Commit => engine.commit_mark().is_some(),
        DrawMsg::Key(key) => {
            engine.key_input(key);
            false
        }
        DrawMsg::FinishText => engine.finalize_text().is_some(),
        DrawMsg::Undo => {
            let undone = engine.undo();
            if let Some(mark) = &undone {
                log::debug!("Undid {:?} mark", mark.kind());
            }
            undone.is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolSettings;
    use crate::domain::{MarkKind, Rect};
    use crate::session::messages::KeyInput;

    #[test]
    fn test_messages_report_history_changes() {
        let mut engine = AnnotationEngine::new(Rect::new(0, 0, 200, 200), ToolSettings::default());

        let begin = DrawMsg::Begin {
            kind: MarkKind::Ellipse,
            x: 10.0,
            y: 10.0,
        };
        assert!(!handle_draw_msg(&mut engine, begin));
        assert!(!handle_draw_msg(&mut engine, DrawMsg::Update { x: 50.0, y: 60.0 }));
        assert!(handle_draw_msg(&mut engine, DrawMsg::Commit));

        let text = DrawMsg::Begin {
            kind: MarkKind::Text,
            x: 20.0,
            y: 20.0,
        };
        assert!(!handle_draw_msg(&mut engine, text));
        assert!(!handle_draw_msg(&mut engine, DrawMsg::Key(KeyInput::Char('x'))));
        // Starting another mark finalizes the text
        assert!(handle_draw_msg(&mut engine, begin));
        assert_eq!(engine.marks().len(), 2);

        assert!(handle_draw_msg(&mut engine, DrawMsg::Undo));
        assert!(handle_draw_msg(&mut engine, DrawMsg::Undo));
        assert!(!handle_draw_msg(&mut engine, DrawMsg::Undo));
        assert!(!handle_draw_msg(&mut engine, DrawMsg::FinishText));
    }
}
