//! Live text buffer for a text mark being edited

use std::time::{Duration, Instant};

use crate::config::{CARET_BLINK, ShapeColor};
use crate::domain::TextMark;
use crate::session::messages::{KeyInput, SpecialKey};

/// Approximate advance of one glyph relative to the font size
const GLYPH_ADVANCE: f32 = 0.6;
/// Line height relative to the font size
const LINE_HEIGHT: f32 = 1.25;
/// Horizontal inset of the text inside its edit box
pub const TEXT_INSET: f32 = 5.0;
/// Minimum width of the edit box
const MIN_BOX_WIDTH: f32 = 30.0;

/// A text mark in edit, with a blinking caret and a dashed edit box
#[derive(Debug, Clone)]
pub struct TextBuffer {
    x: f32,
    y: f32,
    content: String,
    color: ShapeColor,
    font_size: u32,
    started: Instant,
}

impl TextBuffer {
    pub fn new(x: f32, y: f32, color: ShapeColor, font_size: u32) -> Self {
        Self::started_at(x, y, color, font_size, Instant::now())
    }

    pub fn started_at(x: f32, y: f32, color: ShapeColor, font_size: u32, started: Instant) -> Self {
        Self {
            x,
            y,
            content: String::new(),
            color,
            font_size,
            started,
        }
    }

    /// Apply a keystroke
    pub fn input(&mut self, key: KeyInput) {
        match key {
            KeyInput::Special(SpecialKey::Backspace) => {
                self.content.pop();
            }
            KeyInput::Special(SpecialKey::Tab) | KeyInput::Char('\t') => {
                self.content.push_str("    ");
            }
            KeyInput::Special(SpecialKey::Enter) | KeyInput::Char('\n') | KeyInput::Char('\r') => {
                self.content.push('\n');
            }
            KeyInput::Char(c) if !c.is_control() => self.content.push(c),
            KeyInput::Char(_) | KeyInput::Special(SpecialKey::Other) => {}
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Whether the caret is drawn at `now`; it toggles every blink period
    pub fn caret_visible(&self, now: Instant) -> bool {
        caret_phase(now.saturating_duration_since(self.started))
    }

    /// Dashed edit box `(x0, y0, x1, y1)`, grown to fit the content and caret
    pub fn edit_box(&self) -> (f32, f32, f32, f32) {
        let size = self.font_size as f32;
        let lines: Vec<&str> = self.content.split('\n').collect();
        let widest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        // One extra advance for the caret
        let text_width = (widest + 1) as f32 * size * GLYPH_ADVANCE;
        let text_height = lines.len() as f32 * size * LINE_HEIGHT;

        let x1 = self.x + (TEXT_INSET + text_width + 10.0).max(MIN_BOX_WIDTH);
        let y1 = self.y + text_height + 5.0;
        (self.x, self.y, x1, y1)
    }

    /// Caret as a vertical segment `(x, top, bottom)` after the last glyph
    pub fn caret_line(&self) -> (f32, f32, f32) {
        let size = self.font_size as f32;
        let line_count = self.content.split('\n').count();
        let last_len = self
            .content
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        let x = self.x + TEXT_INSET + last_len as f32 * size * GLYPH_ADVANCE;
        let top = self.y + (line_count - 1) as f32 * size * LINE_HEIGHT;
        (x, top, top + size * LINE_HEIGHT)
    }

    /// Finish editing; `None` when only whitespace was typed. Committed
    /// content is kept exactly as typed.
    pub fn finish(self) -> Option<TextMark> {
        if self.content.trim().is_empty() {
            return None;
        }
        Some(TextMark {
            x: self.x,
            y: self.y,
            content: self.content,
            color: self.color,
            font_size: self.font_size,
        })
    }
}

fn caret_phase(elapsed: Duration) -> bool {
    (elapsed.as_millis() / CARET_BLINK.as_millis()) % 2 == 0
}
