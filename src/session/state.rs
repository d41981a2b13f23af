//! Capture session controller
//!
//! Owns the interactive state of one capture: the full-screen backdrop, the
//! selection machine, the annotation engine once the region is frozen, and
//! the recorder. The UI layer feeds it pointer and key events and reads back
//! the region, cursor, marks and recorder status.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use super::messages::{DrawMsg, KeyInput, PointerEvent};
use super::selection::{SelectionMachine, SelectionOutcome};
use crate::annotations::handlers::handle_draw_msg;
use crate::annotations::{AnnotationEngine, TextBuffer};
use crate::capture::{self, ScreenGrabber};
use crate::config::{CaptureMode, Settings, ToolSettings};
use crate::domain::{CursorGlyph, HandleDot, Mark, MarkKind, MaskRects, Rect};
use crate::error::SessionError;
use crate::render::{self, NoText, TextPainter};
use crate::screencast::{
    RecordRequest, RecorderController, RecorderIo, RecordingOutcome, StatusSnapshot,
};
use crate::surface::{OverlaySurface, SaveDestination};

/// What a routed event did, for the UI to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Event handled by the selection machine
    Selection(SelectionOutcome),
    /// The mark in progress changed
    Drawing,
    /// The committed mark list changed
    MarksChanged,
    /// A still was exported to this path
    Exported(PathBuf),
    /// The whole session was cancelled
    Cancelled,
    Ignored,
}

/// One interactive capture, from region selection to export or recording
pub struct CaptureSession {
    grabber: Arc<dyn ScreenGrabber>,
    backdrop: RgbaImage,
    settings: ToolSettings,
    export_dir: Option<PathBuf>,
    selection: SelectionMachine,
    annotations: Option<AnnotationEngine>,
    tool: Option<MarkKind>,
    text_painter: Box<dyn TextPainter + Send>,
    recorder: RecorderController,
}

impl CaptureSession {
    /// Start a session: grab the full-screen backdrop and wait for a region
    pub fn new(grabber: Arc<dyn ScreenGrabber>, settings: &Settings) -> Result<Self, SessionError> {
        let (width, height) = grabber.screen_size()?;
        let backdrop = capture::capture_screen(grabber.as_ref())?;
        let tool_settings = settings.tool_settings();
        log::info!("Capture session started on a {}x{} screen", width, height);

        Ok(Self {
            grabber,
            backdrop,
            settings: tool_settings,
            export_dir: settings.export_dir(),
            selection: SelectionMachine::new(width, height, tool_settings.mask_enabled),
            annotations: None,
            tool: None,
            text_painter: Box::new(NoText),
            recorder: RecorderController::new(),
        })
    }

    /// Use `painter` for text glyphs in exported stills
    pub fn with_text_painter(mut self, painter: Box<dyn TextPainter + Send>) -> Self {
        self.text_painter = painter;
        self
    }

    /// Override where `export_still` writes
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Replace the current tool settings. Committed marks keep theirs.
    pub fn update_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
        self.selection.set_mask_enabled(settings.mask_enabled);
        if let Some(engine) = self.annotations.as_mut() {
            engine.set_settings(settings);
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Pick an annotation tool. The region is frozen on first use and any
    /// text in edit is finalized.
    pub fn select_tool(&mut self, kind: MarkKind) -> Result<(), SessionError> {
        let region = self.selection.freeze().ok_or(SessionError::NoRegion)?;
        self.settings.mark_kind = kind;
        let settings = self.settings;
        let engine = self
            .annotations
            .get_or_insert_with(|| AnnotationEngine::new(region, settings));
        engine.finalize_text();
        engine.set_settings(settings);
        self.tool = Some(kind);
        log::debug!("Tool selected: {:?}", kind);
        Ok(())
    }

    pub fn tool(&self) -> Option<MarkKind> {
        self.tool
    }

    /// Route a pointer event to the annotation engine when a tool is active,
    /// to the selection machine otherwise.
    ///
    /// A double click that triggers the still export returns the export's
    /// error, if any.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<SessionEvent, SessionError> {
        if self.selection.is_cancelled() {
            return Ok(SessionEvent::Ignored);
        }
        if let PointerEvent::RightDown { .. } = event {
            self.cancel();
            return Ok(SessionEvent::Cancelled);
        }

        if let (Some(kind), Some(engine)) = (self.tool, self.annotations.as_mut()) {
            let region = engine.region();
            let msg = match event {
                PointerEvent::Down { x, y } if region.contains_point_closed(x, y) => {
                    DrawMsg::Begin {
                        kind,
                        x: x as f32,
                        y: y as f32,
                    }
                }
                PointerEvent::Drag { x, y } => DrawMsg::Update {
                    x: x as f32,
                    y: y as f32,
                },
                PointerEvent::Up { .. } => DrawMsg::Commit,
                _ => return Ok(SessionEvent::Ignored),
            };
            return Ok(if handle_draw_msg(engine, msg) {
                SessionEvent::MarksChanged
            } else {
                SessionEvent::Drawing
            });
        }

        let event = match self.selection.handle(event) {
            SelectionOutcome::TooSmall => {
                log::warn!("Selected region is too small");
                SessionEvent::Selection(SelectionOutcome::TooSmall)
            }
            SelectionOutcome::ExportRequested(_) => {
                let path = self.export_still().inspect_err(|e| {
                    log::error!("Export failed: {}", e);
                })?;
                SessionEvent::Exported(path)
            }
            SelectionOutcome::Cancelled => {
                self.cancel();
                SessionEvent::Cancelled
            }
            outcome => SessionEvent::Selection(outcome),
        };
        Ok(event)
    }

    /// Route a keystroke to the text mark in edit
    pub fn key(&mut self, key: KeyInput) -> bool {
        self.annotations
            .as_mut()
            .is_some_and(|engine| engine.key_input(key))
    }

    /// Finish the text mark in edit
    pub fn finish_text(&mut self) -> bool {
        self.annotations
            .as_mut()
            .is_some_and(|engine| handle_draw_msg(engine, DrawMsg::FinishText))
    }

    /// Remove the most recent mark
    pub fn undo(&mut self) -> Option<Mark> {
        self.annotations.as_mut()?.undo()
    }

    /// Export the committed region with its marks into the export directory
    pub fn export_still(&mut self) -> Result<PathBuf, SessionError> {
        let dir = self.export_dir.clone().ok_or(SessionError::NoExportDir)?;
        let path = capture::image::get_img_path(&dir)?;
        self.export_still_to(&path)
    }

    /// Export the committed region with its marks to `path`
    pub fn export_still_to(&mut self, path: &Path) -> Result<PathBuf, SessionError> {
        if self.selection.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        let region = self.selection.committed().ok_or(SessionError::NoRegion)?;
        if let Some(engine) = self.annotations.as_mut() {
            engine.finalize_text();
        }

        let mut image = capture::capture_region(self.grabber.as_ref(), &region)?;
        render::draw_marks(&mut image, self.marks(), &region, self.text_painter.as_ref());
        capture::image::save_rgba(&image, path)?;
        Ok(path.to_path_buf())
    }

    /// Request for recording the committed region in `mode`
    pub fn record_request(&self, mode: CaptureMode) -> Result<RecordRequest, SessionError> {
        let region = self.selection.committed().ok_or(SessionError::NoRegion)?;
        Ok(RecordRequest::new(region, mode))
    }

    /// Start recording on a background thread
    pub fn start_recording(
        &mut self,
        request: RecordRequest,
        overlay: Box<dyn OverlaySurface>,
        destination: Box<dyn SaveDestination>,
    ) -> Result<(), SessionError> {
        if self.selection.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        let io = RecorderIo {
            grabber: Arc::clone(&self.grabber),
            overlay,
            destination,
        };
        self.recorder.arm(request, io)?;
        Ok(())
    }

    pub fn stop_recording(&self) {
        self.recorder.stop();
    }

    pub fn cancel_recording(&self) {
        self.recorder.cancel();
    }

    pub fn recording_status(&self) -> StatusSnapshot {
        self.recorder.snapshot()
    }

    pub fn recording_label(&self) -> String {
        self.recorder.elapsed_label()
    }

    /// Block until the recorder publishes something or `timeout` passes
    pub fn wait_recording_change(&self, timeout: Duration) -> bool {
        self.recorder.status().wait_for_change(timeout)
    }

    /// Wait for the recording attempt to end
    pub fn finish_recording(&mut self) -> Result<RecordingOutcome, SessionError> {
        Ok(self.recorder.join()?)
    }

    /// Cancel everything: selection, marks and any recording
    pub fn cancel(&mut self) {
        if !self.selection.is_cancelled() {
            self.selection.cancel();
        }
        if let Some(engine) = self.annotations.as_mut() {
            engine.clear();
        }
        self.tool = None;
        self.recorder.cancel();
        log::info!("Capture session cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.selection.is_cancelled()
    }

    pub fn backdrop(&self) -> &RgbaImage {
        &self.backdrop
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    /// Region bounding box, for live size display
    pub fn region(&self) -> Option<Rect> {
        self.selection.region()
    }

    pub fn size_label(&self) -> Option<String> {
        self.selection.size_label()
    }

    pub fn cursor(&self) -> CursorGlyph {
        if self.tool.is_some() {
            CursorGlyph::Crosshair
        } else {
            self.selection.cursor()
        }
    }

    pub fn handle_dots(&self) -> Option<[HandleDot; 8]> {
        self.selection.handle_dots()
    }

    pub fn mask(&self) -> Option<MaskRects> {
        self.selection.mask()
    }

    /// Committed marks, oldest first
    pub fn marks(&self) -> &[Mark] {
        self.annotations
            .as_ref()
            .map(AnnotationEngine::marks)
            .unwrap_or_default()
    }

    pub fn can_undo(&self) -> bool {
        self.annotations
            .as_ref()
            .is_some_and(AnnotationEngine::can_undo)
    }

    pub fn current_mark(&self) -> Option<Mark> {
        self.annotations.as_ref()?.current_mark()
    }

    pub fn text_in_edit(&self) -> Option<&TextBuffer> {
        self.annotations.as_ref()?.text_in_edit()
    }
}
