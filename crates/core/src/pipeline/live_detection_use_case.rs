use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::capture::domain::frame_display::FrameDisplay;
use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::face_eye_detector::FaceEyeDetector;
use crate::overlay::domain::eye_marker::EyeMarker;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::constants::{
    DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_KEY_POLL_MS, ESCAPE_KEY,
};
use crate::shared::frame::Frame;

use super::pipeline_logger::PipelineLogger;

/// What the escape key does while the feed is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeAction {
    /// Log a lag warning and keep going.
    #[default]
    Warn,
    /// End the session.
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopSettings {
    pub display_width: i32,
    pub display_height: i32,
    pub key_poll_ms: i32,
    pub escape_action: EscapeAction,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            key_poll_ms: DEFAULT_KEY_POLL_MS,
            escape_action: EscapeAction::Warn,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A read failed or produced an empty frame.
    CaptureFailed(String),
    /// A finite source ran out of frames.
    SourceExhausted,
    EscapePressed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub frames_processed: usize,
    pub faces_detected: usize,
    pub eyes_detected: usize,
    pub stop_reason: StopReason,
}

/// The capture loop: read → detect faces → draw → detect eyes per face →
/// draw → resize → show → poll key, one frame at a time.
///
/// Single-use in spirit: `execute` opens the source and releases it on
/// every exit path, successful or not.
pub struct LiveDetectionUseCase {
    source: Box<dyn FrameSource>,
    detector: FaceEyeDetector,
    renderer: Box<dyn OverlayRenderer>,
    display: Box<dyn FrameDisplay>,
    logger: Box<dyn PipelineLogger>,
    settings: LoopSettings,
}

impl LiveDetectionUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: FaceEyeDetector,
        renderer: Box<dyn OverlayRenderer>,
        display: Box<dyn FrameDisplay>,
        logger: Box<dyn PipelineLogger>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            detector,
            renderer,
            display,
            logger,
            settings,
        }
    }

    pub fn execute(&mut self) -> Result<SessionReport, Box<dyn std::error::Error>> {
        let result = self.run();
        self.source.release();
        self.display.close();
        self.logger.summary();
        result
    }

    fn run(&mut self) -> Result<SessionReport, Box<dyn std::error::Error>> {
        self.source.open()?;
        self.logger.info("Capture started");

        let mut frames_processed = 0;
        let mut faces_detected = 0;
        let mut eyes_detected = 0;

        let stop_reason = loop {
            let started = Instant::now();
            let mut frame = match self.source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::SourceExhausted,
                Err(e) => {
                    log::error!("Frames aren't being captured: {e}");
                    break StopReason::CaptureFailed(e.to_string());
                }
            };
            self.logger.timing("capture", elapsed_ms(started));

            let (faces, eyes) = self.annotate(&mut frame)?;
            faces_detected += faces;
            eyes_detected += eyes;
            self.logger.metric("faces", faces as f64);
            self.logger.metric("eyes", eyes as f64);

            let started = Instant::now();
            let shown = frame.resized(self.settings.display_width, self.settings.display_height)?;
            self.display.show(&shown)?;
            let key = self.display.poll_key(self.settings.key_poll_ms)?;
            self.logger.timing("display", elapsed_ms(started));

            frames_processed += 1;
            self.logger.frame_done(frames_processed);

            if key == Some(ESCAPE_KEY) {
                match self.settings.escape_action {
                    EscapeAction::Warn => log::warn!(
                        "Too much lag occurred, try closing other applications to free some memory"
                    ),
                    EscapeAction::Quit => break StopReason::EscapePressed,
                }
            }
        };

        log::info!("Capture stopped after {frames_processed} frames: {stop_reason:?}");
        Ok(SessionReport {
            frames_processed,
            faces_detected,
            eyes_detected,
            stop_reason,
        })
    }

    /// Draws every face and its eyes onto `frame`. Returns `(faces, eyes)`.
    fn annotate(
        &mut self,
        frame: &mut Frame,
    ) -> Result<(usize, usize), Box<dyn std::error::Error>> {
        let started = Instant::now();
        let scan = self.detector.detect_faces(frame)?;
        let mut detect_ms = elapsed_ms(started);
        let mut draw_ms = 0.0;
        let mut eye_count = 0;

        for face in &scan.faces {
            let started = Instant::now();
            self.renderer.draw_face(frame, face)?;
            draw_ms += elapsed_ms(started);

            let started = Instant::now();
            let roi = scan.face_roi(face)?;
            let eyes = self.detector.detect_eyes(&roi)?;
            detect_ms += elapsed_ms(started);

            let started = Instant::now();
            for eye in &eyes {
                self.renderer
                    .draw_eye(frame, &EyeMarker::from_face_local(face, eye))?;
            }
            draw_ms += elapsed_ms(started);
            eye_count += eyes.len();
        }

        self.logger.timing("detect", detect_ms);
        self.logger.timing("draw", draw_ms);
        Ok((scan.faces.len(), eye_count))
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
