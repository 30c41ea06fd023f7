// Per-frame session driver: stabilizer + feedback selection

use crate::config::Config;
use crate::error::Result;
use crate::feedback::{FeedbackPicker, Tint};
use crate::models::LabelFrame;
use crate::report::SessionReport;
use crate::source::LabelSource;
use crate::stabilizer::{EmotionStabilizer, StabilizerConfig};
use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::info;

/// What the display layer needs to annotate one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotation {
    /// Stabilized emotion, None before the first accepted transition
    pub emotion: Option<String>,
    pub tint: Option<Tint>,
    pub feedback: &'static str,
    /// Whether this frame changed the stabilized emotion
    pub transitioned: bool,
}

/// One camera session: owns the stabilizer and the feedback picker
pub struct Session<R: Rng = StdRng> {
    stabilizer: EmotionStabilizer,
    picker: FeedbackPicker<R>,
    frames: u64,
    last_timestamp: f64,
}

impl Session<StdRng> {
    /// Builds a session from application config; seeded feedback when configured
    pub fn from_config(config: &Config, session_start: f64) -> Result<Self> {
        config.validate()?;
        let picker = match config.feedback_seed {
            Some(seed) => FeedbackPicker::from_seed(seed),
            None => FeedbackPicker::from_entropy(),
        }
        .with_tint_alpha(config.tint_alpha);
        Self::new(config.stabilizer(), picker, session_start)
    }
}

impl<R: Rng> Session<R> {
    pub fn new(
        stabilizer_config: StabilizerConfig,
        picker: FeedbackPicker<R>,
        session_start: f64,
    ) -> Result<Self> {
        Ok(Self {
            stabilizer: EmotionStabilizer::new(stabilizer_config, session_start)?,
            picker,
            frames: 0,
            last_timestamp: session_start,
        })
    }

    /// Runs one classified frame through the stabilizer and picks its annotation
    pub fn process(&mut self, frame: &LabelFrame) -> Result<FrameAnnotation> {
        let observation = self.stabilizer.observe(&frame.label, frame.timestamp)?;
        self.frames += 1;
        self.last_timestamp = frame.timestamp;

        let emotion = observation.emotion.as_deref();
        Ok(FrameAnnotation {
            tint: self.picker.tint(emotion),
            feedback: self.picker.feedback(emotion),
            emotion: observation.emotion,
            transitioned: observation.transitioned,
        })
    }

    /// Finalizes the accounting at `now`
    pub fn finish(&mut self, now: f64) -> Result<SessionReport> {
        info!("Finishing session after {} frame(s)", self.frames);
        self.stabilizer.finalize(now)
    }

    pub fn stabilizer(&self) -> &EmotionStabilizer {
        &self.stabilizer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Timestamp of the most recent processed frame (session start if none)
    pub fn last_timestamp(&self) -> f64 {
        self.last_timestamp
    }

    /// Drains frames from a channel until the sender side closes, handing each
    /// annotation to `on_frame`
    pub async fn drain<F>(
        &mut self,
        receiver: &mut mpsc::Receiver<LabelFrame>,
        mut on_frame: F,
    ) -> Result<()>
    where
        F: FnMut(&FrameAnnotation),
    {
        while let Some(frame) = receiver.recv().await {
            let annotation = self.process(&frame)?;
            on_frame(&annotation);
        }
        Ok(())
    }
}

/// Forwards frames from a source into the session channel until the source
/// ends or the session stops listening
pub async fn pump<S: LabelSource>(mut source: S, sender: mpsc::Sender<LabelFrame>) -> Result<()> {
    while let Some(frame) = source.next_frame().await? {
        if sender.send(frame).await.is_err() {
            break;
        }
    }
    Ok(())
}
