// Tint colors and canned responses keyed by stabilized emotion

use crate::models::KnownEmotion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Response used for unmapped emotions and before any emotion is set
pub const FALLBACK_FEEDBACK: &str = "Stay balanced and keep going!";

/// Default weight of the tint when blended over a frame
pub const DEFAULT_TINT_ALPHA: f32 = 0.3;

/// RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Color overlay for a frame: `alpha * color + (1 - alpha) * pixel`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub color: Rgb,
    pub alpha: f32,
}

impl Tint {
    /// Blends one RGB pixel with the tint color
    pub fn blend(&self, pixel: Rgb) -> Rgb {
        let mix = |tint: u8, base: u8| -> u8 {
            (self.alpha * tint as f32 + (1.0 - self.alpha) * base as f32)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb(
            mix(self.color.0, pixel.0),
            mix(self.color.1, pixel.1),
            mix(self.color.2, pixel.2),
        )
    }
}

/// Tint color for an emotion, if it has one
pub fn tint_color(emotion: KnownEmotion) -> Option<Rgb> {
    match emotion {
        KnownEmotion::Happy => Some(Rgb(0, 255, 0)),
        KnownEmotion::Sad => Some(Rgb(0, 0, 255)),
        KnownEmotion::Angry => Some(Rgb(255, 0, 0)),
        KnownEmotion::Surprise => Some(Rgb(0, 255, 255)),
        _ => None,
    }
}

/// Canned responses for an emotion; empty when only the fallback applies
pub fn responses(emotion: KnownEmotion) -> &'static [&'static str] {
    match emotion {
        KnownEmotion::Happy => &["Keep up the positive energy!", "Happiness looks great on you!"],
        KnownEmotion::Sad => &[
            "Take a deep breath. It's okay to feel down sometimes.",
            "Consider doing something you enjoy!",
        ],
        KnownEmotion::Angry => &["Take a few calming breaths.", "It might help to take a quick walk!"],
        KnownEmotion::Surprise => &["You look pleasantly surprised!", "Stay curious!"],
        _ => &[],
    }
}

/// Chooses tints and feedback lines for the stabilized emotion.
///
/// The random source is injected so sessions can be replayed deterministically.
pub struct FeedbackPicker<R: Rng> {
    rng: R,
    tint_alpha: f32,
}

impl FeedbackPicker<StdRng> {
    /// Reproducible picker
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FeedbackPicker<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            tint_alpha: DEFAULT_TINT_ALPHA,
        }
    }

    pub fn with_tint_alpha(mut self, alpha: f32) -> Self {
        self.tint_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Tint for a stabilized emotion label; None for unmapped or unset emotions
    pub fn tint(&self, emotion: Option<&str>) -> Option<Tint> {
        let color = tint_color(KnownEmotion::from_label(emotion?)?)?;
        Some(Tint {
            color,
            alpha: self.tint_alpha,
        })
    }

    /// Random canned response for a stabilized emotion label
    pub fn feedback(&mut self, emotion: Option<&str>) -> &'static str {
        let options = emotion
            .and_then(KnownEmotion::from_label)
            .map(responses)
            .unwrap_or(&[]);
        options
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_FEEDBACK)
    }
}
