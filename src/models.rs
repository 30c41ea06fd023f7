// Core data models for the emotion stabilizer

use serde::{Deserialize, Serialize};

/// One classified frame: the raw label and when it was observed
#[derive(Clone, Debug, PartialEq)]
pub struct LabelFrame {
    /// Raw emotion label from the classifier
    pub label: String,
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
}

impl LabelFrame {
    /// Creates a new LabelFrame with the given parameters
    pub fn new(label: impl Into<String>, timestamp: f64) -> Self {
        Self {
            label: label.into(),
            timestamp,
        }
    }
}

/// The labels the face-analysis classifier emits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownEmotion {
    Happy,
    Sad,
    Angry,
    Surprise,
    Neutral,
    Fear,
    Disgust,
}

impl KnownEmotion {
    pub const ALL: [KnownEmotion; 7] = [
        KnownEmotion::Happy,
        KnownEmotion::Sad,
        KnownEmotion::Angry,
        KnownEmotion::Surprise,
        KnownEmotion::Neutral,
        KnownEmotion::Fear,
        KnownEmotion::Disgust,
    ];

    /// Label string as produced by the classifier
    pub fn as_label(&self) -> &'static str {
        match self {
            KnownEmotion::Happy => "happy",
            KnownEmotion::Sad => "sad",
            KnownEmotion::Angry => "angry",
            KnownEmotion::Surprise => "surprise",
            KnownEmotion::Neutral => "neutral",
            KnownEmotion::Fear => "fear",
            KnownEmotion::Disgust => "disgust",
        }
    }

    /// Exact lookup of a classifier label; None for anything outside the set.
    /// Use `FromStr` for lenient parsing of user input.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|emotion| emotion.as_label() == label)
    }
}

impl std::fmt::Display for KnownEmotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownEmotion::Happy => write!(f, "Happy"),
            KnownEmotion::Sad => write!(f, "Sad"),
            KnownEmotion::Angry => write!(f, "Angry"),
            KnownEmotion::Surprise => write!(f, "Surprise"),
            KnownEmotion::Neutral => write!(f, "Neutral"),
            KnownEmotion::Fear => write!(f, "Fear"),
            KnownEmotion::Disgust => write!(f, "Disgust"),
        }
    }
}

impl std::str::FromStr for KnownEmotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "surprise" | "surprised" => Ok(Self::Surprise),
            "neutral" => Ok(Self::Neutral),
            "fear" | "scared" => Ok(Self::Fear),
            "disgust" | "disgusted" => Ok(Self::Disgust),
            _ => Err(format!("Unknown emotion: {s}")),
        }
    }
}

/// Result of feeding one frame to the stabilizer
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Stabilized emotion after this frame, None until the first transition
    pub emotion: Option<String>,
    /// Whether this frame caused a transition
    pub transitioned: bool,
}

impl Observation {
    pub fn new(emotion: Option<String>, transitioned: bool) -> Self {
        Self {
            emotion,
            transitioned,
        }
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.emotion {
            Some(emotion) => write!(f, "{}", display_name(emotion)),
            None => write!(f, "None"),
        }
    }
}

/// Capitalizes a label for display ("happy" -> "Happy")
pub fn display_name(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
