// End-of-session report: durations and frequency per stabilized emotion

use crate::error::Result;
use crate::models::display_name;
use crate::stabilizer::EmotionAccounting;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seconds spent in one stabilized emotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionDuration {
    pub emotion: String,
    pub seconds: f64,
}

/// Frames attributed to one stabilized emotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub emotion: String,
    pub frames: u64,
}

/// Accounting snapshot handed to whatever prints or charts the session.
///
/// Entries are ordered by when each emotion first became current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Emotions with non-zero accumulated duration
    pub durations: Vec<EmotionDuration>,
    /// Frame counts for every emotion that was ever current
    pub counts: Vec<EmotionCount>,
    /// Finalize time minus session start, None until finalized
    pub session_secs: Option<f64>,
}

impl SessionReport {
    pub fn from_accounting(accounting: &EmotionAccounting, session_secs: Option<f64>) -> Self {
        let durations = accounting
            .durations()
            .iter()
            .filter(|(_, secs)| *secs > 0.0)
            .map(|(emotion, secs)| EmotionDuration {
                emotion: emotion.clone(),
                seconds: *secs,
            })
            .collect();
        let counts = accounting
            .counts()
            .iter()
            .map(|(emotion, frames)| EmotionCount {
                emotion: emotion.clone(),
                frames: *frames,
            })
            .collect();

        Self {
            durations,
            counts,
            session_secs,
        }
    }

    pub fn duration(&self, emotion: &str) -> Option<f64> {
        self.durations
            .iter()
            .find(|d| d.emotion == emotion)
            .map(|d| d.seconds)
    }

    pub fn count(&self, emotion: &str) -> u64 {
        self.counts
            .iter()
            .find(|c| c.emotion == emotion)
            .map_or(0, |c| c.frames)
    }

    pub fn total_duration(&self) -> f64 {
        self.durations.iter().map(|d| d.seconds).sum()
    }

    pub fn total_frames(&self) -> u64 {
        self.counts.iter().map(|c| c.frames).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty() && self.counts.is_empty()
    }

    /// One "<Emotion> Duration: <secs> seconds" line per emotion
    pub fn summary_lines(&self) -> Vec<String> {
        self.durations
            .iter()
            .map(|d| {
                format!(
                    "{} Duration: {:.2} seconds",
                    display_name(&d.emotion),
                    d.seconds
                )
            })
            .collect()
    }

    /// Horizontal text bar chart of frame counts, longest bar `width` cells
    pub fn frequency_chart(&self, width: usize) -> String {
        let mut chart = String::from("Emotion Timeline (frequency)\n");
        let Some(max) = self.counts.iter().map(|c| c.frames).max() else {
            chart.push_str("  (no frames)\n");
            return chart;
        };
        let label_width = self
            .counts
            .iter()
            .map(|c| c.emotion.chars().count())
            .max()
            .unwrap_or(0);

        for c in &self.counts {
            // counts are never zero; keep at least one cell so short bars stay visible
            let cells = ((c.frames as f64 / max as f64 * width as f64).round() as usize).max(1);
            chart.push_str(&format!(
                "  {:<label_width$} | {} {}\n",
                display_name(&c.emotion),
                "#".repeat(cells),
                c.frames,
            ));
        }
        chart
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
