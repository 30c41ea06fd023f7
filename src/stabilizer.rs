// Temporal smoothing of per-frame emotion labels

use crate::error::{Result, SteadyEmotionError};
use crate::models::Observation;
use crate::report::SessionReport;
use crate::window::RecentWindow;
use tracing::{debug, info, warn};

/// Tunables for the smoothing policy
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerConfig {
    /// Number of recent raw labels the majority vote looks at
    pub window_capacity: usize,
    /// Minimum seconds between two accepted transitions; 0 disables the gate
    pub cooldown_secs: f64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            window_capacity: 10,
            cooldown_secs: 5.0,
        }
    }
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_capacity == 0 {
            return Err(SteadyEmotionError::Config(
                "window capacity must be at least 1".to_string(),
            ));
        }
        if !self.cooldown_secs.is_finite() || self.cooldown_secs < 0.0 {
            return Err(SteadyEmotionError::Config(format!(
                "cooldown must be a non-negative number of seconds, got {}",
                self.cooldown_secs
            )));
        }
        Ok(())
    }
}

/// Cumulative seconds and frame counts per stabilized emotion.
///
/// Entries keep the order in which each emotion first became current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionAccounting {
    durations: Vec<(String, f64)>,
    counts: Vec<(String, u64)>,
}

impl EmotionAccounting {
    fn add_duration(&mut self, emotion: &str, secs: f64) {
        match self.durations.iter_mut().find(|(label, _)| label == emotion) {
            Some((_, total)) => *total += secs,
            None => self.durations.push((emotion.to_string(), secs)),
        }
    }

    fn count_frame(&mut self, emotion: &str) {
        match self.counts.iter_mut().find(|(label, _)| label == emotion) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((emotion.to_string(), 1)),
        }
    }

    pub fn duration(&self, emotion: &str) -> f64 {
        self.durations
            .iter()
            .find(|(label, _)| label == emotion)
            .map_or(0.0, |(_, secs)| *secs)
    }

    pub fn count(&self, emotion: &str) -> u64 {
        self.counts
            .iter()
            .find(|(label, _)| label == emotion)
            .map_or(0, |(_, count)| *count)
    }

    pub fn durations(&self) -> &[(String, f64)] {
        &self.durations
    }

    pub fn counts(&self) -> &[(String, u64)] {
        &self.counts
    }

    pub fn total_duration(&self) -> f64 {
        self.durations.iter().map(|(_, secs)| secs).sum()
    }
}

/// Session timestamps, all in seconds on one monotonic time base
#[derive(Debug, Clone)]
struct SessionClock {
    session_start: f64,
    emotion_start: f64,
    last_update: Option<f64>,
    first_transition: Option<f64>,
    last_seen: f64,
}

impl SessionClock {
    fn new(session_start: f64) -> Self {
        Self {
            session_start,
            emotion_start: session_start,
            last_update: None,
            first_transition: None,
            last_seen: session_start,
        }
    }

    fn advance(&mut self, now: f64) -> Result<()> {
        if !now.is_finite() || now < self.last_seen {
            return Err(SteadyEmotionError::NonMonotonicTime {
                previous: self.last_seen,
                now,
            });
        }
        self.last_seen = now;
        Ok(())
    }
}

/// Smooths a stream of raw labels into a stable current emotion and keeps
/// per-emotion duration and frame-count accounting.
///
/// One instance per label stream; not meant to be shared across threads.
#[derive(Debug, Clone)]
pub struct EmotionStabilizer {
    config: StabilizerConfig,
    window: RecentWindow,
    current: Option<String>,
    accounting: EmotionAccounting,
    clock: SessionClock,
    finalized_at: Option<f64>,
}

impl EmotionStabilizer {
    /// Creates a stabilizer for a session starting at `session_start` seconds
    pub fn new(config: StabilizerConfig, session_start: f64) -> Result<Self> {
        config.validate()?;
        if !session_start.is_finite() {
            return Err(SteadyEmotionError::Config(format!(
                "session start must be finite, got {session_start}"
            )));
        }

        Ok(Self {
            window: RecentWindow::new(config.window_capacity),
            config,
            current: None,
            accounting: EmotionAccounting::default(),
            clock: SessionClock::new(session_start),
            finalized_at: None,
        })
    }

    /// Feeds one classified frame and returns the stabilized emotion after it
    pub fn observe(&mut self, raw_label: &str, now: f64) -> Result<Observation> {
        if self.finalized_at.is_some() {
            warn!("Frame '{}' observed after finalize, rejecting", raw_label);
            return Err(SteadyEmotionError::InvalidState(
                "cannot observe frames after the session was finalized".to_string(),
            ));
        }
        self.clock.advance(now)?;

        self.window.push(raw_label);
        let majority = self.window.majority().map(str::to_string);
        let transitioned = match majority {
            Some(majority)
                if self.current.as_ref() != Some(&majority) && self.cooldown_elapsed(now) =>
            {
                self.transition(majority, now);
                true
            }
            _ => false,
        };

        // the window is never empty here, so the first frame always sets an emotion
        if let Some(current) = &self.current {
            self.accounting.count_frame(current);
        }
        debug!(
            "Frame at {:.3}s: raw={} stabilized={:?}",
            now, raw_label, self.current
        );

        Ok(Observation::new(self.current.clone(), transitioned))
    }

    /// Closes the open emotion interval. Accepted exactly once.
    pub fn finalize(&mut self, now: f64) -> Result<SessionReport> {
        if let Some(at) = self.finalized_at {
            return Err(SteadyEmotionError::InvalidState(format!(
                "session already finalized at {at:.3}s"
            )));
        }
        self.clock.advance(now)?;

        if let Some(emotion) = &self.current {
            self.accounting
                .add_duration(emotion, now - self.clock.emotion_start);
        }
        self.finalized_at = Some(now);

        info!(
            "Session finalized after {:.2}s, {} emotion(s) accounted",
            now - self.clock.session_start,
            self.accounting.durations().len()
        );
        Ok(self.report())
    }

    /// Snapshot of the accounting; the open interval is only included after finalize
    pub fn report(&self) -> SessionReport {
        SessionReport::from_accounting(
            &self.accounting,
            self.finalized_at.map(|at| at - self.clock.session_start),
        )
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn window(&self) -> &RecentWindow {
        &self.window
    }

    pub fn accounting(&self) -> &EmotionAccounting {
        &self.accounting
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    /// Timestamp of the first accepted transition, if any
    pub fn first_transition_at(&self) -> Option<f64> {
        self.clock.first_transition
    }

    /// Timestamp of the most recent accepted transition, if any
    pub fn last_transition_at(&self) -> Option<f64> {
        self.clock.last_update
    }

    fn cooldown_elapsed(&self, now: f64) -> bool {
        match self.clock.last_update {
            None => true,
            Some(_) if self.config.cooldown_secs == 0.0 => true,
            Some(last) => now - last > self.config.cooldown_secs,
        }
    }

    fn transition(&mut self, next: String, now: f64) {
        if let Some(previous) = &self.current {
            let held = now - self.clock.emotion_start;
            self.accounting.add_duration(previous, held);
            info!("Emotion {} -> {} after {:.2}s", previous, next, held);
        } else {
            info!("Initial emotion {} at {:.2}s", next, now);
            self.clock.first_transition = Some(now);
        }
        // registers the emotion so report order follows first acceptance
        self.accounting.add_duration(&next, 0.0);

        self.current = Some(next);
        self.clock.emotion_start = now;
        self.clock.last_update = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stabilizer(capacity: usize, cooldown: f64) -> EmotionStabilizer {
        EmotionStabilizer::new(
            StabilizerConfig {
                window_capacity: capacity,
                cooldown_secs: cooldown,
            },
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = StabilizerConfig::default();
        assert_eq!(config.window_capacity, 10);
        assert_eq!(config.cooldown_secs, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_config() {
        let zero = StabilizerConfig {
            window_capacity: 0,
            cooldown_secs: 5.0,
        };
        assert!(matches!(
            EmotionStabilizer::new(zero, 0.0),
            Err(SteadyEmotionError::Config(_))
        ));

        let negative = StabilizerConfig {
            window_capacity: 10,
            cooldown_secs: -1.0,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_first_transition_skips_cooldown() {
        let mut s = stabilizer(10, 5.0);
        let obs = s.observe("neutral", 0.0).unwrap();
        assert_eq!(obs.emotion.as_deref(), Some("neutral"));
        assert!(obs.transitioned);
        assert_eq!(s.first_transition_at(), Some(0.0));
    }

    #[test]
    fn test_majority_scenario_without_cooldown() {
        let mut s = stabilizer(3, 0.0);
        s.observe("happy", 0.0).unwrap();
        s.observe("happy", 1.0).unwrap();
        let obs = s.observe("sad", 2.0).unwrap();
        assert_eq!(s.window().majority(), Some("happy"));
        assert_eq!(obs.emotion.as_deref(), Some("happy"));
        assert!(!obs.transitioned);
        assert_eq!(s.last_transition_at(), Some(0.0));
    }

    #[test]
    fn test_cooldown_blocks_transition() {
        let mut s = stabilizer(3, 5.0);
        s.observe("happy", 0.0).unwrap();
        for t in [1.0, 2.0, 3.0, 4.0, 5.0] {
            let obs = s.observe("sad", t).unwrap();
            assert_eq!(obs.emotion.as_deref(), Some("happy"), "t={t}");
        }
        let obs = s.observe("sad", 5.5).unwrap();
        assert!(obs.transitioned);
        assert_eq!(obs.emotion.as_deref(), Some("sad"));
        assert_eq!(s.accounting().duration("happy"), 5.5);
    }

    #[test]
    fn test_counts_follow_stabilized_emotion() {
        let mut s = stabilizer(10, 5.0);
        s.observe("happy", 0.0).unwrap();
        s.observe("sad", 0.1).unwrap();
        s.observe("sad", 0.2).unwrap();
        assert_eq!(s.accounting().count("happy"), 3);
        assert_eq!(s.accounting().count("sad"), 0);
    }

    #[test]
    fn test_every_frame_is_counted() {
        let mut s = stabilizer(2, 0.0);
        let labels = ["happy", "sad", "sad", "angry", "angry", "happy"];
        for (i, label) in labels.iter().enumerate() {
            s.observe(label, i as f64).unwrap();
        }
        let total: u64 = s.accounting().counts().iter().map(|(_, c)| c).sum();
        assert_eq!(total, labels.len() as u64);
    }

    #[test]
    fn test_finalize_flushes_open_interval() {
        let mut s = stabilizer(10, 5.0);
        s.observe("neutral", 0.0).unwrap();
        let report = s.finalize(10.0).unwrap();
        assert_eq!(report.duration("neutral"), Some(10.0));
        assert_eq!(report.count("neutral"), 1);
        assert_eq!(report.session_secs, Some(10.0));
    }

    #[test]
    fn test_finalize_twice_is_rejected() {
        let mut s = stabilizer(10, 5.0);
        s.observe("neutral", 0.0).unwrap();
        s.finalize(10.0).unwrap();
        let before = s.report();
        assert!(matches!(
            s.finalize(20.0),
            Err(SteadyEmotionError::InvalidState(_))
        ));
        assert_eq!(s.report(), before);
    }

    #[test]
    fn test_observe_after_finalize_is_rejected() {
        let mut s = stabilizer(10, 5.0);
        s.finalize(1.0).unwrap();
        assert!(matches!(
            s.observe("happy", 2.0),
            Err(SteadyEmotionError::InvalidState(_))
        ));
        assert!(s.window().is_empty());
    }

    #[test]
    fn test_time_going_backwards_is_rejected() {
        let mut s = stabilizer(10, 5.0);
        s.observe("happy", 3.0).unwrap();
        let err = s.observe("sad", 2.0).unwrap_err();
        assert!(matches!(err, SteadyEmotionError::NonMonotonicTime { .. }));
        assert_eq!(s.window().len(), 1);
        assert!(s.finalize(2.5).is_err());
        assert!(s.finalize(3.0).is_ok());
    }

    #[test]
    fn test_infinite_timestamps_are_rejected() {
        let mut s = stabilizer(10, 5.0);
        s.observe("happy", 1.0).unwrap();
        assert!(matches!(
            s.observe("sad", f64::INFINITY),
            Err(SteadyEmotionError::NonMonotonicTime { .. })
        ));
        assert!(s.observe("sad", f64::NAN).is_err());
        assert!(s.finalize(f64::INFINITY).is_err());
        assert_eq!(s.window().len(), 1);

        let report = s.finalize(3.0).unwrap();
        assert_eq!(report.duration("happy"), Some(2.0));
    }

    #[test]
    fn test_zero_cooldown_allows_transitions_at_same_timestamp() {
        let mut s = stabilizer(1, 0.0);
        s.observe("happy", 0.0).unwrap();
        assert!(s.observe("sad", 2.0).unwrap().transitioned);
        let obs = s.observe("angry", 2.0).unwrap();
        assert!(obs.transitioned);
        assert_eq!(obs.emotion.as_deref(), Some("angry"));
        assert_eq!(s.last_transition_at(), Some(2.0));

        let report = s.finalize(4.0).unwrap();
        assert_eq!(report.duration("happy"), Some(2.0));
        assert_eq!(report.duration("sad"), None);
        assert_eq!(report.count("sad"), 1);
        assert_eq!(report.duration("angry"), Some(2.0));
    }

    #[test]
    fn test_equal_timestamps_are_allowed() {
        let mut s = stabilizer(10, 5.0);
        s.observe("happy", 1.0).unwrap();
        s.observe("happy", 1.0).unwrap();
        assert_eq!(s.accounting().count("happy"), 2);
    }
}
