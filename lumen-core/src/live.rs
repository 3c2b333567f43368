//! Live pipeline status: tempo, running chains, registered events.
//!
//! The poller decides when a round of fetches is due and runs every result
//! through a change detector, so the view is only re-rendered when the
//! backend actually reports something different.

use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Deserialize;

use crate::error::ApiError;
use crate::settings::Settings;

/// Consecutive poll failures between repeated warnings.
const FAILURE_LOG_EVERY: u32 = 30;

// ── Wire views ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainView {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Priority", alias = "priority", default)]
    pub priority: i64,
    #[serde(rename = "TickRate", alias = "tickRate", alias = "tickrate", default)]
    pub tick_rate: i64,
    #[serde(rename = "NumLamps", alias = "numLamps", alias = "numlamps", default)]
    pub num_lamps: i64,
    #[serde(rename = "Output", alias = "output", default)]
    pub output: Option<OutputView>,
    #[serde(rename = "Effects", alias = "effects", default, deserialize_with = "crate::model::null_as_default")]
    pub effects: Vec<EffectView>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputView {
    #[serde(rename = "Type", alias = "type", default)]
    pub output_type: String,
    #[serde(rename = "ChannelMapping", alias = "channelMapping", default)]
    pub channel_mapping: String,
    #[serde(rename = "NumChannelsPerLamp", alias = "numChannelsPerLamp", default)]
    pub num_channels_per_lamp: i64,
    #[serde(rename = "Args", alias = "args", default)]
    pub args: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectView {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Type", alias = "type", default)]
    pub effect_type: String,
    /// Absent means enabled
    #[serde(rename = "Enabled", alias = "enabled", default)]
    pub enabled: Option<bool>,
    #[serde(rename = "Group", alias = "group", default)]
    pub group: Option<String>,
    #[serde(rename = "Args", alias = "args", default)]
    pub args: Option<serde_json::Value>,
}

impl EffectView {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

// ── Change detection ──────────────────────────────────────────────

/// Remembers the last observed value and reports only real changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector<T> {
    last: Option<T>,
}

impl<T: PartialEq> ChangeDetector<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Record `next`. Returns it when it differs from the previous value.
    pub fn observe(&mut self, next: T) -> Option<&T> {
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        self.last = Some(next);
        self.last.as_ref()
    }

    pub fn current(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

/// Logs the first failure of a streak, then every `FAILURE_LOG_EVERY`th,
/// then once on recovery.
#[derive(Debug, Clone, Default)]
pub struct ErrorThrottle {
    streak: u32,
}

impl ErrorThrottle {
    pub fn failure(&mut self, what: &str, err: &ApiError) -> bool {
        self.streak = self.streak.saturating_add(1);
        let log = self.streak == 1 || self.streak % FAILURE_LOG_EVERY == 0;
        if log {
            warn!("{} poll failed ({} in a row): {}", what, self.streak, err);
        }
        log
    }

    pub fn success(&mut self, what: &str) {
        if self.streak > 0 {
            info!("{} poll recovered after {} failures", what, self.streak);
            self.streak = 0;
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }
}

// ── Rendering ─────────────────────────────────────────────────────

pub trait LiveRenderer {
    fn render_tempo(&mut self, bpm: f64);
    fn render_chains(&mut self, chains: &[ChainView]);
    fn render_events(&mut self, events: &[String]);
}

pub fn format_tempo(bpm: f64) -> String {
    format!("{:.2}", bpm)
}

/// What the live pane draws. `revision` counts renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveView {
    pub tempo: Option<String>,
    pub chains: Vec<ChainView>,
    pub events: Vec<String>,
    pub revision: u64,
}

impl LiveView {
    pub fn tempo_text(&self) -> &str {
        self.tempo.as_deref().unwrap_or("--")
    }
}

impl LiveRenderer for LiveView {
    fn render_tempo(&mut self, bpm: f64) {
        self.tempo = Some(format_tempo(bpm));
        self.revision += 1;
    }

    fn render_chains(&mut self, chains: &[ChainView]) {
        self.chains = chains.to_vec();
        self.revision += 1;
    }

    fn render_events(&mut self, events: &[String]) {
        self.events = events.to_vec();
        self.revision += 1;
    }
}

// ── Poller ────────────────────────────────────────────────────────

pub struct LivePoller {
    interval: Duration,
    tempo_step: f64,
    next_poll: Option<Instant>,
    tempo: ChangeDetector<f64>,
    chains: ChangeDetector<Vec<ChainView>>,
    events: ChangeDetector<Vec<String>>,
    tempo_errors: ErrorThrottle,
    chain_errors: ErrorThrottle,
    event_errors: ErrorThrottle,
}

impl LivePoller {
    pub fn new(interval: Duration, tempo_step: f64) -> Self {
        Self {
            interval,
            tempo_step,
            next_poll: None,
            tempo: ChangeDetector::new(),
            chains: ChangeDetector::new(),
            events: ChangeDetector::new(),
            tempo_errors: ErrorThrottle::default(),
            chain_errors: ErrorThrottle::default(),
            event_errors: ErrorThrottle::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.poll_interval(), settings.tempo_step)
    }

    /// True once per interval. The first call is always due.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_poll {
            Some(at) if now < at => false,
            _ => {
                self.next_poll = Some(now + self.interval);
                true
            }
        }
    }

    pub fn current_tempo(&self) -> Option<f64> {
        self.tempo.current().copied()
    }

    /// Tempo one step up (`direction > 0`) or down from the last known value.
    pub fn tempo_target(&self, direction: i8) -> Option<f64> {
        self.current_tempo().map(|bpm| bpm + self.tempo_step * f64::from(direction.signum()))
    }

    pub fn apply_tempo(&mut self, result: Result<f64, ApiError>, view: &mut dyn LiveRenderer) -> bool {
        match result {
            Ok(bpm) => {
                self.tempo_errors.success("tempo");
                match self.tempo.observe(bpm) {
                    Some(bpm) => {
                        view.render_tempo(*bpm);
                        true
                    }
                    None => false,
                }
            }
            Err(e) => {
                self.tempo_errors.failure("tempo", &e);
                false
            }
        }
    }

    /// Result of a tempo write. The confirmed value is shown immediately
    /// rather than on the next poll; errors go back to the caller.
    pub fn apply_tempo_write(&mut self, result: Result<f64, ApiError>, view: &mut dyn LiveRenderer) -> Result<f64, ApiError> {
        let bpm = result?;
        if let Some(bpm) = self.tempo.observe(bpm) {
            view.render_tempo(*bpm);
        }
        Ok(bpm)
    }

    pub fn apply_chains(&mut self, result: Result<Vec<ChainView>, ApiError>, view: &mut dyn LiveRenderer) -> bool {
        match result {
            Ok(chains) => {
                self.chain_errors.success("chains");
                match self.chains.observe(chains) {
                    Some(chains) => {
                        view.render_chains(chains);
                        true
                    }
                    None => false,
                }
            }
            Err(e) => {
                self.chain_errors.failure("chains", &e);
                false
            }
        }
    }

    pub fn apply_events(&mut self, result: Result<Vec<String>, ApiError>, view: &mut dyn LiveRenderer) -> bool {
        match result {
            Ok(events) => {
                self.event_errors.success("events");
                match self.events.observe(events) {
                    Some(events) => {
                        view.render_events(events);
                        true
                    }
                    None => false,
                }
            }
            Err(e) => {
                self.event_errors.failure("events", &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn poller() -> LivePoller {
        LivePoller::new(Duration::from_millis(1000), 5.0)
    }

    fn chains(value: serde_json::Value) -> Vec<ChainView> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn identical_tempo_renders_once() {
        let mut poller = poller();
        let mut view = LiveView::default();
        assert!(poller.apply_tempo(Ok(120.0), &mut view));
        assert!(!poller.apply_tempo(Ok(120.0), &mut view));
        assert!(poller.apply_tempo(Ok(125.0), &mut view));
        assert_eq!(view.revision, 2);
        assert_eq!(view.tempo_text(), "125.00");
    }

    #[test]
    fn tempo_step_down_renders_confirmed_value() {
        let mut poller = poller();
        let mut view = LiveView::default();
        poller.apply_tempo(Ok(120.0), &mut view);

        let target = poller.tempo_target(-1).unwrap();
        assert_eq!(target, 115.0);
        assert_eq!(poller.apply_tempo_write(Ok(target), &mut view), Ok(115.0));
        assert_eq!(view.tempo_text(), "115.00");
        // the next poll returns the same value and renders nothing
        assert!(!poller.apply_tempo(Ok(115.0), &mut view));
    }

    #[test]
    fn tempo_target_needs_a_known_tempo() {
        assert_eq!(poller().tempo_target(1), None);
    }

    #[test]
    fn failed_tempo_write_keeps_display() {
        let mut poller = poller();
        let mut view = LiveView::default();
        poller.apply_tempo(Ok(90.0), &mut view);
        assert!(poller.apply_tempo_write(Err(ApiError::Tempo("503".into())), &mut view).is_err());
        assert_eq!(view.tempo_text(), "90.00");
        assert_eq!(poller.current_tempo(), Some(90.0));
    }

    #[test]
    fn chain_equality_ignores_key_order() {
        let mut poller = poller();
        let mut view = LiveView::default();
        let a = chains(json!([{"ID": "c1", "Priority": 1, "Effects": [{"ID": "e", "Type": "strobe"}]}]));
        let b = chains(json!([{"Effects": [{"Type": "strobe", "ID": "e"}], "Priority": 1, "ID": "c1"}]));
        assert!(poller.apply_chains(Ok(a), &mut view));
        assert!(!poller.apply_chains(Ok(b), &mut view));
        assert_eq!(view.revision, 1);
    }

    #[test]
    fn list_order_is_significant() {
        let mut poller = poller();
        let mut view = LiveView::default();
        assert!(poller.apply_events(Ok(vec!["a".into(), "b".into()]), &mut view));
        assert!(poller.apply_events(Ok(vec!["b".into(), "a".into()]), &mut view));
        assert_eq!(view.events, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn null_effects_read_as_empty() {
        let list = chains(json!([{"ID": "c1", "Effects": null}]));
        assert!(list[0].effects.is_empty());
        let effect: EffectView = serde_json::from_value(json!({"ID": "e"})).unwrap();
        assert!(effect.is_enabled());
    }

    #[test]
    fn poll_failures_do_not_render() {
        let mut poller = poller();
        let mut view = LiveView::default();
        poller.apply_tempo(Ok(100.0), &mut view);
        assert!(!poller.apply_tempo(Err(ApiError::fetch("/api/bpm", "refused")), &mut view));
        assert_eq!(view.tempo_text(), "100.00");
    }

    #[test]
    fn error_throttle_logs_first_and_periodic() {
        let mut throttle = ErrorThrottle::default();
        let err = ApiError::Disconnected;
        assert!(throttle.failure("tempo", &err));
        assert!(!throttle.failure("tempo", &err));
        for _ in 2..FAILURE_LOG_EVERY - 1 {
            throttle.failure("tempo", &err);
        }
        assert!(throttle.failure("tempo", &err));
        throttle.success("tempo");
        assert_eq!(throttle.streak(), 0);
    }

    #[test]
    fn poll_schedule() {
        let mut poller = poller();
        let start = Instant::now();
        assert!(poller.poll_due(start));
        assert!(!poller.poll_due(start + Duration::from_millis(500)));
        assert!(poller.poll_due(start + Duration::from_millis(1000)));
    }
}
