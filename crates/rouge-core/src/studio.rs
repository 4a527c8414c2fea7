//! The application shell around the engine.
//!
//! [`Studio`] owns the live [`StyleState`] and wires edits into the
//! history explicitly: every mutation entry point either restarts the
//! commit debounce or commits on the spot. Nothing is global; a host
//! constructs one studio and drives it with its own clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_time::Instant;

use crate::composite::{CompositeReport, composite};
use crate::debounce::Debouncer;
use crate::history::{History, HistoryStep, unix_millis};
use crate::landmarks::LandmarkSet;
use crate::looks::{LookError, LookStore, MemoryLookStore, SavedLook};
use crate::presets::{PresetOutcome, apply_preset};
use crate::style::{StyleState, UpdateOutcome};
use crate::surface::Surface;
use crate::types::{ComposeError, RgbaImage};

/// Serialize a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("invalid studio configuration: {0}")]
    InvalidConfig(String),
}

/// Tunables for a [`Studio`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Most history entries kept before the oldest is dropped.
    pub max_history: usize,
    /// Quiet period after the last edit before it is committed.
    #[serde(rename = "commit_debounce_ms", with = "millis")]
    pub commit_debounce: Duration,
    /// Longer side of saved-look preview thumbnails, in pixels.
    pub preview_max_dimension: u32,
}

impl StudioConfig {
    pub const DEFAULT_MAX_HISTORY: usize = 50;
    pub const DEFAULT_COMMIT_DEBOUNCE: Duration = Duration::from_millis(500);
    pub const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 256;

    /// # Errors
    ///
    /// Returns [`StudioError::InvalidConfig`] if `max_history` or
    /// `preview_max_dimension` is zero.
    pub fn validate(&self) -> Result<(), StudioError> {
        if self.max_history == 0 {
            return Err(StudioError::InvalidConfig(
                "max_history must be at least 1".into(),
            ));
        }
        if self.preview_max_dimension == 0 {
            return Err(StudioError::InvalidConfig(
                "preview_max_dimension must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            max_history: Self::DEFAULT_MAX_HISTORY,
            commit_debounce: Self::DEFAULT_COMMIT_DEBOUNCE,
            preview_max_dimension: Self::DEFAULT_PREVIEW_MAX_DIMENSION,
        }
    }
}

/// Live style, its history, and the saved-look store.
#[derive(Debug)]
pub struct Studio<S: LookStore = MemoryLookStore> {
    config: StudioConfig,
    style: StyleState,
    history: History,
    debouncer: Debouncer,
    looks: S,
    recording: bool,
}

impl Studio<MemoryLookStore> {
    /// A studio with default style and an in-memory look store.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: StudioConfig) -> Result<Self, StudioError> {
        Self::with_store(config, MemoryLookStore::new())
    }
}

impl<S: LookStore> Studio<S> {
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidConfig`] if `config` fails validation.
    pub fn with_store(config: StudioConfig, looks: S) -> Result<Self, StudioError> {
        config.validate()?;
        let style = StyleState::default();
        Ok(Self {
            history: History::new(style.clone(), config.max_history),
            debouncer: Debouncer::new(config.commit_debounce),
            style,
            config,
            looks,
            recording: true,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StudioConfig {
        &self.config
    }

    #[must_use]
    pub const fn style(&self) -> &StyleState {
        &self.style
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn looks(&self) -> &S {
        &self.looks
    }

    pub const fn looks_mut(&mut self) -> &mut S {
        &mut self.looks
    }

    /// Whether edits are currently being recorded into history.
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        self.recording
    }

    /// Pause or resume history recording. While paused, edits still
    /// change the style but are never committed.
    ///
    /// An edit still waiting for its quiet period is committed before
    /// recording pauses.
    pub fn set_recording(&mut self, recording: bool) {
        if !recording {
            self.flush();
        }
        self.recording = recording;
    }

    /// An edit is waiting for its quiet period to end.
    #[must_use]
    pub const fn has_pending_commit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When [`tick`](Self::tick) should next be called, if anything is
    /// pending.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.has_pending_commit() || self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.has_pending_commit() && self.history.can_redo()
    }

    /// Change one property and schedule a commit.
    pub fn update(&mut self, feature: &str, property: &str, value: Value, now: Instant) -> UpdateOutcome {
        let outcome = self.style.update(feature, property, value);
        if outcome.is_applied() {
            self.schedule_commit(now);
        }
        outcome
    }

    /// Replace the whole style and schedule a commit.
    pub fn set_style(&mut self, style: StyleState, now: Instant) {
        self.style = style;
        self.schedule_commit(now);
    }

    /// Commit the pending edit once its quiet period has passed.
    ///
    /// Returns `true` if a history entry was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            self.commit();
            return true;
        }
        false
    }

    /// Commit the pending edit now, if there is one.
    pub fn flush(&mut self) -> bool {
        if !self.debouncer.is_pending() {
            return false;
        }
        self.debouncer.cancel();
        self.commit();
        true
    }

    /// Step back.
    ///
    /// An uncommitted edit is discarded first, returning to the current
    /// history entry. Otherwise the cursor moves back one entry. Returns
    /// `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if self.debouncer.is_pending() {
            self.debouncer.cancel();
            let current = self.history.current().clone();
            self.restore(current);
            return true;
        }
        match self.history.undo() {
            HistoryStep::Moved(state) => {
                let state = state.clone();
                self.restore(state);
                true
            }
            HistoryStep::AtBoundary => false,
        }
    }

    /// Step forward. Returns `false` at the newest entry or while an
    /// edit is pending.
    pub fn redo(&mut self) -> bool {
        if self.debouncer.is_pending() {
            return false;
        }
        match self.history.redo() {
            HistoryStep::Moved(state) => {
                let state = state.clone();
                self.restore(state);
                true
            }
            HistoryStep::AtBoundary => false,
        }
    }

    /// Merge a preset into the live style and commit it as one entry.
    pub fn apply_preset(&mut self, name: &str) -> PresetOutcome {
        let outcome = apply_preset(&mut self.style, name);
        if outcome.is_applied() {
            self.debouncer.cancel();
            self.commit();
        }
        outcome
    }

    /// Restore every feature to its default and commit.
    pub fn reset(&mut self) {
        self.style.reset();
        self.debouncer.cancel();
        self.commit();
        tracing::info!("style reset to defaults");
    }

    /// Store the live style under `name`.
    ///
    /// With a `surface`, a thumbnail of it is stored alongside.
    ///
    /// # Errors
    ///
    /// Returns [`LookError::EmptyName`] for a blank name,
    /// [`LookError::Preview`] if the thumbnail cannot be encoded, or
    /// whatever the store reports.
    pub fn save_look(
        &mut self,
        name: &str,
        description: &str,
        surface: Option<&Surface>,
    ) -> Result<(), LookError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookError::EmptyName);
        }
        let preview_png = surface
            .map(|s| s.preview_png(self.config.preview_max_dimension))
            .transpose()?;
        self.looks.save(SavedLook {
            name: name.to_owned(),
            description: description.to_owned(),
            style: self.style.clone(),
            timestamp_ms: unix_millis(),
            preview_png,
        })?;
        tracing::info!(look = name, "saved look");
        Ok(())
    }

    /// Replace the live style with a saved look and commit, so the load
    /// itself can be undone.
    ///
    /// # Errors
    ///
    /// Returns [`LookError::NotFound`] if no look has that name.
    pub fn load_look(&mut self, name: &str) -> Result<(), LookError> {
        let style = self
            .looks
            .get(name)
            .map(|look| look.style.clone())
            .ok_or_else(|| LookError::NotFound(name.to_owned()))?;
        self.debouncer.cancel();
        self.style = style;
        self.commit();
        tracing::info!(look = name, "loaded look");
        Ok(())
    }

    /// Returns `true` if a look was removed.
    pub fn delete_look(&mut self, name: &str) -> bool {
        self.looks.delete(name).is_some()
    }

    #[must_use]
    pub fn look_names(&self) -> Vec<String> {
        self.looks.names()
    }

    /// Composite the live style onto `surface`.
    ///
    /// # Errors
    ///
    /// See [`composite`].
    pub fn render(
        &self,
        surface: &mut Surface,
        source: &RgbaImage,
        landmarks: Option<&LandmarkSet>,
    ) -> Result<CompositeReport, ComposeError> {
        composite(surface, source, landmarks, &self.style)
    }

    fn schedule_commit(&mut self, now: Instant) {
        if self.recording {
            self.debouncer.touch(now);
        }
    }

    fn commit(&mut self) {
        if self.recording {
            self.history.commit(self.style.clone());
        }
    }

    /// Adopt a state from history without recording it again.
    fn restore(&mut self, state: StyleState) {
        let was_recording = self.recording;
        self.recording = false;
        self.style.restore(&state);
        self.recording = was_recording;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::style::Feature;

    fn studio() -> Studio {
        Studio::new(StudioConfig::default()).unwrap()
    }

    const QUIET: Duration = StudioConfig::DEFAULT_COMMIT_DEBOUNCE;

    #[test]
    fn rapid_edits_coalesce_into_one_entry() {
        let mut s = studio();
        let t0 = Instant::now();
        for (i, opacity) in [0.1, 0.2, 0.3, 0.4].into_iter().enumerate() {
            let at = t0 + Duration::from_millis(100 * u64::try_from(i).unwrap());
            assert!(s.update("lips", "opacity", json!(opacity), at).is_applied());
        }
        assert!(!s.tick(t0 + Duration::from_millis(400)));
        assert!(s.tick(t0 + Duration::from_millis(300) + QUIET));
        assert_eq!(s.history().len(), 2);
        assert!((s.history().current().lips.opacity - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn rejected_update_schedules_nothing() {
        let mut s = studio();
        let now = Instant::now();
        let outcome = s.update("lips", "opacity", json!("loud"), now);
        assert!(!outcome.is_applied());
        assert!(!s.has_pending_commit());
        assert_eq!(s.update("nails", "color", json!("#fff"), now), UpdateOutcome::UnknownFeature);
    }

    #[test]
    fn undo_discards_pending_edit() {
        let mut s = studio();
        let t0 = Instant::now();
        s.update("lips", "opacity", json!(0.2), t0);
        assert!(s.undo());
        assert!(!s.has_pending_commit());
        assert_eq!(s.style(), &StyleState::default());
        // The cancelled commit never lands.
        assert!(!s.tick(t0 + QUIET));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn undo_and_redo_restore_committed_states() {
        let mut s = studio();
        let t0 = Instant::now();
        s.update("lips", "opacity", json!(0.2), t0);
        s.flush();
        s.update("lips", "opacity", json!(0.3), t0);
        s.flush();

        assert!(s.undo());
        assert!((s.style().lips.opacity - 0.2).abs() < f64::EPSILON);
        assert!(s.undo());
        assert_eq!(s.style(), &StyleState::default());
        assert!(!s.undo());
        assert!(s.redo());
        assert!((s.style().lips.opacity - 0.2).abs() < f64::EPSILON);
        // Restoring never writes history.
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn preset_is_a_single_entry() {
        let mut s = studio();
        assert!(s.apply_preset("glam").is_applied());
        assert_eq!(s.history().len(), 2);
        assert!(s.undo());
        assert_eq!(s.style(), &StyleState::default());
        assert_eq!(s.apply_preset("nope"), PresetOutcome::NotFound);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn load_look_is_undoable() {
        let mut s = studio();
        s.apply_preset("smokey");
        s.save_look("evening out", "", None).unwrap();
        s.reset();
        assert_eq!(s.style(), &StyleState::default());

        s.load_look("evening out").unwrap();
        assert!(s.style().is_enabled(Feature::Eyeliner));
        assert!((s.style().eyeliner.thickness - 4.0).abs() < f64::EPSILON);
        assert!(s.undo());
        assert_eq!(s.style(), &StyleState::default());
        assert!(matches!(s.load_look("missing"), Err(LookError::NotFound(_))));
    }

    #[test]
    fn save_look_stores_preview() {
        let mut s = studio();
        let surface = Surface::new(600, 300).unwrap();
        s.save_look("thumb", "with preview", Some(&surface)).unwrap();
        let png = s.looks().get("thumb").unwrap().preview_png.clone().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (256, 128));
        assert!(matches!(s.save_look(" ", "", None), Err(LookError::EmptyName)));
        assert!(s.delete_look("thumb"));
        assert!(s.look_names().is_empty());
    }

    #[test]
    fn paused_recording_skips_history() {
        let mut s = studio();
        s.set_recording(false);
        s.update("blush", "opacity", json!(0.9), Instant::now());
        assert!(!s.has_pending_commit());
        s.reset();
        assert_eq!(s.history().len(), 1);
        s.set_recording(true);
        s.reset();
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn pausing_commits_the_pending_edit() {
        let mut s = studio();
        let t0 = Instant::now();
        s.update("lips", "opacity", json!(0.3), t0);
        s.set_recording(false);
        assert!(!s.has_pending_commit());
        s.set_recording(true);
        assert!(!s.tick(t0 + QUIET));

        assert_eq!(s.history().len(), 2);
        assert!((s.history().current().lips.opacity - 0.3).abs() < f64::EPSILON);
        assert!(s.can_undo());
        assert!(s.undo());
        assert_eq!(s.style(), &StyleState::default());
    }

    #[test]
    fn config_validation() {
        let bad = StudioConfig {
            max_history: 0,
            ..StudioConfig::default()
        };
        assert!(Studio::new(bad).is_err());
        let json = serde_json::to_value(StudioConfig::default()).unwrap();
        assert_eq!(json["commit_debounce_ms"], 500);
        let parsed: StudioConfig =
            serde_json::from_str(r#"{"max_history": 5, "commit_debounce_ms": 250}"#).unwrap();
        assert_eq!(parsed.max_history, 5);
        assert_eq!(parsed.commit_debounce, Duration::from_millis(250));
        assert_eq!(parsed.preview_max_dimension, 256);
    }
}
