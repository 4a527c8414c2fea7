//! Browser entry point for the rouge makeup studio.
//!
//! [`WebStudio`] wraps a [`Studio`] for a JavaScript host. Frames cross
//! the boundary as raw RGBA byte buffers (canvas `ImageData.data`), and
//! landmarks as flat `Float32Array`s of `x, y, z` triples. Structured
//! values (style, reports, analysis) travel as JSON strings.
//!
//! Debounced history commits are driven by a `gloo-timers` timeout that
//! calls back into the studio once the quiet period has passed.
//!
//! Loading the module installs a panic hook and a `tracing` subscriber
//! that writes to the browser console.

mod console;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use rouge_core::{
    FixedToneClassifier, LandmarkSet, LandmarkSmoother, LookStore, PresetOutcome, RgbaImage,
    SkinTone, Studio, StudioConfig, StyleState, Surface, ToneClassifier, ToneReading,
    ToneSuggestion, Undertone, UpdateOutcome,
};
use wasm_bindgen::prelude::*;
use web_time::Instant;

struct Inner {
    studio: Studio,
    smoother: LandmarkSmoother,
    landmarks: Option<LandmarkSet>,
    surface: Option<Surface>,
    last_report: Option<String>,
    timer_armed: bool,
    tone: Option<FixedToneClassifier>,
}

#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn start() {
    console_error_panic_hook::set_once();
    console::install();
}

/// A makeup studio bound to one page.
#[wasm_bindgen]
pub struct WebStudio {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl WebStudio {
    /// Create a studio. `config_json` is a `StudioConfig` document, or
    /// `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Self, JsError> {
        let config = match config_json {
            Some(json) => serde_json::from_str::<StudioConfig>(&json)?,
            None => StudioConfig::default(),
        };
        let studio = Studio::new(config)?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                studio,
                smoother: LandmarkSmoother::default(),
                landmarks: None,
                surface: None,
                last_report: None,
                timer_armed: false,
                tone: None,
            })),
        })
    }

    /// Feed the latest detector output, or `null` when no face is found.
    ///
    /// Landmarks are smoothed across frames; losing the face resets the
    /// smoothing window.
    #[wasm_bindgen(js_name = setLandmarks)]
    pub fn set_landmarks(&self, xyz: Option<js_sys::Float32Array>) -> Result<(), JsError> {
        let mut inner = self.inner.borrow_mut();
        let Some(xyz) = xyz else {
            inner.smoother.reset();
            inner.landmarks = None;
            return Ok(());
        };
        let raw = LandmarkSet::from_xyz(&xyz.to_vec())
            .ok_or_else(|| JsError::new("landmark buffer length must be a multiple of 3"))?;
        let smoothed = inner.smoother.push(raw);
        inner.landmarks = Some(smoothed);
        Ok(())
    }

    /// Composite the current style over one frame and return the result
    /// as straight-alpha RGBA bytes of the same size.
    pub fn render(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, JsError> {
        let source = RgbaImage::from_raw(width, height, rgba.to_vec())
            .ok_or_else(|| JsError::new("pixel buffer does not match width * height * 4"))?;
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;

        let reuse = inner
            .surface
            .as_ref()
            .is_some_and(|s| s.width() == width && s.height() == height);
        if !reuse {
            inner.surface = Some(Surface::new(width, height)?);
        }
        let Some(surface) = inner.surface.as_mut() else {
            return Err(JsError::new("surface unavailable"));
        };

        let report = inner
            .studio
            .render(surface, &source, inner.landmarks.as_ref())?;
        for layer in report.layers.iter().filter(|l| l.outcome.is_skipped()) {
            web_sys::console::warn_1(&format!("rouge: {} {}", layer.feature, layer.outcome).into());
        }
        inner.last_report = serde_json::to_string(&report).ok();
        Ok(surface.to_rgba_bytes())
    }

    /// JSON `CompositeReport` of the most recent render.
    #[wasm_bindgen(js_name = lastReportJson)]
    pub fn last_report_json(&self) -> Option<String> {
        self.inner.borrow().last_report.clone()
    }

    /// Set one property from its JSON value. Returns `"applied"`,
    /// `"unknown_feature"`, `"unknown_property"` or `"rejected: ..."`.
    pub fn update(&self, feature: &str, property: &str, value_json: &str) -> String {
        let value = match serde_json::from_str(value_json) {
            Ok(v) => v,
            Err(e) => return outcome_label(&UpdateOutcome::Rejected(e.to_string())),
        };
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            inner.studio.update(feature, property, value, Instant::now())
        };
        self.arm_commit_timer();
        outcome_label(&outcome)
    }

    /// Read one property as JSON, or `undefined` if it does not exist.
    pub fn get(&self, feature: &str, property: &str) -> Option<String> {
        let inner = self.inner.borrow();
        inner
            .studio
            .style()
            .get(feature, property)
            .map(|v| v.to_string())
    }

    pub fn undo(&self) -> bool {
        self.inner.borrow_mut().studio.undo()
    }

    pub fn redo(&self) -> bool {
        self.inner.borrow_mut().studio.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.borrow().studio.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.borrow().studio.can_redo()
    }

    /// Returns `false` for an unknown preset name.
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&self, name: &str) -> Result<bool, JsError> {
        match self.inner.borrow_mut().studio.apply_preset(name) {
            PresetOutcome::Applied => Ok(true),
            PresetOutcome::NotFound => Ok(false),
            PresetOutcome::Rejected(reason) => Err(JsError::new(&reason)),
        }
    }

    #[wasm_bindgen(js_name = presetNames)]
    pub fn preset_names() -> Vec<String> {
        rouge_core::preset_names()
            .iter()
            .map(|&n| n.to_owned())
            .collect()
    }

    pub fn reset(&self) {
        self.inner.borrow_mut().studio.reset();
    }

    /// The whole style as JSON.
    #[wasm_bindgen(js_name = styleJson)]
    pub fn style_json(&self) -> Result<String, JsError> {
        Ok(self.inner.borrow().studio.style().to_json()?)
    }

    /// Replace the whole style from JSON. Committed after the usual
    /// quiet period.
    #[wasm_bindgen(js_name = setStyleJson)]
    pub fn set_style_json(&self, json: &str) -> Result<(), JsError> {
        let style = StyleState::from_json(json)?;
        self.inner
            .borrow_mut()
            .studio
            .set_style(style, Instant::now());
        self.arm_commit_timer();
        Ok(())
    }

    /// `true` if any feature is switched on.
    #[wasm_bindgen(js_name = hasMakeupApplied)]
    pub fn has_makeup_applied(&self) -> bool {
        self.inner.borrow().studio.style().has_makeup_applied()
    }

    /// Save the live style, with a thumbnail of the last rendered frame.
    #[wasm_bindgen(js_name = saveLook)]
    pub fn save_look(&self, name: &str, description: &str) -> Result<(), JsError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner
            .studio
            .save_look(name, description, inner.surface.as_ref())?;
        Ok(())
    }

    #[wasm_bindgen(js_name = loadLook)]
    pub fn load_look(&self, name: &str) -> Result<(), JsError> {
        self.inner.borrow_mut().studio.load_look(name)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = deleteLook)]
    pub fn delete_look(&self, name: &str) -> bool {
        self.inner.borrow_mut().studio.delete_look(name)
    }

    #[wasm_bindgen(js_name = lookNames)]
    pub fn look_names(&self) -> Vec<String> {
        self.inner.borrow().studio.look_names()
    }

    /// PNG thumbnail stored with a look, if any.
    #[wasm_bindgen(js_name = lookPreview)]
    pub fn look_preview(&self, name: &str) -> Option<Vec<u8>> {
        let inner = self.inner.borrow();
        inner
            .studio
            .looks()
            .get(name)
            .and_then(|look| look.preview_png.clone())
    }

    /// Every saved look as one JSON document, for persistence by the host.
    #[wasm_bindgen(js_name = exportLooksJson)]
    pub fn export_looks_json(&self) -> Result<String, JsError> {
        Ok(self.inner.borrow().studio.looks().export_json()?)
    }

    /// Merge looks from [`export_looks_json`](Self::export_looks_json)
    /// output. Returns how many were imported.
    #[wasm_bindgen(js_name = importLooksJson)]
    pub fn import_looks_json(&self, json: &str) -> Result<u32, JsError> {
        let count = self
            .inner
            .borrow_mut()
            .studio
            .looks_mut()
            .import_json(json)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Face proportions, expressions and tips for the current landmarks
    /// as JSON, or `undefined` without a face.
    #[wasm_bindgen(js_name = analyzeJson)]
    pub fn analyze_json(&self) -> Result<Option<String>, JsError> {
        let inner = self.inner.borrow();
        let Some(landmarks) = inner.landmarks.as_ref() else {
            return Ok(None);
        };
        let analysis = rouge_core::analyze(landmarks)?;
        Ok(Some(serde_json::to_string(&analysis)?))
    }

    /// Use a fixed skin tone reading, e.g. one the user picked. Names are
    /// matched case-insensitively.
    #[wasm_bindgen(js_name = setToneReading)]
    pub fn set_tone_reading(&self, skin_tone: &str, undertone: &str) -> Result<(), JsError> {
        let reading = ToneReading {
            skin_tone: skin_tone.parse::<SkinTone>()?,
            undertone: undertone.parse::<Undertone>()?,
        };
        tracing::info!(skin_tone = %reading.skin_tone, undertone = %reading.undertone, "tone set");
        self.inner.borrow_mut().tone = Some(FixedToneClassifier(reading));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearToneReading)]
    pub fn clear_tone_reading(&self) {
        self.inner.borrow_mut().tone = None;
    }

    /// JSON `ToneSuggestion` for one frame: the swatches for the tone
    /// reading, or the default palette without a reading or a face.
    #[wasm_bindgen(js_name = paletteJson)]
    pub fn palette_json(&self, width: u32, height: u32, rgba: &[u8]) -> Result<String, JsError> {
        let frame = RgbaImage::from_raw(width, height, rgba.to_vec())
            .ok_or_else(|| JsError::new("pixel buffer does not match width * height * 4"))?;
        let inner = self.inner.borrow();
        let classifier = inner.tone.as_ref().map(|c| c as &dyn ToneClassifier);
        let suggestion = tone_suggestion(classifier, &frame, inner.landmarks.as_ref());
        Ok(serde_json::to_string(&suggestion)?)
    }

    /// Commit any pending edit immediately, e.g. before the page unloads.
    pub fn flush(&self) -> bool {
        self.inner.borrow_mut().studio.flush()
    }
}

impl WebStudio {
    fn arm_commit_timer(&self) {
        arm(&self.inner);
    }
}

/// Schedule a tick for the studio's pending deadline.
///
/// At most one timeout is outstanding. When it fires before a later
/// edit's deadline it re-arms for the remainder. Fired timeouts are
/// forgotten rather than dropped from inside their own callback.
fn arm(inner: &Rc<RefCell<Inner>>) {
    let wait_ms = {
        let mut state = inner.borrow_mut();
        if state.timer_armed {
            return;
        }
        let Some(deadline) = state.studio.next_deadline() else {
            return;
        };
        state.timer_armed = true;
        millis_until(deadline, Instant::now())
    };
    let weak: Weak<RefCell<Inner>> = Rc::downgrade(inner);
    Timeout::new(wait_ms, move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        {
            let mut state = inner.borrow_mut();
            state.timer_armed = false;
            if state.studio.tick(Instant::now()) {
                tracing::debug!("debounced edit committed");
            }
        }
        arm(&inner);
    })
    .forget();
}

/// Milliseconds from `now` until `deadline`, rounded up so the timer
/// never fires before it.
fn millis_until(deadline: Instant, now: Instant) -> u32 {
    let wait = deadline.saturating_duration_since(now);
    let ms = wait.as_millis() + u128::from(wait.subsec_nanos() % 1_000_000 != 0);
    u32::try_from(ms).unwrap_or(u32::MAX)
}

/// Classify only when there is both a classifier and a face.
fn tone_suggestion(
    classifier: Option<&dyn ToneClassifier>,
    frame: &RgbaImage,
    landmarks: Option<&LandmarkSet>,
) -> ToneSuggestion {
    match (classifier, landmarks) {
        (Some(classifier), Some(landmarks)) => rouge_core::suggest(classifier, frame, landmarks),
        _ => ToneSuggestion::new(None),
    }
}

fn outcome_label(outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Applied => "applied".to_owned(),
        UpdateOutcome::UnknownFeature => "unknown_feature".to_owned(),
        UpdateOutcome::UnknownProperty => "unknown_property".to_owned(),
        UpdateOutcome::Rejected(reason) => format!("rejected: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rouge_core::Landmark;

    use super::*;

    #[test]
    fn millis_until_rounds_up() {
        let now = Instant::now();
        assert_eq!(millis_until(now + Duration::from_micros(1500), now), 2);
        assert_eq!(millis_until(now + Duration::from_millis(500), now), 500);
        assert_eq!(millis_until(now, now + Duration::from_secs(1)), 0);
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome_label(&UpdateOutcome::Applied), "applied");
        assert_eq!(outcome_label(&UpdateOutcome::UnknownProperty), "unknown_property");
        assert_eq!(
            outcome_label(&UpdateOutcome::Rejected("bad".into())),
            "rejected: bad"
        );
    }

    #[test]
    fn palette_needs_classifier_and_face() {
        let frame = RgbaImage::new(4, 4);
        let face = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0)]);
        let warm = FixedToneClassifier(ToneReading {
            skin_tone: SkinTone::Light,
            undertone: Undertone::Warm,
        });

        let picked = tone_suggestion(Some(&warm), &frame, Some(&face));
        assert_eq!(picked.reading, Some(warm.0));
        assert_eq!(picked.lips[0].to_string(), "#ff6b6b");

        assert_eq!(tone_suggestion(Some(&warm), &frame, None), ToneSuggestion::new(None));
        assert_eq!(tone_suggestion(None, &frame, Some(&face)), ToneSuggestion::new(None));
    }
}
