//! rouge-core: Landmark-driven makeup compositing engine (sans-IO).
//!
//! Paints cosmetic layers onto a raster from face-mesh landmarks:
//! base image -> foundation -> concealer -> blush -> bronzer ->
//! eyeshadow -> eyeliner -> brows -> lip liner -> lips -> highlighter ->
//! setting spray.
//!
//! Around the compositor sit the typed style state, named presets, a
//! bounded undo/redo history with debounced commits, saved looks and
//! face-proportion analysis. [`Studio`] ties them together.
//!
//! This crate has **no I/O dependencies**: landmarks, frames and the
//! clock are all handed in by the host. Browser wiring lives in
//! `rouge-web`, file handling in the `rouge` CLI.

pub mod analysis;
pub mod color;
pub mod composite;
pub mod debounce;
pub mod draw;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod landmarks;
pub mod looks;
pub mod presets;
pub mod smoothing;
pub mod studio;
pub mod style;
pub mod surface;
pub mod tone;
pub mod types;

pub use analysis::{FaceAnalysis, FaceShape, analyze};
pub use color::Rgb;
pub use composite::{CompositeReport, FeaturePainter, LayerOutcome, StandardPainter, composite, composite_with};
pub use debounce::Debouncer;
pub use history::{History, HistoryStep};
pub use landmarks::{Landmark, LandmarkSet, Region, Side};
pub use looks::{LookError, LookStore, MemoryLookStore, SavedLook};
pub use presets::{PresetOutcome, apply_preset, preset_names};
pub use smoothing::LandmarkSmoother;
pub use studio::{Studio, StudioConfig, StudioError};
pub use style::{Feature, StyleError, StyleState, UpdateOutcome};
pub use surface::Surface;
pub use tone::{
    FixedToneClassifier, SkinTone, ToneClassifier, ToneReading, ToneSuggestion, Undertone, suggest,
};
pub use types::{ComposeError, Dimensions, GeometryError, Point, RgbaImage, SurfaceError};
