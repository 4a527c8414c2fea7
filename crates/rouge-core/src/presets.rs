//! Named look bundles.
//!
//! A preset is a set of partial feature records. Applying one
//! shallow-merges each record into the current [`StyleState`] and switches
//! that feature on; features the preset does not mention are left alone.

use serde_json::{Map, Value, json};

use crate::style::{Feature, StyleState};

/// Built-in preset names, in display order.
pub const PRESET_NAMES: [&str; 8] = [
    "natural",
    "glam",
    "smokey",
    "bridal",
    "everyday",
    "professional",
    "evening",
    "bold",
];

/// Result of [`apply_preset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetOutcome {
    Applied,
    NotFound,
    /// The bundle did not fit the style schema. State is unchanged.
    Rejected(String),
}

impl PresetOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A resolved preset: one partial record per mentioned feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub entries: Vec<(Feature, Map<String, Value>)>,
}

#[must_use]
pub const fn preset_names() -> &'static [&'static str] {
    &PRESET_NAMES
}

/// Look up a preset by name.
///
/// Returns `None` for unknown names and for a bundle that mentions a
/// feature not in the schema.
#[must_use]
pub fn preset(name: &str) -> Option<Preset> {
    let (name, description, bundle) = bundle(name)?;
    let Value::Object(features) = bundle else {
        return None;
    };
    let mut entries = Vec::with_capacity(features.len());
    for (key, record) in features {
        let feature = Feature::from_name(&key)?;
        let Value::Object(partial) = record else {
            return None;
        };
        entries.push((feature, partial));
    }
    // Map iteration is alphabetical; present entries bottom layer first.
    entries.sort_by_key(|(f, _)| Feature::DRAW_ORDER.iter().position(|x| x == f));
    Some(Preset {
        name,
        description,
        entries,
    })
}

/// Merge the named preset into `state`.
///
/// The merge is all-or-nothing: if any entry is rejected, `state` is
/// unchanged.
pub fn apply_preset(state: &mut StyleState, name: &str) -> PresetOutcome {
    let Some(preset) = preset(name) else {
        return PresetOutcome::NotFound;
    };
    let mut next = state.clone();
    for (feature, partial) in &preset.entries {
        if let Err(e) = next.merge(*feature, partial) {
            tracing::warn!(preset = name, %feature, error = %e, "preset entry rejected");
            return PresetOutcome::Rejected(format!("{feature}: {e}"));
        }
        next.set_enabled(*feature, true);
    }
    *state = next;
    tracing::info!(preset = name, features = preset.entries.len(), "applied preset");
    PresetOutcome::Applied
}

fn bundle(name: &str) -> Option<(&'static str, &'static str, Value)> {
    let found = match name {
        "natural" => (
            "natural",
            "Light coverage with soft pink cheeks and a satin lip",
            json!({
                "foundation": { "opacity": 0.5, "coverage": 0.6 },
                "blush": { "color": "#FFB6C1", "opacity": 0.3 },
                "lips": { "color": "#FF6B8B", "opacity": 0.5, "finish": "satin" }
            }),
        ),
        "glam" => (
            "glam",
            "Full matte base, purple crease, winged liner",
            json!({
                "foundation": { "opacity": 0.8, "coverage": 0.9, "texture": "matte" },
                "eyeshadow": { "layers": [
                    { "color": "#9C27B0", "position": "crease", "opacity": 0.7 },
                    { "color": "#673AB7", "position": "lid", "opacity": 0.9 }
                ]},
                "eyeliner": { "style": "winged", "thickness": 3.0 },
                "lips": { "color": "#D81B60", "opacity": 0.9, "finish": "matte" },
                "highlighter": { "intensity": 0.8 }
            }),
        ),
        "smokey" => (
            "smokey",
            "Charcoal shadow gradient with heavy liner",
            json!({
                "eyeshadow": {
                    "layers": [
                        { "color": "#212121", "position": "crease", "opacity": 0.8 },
                        { "color": "#424242", "position": "lid", "opacity": 0.9 },
                        { "color": "#757575", "position": "browbone", "opacity": 0.4 }
                    ],
                    "finish": "matte"
                },
                "eyeliner": { "thickness": 4.0 },
                "lips": { "color": "#333", "opacity": 0.7, "finish": "matte" }
            }),
        ),
        "bridal" => (
            "bridal",
            "Even base, concealed under-eyes, soft glow",
            json!({
                "foundation": { "opacity": 0.7, "finish": "natural" },
                "concealer": { "intensity": 0.8 },
                "blush": { "color": "#FFCDD2", "opacity": 0.4, "placement": "apples" },
                "highlighter": { "intensity": 0.6 },
                "lips": { "color": "#FF8A80", "opacity": 0.6, "finish": "satin" }
            }),
        ),
        "everyday" => (
            "everyday",
            "Sheer base with a lavender lid",
            json!({
                "foundation": { "color": "#FFF8E1", "opacity": 0.2 },
                "eyeshadow": { "layers": [
                    { "color": "#B39DDB", "position": "lid", "opacity": 0.4 }
                ]},
                "blush": { "color": "#FF80AB", "opacity": 0.3, "radius": 25.0 },
                "lips": { "color": "#FF8A80", "opacity": 0.6, "finish": "matte" }
            }),
        ),
        "professional" => (
            "professional",
            "Muted periwinkle lid and a defined lip",
            json!({
                "eyeshadow": { "layers": [
                    { "color": "#5C6BC0", "position": "lid", "opacity": 0.3 }
                ]},
                "eyeliner": { "color": "#000000", "opacity": 0.8, "thickness": 2.0 },
                "blush": { "color": "#F06292", "opacity": 0.2, "radius": 20.0 },
                "lips": { "color": "#D81B60", "opacity": 0.7, "finish": "matte" }
            }),
        ),
        "evening" => (
            "evening",
            "Violet lid, stronger liner, glossy berry lip",
            json!({
                "eyeshadow": { "layers": [
                    { "color": "#7E57C2", "position": "lid", "opacity": 0.7 }
                ]},
                "eyeliner": { "color": "#000000", "opacity": 0.9, "thickness": 3.0 },
                "blush": { "color": "#EC407A", "opacity": 0.4, "radius": 30.0 },
                "lips": { "color": "#C2185B", "opacity": 0.9, "finish": "gloss" }
            }),
        ),
        "bold" => (
            "bold",
            "Deep indigo lid and a plum matte lip",
            json!({
                "eyeshadow": { "layers": [
                    { "color": "#4527A0", "position": "lid", "opacity": 0.8 }
                ]},
                "eyeliner": { "color": "#000000", "opacity": 1.0, "thickness": 4.0 },
                "blush": { "color": "#D81B60", "opacity": 0.5, "radius": 35.0 },
                "lips": { "color": "#880E4F", "opacity": 0.9, "finish": "matte" }
            }),
        ),
        _ => return None,
    };
    Some(found)
}
