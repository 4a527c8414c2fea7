//! rouge: composite makeup onto a still image from the command line.
//!
//! Landmarks are read from a JSON array of `{"x", "y", "z"}` objects in
//! normalized image coordinates, as a face-mesh detector emits them.
//!
//! # Usage
//!
//! ```text
//! rouge render portrait.jpg --landmarks face.json --preset glam -o out.png
//! rouge render portrait.jpg --landmarks face.json --set lips.color=#b0305a --set lips.enabled=true
//! rouge analyze --landmarks face.json --undertone cool
//! rouge presets
//! ```
//!
//! Set `RUST_LOG=rouge_core=debug` to see per-layer decisions.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rouge_core::{
    LandmarkSet, PresetOutcome, SavedLook, SkinTone, StyleState, Surface, ToneReading,
    ToneSuggestion, Undertone, UpdateOutcome, analyze, apply_preset, composite, preset_names,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Virtual makeup try-on for still images.
#[derive(Parser)]
#[command(name = "rouge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite a style onto an image and write a PNG.
    Render(RenderArgs),
    /// Classify face proportions and print application tips and swatches.
    Analyze(AnalyzeArgs),
    /// List the built-in presets.
    Presets,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Input image (PNG, JPEG, BMP, WebP).
    image: PathBuf,

    /// Landmark JSON file. Without it only the base image is written.
    #[arg(long)]
    landmarks: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Start from a built-in preset.
    #[arg(long, conflicts_with = "look")]
    preset: Option<String>,

    /// Start from a saved look or style JSON file.
    #[arg(long)]
    look: Option<PathBuf>,

    /// Override one property, as `feature.property=value`. The value is
    /// parsed as JSON and falls back to a plain string. Repeatable.
    #[arg(long = "set", value_name = "FEATURE.PROPERTY=VALUE")]
    set: Vec<String>,

    /// Print the layer report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Landmark JSON file.
    #[arg(long)]
    landmarks: PathBuf,

    /// Skin tone for the suggested swatches (fair, light, medium, olive, tan, deep).
    #[arg(long)]
    skin_tone: Option<SkinTone>,

    /// Undertone for the suggested swatches (warm, cool, neutral).
    #[arg(long)]
    undertone: Option<Undertone>,

    /// Print the analysis as JSON.
    #[arg(long)]
    json: bool,
}

impl AnalyzeArgs {
    /// A reading when either half was given; the other half defaults.
    fn tone_reading(&self) -> Option<ToneReading> {
        if self.skin_tone.is_none() && self.undertone.is_none() {
            return None;
        }
        Some(ToneReading {
            skin_tone: self.skin_tone.unwrap_or_default(),
            undertone: self.undertone.unwrap_or_default(),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Render(args) => render(&args),
        Command::Analyze(args) => analyze_face(&args),
        Command::Presets => {
            for name in preset_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let style = build_style(args)?;
    let source = image::open(&args.image)
        .with_context(|| format!("decoding {}", args.image.display()))?
        .to_rgba8();
    let landmarks = args.landmarks.as_deref().map(read_landmarks).transpose()?;

    let mut surface = Surface::new(source.width(), source.height())?;
    let report = composite(&mut surface, &source, landmarks.as_ref(), &style)?;

    let png = surface.encode_png()?;
    std::fs::write(&args.output, &png)
        .with_context(|| format!("writing {}", args.output.display()))?;
    eprintln!("wrote {} ({} bytes)", args.output.display(), png.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if !report.face_present {
            println!("no face: base image only");
        }
        for layer in &report.layers {
            println!("{:<14} {}", layer.feature.name(), layer.outcome);
        }
        println!("elapsed: {:.3}ms", report.elapsed.as_secs_f64() * 1000.0);
    }
    Ok(())
}

fn build_style(args: &RenderArgs) -> Result<StyleState> {
    let mut style = match &args.look {
        Some(path) => read_look(path)?,
        None => StyleState::default(),
    };
    if let Some(name) = &args.preset {
        match apply_preset(&mut style, name) {
            PresetOutcome::Applied => {}
            PresetOutcome::NotFound => {
                bail!("unknown preset {name:?} (try `rouge presets`)")
            }
            PresetOutcome::Rejected(reason) => bail!("preset {name:?} rejected: {reason}"),
        }
    }
    for assignment in &args.set {
        let (feature, property, value) = parse_assignment(assignment)?;
        match style.update(feature, property, value) {
            UpdateOutcome::Applied => {}
            UpdateOutcome::UnknownFeature => bail!("unknown feature {feature:?}"),
            UpdateOutcome::UnknownProperty => bail!("{feature} has no property {property:?}"),
            UpdateOutcome::Rejected(reason) => bail!("{assignment}: {reason}"),
        }
    }
    Ok(style)
}

/// Split `feature.property=value`. The value is JSON if it parses as
/// such, otherwise the raw text as a string.
fn parse_assignment(text: &str) -> Result<(&str, &str, Value)> {
    let Some((path, raw)) = text.split_once('=') else {
        bail!("expected FEATURE.PROPERTY=VALUE, got {text:?}");
    };
    let Some((feature, property)) = path.split_once('.') else {
        bail!("expected FEATURE.PROPERTY before '=', got {path:?}");
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((feature.trim(), property.trim(), value))
}

/// A file holding either one saved look or a bare style document.
fn read_look(path: &Path) -> Result<StyleState> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if let Ok(look) = serde_json::from_str::<SavedLook>(&text) {
        tracing::info!(look = %look.name, "loaded saved look");
        return Ok(look.style);
    }
    StyleState::from_json(&text).with_context(|| format!("parsing style in {}", path.display()))
}

fn read_landmarks(path: &Path) -> Result<LandmarkSet> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let set: LandmarkSet = serde_json::from_str(&text)
        .with_context(|| format!("parsing landmarks in {}", path.display()))?;
    tracing::debug!(points = set.len(), "landmarks loaded");
    Ok(set)
}

fn analyze_face(args: &AnalyzeArgs) -> Result<()> {
    let landmarks = read_landmarks(&args.landmarks)?;
    let analysis = analyze(&landmarks)?;
    let swatches = ToneSuggestion::new(args.tone_reading());
    if args.json {
        let doc = serde_json::json!({ "analysis": analysis, "palette": swatches });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    println!("face shape:   {}", analysis.face_shape);
    println!("eye size:     {}", analysis.eye_size);
    println!("lip fullness: {}", analysis.lip_fullness);
    println!("nose size:    {}", analysis.nose_size);
    let e = analysis.expressions;
    println!(
        "expression:   mouth_open={} smiling={} eyes_closed={}",
        e.mouth_open, e.smiling, e.eyes_closed
    );
    println!();
    for tip in &analysis.tips {
        println!("[{}] {}", tip.topic, tip.advice);
    }
    println!();
    if let Some(reading) = swatches.reading {
        println!("palette for {} skin, {} undertone:", reading.skin_tone, reading.undertone);
    } else {
        println!("palette:");
    }
    for (label, colors) in [
        ("lips", &swatches.lips),
        ("eyes", &swatches.eyes),
        ("cheeks", &swatches.cheeks),
    ] {
        let hex: Vec<String> = colors.iter().map(ToString::to_string).collect();
        println!("  {label:<7}{}", hex.join(" "));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use super::*;

    fn analyze_args(extra: &[&str]) -> AnalyzeArgs {
        let argv = ["rouge", "analyze", "--landmarks", "f.json"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Analyze(args) => args,
            _ => unreachable!(),
        }
    }

    fn render_args(extra: &[&str]) -> RenderArgs {
        let argv = ["rouge", "render", "in.png"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Render(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn assignment_parses_json_values() {
        let (f, p, v) = parse_assignment("blush.opacity=0.4").unwrap();
        assert_eq!((f, p), ("blush", "opacity"));
        assert_eq!(v, serde_json::json!(0.4));

        let (_, _, v) = parse_assignment("lips.enabled=true").unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn assignment_falls_back_to_string() {
        let (f, p, v) = parse_assignment("lips.color=#b0305a").unwrap();
        assert_eq!((f, p), ("lips", "color"));
        assert_eq!(v, Value::String("#b0305a".into()));
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_assignment("lips.color").is_err());
        assert!(parse_assignment("color=#fff").is_err());
    }

    #[test]
    fn set_flags_layer_over_preset() {
        let args = render_args(&["--preset", "glam", "--set", "lips.opacity=0.25"]);
        let style = build_style(&args).unwrap();
        assert!(style.lips.enabled);
        assert!((style.lips.opacity - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let args = render_args(&["--preset", "gothic"]);
        assert!(build_style(&args).is_err());
    }

    #[test]
    fn tone_flags_build_a_reading() {
        assert_eq!(analyze_args(&[]).tone_reading(), None);

        let reading = analyze_args(&["--undertone", "warm"]).tone_reading().unwrap();
        assert_eq!(reading.undertone, Undertone::Warm);
        assert_eq!(reading.skin_tone, SkinTone::Medium);

        let reading = analyze_args(&["--skin-tone", "deep", "--undertone", "cool"])
            .tone_reading()
            .unwrap();
        assert_eq!(ToneSuggestion::new(Some(reading)).lips[0].to_string(), "#e91e63");
    }

    #[test]
    fn unknown_undertone_is_rejected_at_parse_time() {
        let argv = ["rouge", "analyze", "--landmarks", "f.json", "--undertone", "teal"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
