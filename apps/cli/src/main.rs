// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow Caster command line tool.
//!
//! Reads a scene document, casts the shadow of its instances onto the
//! selected face and writes the shadow as JSON.
//!
//! Settings are layered: defaults, then `SHADOW_*` environment variables,
//! then `--config`, then individual flags.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use nalgebra::Vector3;
use shadow_caster_processing::{cast_shadows, InMemoryStore, SceneStore, ShadowConfig};
use shadow_caster_scene::load_scene;

mod output;

use output::ShadowOutput;

#[derive(Parser, Debug)]
#[command(version, about = "Cast the silhouette of a scene onto a selected face")]
struct CliArgs {
    /// Scene document (JSON).
    scene: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Direction toward the sun as "x,y,z". Overrides the document's sun.
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    sun: Option<Vector3<f64>>,

    /// Index of the root face to cast onto. Overrides the document's selection.
    #[arg(long)]
    target: Option<usize>,

    /// Pipeline configuration file (JSON); missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Geometric tolerance in model units.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Name of the shadow container.
    #[arg(long)]
    name: Option<String>,

    /// Keep shadow that falls outside the target face.
    #[arg(long)]
    no_clip: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

/// Parse a vector in the format "x,y,z"
fn parse_vector(s: &str) -> Result<Vector3<f64>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("Invalid vector format: '{}'. Expected 'x,y,z'", s));
    }
    let mut v = [0.0; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| format!("Failed to parse component: {}", part))?;
    }
    Ok(Vector3::new(v[0], v[1], v[2]))
}

fn load_config(args: &CliArgs) -> anyhow::Result<ShadowConfig> {
    let mut config = ShadowConfig::from_env();
    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        config = config
            .overlay_json(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(name) = &args.name {
        config.container_name = name.clone();
    }
    if args.no_clip {
        config.clip_to_target = false;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let json = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("reading scene {}", args.scene.display()))?;
    let mut loaded = load_scene(&json).with_context(|| format!("loading scene {}", args.scene.display()))?;

    if let Some(index) = args.target {
        loaded.selection = vec![loaded.scene.select(index)?];
    }
    if let Some(sun) = args.sun {
        loaded.sun = sun;
    }

    tracing::info!(
        scene = %args.scene.display(),
        definitions = loaded.scene.definition_count(),
        roots = loaded.scene.roots().len(),
        tolerance = config.tolerance,
        "Loaded scene"
    );

    let mut store = InMemoryStore::from_loaded(loaded);
    let report = cast_shadows(&mut store, &config)?;
    let Some(container) = store.container(report.container) else {
        bail!("shadow container {:?} was not committed", report.container);
    };

    let out = ShadowOutput::new(container, &report);
    let text = if args.pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), area = report.area, "Shadow written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    run(&args)
}
