//! madtracks CLI - Mad Tracks level inspector and converter
//!
//! Reads level files into a JSON scene, writes scenes back to level files and
//! lists the trackpart catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use madtracks_level::{
    export_level, ExportObject, ImportSettings, LevelImporter, LevelScene, TrackpartCategory,
};

#[derive(Parser)]
#[command(name = "madtracks")]
#[command(about = "Mad Tracks level importer and exporter", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Game installation directory (overrides the settings file)
    #[arg(short, long, global = true)]
    game_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a level and print its scene as JSON
    Import {
        /// Level file, or level name inside the game's level directory
        level: PathBuf,
        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a JSON scene back to a level file
    Export {
        /// JSON scene (as produced by `import`) or list of export objects
        scene: PathBuf,
        /// Output level .ini file
        output: PathBuf,
    },
    /// Display a summary of a level
    Info {
        /// Level file, or level name inside the game's level directory
        level: PathBuf,
    },
    /// List the trackpart catalog
    Catalog {
        /// Only list one category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Small,
    Medium,
    Golf,
}

impl From<CategoryArg> for TrackpartCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Small => TrackpartCategory::Small,
            CategoryArg::Medium => TrackpartCategory::Medium,
            CategoryArg::Golf => TrackpartCategory::Golf,
        }
    }
}

/// Scene files accepted by `export`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SceneFile {
    Level(LevelScene),
    Objects(Vec<ExportObject>),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.game_dir)?;
    let importer = LevelImporter::from_settings(settings).context("Failed to set up importer")?;

    match cli.command {
        Commands::Import { level, output } => import_level(&importer, &level, output.as_deref())?,
        Commands::Export { scene, output } => export_scene(&importer, &scene, &output)?,
        Commands::Info { level } => show_info(&importer, &level)?,
        Commands::Catalog { category } => show_catalog(&importer, category.map(Into::into)),
    }

    Ok(())
}

fn load_settings(config: Option<&Path>, game_dir: Option<PathBuf>) -> Result<ImportSettings> {
    let mut settings = match config {
        Some(path) => ImportSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ImportSettings::default(),
    };
    if let Some(dir) = game_dir {
        settings.game_dir = dir;
    }
    debug!(game_dir = %settings.game_dir.display(), scale = settings.scale, "settings loaded");
    Ok(settings)
}

fn import_level(importer: &LevelImporter, level: &Path, output: Option<&Path>) -> Result<()> {
    let path = importer.level_path(level);
    let scene = importer
        .scene(&path)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    let json = serde_json::to_string_pretty(&scene)?;

    match output {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote scene to {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn export_scene(importer: &LevelImporter, scene: &Path, output: &Path) -> Result<()> {
    let json = fs::read_to_string(scene).with_context(|| format!("Failed to read {}", scene.display()))?;
    let scale = importer.settings().scale;
    let objects = match serde_json::from_str(&json).context("Unrecognized scene file")? {
        SceneFile::Level(level) => level.to_export_objects(scale),
        SceneFile::Objects(objects) => objects,
    };

    if objects.is_empty() {
        anyhow::bail!("Scene has nothing to export");
    }

    let ini = export_level(&objects, scale);
    ini.write(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Exported {} sections to {}", ini.sections.len(), output.display());
    Ok(())
}

fn show_info(importer: &LevelImporter, level: &Path) -> Result<()> {
    let path = importer.level_path(level);
    let ini = importer
        .read_level(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let scene = importer
        .scene(&path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    println!("File: {}", path.display());
    println!("Sections: {}", ini.sections.len());
    println!("Geometry instances: {}", scene.geometry.len());
    println!("Objects: {}", scene.objects.len());
    println!("Trackpart sequences: {}", scene.sequences.len());
    for sequence in &scene.sequences {
        let first = sequence
            .first()
            .map(|p| p.entity.filename.as_str())
            .unwrap_or("-");
        println!(
            "  [{}] {} parts, starting with {}",
            sequence.sequence_index,
            sequence.len(),
            first
        );
    }
    Ok(())
}

fn show_catalog(importer: &LevelImporter, category: Option<TrackpartCategory>) {
    let catalog = importer.catalog();
    let entries = match category {
        Some(category) => catalog.in_category(category),
        None => catalog.sorted(),
    };

    for entry in entries {
        let p = entry.position;
        let r = entry.rotation;
        print!(
            "{:<28} pos ({}, {}, {}) rot ({}, {}, {})",
            entry.descriptor, p.x, p.y, p.z, r.x, r.y, r.z
        );
        if entry.inverted().is_some() {
            print!(" [invertible]");
        }
        println!();
    }
}
