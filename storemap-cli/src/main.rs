//! storemap - interactive 3D store map
//!
//! Opens the viewer by default; `nodes` and `resolve` load the model
//! headless to inspect the section index and test searches.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use storemap_core::{StoreMap, StoreMapConfig};
use storemap_io::AssetLoader;

#[derive(Parser, Debug)]
#[command(
    name = "storemap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive 3D store map with section search"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scene asset to load, overriding the configuration
    #[arg(long, global = true, value_name = "PATH")]
    asset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Open the interactive viewer
    View,
    /// Print the indexed section names
    Nodes {
        /// Also list mesh nodes that are not store sections
        #[arg(long)]
        all: bool,
    },
    /// Run one search and print the section it would highlight
    Resolve {
        /// Free-text product query
        text: Option<String>,
        /// Department to use when the text is empty
        #[arg(long, default_value = "")]
        category: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.asset.as_ref())?;

    match cli.command.unwrap_or(Command::View) {
        Command::View => {
            storemap_visualization::show_store_map(config).context("viewer failed")?;
        }
        Command::Nodes { all } => {
            let map = load_session(&config)?;
            print_nodes(&map, all);
        }
        Command::Resolve { text, category } => {
            let mut map = load_session(&config)?;
            let resolution = map.resolve(text.as_deref().unwrap_or(""), &category);
            println!("{}", resolution);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>, asset: Option<&PathBuf>) -> Result<StoreMapConfig> {
    let mut config = match path {
        Some(path) => StoreMapConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => StoreMapConfig::default(),
    };
    if let Some(asset) = asset {
        config.asset.path = asset.clone();
    }
    Ok(config)
}

/// Load the asset and index it, failing on a load error
fn load_session(config: &StoreMapConfig) -> Result<StoreMap> {
    let mut map = StoreMap::from_config(config)?;
    let scene = AssetLoader::spawn(&config.asset.path)
        .wait()
        .with_context(|| format!("failed to load {}", config.asset.path.display()))?;
    map.complete_load(Ok(scene));
    Ok(map)
}

fn print_nodes(map: &StoreMap, all: bool) {
    for (name, _) in map.index().iter() {
        println!("{}", name);
    }

    if !all {
        return;
    }
    if let Some(scene) = map.scene() {
        println!();
        for id in scene.mesh_nodes() {
            if let Some(node) = scene.node(id) {
                if !map.index().contains(&node.name) {
                    println!("{} (not a section)", node.name);
                }
            }
        }
    }
}
