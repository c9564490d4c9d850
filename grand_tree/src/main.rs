//! grand_tree: interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use grand_tree::app::run;
use grand_tree::config::{AppConfig, ClassifierKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "grand_tree", version, about = "Gesture-driven holiday tree")]
struct Args {
    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed layout seed (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Gesture source (overrides the config file).
    #[arg(long, value_enum)]
    classifier: Option<ClassifierKind>,

    /// Debug logging (`RUST_LOG` takes precedence).
    #[arg(short, long)]
    verbose: bool,

    /// Skip the banner and start with defaults.
    #[arg(long)]
    quick: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "grand_tree=debug,formation_core=debug" } else { "grand_tree=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut cfg = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                std::process::exit(2);
            }
        },
        None => AppConfig::from_env(),
    };
    if args.seed.is_some() {
        cfg.scene.seed = args.seed;
    }
    if let Some(kind) = args.classifier {
        cfg.observation.classifier = kind;
    }

    if !args.quick {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║          Grand Tree — Gesture Controlled Christmas           ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        match cfg.observation.classifier {
            ClassifierKind::Sim    => println!("  Mode: Keyboard simulation  (O=open  C=closed  N=no hand)"),
            ClassifierKind::Remote => println!("  Mode: Vision API  (frames from {})", cfg.observation.remote.frame_path.display()),
        }
        println!("  Particles: {} foliage, {} ornaments, {} cards",
            cfg.scene.foliage_count, cfg.scene.ornament_count, cfg.scene.card_count);
        println!();
    }

    info!(classifier = ?cfg.observation.classifier, seed = ?cfg.scene.seed, "opening viewer");

    if let Err(e) = run(cfg) {
        error!("{e}");
        std::process::exit(1);
    }
}
