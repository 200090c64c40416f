use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worldscene_input::{InputEvent, PointerButton};
use worldscene_kernel::{World, WorldConfig};
use worldscene_render::{DebugTextRenderer, HeadlessContainer};
use worldscene_scene::{NoHelpers, StandardHelpers};

#[derive(Parser)]
#[command(name = "worldscene-cli", about = "Headless tools for worldscene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON world config; defaults to the stock scene
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Assemble a world and print debug frames
    Assemble {
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Container width in pixels
        #[arg(long, default_value = "800")]
        width: u32,
        /// Container height in pixels
        #[arg(long, default_value = "600")]
        height: u32,
        /// Horizontal orbit drag applied before each frame, in pixels
        #[arg(long, default_value = "0")]
        orbit: f32,
        /// Background HDR file, overriding the config
        #[arg(long)]
        background: Option<PathBuf>,
        /// Block until the background has loaded before the first frame
        #[arg(long)]
        wait: bool,
        /// Build the scene without a light helper
        #[arg(long)]
        no_helpers: bool,
    },
    /// Print the effective config as JSON
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WorldConfig> {
    match path {
        Some(path) => WorldConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WorldConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("worldscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", worldscene_assets::crate_info());
            println!("render: {}", worldscene_render::crate_info());
        }
        Commands::Assemble {
            frames,
            width,
            height,
            orbit,
            background,
            wait,
            no_helpers,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            if let Some(path) = background {
                config.background.set_path(path);
            }

            let mut container = HeadlessContainer::new(width, height);
            let mut loader = config.background.loader();
            let helpers: &dyn worldscene_scene::HelperFactory = if no_helpers {
                &NoHelpers
            } else {
                &StandardHelpers
            };
            let mut world = World::new(
                &mut container,
                &config,
                |settings, _| Ok(DebugTextRenderer::new(settings.clone())),
                &mut loader,
                helpers,
            )?;

            if wait {
                world.wait_for_assets();
            }

            world.render();
            for _ in 0..frames {
                if orbit != 0.0 {
                    let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
                    for event in InputEvent::drag(
                        PointerButton::Primary,
                        center,
                        center + Vec2::new(orbit, 0.0),
                    ) {
                        world.handle_input(&event);
                    }
                }
                if let Some(frame) = world.tick() {
                    print!("{frame}");
                }
            }
            world.stop();
            tracing::debug!(frames = world.frames(), "assemble finished");
            println!("phase: {:?}, frames: {}", world.phase(), world.frames());
        }
        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}
