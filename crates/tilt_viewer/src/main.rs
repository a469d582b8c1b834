use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tilt_core::Scene;
use tilt_renderer::{render_frame, Coordinator, FrameBuffer, RenderConfig};

/// Command line arguments
#[derive(Parser)]
#[command(name = "tilt_viewer")]
#[command(about = "Render a sphere scene through the tiled worker pipeline")]
struct Args {
    /// Render config (JSON); missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene description (JSON); defaults to the built-in demo scene
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Frame size as WIDTHxHEIGHT, overriding the scene's
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Where to write the presented frame
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Use 4x jittered supersampling
    #[arg(long)]
    anti_alias: bool,

    /// Render once on the rayon pool instead of the worker pipeline
    #[arg(long)]
    direct: bool,

    /// Camera keys to apply after the first pass starts (w W s S a d ArrowUp ...)
    keys: Vec<String>,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("frame size must be non-zero, got {w}x{h}"));
    }
    Ok((w, h))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn build_scene(args: &Args) -> Result<Scene> {
    let mut scene = match &args.scene {
        Some(path) => load_json::<Scene>(path)?,
        None => Scene::demo(600, 600),
    };
    if let Some((width, height)) = args.size {
        scene.width = width;
        scene.height = height;
    }
    if scene.width == 0 || scene.height == 0 {
        bail!("scene frame size must be non-zero, got {}x{}", scene.width, scene.height);
    }
    Ok(scene)
}

fn build_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => load_json::<RenderConfig>(path)?,
        None => RenderConfig::default(),
    };
    if args.anti_alias {
        config.samples_per_pixel = 4;
    }
    config.validate()?;
    Ok(config)
}

fn render_direct(mut scene: Scene, config: &RenderConfig, keys: &[String]) -> Result<FrameBuffer> {
    for key in keys {
        if !scene.apply_command(key) {
            log::warn!("Ignoring unrecognized key {:?}", key);
        }
    }
    Ok(render_frame(&scene, config)?)
}

fn render_pipeline(scene: Scene, config: RenderConfig, keys: &[String]) -> Result<FrameBuffer> {
    let sink = FrameBuffer::new(scene.width, scene.height);
    let mut coordinator = Coordinator::spawn(scene, config, sink)?;

    coordinator.start()?;
    // Each recognized key supersedes whatever is still in flight
    for key in keys {
        coordinator.apply_command(key)?;
    }
    coordinator.render_until_presented()?;

    log::info!(
        "Presented generation {} (eye at {})",
        coordinator.generation(),
        coordinator.scene().camera.eye
    );
    Ok(coordinator.sink().clone())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scene = build_scene(&args)?;
    let config = build_config(&args)?;

    log::info!(
        "Rendering {}x{}: {} spheres, {} lights, {} spp",
        scene.width,
        scene.height,
        scene.spheres.len(),
        scene.lights.len(),
        config.samples_per_pixel
    );

    let start = Instant::now();
    let frame = if args.direct {
        render_direct(scene, &config, &args.keys)?
    } else {
        render_pipeline(scene, config, &args.keys)?
    };
    log::info!("Rendered in {:?}", start.elapsed());

    frame
        .to_image()
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Saved to {}", args.output.display());

    Ok(())
}
