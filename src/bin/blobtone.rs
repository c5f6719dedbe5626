use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use blobtone::{CpuRenderer, FrameRGBA, RenderSettings, Scene, SceneConfig, SceneRenderer};

#[derive(Parser, Debug)]
#[command(name = "blobtone", version)]
struct Cli {
    /// Log generation details to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one scene and render it as a PNG.
    Frame(FrameArgs),
    /// Generate one scene and write it as JSON.
    Scene(SceneArgs),
    /// Print the preset list as JSON.
    Presets(ConfigArgs),
    /// Run the refresh timer and write a PNG for every published scene.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Scene configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// RNG seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the configured layer count.
    #[arg(long)]
    layers: Option<usize>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: GenArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels (defaults to the container width).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to the container height).
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct SceneArgs {
    #[command(flatten)]
    common: GenArgs,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    common: GenArgs,

    /// Directory receiving `scene_<generation>.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of scenes to write before stopping.
    #[arg(long, default_value_t = 3)]
    count: u64,

    /// Override the configured refresh interval.
    #[arg(long)]
    interval_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Scene(args) => cmd_scene(args),
        Command::Presets(args) => cmd_presets(args),
        Command::Watch(args) => cmd_watch(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<SceneConfig> {
    let config = match &args.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };
    config.validate().context("invalid scene config")?;
    Ok(config)
}

fn generate(args: &GenArgs) -> anyhow::Result<Arc<Scene>> {
    let mut config = load_config(&args.config)?;
    if let Some(n) = args.layers {
        config.compositor.layer_count = n;
    }
    let compositor = config.build_compositor(args.seed)?;
    let out = compositor.regenerate()?;
    for failure in &out.failures {
        eprintln!("warning: {failure}");
    }
    Ok(out.scene)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = generate(&args.common)?;
    let mut settings = RenderSettings::for_scene(&scene);
    if let Some(w) = args.width {
        settings.width = w;
    }
    if let Some(h) = args.height {
        settings.height = h;
    }
    let frame = CpuRenderer::new(settings).render(&scene)?;
    write_png(&args.out, &frame)?;
    eprintln!(
        "wrote {} ({} layers, {} dots)",
        args.out.display(),
        scene.layers.len(),
        scene.dot_count()
    );
    Ok(())
}

fn cmd_scene(args: SceneArgs) -> anyhow::Result<()> {
    let scene = generate(&args.common)?;
    let json = serde_json::to_string_pretty(&*scene).context("serialize scene")?;
    match &args.out {
        Some(path) => {
            ensure_parent_dir(path)?;
            std::fs::write(path, json)
                .with_context(|| format!("write scene json '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_presets(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let presets = config.preset_provider()?;
    let json = serde_json::to_string_pretty(presets.list()).context("serialize presets")?;
    println!("{json}");
    Ok(())
}

fn cmd_watch(args: WatchArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.common.config)?;
    if let Some(n) = args.common.layers {
        config.compositor.layer_count = n;
    }
    if let Some(ms) = args.interval_ms {
        config.compositor.refresh_interval_ms = ms;
    }
    config.compositor.auto_refresh = true;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let compositor = Arc::new(config.build_compositor(args.common.seed)?);
    compositor.start()?;

    let interval = Duration::from_millis(config.compositor.refresh_interval_ms);
    let rounds = u32::try_from(args.count).unwrap_or(u32::MAX).saturating_add(2);
    let deadline = interval
        .checked_mul(rounds)
        .and_then(|d| Instant::now().checked_add(d));
    let mut last = 0u64;
    let mut written = 0u64;
    while written < args.count && deadline.is_none_or(|d| Instant::now() < d) {
        let scene = compositor.scene();
        if scene.generation > last {
            last = scene.generation;
            let frame = CpuRenderer::new(RenderSettings::for_scene(&scene)).render(&scene)?;
            let path = args.out_dir.join(format!("scene_{:04}.png", scene.generation));
            write_png(&path, &frame)?;
            eprintln!("wrote {}", path.display());
            written += 1;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    compositor.teardown();
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let straight = frame.to_straight_rgba8();
    image::save_buffer_with_format(
        path,
        &straight.data,
        straight.width,
        straight.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
