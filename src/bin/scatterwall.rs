use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng as _;
use rand::rngs::StdRng;

use scatterwall::{AnimationScheduler, Compositor, Scene, SceneConfig, export};

#[derive(Parser, Debug)]
#[command(name = "scatterwall", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the static wallpaper as a single PNG.
    Still(StillArgs),
    /// Drive the animation loop on a virtual clock and dump frames.
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Output PNG path.
    #[arg(long, default_value = "wallpaper.png")]
    out: PathBuf,

    /// Scene JSON; defaults to the built-in dual-monitor scene.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Seed for placement and variation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the bezel gap strip instead of excising it.
    #[arg(long)]
    full: bool,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Directory receiving the frame PNGs.
    #[arg(long = "out-dir")]
    out_dir: PathBuf,

    /// Scene JSON; defaults to the built-in dual-monitor scene.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Seed for placement and variation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of 20 Hz ticks to simulate.
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Write every Nth tick as a PNG.
    #[arg(long, default_value_t = 5)]
    every: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Animate(args) => cmd_animate(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(scatterwall::dual_monitor());
    };
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let config: SceneConfig =
        serde_json::from_reader(BufReader::new(f)).context("parse scene JSON")?;
    Ok(config)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let config = load_config(args.scene.as_deref())?;
    config.validate()?;

    let mut scene = Scene::from_config(&config)?;
    let mut compositor = Compositor::new(
        scene.logical_size(),
        scene.gap(),
        scene.background_premul(),
    )?;

    let mut rng = seeded_rng(args.seed);
    compositor.render_static(&mut scene, &mut rng)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    if args.full {
        export::write_png(compositor.surface(), &args.out)?;
    } else {
        let frame = export::contiguous(&compositor);
        export::write_png(&frame, &args.out)?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> anyhow::Result<()> {
    let config = load_config(args.scene.as_deref())?;
    config.validate()?;

    let mut scene = Scene::from_config(&config)?;
    let mut compositor = Compositor::new(
        scene.logical_size(),
        scene.gap(),
        scene.background_premul(),
    )?;

    let mut rng = seeded_rng(args.seed);
    compositor.render_static(&mut scene, &mut rng)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let tick_ms = 1000.0 / scatterwall::TICK_RATE_HZ;
    let every = args.every.max(1);
    let mut scheduler = AnimationScheduler::new(scene, compositor, 0.0);

    let mut written = 0u64;
    for tick in 1..=args.ticks {
        scheduler.advance(tick as f64 * tick_ms, &mut rng)?;
        if tick.is_multiple_of(every) || tick == args.ticks {
            let path = args.out_dir.join(format!("frame_{tick:05}.png"));
            export::write_png(scheduler.present(), &path)?;
            written += 1;
        }
    }

    eprintln!(
        "wrote {written} frame(s) covering {} simulated ticks to {}",
        args.ticks,
        args.out_dir.display()
    );
    Ok(())
}
