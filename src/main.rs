use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    style::ResetColor,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use log::info;

use neuralbg::{
    BackgroundConfig, DrawSurface, FrameOutcome, FrameStats, NeuralBackground, Rgb, TerminalCanvas,
};

/// Animated neural sphere background for the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Particle and edge colour as "r, g, b"
    #[arg(long)]
    color: Option<Rgb>,

    /// Opacity multiplier for everything drawn (0..=1)
    #[arg(long)]
    opacity: Option<f64>,

    /// Number of clusters
    #[arg(long)]
    clusters: Option<usize>,

    /// Nodes per cluster
    #[arg(long)]
    nodes: Option<usize>,

    /// Base cluster radius in world units
    #[arg(long)]
    radius: Option<f64>,

    /// Screen distance under which nodes are connected
    #[arg(long)]
    connection_distance: Option<f64>,

    /// Perspective focal length
    #[arg(long)]
    perspective: Option<f64>,

    /// Seed for reproducible worlds
    #[arg(long)]
    seed: Option<u64>,

    /// World units covered by one half-block pixel
    #[arg(long, default_value_t = 8.0)]
    cell_px: f64,

    /// Frame rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Terminal background colour as "r, g, b"
    #[arg(long, default_value = "6, 7, 14")]
    background: Rgb,
}

impl Args {
    fn load_config(&self) -> Result<BackgroundConfig> {
        let mut config = match &self.config {
            Some(path) => BackgroundConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => BackgroundConfig::default(),
        };

        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(opacity) = self.opacity {
            config.opacity = opacity;
        }
        if let Some(clusters) = self.clusters {
            config.cluster_count = clusters;
        }
        if let Some(nodes) = self.nodes {
            config.nodes_per_cluster = nodes;
        }
        if let Some(radius) = self.radius {
            config.cluster_base_radius = radius;
        }
        if let Some(distance) = self.connection_distance {
            config.connection_distance = distance;
        }
        if let Some(perspective) = self.perspective {
            config.perspective = perspective;
        }

        config.validate().context("invalid command line override")?;
        Ok(config)
    }
}

/// Raw mode and the alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
    }
}

fn terminal_size() -> Result<(u16, u16)> {
    if let Some(size) = termsize::get() {
        return Ok((size.cols, size.rows));
    }
    terminal::size().context("failed to query terminal size")
}

fn status_line(
    background: &NeuralBackground,
    stats: FrameStats,
    debug: bool,
    paused: bool,
) -> Option<String> {
    let mut parts = Vec::new();
    if debug {
        let clusters = background.world().map_or(0, |world| world.groups().len());
        parts.push(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
        parts.push(format!(
            "clusters {}/{} nodes {} edges {}",
            clusters,
            background.config().cluster_count,
            stats.nodes,
            stats.edges
        ));
        parts.push(format!("FPS {:.1}", background.fps()));
    }
    if paused {
        parts.push("Paused".to_string());
    }
    (!parts.is_empty()).then(|| format!(" {} ", parts.join(" | ")))
}

fn run(args: &Args, config: BackgroundConfig) -> Result<()> {
    anyhow::ensure!(
        args.cell_px.is_finite() && args.cell_px > 0.0,
        "--cell-px must be a positive number, got {}",
        args.cell_px
    );
    let (cols, rows) = terminal_size()?;
    let mut out = io::stdout();
    let _guard = TerminalGuard::enter(&mut out).context("failed to set up terminal")?;

    let mut canvas = TerminalCanvas::new(cols, rows, args.cell_px, args.background);
    let mut background = match args.seed {
        Some(seed) => NeuralBackground::with_seed(config, seed),
        None => NeuralBackground::new(config),
    };
    let (width, height) = canvas.size();
    background.mount(width, height);

    let frame_time = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let mut paused = false;
    let mut debug = false;
    let mut stats = FrameStats::default();

    'running: loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break 'running,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break 'running
                    }
                    KeyCode::Char('p') => paused = !paused,
                    KeyCode::Char('d') => debug = !debug,
                    KeyCode::Char('r') => background.regenerate(),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    canvas.resize(cols, rows);
                    let (width, height) = canvas.size();
                    background.resize(width, height);
                }
                _ => {}
            }
        }

        if !paused {
            if let FrameOutcome::Drawn(frame) = background.tick(Some(&mut canvas)) {
                stats = frame;
            }
        }
        canvas.set_overlay(status_line(&background, stats, debug, paused));
        canvas.present(&mut out)?;

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    background.unmount();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.load_config()?;
    info!("starting with {:?}", config);

    run(&args, config)
}
