//! Wisp CLI
//!
//! Replay window-event timelines against the animation engine without a
//! compositor, and inspect the registered effects and configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wisp_animation::effects::Builtins;
use wisp_animation::{
    AnimationConfig, Animator, EngineEvent, Extension, PaintDecision, WindowEvent,
};
use wisp_core::WindowId;
use wisp_fx::Addon;

mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "wisp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wisp window animation simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario frame by frame
    Run {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Animation configuration (TOML); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Milliseconds per frame
        #[arg(long, default_value = "16")]
        ms: f32,

        /// Stop after this many frames even if still animating
        #[arg(long, default_value = "1000")]
        max_frames: usize,

        /// Print one JSON object per frame
        #[arg(long)]
        json: bool,
    },

    /// List effects with their events and parameters
    Effects {
        /// Include parameter declarations
        #[arg(short, long)]
        params: bool,
    },

    /// Print the default configuration as TOML
    Config,

    /// Check a configuration file
    Check {
        /// Animation configuration (TOML)
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            ms,
            max_frames,
            json,
        } => cmd_run(&scenario, config.as_deref(), ms, max_frames, json),

        Commands::Effects { params } => cmd_effects(params),

        Commands::Config => cmd_config(),

        Commands::Check { config } => cmd_check(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnimationConfig> {
    let Some(path) = path else {
        return Ok(AnimationConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    AnimationConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// run
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct FrameReport {
    frame: usize,
    events: Vec<EngineEvent>,
    damage: Vec<WindowDamage>,
    windows: Vec<WindowReport>,
}

#[derive(Debug, Serialize)]
struct WindowDamage {
    window: WindowId,
    /// x, y, width, height
    rects: Vec<[i32; 4]>,
}

#[derive(Debug, Serialize)]
struct WindowReport {
    window: WindowId,
    event: WindowEvent,
    effect: String,
    remaining_ms: f32,
    progress: f32,
    opacity: Option<f32>,
}

fn cmd_run(
    scenario_path: &Path,
    config_path: Option<&Path>,
    ms: f32,
    max_frames: usize,
    json: bool,
) -> Result<()> {
    if ms <= 0.0 {
        anyhow::bail!("Frame length must be positive, got {}", ms);
    }
    let scenario = Scenario::load(scenario_path)?;
    let mut config = load_config(config_path)?;
    if let Some(seed) = scenario.seed {
        config.seed = seed;
    }

    let mut animator = Animator::new(config, scenario.screen.info());
    animator
        .add_extension(&Addon)
        .context("Failed to register the fx effects")?;
    info!(
        "Replaying {} events from {}",
        scenario.steps.len(),
        scenario_path.display()
    );

    let mut replies = Vec::new();
    let mut frame = 0;
    while frame < max_frames {
        for event in scenario.due(frame) {
            debug!(frame, ?event, "Host event");
            replies.extend(animator.handle(event.clone()));
        }

        let prepared = animator.prepare_paint(ms);
        replies.extend(prepared.events);

        let mut windows = Vec::new();
        for step in animator.paint_order() {
            let opacity = match animator.paint_window(step) {
                PaintDecision::Paint(p) => Some(p.attributes.opacity),
                PaintDecision::Skip => Some(0.0),
                PaintDecision::Untouched => None,
            };
            if step.over_new_copy {
                continue;
            }
            if let Some(state) = animator.state(step.window).filter(|s| s.is_animating()) {
                windows.push(WindowReport {
                    window: step.window,
                    event: state.event,
                    effect: animator.effect_name(step.window).unwrap_or("").to_string(),
                    remaining_ms: state.remaining_time,
                    progress: wisp_animation::progress::default_progress(state),
                    opacity,
                });
            }
        }

        let report = FrameReport {
            frame,
            events: std::mem::take(&mut replies),
            damage: prepared
                .damage
                .iter()
                .map(|d| WindowDamage {
                    window: d.window,
                    rects: d
                        .region
                        .iter()
                        .map(|r| [r.x, r.y, r.width, r.height])
                        .collect(),
                })
                .collect(),
            windows,
        };
        print_frame(&report, json)?;

        frame += 1;
        if frame > scenario.last_frame() && !animator.done_paint() {
            break;
        }
    }

    if frame >= max_frames && animator.done_paint() {
        warn!("Stopped after {} frames with animations still running", max_frames);
    }
    info!("Replayed {} frames", frame);
    Ok(())
}

fn print_frame(report: &FrameReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    if report.events.is_empty() && report.damage.is_empty() && report.windows.is_empty() {
        return Ok(());
    }

    println!("frame {}", report.frame);
    for event in &report.events {
        println!("  event   {:?}", event);
    }
    for damage in &report.damage {
        println!("  damage  {} {:?}", damage.window, damage.rects);
    }
    for w in &report.windows {
        println!(
            "  window  {} {} {} {:.0}ms left progress {:.2}{}",
            w.window,
            w.event,
            w.effect,
            w.remaining_ms,
            w.progress,
            w.opacity
                .map(|o| format!(" opacity {:.2}", o))
                .unwrap_or_default()
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// effects / config / check
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_effects(show_params: bool) -> Result<()> {
    let extensions: [&dyn Extension; 2] = [&Builtins, &Addon];
    for extension in extensions {
        println!("{}", extension.name());
        for effect in extension.effects() {
            let events: Vec<&str> = effect.events().iter().map(|k| k.name()).collect();
            println!(
                "  {}:{:<18} {}",
                extension.name(),
                effect.name(),
                events.join(", ")
            );
            if show_params {
                for spec in effect.params() {
                    let range = match (spec.min, spec.max) {
                        (Some(min), Some(max)) => format!(" [{}, {}]", min, max),
                        _ => String::new(),
                    };
                    println!(
                        "      {:<28} {:?} = {:?}{}",
                        spec.name, spec.kind, spec.default, range
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let toml = AnimationConfig::default()
        .to_toml_string()
        .context("Failed to serialize the default configuration")?;
    print!("{}", toml);
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    let mut animator = Animator::new(config, wisp_core::ScreenInfo::new(1920, 1080));
    animator
        .add_extension(&Addon)
        .context("Failed to register the fx effects")?;

    let config = animator.config();
    let mut problems = 0;
    for kind in wisp_animation::EventKind::ALL {
        let rules = config.rules(kind);
        if !rules.is_consistent() {
            warn!("{} rows have mismatched list lengths", kind.name());
            problems += 1;
        }
        for effect in &rules.effects {
            if animator.registry().lookup(effect).is_none() {
                warn!("{}: unknown effect '{}'", kind.name(), effect);
                problems += 1;
            }
        }
    }
    if problems > 0 {
        anyhow::bail!("{} problem(s) in {}", problems, path.display());
    }
    info!("{} is valid", path.display());
    Ok(())
}
