use labsim::{bench_models, bench_render};
use labsim::{RecordingSurface, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file inside the crate's `scenarios/` directory
    #[arg(short, default_value = "projectile.yaml")]
    file_name: String,

    /// Run without a window, rendering into a recording surface
    #[arg(long)]
    headless: bool,

    /// Maximum ticks for a headless run
    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Print evaluation and render timings for every model, then exit
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader).with_context(|| format!("loading {}", config_path.display()))?;

    tracing::debug!(?scenario_cfg, "scenario loaded");
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.bench {
        bench_models();
        bench_render();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;

    if args.headless || cfg!(not(feature = "viewer")) {
        let mut surface = RecordingSurface::new();
        let report = scenario.run_headless(args.frames, 1.0 / 60.0, &mut surface);
        println!(
            "{}: {} frames over {} ticks, t = {:.3} s, {:?}, {} draw calls",
            scenario.component.name(),
            report.frames,
            report.ticks,
            report.final_time,
            report.state,
            surface.total_draw_calls()
        );
        scenario.teardown();
        return Ok(());
    }

    #[cfg(feature = "viewer")]
    labsim::run_2d(scenario);

    Ok(())
}
