use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tl_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, project_service, query,
    run_service,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(about = "twolayer CLI - two-box lake temperature and oxygen model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration and its forcing file
    Validate {
        /// Path to the run configuration (YAML or JSON)
        config_path: PathBuf,
    },
    /// Run the configured simulation
    Run {
        /// Path to the run configuration
        config_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Run one member per entrainment calibration multiplier
    Sweep {
        /// Path to the run configuration
        config_path: PathBuf,
        /// Calibration multipliers, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        cal: Vec<f64>,
    },
    /// List cached runs for a configuration
    Runs {
        /// Path to the run configuration
        config_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the run configuration
        config_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one state variable of a run as CSV
    ExportSeries {
        /// Path to the run configuration
        config_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Variable name (te, th, oe, oh)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            no_cache,
        } => cmd_run(&config_path, !no_cache),
        Commands::Sweep { config_path, cal } => cmd_sweep(&config_path, &cal),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::ShowRun {
            config_path,
            run_id,
        } => cmd_show_run(&config_path, &run_id),
        Commands::ExportSeries {
            config_path,
            run_id,
            variable,
            output,
        } => cmd_export_series(&config_path, &run_id, &variable, output.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = project_service::load_config(config_path)?;
    let forcing = project_service::load_forcing(config_path, &config)?;
    tl_app::compile(&config, &forcing)?;

    let summary = project_service::summarize(config_path, &config);
    println!("✓ Configuration is valid");
    println!("  Name: {}", summary.name);
    println!("  Variant: {}", summary.variant.as_str());
    println!("  Ice: {}", if summary.ice { "on" } else { "off" });
    println!("  Output times: {}", summary.grid_points);
    println!(
        "  Forcing: {} ({} rows)",
        summary.forcing_path.display(),
        forcing.len()
    );
    if summary.uses_hypsography {
        println!("  Geometry: derived from hypsography");
    }
    Ok(())
}

fn cmd_run(config_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running: {}", config_path.display());

    let request = RunRequest {
        config_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            let fraction = event
                .simulation
                .as_ref()
                .map(|s| s.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let (_manifest, records) = run_service::load_run(config_path, &response.run_id)?;
    print_final_state(&query::get_run_summary(&records)?);

    Ok(())
}

fn cmd_sweep(config_path: &Path, calibrations: &[f64]) -> AppResult<()> {
    println!(
        "Calibration sweep over {} members: {}",
        calibrations.len(),
        config_path.display()
    );
    let started = Instant::now();
    let members = tl_app::sweep_config(config_path, calibrations)?;

    println!("\n  {:>10}  {:>10}  {:>10}", "cal", "Te end", "Th end");
    for member in &members {
        let summary = query::get_run_summary(&member.trajectory)?;
        println!(
            "  {:>10.4}  {:>10.4}  {:>10.4}",
            member.calibration, summary.final_record.te, summary.final_record.th
        );
    }
    println!("\n  Total: {:.3}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.simulation) {
        (RunStage::Simulating, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}d  step={}/{}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.sim_time_d,
                s.t_end_d,
                s.step,
                s.steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &tl_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    println!(
        "  Load:      {:.3}s ({:.1}%)",
        timing.load_time_s,
        100.0 * timing.load_time_s / total
    );
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!(
            "  Compile:   {:.3}s ({:.1}%)",
            timing.compile_time_s,
            100.0 * timing.compile_time_s / total
        );
        println!(
            "  Integrate: {:.3}s ({:.1}%)",
            timing.simulate_time_s,
            100.0 * timing.simulate_time_s / total
        );
        println!(
            "  Save:      {:.3}s ({:.1}%)",
            timing.save_time_s,
            100.0 * timing.save_time_s / total
        );
        println!("  Steps:     {}", timing.steps);
    }
    println!("  Diagnostics rows: {}", timing.diagnostics_rows);
    println!("  Total:     {:.3}s", timing.total_time_s);
}

fn print_final_state(summary: &query::RunSummary) {
    let last = &summary.final_record;
    println!("  Time points: {}", summary.record_count);
    println!(
        "  Time range: {:.3} - {:.3} d",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Final Te: {:.4} °C", last.te);
    println!("  Final Th: {:.4} °C", last.th);
    if let (Some(oe), Some(oh)) = (last.oe, last.oh) {
        println!("  Final Oe: {:.6e} g", oe);
        println!("  Final Oh: {:.6e} g", oh);
    }
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(config_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", config_path.display());
    } else {
        println!("Cached runs for '{}':", config_path.display());
        for manifest in runs {
            println!(
                "  {} {} [{}] ({})",
                manifest.run_id,
                manifest.name,
                manifest.variant.as_str(),
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(config_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(config_path, run_id)?;
    let summary = query::get_run_summary(&records)?;

    println!("\nRun Summary:");
    println!("  Name: {}", manifest.name);
    println!("  Variant: {}", manifest.variant.as_str());
    println!("  Solver: {}", manifest.solver_version);
    println!("  Created: {}", manifest.timestamp);
    print_final_state(&summary);
    if let Some(file) = &manifest.diagnostics_file {
        println!("  Diagnostics: {} ({} rows)", file, manifest.diagnostics_rows);
    }

    println!("\nVariables:");
    for name in query::series_variables(&records) {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_export_series(
    config_path: &Path,
    run_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, records) = run_service::load_run(config_path, run_id)?;
    let series = query::extract_series(&records, variable)?;

    let mut csv = format!("time_d,{}\n", variable);
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
