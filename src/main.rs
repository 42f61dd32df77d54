use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc;

use clap::{Parser, Subcommand, ValueEnum};
use mandelbrot_engine::{
    AnalysisResult, CallbackObserver, ChunkOrdering, Complex, Engine, EngineConfig, GridRequest,
    JobError, JobSummary, PointRequest, RegionRequest,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(about = "Escape-time analysis of z <- z^2 + c")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Iterate a single point and print its behaviour.
    Point {
        #[arg(long, allow_negative_numbers = true)]
        real: f64,
        #[arg(long, allow_negative_numbers = true)]
        imag: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z0_real: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z0_imag: f64,
        #[arg(long, default_value_t = 100)]
        max_iterations: i64,
        /// Print every step of the orbit.
        #[arg(long)]
        orbit: bool,
    },
    /// Evaluate a square grid of parameters around a center.
    Grid {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        center_real: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        center_imag: f64,
        #[arg(long, default_value_t = 11)]
        size: i64,
        /// Distance between neighbouring points; fitted to the view when omitted.
        #[arg(long)]
        spacing: Option<f64>,
        #[arg(long, default_value_t = 3.0)]
        view_width: f64,
        #[arg(long, default_value_t = 2.5)]
        view_height: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z0_real: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z0_imag: f64,
        #[arg(long, default_value_t = 100)]
        max_iterations: i64,
    },
    /// Compute a viewport in chunks and print a summary.
    Region {
        #[arg(long, default_value_t = -2.0, allow_negative_numbers = true)]
        x_min: f64,
        #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
        x_max: f64,
        #[arg(long, default_value_t = -1.25, allow_negative_numbers = true)]
        y_min: f64,
        #[arg(long, default_value_t = 1.25, allow_negative_numbers = true)]
        y_max: f64,
        #[arg(long, default_value_t = 400, allow_negative_numbers = true)]
        width: i64,
        #[arg(long, default_value_t = 400, allow_negative_numbers = true)]
        height: i64,
        #[arg(long, default_value_t = 100)]
        max_iterations: i64,
        #[arg(long, default_value_t = 50)]
        chunk: u32,
        #[arg(long, value_enum, default_value_t = DispatchOrder::RowMajor)]
        ordering: DispatchOrder,
        /// Seed for `--ordering shuffle`.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, default_value_t = 0.1)]
        progress_granularity: f64,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum DispatchOrder {
    RowMajor,
    Spiral,
    Shuffle,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mandelbrot_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Args::parse().command {
        Command::Point {
            real,
            imag,
            z0_real,
            z0_imag,
            max_iterations,
            orbit,
        } => {
            let engine = Engine::new(EngineConfig::default())?;
            let c = Complex::new(real, imag);
            let result = engine.evaluate_point(PointRequest {
                z0: Complex::new(z0_real, z0_imag),
                c,
                max_iterations,
            })?;

            println!("{c}: {}", describe(&result));
            if orbit {
                for step in result.sequence() {
                    println!("{:>6}  {}", step.iteration, step.z);
                }
            }
        }
        Command::Grid {
            center_real,
            center_imag,
            size,
            spacing,
            view_width,
            view_height,
            z0_real,
            z0_imag,
            max_iterations,
        } => {
            let engine = Engine::new(EngineConfig::default())?;
            let spacing = spacing.unwrap_or_else(|| {
                GridRequest::spacing_for_view(
                    view_width,
                    view_height,
                    u32::try_from(size).unwrap_or(1),
                )
            });

            let results = engine.evaluate_grid(&GridRequest {
                center: Complex::new(center_real, center_imag),
                size,
                spacing,
                z0: Complex::new(z0_real, z0_imag),
                max_iterations,
            })?;

            let mut rows: Vec<_> = results.iter().collect();
            rows.sort_by(|a, b| a.0.cmp(b.0));
            for (key, result) in rows {
                println!("{key}: {}", describe(result));
            }
            print_totals(results.values());
        }
        Command::Region {
            x_min,
            x_max,
            y_min,
            y_max,
            width,
            height,
            max_iterations,
            chunk,
            ordering,
            seed,
            workers,
            progress_granularity,
        } => {
            let defaults = EngineConfig::default();
            let engine = Engine::new(EngineConfig {
                chunk_capacity: (chunk, chunk),
                ordering: match ordering {
                    DispatchOrder::RowMajor => ChunkOrdering::RowMajor,
                    DispatchOrder::Spiral => ChunkOrdering::Spiral,
                    DispatchOrder::Shuffle => ChunkOrdering::Shuffle { seed },
                },
                workers: workers.unwrap_or(defaults.workers),
                progress_granularity,
                ..defaults
            })?;

            let (sender, receiver) = mpsc::channel();
            let observer = CallbackObserver::new(
                |fraction| info!(percent = fraction * 100.0, "progress"),
                move |outcome: Result<JobSummary, JobError>| {
                    let _ = sender.send(outcome);
                },
            );

            engine.compute_region(
                RegionRequest {
                    x_range: (x_min, x_max),
                    y_range: (y_min, y_max),
                    resolution: (width, height),
                    max_iterations,
                },
                Arc::new(observer),
            )?;

            let summary = receiver.recv()??;
            println!(
                "chunks: {} computed, {} cached, {} retried, {} total",
                summary.computed_chunks,
                summary.cached_chunks,
                summary.retried_chunks,
                summary.total_chunks
            );
            print_totals(engine.snapshot().values());
        }
    }

    Ok(())
}

fn describe(result: &AnalysisResult) -> String {
    match result.escape_time() {
        Some(escape_time) => format!("{} at iteration {escape_time}", result.behaviour_label()),
        None => result.behaviour_label().to_owned(),
    }
}

fn print_totals<'a>(results: impl Iterator<Item = &'a AnalysisResult>) {
    let (mut converges, mut diverges, mut escape_sum) = (0u64, 0u64, 0u64);

    for result in results {
        match result.escape_time() {
            Some(escape_time) => {
                diverges += 1;
                escape_sum += u64::from(escape_time);
            }
            None => converges += 1,
        }
    }

    println!("converges: {converges}, diverges: {diverges}");
    if diverges > 0 {
        println!("mean escape time: {:.2}", escape_sum as f64 / diverges as f64);
    }
}
