use clap::{Parser, Subcommand};
use sn_network::{LoopDepot, Network, Settings};
use sn_results::{CsvEmitter, RunKind, RunManifest, compute_run_id, write_summary};
use sn_solver::solve_steady;
use sn_transient::TransientEngine;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "sn-cli")]
#[command(about = "SurgeNet - steady and water-hammer pipe-network simulation", long_about = None)]
struct Cli {
    /// Directory holding the settings, nodes, and elements input files
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Output directory for CSV series, summary, and the run manifest
    #[arg(long, default_value = "results")]
    out: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the inputs, validate topology, and enumerate the loop system
    Check,
    /// Solve the steady state and print the network summary
    Steady,
    /// Full pipeline: steady solve, transient run, CSV emission
    Run,
}

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Parse(#[from] sn_io::ParseError),

    #[error(transparent)]
    Network(#[from] sn_network::NetworkError),

    #[error(transparent)]
    Solver(#[from] sn_solver::SolverError),

    #[error(transparent)]
    Transient(#[from] sn_transient::TransientError),

    #[error(transparent)]
    Results(#[from] sn_results::ResultsError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// 1 I/O, 2 parse, 3 topology, 4 numerical-fatal.
    fn exit_code(&self) -> u8 {
        match self {
            AppError::Io(_) => 1,
            AppError::Parse(sn_io::ParseError::Io(_)) => 1,
            AppError::Parse(sn_io::ParseError::Network(_)) => 3,
            AppError::Parse(_) => 2,
            AppError::Network(_) => 3,
            AppError::Solver(_) | AppError::Transient(_) => 4,
            AppError::Results(_) => 1,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn dispatch(cli: &Cli) -> Result<(), AppError> {
    let (settings, mut network) = sn_io::load_dir(&cli.dir)?;
    let depot = LoopDepot::enumerate(&network)?;
    info!(
        nodes = network.nodes().len(),
        elements = network.elements().len(),
        loops = depot.loops().len(),
        pseudo_loops = depot.pseudo_loops().len(),
        "network loaded"
    );

    match cli.command {
        Commands::Check => {
            print_summary(&settings, &network, &depot)?;
        }
        Commands::Steady => {
            let report = solve_steady(&mut network, &depot)?;
            info!(
                iterations = report.iterations,
                residual = report.residual_norm,
                converged = report.converged,
                "steady solve finished"
            );
            print_summary(&settings, &network, &depot)?;
        }
        Commands::Run => {
            let report = solve_steady(&mut network, &depot)?;
            info!(
                iterations = report.iterations,
                converged = report.converged,
                "steady solve finished"
            );
            run_transient(cli, &settings, &mut network)?;
            print_summary(&settings, &network, &depot)?;
            save_summary(&cli.out, &settings, &network, &depot)?;
        }
    }
    Ok(())
}

fn run_transient(
    cli: &Cli,
    settings: &Settings,
    network: &mut Network,
) -> Result<(), AppError> {
    if settings.sym_time <= 0.0 {
        info!("symtime is zero, transient stage skipped");
        return Ok(());
    }

    std::fs::create_dir_all(&cli.out)?;
    let mut emitter = CsvEmitter::create(&cli.out, network)?;
    let mut engine = TransientEngine::new(network, *settings)?;
    let (dt, steps) = {
        engine.run(|sample| emitter.emit(&sample))?;
        (engine.dt(), engine.steps_taken())
    };
    emitter.finish()?;

    let read = |name: &str| std::fs::read_to_string(cli.dir.join(name));
    let run_id = compute_run_id(
        &read("settings")?,
        &read("nodes")?,
        &read("elements")?,
        env!("CARGO_PKG_VERSION"),
    );
    RunManifest::new(
        run_id,
        RunKind::Transient {
            dt_s: dt,
            t_end_s: settings.sym_time,
            steps,
        },
    )
    .save(&cli.out)?;
    info!(dt, steps, "transient run finished");
    Ok(())
}

fn print_summary(
    settings: &Settings,
    network: &Network,
    depot: &LoopDepot,
) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, settings, network, depot)?;
    out.flush()?;
    Ok(())
}

fn save_summary(
    dir: &Path,
    settings: &Settings,
    network: &Network,
    depot: &LoopDepot,
) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    let mut buf = Vec::new();
    write_summary(&mut buf, settings, network, depot)?;
    std::fs::write(dir.join("summary.txt"), buf)?;
    Ok(())
}
