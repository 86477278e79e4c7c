//! lapsmooth CLI - mesh smoothing command-line tool.
//!
//! Usage: lapsmooth <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `lapsmooth --help` for available commands. Set `RUST_LOG=debug` for
//! pipeline details.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use lapsmooth::algo::connectivity::Connectivity;
use lapsmooth::algo::{smooth, Progress};
use lapsmooth::io;
use lapsmooth::mesh::PolyMesh;

/// Upper bound on passes accepted from the command line.
const MAX_ITERATIONS: u32 = 50;

#[derive(Parser)]
#[command(name = "lapsmooth")]
#[command(author, version, about = "Laplacian mesh smoothing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Smooth a mesh, keeping boundary vertices fixed
    Smooth {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Smoothing method
        #[arg(short, long, value_enum, default_value = "laplacian")]
        method: SmoothMethod,

        /// Number of iterations (1 to 50)
        #[arg(short, long, default_value = "10",
              value_parser = clap::value_parser!(u32).range(1..=MAX_ITERATIONS as i64))]
        iterations: u32,

        /// Smoothing factor (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        lambda: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SmoothMethod {
    /// Uniform Laplacian smoothing
    Laplacian,
    /// Taubin smoothing (shrinkage-resistant)
    Taubin,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Smooth {
            input,
            output,
            method,
            iterations,
            lambda,
            sequential,
        } => {
            cmd_smooth(&input, &output, method, iterations as usize, lambda, sequential)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward; skip redraws that would not change the bar.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }
        let percent = raw_percent.max(previous);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("loading {}", input.display());
    let mesh: PolyMesh = io::load(input)?;
    let connectivity = Connectivity::build(&mesh)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", connectivity.num_edges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!("Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z);
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let avg_edge = connectivity.average_edge_length(mesh.positions())?;
    println!("Average edge length: {:.6}", avg_edge);

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else {
        println!("Mesh type: Mixed polygon mesh");
    }

    if connectivity.is_closed() {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary vertices, {} boundary edges)",
            connectivity.num_boundary_vertices(),
            connectivity.boundary_edges().count()
        );
    }

    let non_manifold = connectivity.non_manifold_edges().count();
    if non_manifold > 0 {
        println!("Non-manifold edges: {}", non_manifold);
    }

    let isolated = mesh
        .vertex_ids()
        .filter(|&v| connectivity.valence(v) == 0)
        .count();
    if isolated > 0 {
        println!("Unreferenced vertices: {}", isolated);
    }

    Ok(())
}

fn cmd_smooth(
    input: &PathBuf,
    output: &PathBuf,
    method: SmoothMethod,
    iterations: usize,
    lambda: f64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = smooth::SmoothOptions {
        iterations,
        lambda,
        parallel: !sequential,
    };
    // Reject bad parameters before touching the input file.
    options.validate()?;

    log::info!("loading {}", input.display());
    let mesh: PolyMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let mode = if sequential { "sequential" } else { "parallel" };
    let progress = create_progress();

    let start = Instant::now();
    let smoothed = match method {
        SmoothMethod::Laplacian => {
            println!("Applying Laplacian smoothing ({} iterations, lambda={}, {})...", iterations, lambda, mode);
            smooth::laplacian_smooth_with_progress(&mesh, &options, &progress)?
        }
        SmoothMethod::Taubin => {
            println!("Applying Taubin smoothing ({} iterations, lambda={}, {})...", iterations, lambda, mode);
            smooth::taubin_smooth_with_progress(&mesh, &options, &progress)?
        }
    };
    let elapsed = start.elapsed();

    let max_shift = mesh
        .positions()
        .iter()
        .zip(smoothed.positions())
        .map(|(a, b)| (b - a).norm())
        .fold(0.0_f64, f64::max);
    log::info!("largest vertex displacement: {:.6}", max_shift);

    io::save(&smoothed, output)?;
    println!("Saved: {} ({:.2?})", io::output_path(output).display(), elapsed);

    Ok(())
}
