use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use hashi_sat::encode::{DegreeEncoding, encode};
use hashi_sat::{Algo, Cancel, Grid, solve_grid};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "A Hashiwokakero (Bridges) solver driven by a shared CNF encoding."
)]
struct Cli {
    /// Solving engine.
    #[arg(short, long, value_enum, default_value = "sat")]
    algo: Algo,

    /// Path to the input file: one row per line, comma-separated cells,
    /// 0 for water, 1-8 for islands.
    #[arg(short, long)]
    input: PathBuf,

    /// Export the rendered solution and the encoded CNF next to the input.
    #[arg(short, long)]
    export: bool,

    /// Report solve metrics on stderr.
    #[arg(short, long)]
    metrics: bool,
}

fn time_convert(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{:.2} ms", secs * 1000.0)
    } else {
        format!("{secs:.2} s")
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let cancel = Cancel::new();
    {
        let cancel = cancel.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            warn!("interrupted, stopping");
            cancel.cancel();
        }) {
            warn!("failed to set interrupt handler: {err}");
        }
    }

    let grid = Grid::from_file(&cli.input)
        .with_context(|| format!("failed to read puzzle '{}'", cli.input.display()))?;

    let start = Instant::now();
    let rendered = solve_grid(&grid, cli.algo, &cancel);
    let elapsed = start.elapsed();

    // Unsolvable puzzles print nothing and still exit 0.
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    if cli.metrics || cli.export {
        let enc = encode(&grid, DegreeEncoding::default());

        if cli.metrics {
            eprintln!("engine:    {}", cli.algo.name());
            eprintln!("grid:      {}x{}", grid.rows(), grid.cols());
            eprintln!("islands:   {}", enc.islands.len());
            eprintln!("edges:     {}", enc.edges.len());
            eprintln!("variables: {}", enc.next_var - 1);
            eprintln!("clauses:   {}", enc.clauses.len());
            eprintln!("time:      {}", time_convert(elapsed));
        }

        if cli.export {
            let solution_path = cli.input.with_extension("out.txt");
            std::fs::write(&solution_path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write '{}'", solution_path.display()))?;
            enc.write_dimacs(cli.input.with_extension("cnf"))?;
        }
    }

    Ok(())
}
