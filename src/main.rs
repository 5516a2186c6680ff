use average::Estimate;
use clap::{Args, Parser, Subcommand};
use mlfq_model::{
    SchedEvent, SchedParams, Sim, Workload,
    sim::{BernoulliSpec, bernoulli},
};
use std::{error::Error, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Step a five-level MLFQ scheduler one tick at a time")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workload file and print the queue state after every tick
    Run(RunArgs),
    /// Emit a random workload as TOML
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    workload: PathBuf,
    /// Stop after this many ticks instead of running to completion
    #[arg(long)]
    until: Option<u64>,
    /// Only print the final statistics
    #[arg(short, long)]
    quiet: bool,
    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,
    /// Also print raw engine events
    #[arg(long)]
    events: bool,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long, default_value_t = 50)]
    ticks: u64,
    #[arg(long, default_value_t = 0.2)]
    p_arrival: f64,
    #[arg(long, default_value_t = 0.5)]
    p_short: f64,
    #[arg(long, default_value_t = 2)]
    short_ticks: u64,
    #[arg(long, default_value_t = 12)]
    long_ticks: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = mlfq_model::scheduler::DEFAULT_QUANTUM1)]
    quantum1: u64,
    #[arg(long, default_value_t = mlfq_model::scheduler::DEFAULT_QUANTUM2)]
    quantum2: u64,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Generate(args) => generate(args),
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let workload = Workload::load(&args.workload)?;
    let mut sim = Sim::from_workload(workload)?;

    let mut current_idle = 0;
    let mut max_idle = 0;

    loop {
        let finished = match args.until {
            Some(until) => sim.now() >= until,
            None => sim.all_jobs_completed(),
        };
        if finished {
            break;
        }

        let now = sim.now();
        let events = sim.step();

        if args.events {
            for event in &events {
                println!("t={} {:?}", now, event);
            }
        }

        if events.contains(&SchedEvent::Idle) {
            current_idle += 1;
            max_idle = max_idle.max(current_idle);
        } else {
            current_idle = 0;
        }

        if !args.quiet {
            let snapshot = sim.snapshot();
            if args.json {
                println!("{}", serde_json::to_string(&snapshot)?);
            } else {
                println!("{snapshot}");
            }
        }
    }

    let response_times = sim.jobs_map(|j| j.response_time()).flatten();
    let turnaround_times = sim.jobs_map(|j| j.turnaround_time()).flatten();
    let completed = sim.jobs_map(|j| j.completion_time).flatten().count();

    println!("Ticks simulated: {}", sim.now());
    println!("Completed: {}/{}", completed, sim.jobs().len());
    println!("Average response time: {:.2} ticks", avg(response_times));
    println!("Average turnaround time: {:.2} ticks", avg(turnaround_times));
    println!("Longest idle period: {:?} ticks", max_idle);
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let spec = BernoulliSpec {
        ticks: args.ticks,
        p_arrival: args.p_arrival,
        p_short: args.p_short,
        short_ticks: args.short_ticks,
        long_ticks: args.long_ticks,
        seed: args.seed,
    };
    let params = SchedParams::new(args.quantum1, args.quantum2)?;
    let text = bernoulli(spec, params).to_toml()?;

    match args.out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn avg(iter: impl Iterator<Item = u64>) -> f64 {
    iter.map(|t| t as f64).collect::<average::Mean>().estimate()
}
