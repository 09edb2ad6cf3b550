use std::{error::Error, fs, process};

use average::Estimate;
use log::{LevelFilter, Metadata, Record};
use rand::prelude::*;
use regex::Regex;
use sched_sim::{
    Algorithm, Process, Schedule, SchedEvent, Sim, SimConfig, Ticks, Workload,
    core::Priority,
};

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only fails if a logger is already installed
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let matches = clap::App::new("CPU scheduling simulator")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::with_name("inputfile")
                .long("inputfile")
                .takes_value(true)
                .conflicts_with("random")
                .help("Process file, one `arrival burst [priority]` per line"),
        )
        .arg(
            clap::Arg::with_name("random")
                .long("random")
                .takes_value(true)
                .value_name("TICKS")
                .help("Generate a random workload with arrivals spread over TICKS"),
        )
        .arg(
            clap::Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("0")
                .help("Seed for --random"),
        )
        .arg(
            clap::Arg::with_name("schedspec")
                .short("s")
                .long("schedspec")
                .takes_value(true)
                .default_value("F")
                .validator(valid_schedspec)
                .help("Scheduler specification (F, P or R<quantum>)"),
        )
        .arg(
            clap::Arg::with_name("compare")
                .long("compare")
                .help("Run FCFS, priority and the given round-robin quantum side by side"),
        )
        .arg(
            clap::Arg::with_name("trace")
                .long("trace")
                .help("Print every round-robin state transition"),
        )
        .arg(
            clap::Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase log verbosity"),
        )
        .get_matches();

    init_logger(matches.occurrences_of("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn Error>> {
    let workload = if let Some(path) = matches.value_of("inputfile") {
        load_workload(path)?
    } else {
        let ticks: u64 = matches.value_of("random").unwrap_or("20").parse()?;
        let seed: u64 = matches.value_of("seed").unwrap_or("0").parse()?;
        bernoulli_workload(ticks, 0.3, 0.3, 2, 6, seed)?
    };
    log::info!(
        "loaded {} processes, total burst {}",
        workload.len(),
        workload.total_burst()
    );

    let algorithm: Algorithm = matches.value_of("schedspec").unwrap_or("F").parse()?;

    if matches.is_present("compare") {
        let quantum = match algorithm {
            Algorithm::RoundRobin { quantum } => quantum,
            _ => 2,
        };
        let algorithms = [
            Algorithm::Fcfs,
            Algorithm::Priority,
            Algorithm::RoundRobin { quantum },
        ];
        for result in Sim::compare(&workload, &algorithms) {
            print_summary(&result?);
        }
        return Ok(());
    }

    let sim = Sim::new(SimConfig::new(algorithm));
    log::info!("scheduling with {}", sim.config().algorithm);
    if matches.is_present("trace") {
        match sim.trace(&workload) {
            Some(events) => print_trace(&events?),
            None => log::warn!("--trace only applies to round-robin"),
        }
    }

    let schedule = sim.run(&workload)?;
    println!("{schedule}");
    Ok(())
}

fn valid_schedspec(value: String) -> Result<(), String> {
    let re = Regex::new(r"^([FP]|R\d+|fcfs|priority|rr:\d+)$").map_err(|e| e.to_string())?;
    if !re.is_match(&value) {
        Err(format!(
            "Invalid scheduler specification: {value}. Must be one of F, P or R<num>"
        ))
    } else {
        Ok(())
    }
}

fn load_workload(path: &str) -> Result<Workload, Box<dyn Error>> {
    let contents = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;

    let mut processes = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields = line
            .split_whitespace()
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("{path}:{}: {e}", lineno + 1))?;
        let (arrival, burst, priority): (Ticks, Ticks, Priority) = match fields[..] {
            [arrival, burst] => (arrival, burst, 0),
            [arrival, burst, priority] => (arrival, burst, priority),
            _ => {
                return Err(format!(
                    "{path}:{}: expected `arrival burst [priority]`, got {} fields",
                    lineno + 1,
                    fields.len()
                )
                .into());
            }
        };

        let id = processes.len() as u32 + 1;
        processes.push(Process::with_priority(id, arrival, burst, priority));
    }

    Ok(Workload::new(processes)?)
}

fn bernoulli_workload(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Result<Workload, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut processes = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let priority = rng.random_range(0..5);

            processes.push(Process::with_priority(
                processes.len() as u32 + 1,
                t as Ticks,
                burst,
                priority,
            ));
        }
    }

    Ok(Workload::new(processes)?)
}

fn print_trace(events: &[SchedEvent]) {
    for event in events {
        println!("t={} {:?}", event.at(), event);
    }
    println!();
}

fn print_summary(schedule: &Schedule) {
    let aggregate = schedule.aggregate();
    let response_times = schedule.table.iter().map(|r| r.response_time() as f64);

    println!("{}", schedule.algorithm);
    println!("  Gantt chart: {}", schedule.timeline.render());
    println!("  Average waiting time: {:.2} ticks", aggregate.average_waiting_time());
    println!("  Average turnaround time: {:.2} ticks", aggregate.average_turnaround_time());
    // Time to first run
    println!("  Average response time: {:.2} ticks", avg(response_times));
    println!("  CPU idle: {} ticks", schedule.timeline.idle_time());
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
