extern crate buddhafarm;
extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate num;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use num::Complex;
use std::io;
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use buddhafarm::coordinator::{StopFlag, UNBOUNDED};
use buddhafarm::planes::BoundingBox;
use buddhafarm::{Farm, FarmOptions, Header, Store};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const STORE: &str = "store";
const SIZE: &str = "size";
const POINTS: &str = "points";
const ITERATIONS: &str = "iterations";
const CORNER_A: &str = "corner-a";
const CORNER_B: &str = "corner-b";
const THREADS: &str = "threads";
const BATCH_SIZE: &str = "batch-size";
const RENDER_INTERVAL: &str = "render-interval";

fn args<'a>() -> ArgMatches<'a> {
    App::new("buddhafarm")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Checkpointed Monte-Carlo Buddhabrot farm")
        .arg(
            Arg::with_name(STORE)
                .required(false)
                .long(STORE)
                .short("f")
                .takes_value(true)
                .default_value("buddhabrot.bin")
                .help("Store file to farm into; created when absent"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000x1000")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse store size"))
                .help("Histogram size of a new store"),
        )
        .arg(
            Arg::with_name(POINTS)
                .required(false)
                .long(POINTS)
                .short("p")
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_number::<u64>(&s, "Could not parse point target"))
                .help("Escaping samples to farm in total; 0 farms until stopped"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("2000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 100000000",
                    )
                })
                .help("Iteration budget per sample in a new store"),
        )
        .arg(
            Arg::with_name(CORNER_A)
                .required(false)
                .long(CORNER_A)
                .takes_value(true)
                .default_value("-2.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse corner a"))
                .help("Top left corner of a new store's window"),
        )
        .arg(
            Arg::with_name(CORNER_B)
                .required(false)
                .long(CORNER_B)
                .takes_value(true)
                .default_value("1.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse corner b"))
                .help("Bottom right corner of a new store's window"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        0,
                        4096,
                        "Could not parse thread count",
                        "Thread count must be between 0 and 4096",
                    )
                })
                .help("Worker threads; 0 means one per CPU"),
        )
        .arg(
            Arg::with_name(BATCH_SIZE)
                .required(false)
                .long(BATCH_SIZE)
                .short("b")
                .takes_value(true)
                .default_value("1000000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000_000,
                        "Could not parse batch size",
                        "Batch size must be between 1 and 1000000000",
                    )
                })
                .help("Escaping samples per work batch"),
        )
        .arg(
            Arg::with_name(RENDER_INTERVAL)
                .required(false)
                .long(RENDER_INTERVAL)
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_number::<u64>(&s, "Could not parse render interval"))
                .help("Points between snapshots; 0 renders only at the target"),
        )
        .get_matches()
}

fn new_header(matches: &ArgMatches) -> Result<Header, failure::Error> {
    let (width, height) =
        parse_pair(matches.value_of(SIZE).unwrap(), 'x').expect("Error parsing store size");
    let a = parse_complex(matches.value_of(CORNER_A).unwrap()).expect("Error parsing corner a");
    let b = parse_complex(matches.value_of(CORNER_B).unwrap()).expect("Error parsing corner b");
    let bounds = BoundingBox::new(a, b)?;
    Ok(Header {
        progress: 0,
        width,
        height,
        target_points: u64::from_str(matches.value_of(POINTS).unwrap())
            .expect("Error parsing point target"),
        iterations: u32::from_str(matches.value_of(ITERATIONS).unwrap())
            .expect("Error parsing iteration count"),
        bounds,
    })
}

fn spawn_monitor(farm: &Farm, done: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    let coordinator = farm.coordinator();
    let gauges = farm.gauges().to_vec();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(1));
        if done.load(Ordering::Acquire) {
            break;
        }
        let target = coordinator.round_target();
        let ceiling = if target == UNBOUNDED {
            "open".to_string()
        } else {
            target.to_string()
        };
        let batches: Vec<String> = gauges
            .iter()
            .map(|gauge| gauge.load(Ordering::Acquire).to_string())
            .collect();
        info!(
            "{} points claimed toward {}; worker batches: {}",
            coordinator.progress(),
            ceiling,
            batches.join(" ")
        );
    })
}

// Runs detached.  Reading a closed stdin returns Ok(0), so a farm
// with no terminal just loses its keyboard and farms on.
fn spawn_stop_listener(stop: Arc<StopFlag>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if line.trim().eq_ignore_ascii_case("s") {
                        info!("stop requested; letting workers finish their batches");
                        stop.request_stop();
                        break;
                    }
                }
            }
        }
    });
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let path = Path::new(matches.value_of(STORE).unwrap());
    let store = if path.exists() {
        info!(
            "resuming {:?}; size and geometry flags are ignored on an existing store",
            path
        );
        Store::open(path)?
    } else {
        let header = new_header(matches)?;
        info!(
            "creating {:?}: {}x{} cells, {} iterations per sample",
            path, header.width, header.height, header.iterations
        );
        Store::create(path, &header)?
    };

    let options = FarmOptions {
        threads: usize::from_str(matches.value_of(THREADS).unwrap())
            .expect("Error parsing thread count"),
        batch_size: u32::from_str(matches.value_of(BATCH_SIZE).unwrap())
            .expect("Error parsing batch size"),
        render_interval: u64::from_str(matches.value_of(RENDER_INTERVAL).unwrap())
            .expect("Error parsing render interval"),
    };
    let mut farm = Farm::new(store, options)?;

    let header = *farm.header();
    let target = if header.target_points == 0 {
        "unlimited".to_string()
    } else {
        header.target_points.to_string()
    };
    info!(
        "farming to {} points at {}x{}; {} done so far; enter s to stop after the current batch",
        target, header.width, header.height, header.progress
    );

    let done = Arc::new(AtomicBool::new(false));
    let monitor = spawn_monitor(&farm, done.clone());
    spawn_stop_listener(farm.stop_flag());

    let progress = farm.run()?;
    done.store(true, Ordering::Release);
    let _ = monitor.join();
    info!("farm idle at {} points", progress);
    Ok(())
}

fn main() {
    env_logger::from_env(Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(err) = run(&matches) {
        error!("{}", err);
        for cause in err.iter_causes() {
            error!("caused by: {}", cause);
        }
        process::exit(1);
    }
}
