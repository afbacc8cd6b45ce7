extern crate buddhafarm;
extern crate clap;
extern crate env_logger;
extern crate failure;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use std::io;
use std::io::Write;
use std::path::Path;
use std::process;

use buddhafarm::Store;

const STORE: &str = "store";

fn args<'a>() -> ArgMatches<'a> {
    App::new("buddhareset")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Zeroes the progress and histogram of a Buddhabrot store")
        .arg(
            Arg::with_name(STORE)
                .required(false)
                .long(STORE)
                .short("f")
                .takes_value(true)
                .default_value("buddhabrot.bin")
                .help("Store file to reset"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let path = Path::new(matches.value_of(STORE).unwrap());
    let store = Store::open(path)?;
    let header = store.load_header()?;

    println!(
        "{:?} holds {} processed points on a {}x{} histogram.",
        path, header.progress, header.width, header.height
    );
    println!("Resetting throws all of that away and keeps only the geometry.");
    print!("Proceed? Type Yes to confirm: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if answer.trim() == "Yes" || answer.trim() == "yes" {
        store.reset()?;
        println!("Done.  The next farming run starts from zero.");
    } else {
        println!("Left untouched.");
    }
    Ok(())
}

fn main() {
    env_logger::from_env(Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(err) = run(&matches) {
        eprintln!("error: {}", err);
        for cause in err.iter_causes() {
            eprintln!("caused by: {}", cause);
        }
        process::exit(1);
    }
}
