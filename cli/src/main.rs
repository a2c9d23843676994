#[macro_use]
extern crate log;

use std::process;

use anyhow::Result;

use crate::params::Parameters;

mod batch;
mod params;
mod worker;

/// Entrypoint for the command-line interface.
fn main() {
    let matches = params::command().get_matches();

    let level = match matches.occurrences_of("verbosity") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env).format_timestamp_nanos().init();

    if let Err(e) = Parameters::from_clap(&matches).and_then(handle) {
        error!("{e:?}");
        process::exit(1)
    }
}

fn handle(params: Parameters) -> Result<()> {
    if params.background {
        let worker = worker::spawn(move |out| batch::run(&params, out))?;
        worker.drain(|line| println!("{line}"))
    } else {
        batch::run(&params, &mut |line| println!("{line}"))
    }
}
