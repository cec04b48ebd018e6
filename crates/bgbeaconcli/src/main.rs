//! bgbeacon - broadcast iBeacon advertisements from a BLED112 dongle

mod cli;
mod event_log;

use bgbeacon::bgapi::transport::DEFAULT_READ_TIMEOUT;
use bgbeacon::{
    BeaconParameters, CancellationToken, DutyCycleScheduler, LogObserver, RadioController,
    SerialTransport, SystemClock,
};
use clap::Parser;
use cli::Args;
use event_log::CsvEventLog;
use log::{error, info, warn};
use std::process::ExitCode;

const RULE: &str = "================================================================";

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let params = match args.beacon_parameters() {
        Ok(params) => params,
        Err(e) => {
            error!("{}", e);
            eprintln!("Please, run \"bgbeacon --help\" for more options!");
            return ExitCode::from(1);
        }
    };

    if !args.quiet {
        print_banner(&args, &params);
    }

    run(&args, &params)
}

fn run(args: &Args, params: &BeaconParameters) -> ExitCode {
    let event_log = if args.end || args.reset {
        None
    } else {
        match CsvEventLog::create(&args.resource_dir) {
            Ok(log) => Some(log),
            Err(e) => {
                error!(
                    "Cannot create event log in {}: {}",
                    args.resource_dir.display(),
                    e
                );
                return ExitCode::from(1);
            }
        }
    };

    let transport = match SerialTransport::open(&args.port, args.baud, DEFAULT_READ_TIMEOUT) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("\n{}", RULE);
            eprintln!("Port error (name='{}', baud='{}'): {}", args.port, args.baud, e);
            eprintln!("{}", RULE);
            return ExitCode::from(2);
        }
    };
    let mut radio = RadioController::new(transport);

    if args.reset {
        return match radio.reset(false) {
            Ok(()) => {
                info!("Radio reset");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Reset failed: {}", e);
                ExitCode::from(1)
            }
        };
    }

    if args.end {
        return match radio.stop() {
            Ok(()) => {
                info!("iBeacon advertisements ended");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Stop failed: {}", e);
                ExitCode::from(1)
            }
        };
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Cannot install interrupt handler: {}", e);
    }

    let mut scheduler = DutyCycleScheduler::new(params, SystemClock, token);
    scheduler.add_observer(LogObserver);
    if let Some(log) = event_log {
        scheduler.add_observer(log);
    }

    let summary = scheduler.run(&mut radio);
    info!(
        "Goodbye, cruel world! ({} cycles, {} failed)",
        summary.cycles, summary.failed_cycles
    );
    ExitCode::SUCCESS
}

fn print_banner(args: &Args, params: &BeaconParameters) {
    let duty_cycle = params.duty_cycle();

    println!("{}", RULE);
    println!("BLED112 iBeacon v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", RULE);
    println!("Serial port:\t{}", args.port);
    println!("Baud rate:\t{}", args.baud);
    println!("Beacon UUID:\t{}", hex::encode_upper(params.uuid()));
    println!("Beacon Major:\t{:04X}", params.major());
    println!("Beacon Minor:\t{:04X}", params.minor());
    println!("Adv. interval:\t{} ms", params.interval_ms());
    println!("Local name:\t{}", params.local_name());
    if duty_cycle.is_run_once() {
        println!("Adv. duty cycle:\tcontinuous");
    } else {
        println!("Adv. duty cycle duration:\t{} s", duty_cycle.duration().as_secs());
        println!("Adv. duty cycle period:\t{} s", duty_cycle.period().as_secs());
    }
    println!(
        "Scan requests:\t{}",
        if params.scan_request_reporting() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!("----------------------------------------------------------------");
}
