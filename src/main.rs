use std::process::ExitCode;

use clap::Parser;
use csma_cd_sim::cli::{load_payloads, Cli};
use csma_cd_sim::logging;
use csma_cd_sim::simulator::Simulator;

fn main() -> ExitCode {
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    let payloads = match load_payloads(&cli.payload_file) {
        Ok(payloads) => payloads,
        Err(err) => {
            logging::log_error(&err.to_string());
            return ExitCode::from(2);
        }
    };

    let mut simulator = match Simulator::new(
        cli.stations_count as usize,
        payloads,
        None,
        Box::new(std::io::stdout()),
    ) {
        Ok(simulator) => simulator,
        Err(err) => {
            logging::log_error(&err.to_string());
            return ExitCode::from(2);
        }
    };

    logging::log_info(&format!("starting simulation with {} stations", cli.stations_count));

    while !simulator.is_idle() {
        simulator.process_tick();
        if let Some(delay_ms) = cli.tick_delay_ms {
            std::thread::sleep(std::time::Duration::from_millis(delay_ms));
        }
    }

    logging::log_info(&format!(
        "simulation finished at virtual time {:?}",
        simulator.clock()
    ));
    ExitCode::SUCCESS
}
