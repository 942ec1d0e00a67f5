use clap::Parser;
use healthcheck::{
    health::EXIT_UNHEALTHY,
    probe_once, run_probe,
    utils::logging::{debug_enabled, setup_logging},
    ProbeArgs,
};
use std::process::ExitCode;
use tracing::warn;

fn main() -> ExitCode {
    let args = ProbeArgs::parse();
    setup_logging(debug_enabled());

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "[Prober] Invalid probe configuration");
            return ExitCode::from(EXIT_UNHEALTHY);
        },
    };

    match run_probe(probe_once(config)) {
        Ok(result) => ExitCode::from(&result),
        Err(e) => {
            warn!(error = %e, "[Prober] Failed to start runtime");
            ExitCode::from(EXIT_UNHEALTHY)
        },
    }
}
