use backtrace::Backtrace;
use serde::Serialize;
// TODO: switch to PanicHookInfo once rust-version is raised to 1.81
#[allow(deprecated)]
use std::{panic::PanicInfo, process};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Set up logging for the installer.
pub fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_thread_names(true)
        .with_env_filter(env_filter)
        .flatten_event(true)
        .init();
}

#[derive(Debug, Serialize)]
pub struct CrashInfo {
    details: String,
    backtrace: String,
}

/// Invoke to ensure the process exits on a panic in any thread, so a half-finished
/// install never lets the image build carry on.
pub fn setup_panic_handler() {
    #[allow(deprecated)]
    std::panic::set_hook(Box::new(move |pi: &PanicInfo<'_>| {
        handle_panic(pi);
    }));
}

// Formats and logs panic information
#[allow(deprecated)]
fn handle_panic(panic_info: &PanicInfo<'_>) {
    // The Display formatter for a PanicInfo contains the message, payload and location.
    let details = format!("{}", panic_info);
    let backtrace = format!("{:#?}", Backtrace::new());
    let info = CrashInfo { details, backtrace };
    let crash_info = toml::to_string_pretty(&info)
        .unwrap_or_else(|_| format!("details = {:?}", info.details));
    error!("{}", crash_info);
    // Write synchronously as well, error! does not guarantee a flush before exit.
    eprintln!("{}", crash_info);
    process::exit(12);
}
