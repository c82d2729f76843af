use anyhow::Result;
use termlaunch::app::App;
use termlaunch::cli;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let (runtime_options, command) = cli::process_cli();

    // Routes all log::info!() etc. to the debug log file; mirrors to stderr
    // when RUST_LOG is set. --log-level takes precedence over RUST_LOG.
    termlaunch::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting termlaunch {}", termlaunch::VERSION);

    let result = App::new(runtime_options).and_then(|app| app.run(command));

    if let Err(ref e) = result {
        log::error!("termlaunch failed: {:#}", e);
        eprintln!("termlaunch: error: {e:#}");
    }
    result
}
