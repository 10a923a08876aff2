use tracing_subscriber::EnvFilter;

use crate::args::Cli;

/// `RUST_LOG` wins; otherwise the level follows `--debug` / `--quiet`.
pub fn init(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.debug, cli.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directive(debug: bool, quiet: bool) -> &'static str {
    match (debug, quiet) {
        (true, _) => "smtpping=debug",
        (false, true) => "error",
        (false, false) => "warn",
    }
}
