//! tandem - session logs and backlog coordination for cooperating agents

use std::process;

use tandem::cli::{build_cli, handlers};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    if let Err(err) = handlers::dispatch(&matches).await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", handlers::format_error(&err));
        }

        let code = err
            .downcast_ref::<tandem_core::Error>()
            .map(tandem_core::Error::exit_code)
            .unwrap_or_else(|| 1);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
