mod cli;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nbnak_api::NetboxClient;
use nbnak_core::ContextAssembler;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(&cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the document; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(shell) = cli.completions {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "nbnak", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => nbnak_config::default_config_path().ok_or_else(|| CliError::NoConfig {
            path: format!("~/{}", nbnak_config::CONFIG_FILE_NAME),
        })?,
    };
    tracing::debug!(path = %config_path.display(), "loading config");
    let settings = nbnak_config::load(&config_path, &cli.connection.overrides())?;

    let client = NetboxClient::new(
        settings.api_url.as_str(),
        &settings.api_key,
        &settings.transport(),
    )?;
    let assembler = ContextAssembler::new(&client, settings.search_domain.clone());

    let context = assembler.assemble(&cli.context_request()).await?;
    let rendered = output::render(&cli.output, &context)?;
    output::print_output(&rendered)
}
