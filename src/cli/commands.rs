use std::io;

use anyhow::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::OllamaClient;
use crate::config::{Config, ConfigBuilder};
use crate::exec::ShellRunner;
use crate::probe;
use crate::prompt;
use crate::session::Session;
use crate::ui::{self, Output, StdinInput};

use super::args::{Cli, Command};

const INTERRUPTED: &str = "\nInterrupted. Goodbye!";

pub(crate) async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let config = Config::load_with(|builder| apply_flags(builder, &cli))?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Some(Command::Config) => {
            println!("{}", config.to_pretty_json()?);
            Ok(())
        }
        None => run_session(&cli, &config).await,
    }
}

fn apply_flags(builder: ConfigBuilder, cli: &Cli) -> ConfigBuilder {
    builder
        .with_llm(|llm| {
            if let Some(model) = &cli.model {
                llm.model = model.trim().to_string();
            }
            if let Some(base_url) = &cli.base_url {
                llm.base_url = base_url.trim().to_string();
            }
            if let Some(timeout) = cli.timeout {
                llm.timeout_secs = timeout;
            }
        })
        .with_session(|session| {
            if let Some(max_retries) = cli.max_retries {
                session.max_error_retry = max_retries;
            }
        })
}

async fn run_session(cli: &Cli, config: &Config) -> Result<()> {
    let os = probe::detect();
    let system_prompt = prompt::system_prompt(&os);

    let client = OllamaClient::new(&config.llm)?;
    let runner = ShellRunner::new();
    let out = ui::select_output(cli.plain);
    let mut input = StdinInput::new();

    out.info(&format!("Using Ollama model: {}", config.llm.model));
    out.info(&format!("Detected OS: {}", os.details));
    out.info(&format!("Ollama endpoint: {}", client.endpoint()));
    out.info("Type 'exit' or 'quit' to end the session.");
    info!(model = %config.llm.model, endpoint = %client.endpoint(), "session starting");

    let mut session = Session::new(
        &config.session,
        system_prompt,
        &client,
        &runner,
        out.as_ref(),
        &mut input,
    );

    run_until_interrupted(
        session.run(cli.initial_request()),
        tokio::signal::ctrl_c(),
        out.as_ref(),
    )
    .await
}

/// Race the session against `shutdown`. When `shutdown` fires, the session
/// future is dropped, which kills any running child, and the farewell is
/// printed. If the signal listener cannot be installed the session just runs.
async fn run_until_interrupted<S, I>(
    session: S,
    shutdown: I,
    out: &dyn Output,
) -> Result<()>
where
    S: Future<Output = Result<()>>,
    I: Future<Output = io::Result<()>>,
{
    tokio::pin!(session);

    tokio::select! {
        result = &mut session => result,
        signal = shutdown => match signal {
            Ok(()) => {
                out.farewell(INTERRUPTED);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for Ctrl-C");
                session.await
            }
        },
    }
}

/// Route `tracing` output to stderr; `RUST_LOG` directives still apply.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let directive = format!("{}={level}", env!("CARGO_PKG_NAME"));
    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
