//! Command-line interface.
//!
//! `serve` starts the HTTP server; anything else is run as a command. Either
//! way the process then stays up until signalled, as container entrypoints do.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use crate::config::{
    ModelSource, ServeConfig, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_MODEL_DIR,
    DEFAULT_PORT, DEFAULT_STARTUP_TIMEOUT_SECS, MODEL_ENV, TOKENIZER_ENV,
};
use crate::error::{Result, ServeError};
use crate::pipelines::utils::DeviceRequest;

/// Sequence-classification inference server.
#[derive(Parser, Debug)]
#[command(name = "classification-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the model and serve /invocations and /ping
    Serve(ServeArgs),

    /// Run any other command, then keep the process alive
    #[command(external_subcommand)]
    Exec(Vec<String>),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Tokenizer directory or Hugging Face Hub repo id
    #[arg(long, env = TOKENIZER_ENV, default_value = DEFAULT_MODEL_DIR)]
    pub tokenizer: String,

    /// Model directory or Hugging Face Hub repo id
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL_DIR)]
    pub model: String,

    /// Bind host
    #[arg(long, env = "SERVE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Bind port
    #[arg(short, long, env = "SERVE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Run on this CUDA device instead of the CPU
    #[arg(long, env = "SERVE_CUDA_DEVICE")]
    pub cuda: Option<usize>,

    /// Seconds to keep retrying transient startup failures
    #[arg(long, env = "SERVE_STARTUP_TIMEOUT_SECS", default_value_t = DEFAULT_STARTUP_TIMEOUT_SECS)]
    pub startup_timeout_secs: u64,

    /// Largest accepted request body
    #[arg(long, env = "SERVE_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl From<ServeArgs> for ServeConfig {
    fn from(args: ServeArgs) -> Self {
        ServeConfig {
            host: args.host,
            port: args.port,
            source: ModelSource::new(&args.tokenizer, &args.model),
            device: DeviceRequest::from_cuda_index(args.cuda),
            startup_timeout: Duration::from_secs(args.startup_timeout_secs),
            max_body_bytes: args.max_body_bytes,
        }
    }
}

/// Split `argv` into program and arguments.
///
/// The arguments are joined and re-split with shell quoting rules, so a single
/// quoted argument such as `"ls -la"` runs `ls` with `-la`.
pub fn command_line(argv: &[String]) -> Result<Vec<String>> {
    let joined = argv.join(" ");
    let words = shlex::split(&joined)
        .ok_or_else(|| ServeError::Command(format!("unbalanced quotes in '{joined}'")))?;
    if words.is_empty() {
        return Err(ServeError::Command("no command given".into()));
    }
    Ok(words)
}

/// Run `argv` to completion, failing on a non-zero exit.
pub async fn run_command(argv: &[String]) -> Result<()> {
    let words = command_line(argv)?;
    let (program, args) = words
        .split_first()
        .ok_or_else(|| ServeError::Command("no command given".into()))?;

    info!(command = %words.join(" "), "Running command");
    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| ServeError::Command(format!("failed to spawn '{program}': {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(ServeError::Command(format!(
            "'{}' exited with {status}",
            words.join(" ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_uses_model_dir_defaults() {
        let cli =
            Cli::try_parse_from(["classification-server", "serve", "--port", "9000"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 9000);
        assert!(args.cuda.is_none());

        let config = ServeConfig::from(args);
        assert_eq!(config.port, 9000);
        assert_eq!(config.device, DeviceRequest::Cpu);
    }

    #[test]
    fn serve_rejects_unparseable_numbers() {
        for flag in ["--port", "--max-body-bytes", "--startup-timeout-secs"] {
            let parsed = Cli::try_parse_from(["classification-server", "serve", flag, "lots"]);
            assert!(parsed.is_err(), "{flag} accepted a non-number");
        }
    }

    #[test]
    fn serve_accepts_hub_ids_and_cuda() {
        let cli = Cli::try_parse_from([
            "classification-server",
            "serve",
            "--model",
            "clapAI/modernBERT-base-multilingual-sentiment",
            "--tokenizer",
            "clapAI/modernBERT-base-multilingual-sentiment",
            "--cuda",
            "1",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = ServeConfig::from(args);
        assert_eq!(config.device, DeviceRequest::Cuda(1));
        assert_eq!(config.source.model, config.source.tokenizer);
    }

    #[test]
    fn other_commands_are_captured_verbatim() {
        let cli = Cli::try_parse_from(["classification-server", "echo", "hello", "world"]).unwrap();
        match cli.command {
            Commands::Exec(argv) => assert_eq!(argv, vec!["echo", "hello", "world"]),
            other => panic!("expected exec, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_command_reports_exit_status() {
        assert!(run_command(&["true".to_string()]).await.is_ok());
        assert!(matches!(
            run_command(&["false".to_string()]).await,
            Err(ServeError::Command(_))
        ));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        assert!(matches!(run_command(&[]).await, Err(ServeError::Command(_))));
        assert!(matches!(
            run_command(&["  ".to_string()]).await,
            Err(ServeError::Command(_))
        ));
    }

    #[test]
    fn command_line_resplits_quoted_arguments() {
        let argv = vec!["ls -la".to_string(), "'my dir'".to_string()];
        assert_eq!(command_line(&argv).unwrap(), vec!["ls", "-la", "my dir"]);

        let argv = vec!["echo".to_string(), "hello".to_string()];
        assert_eq!(command_line(&argv).unwrap(), vec!["echo", "hello"]);
    }

    #[test]
    fn unbalanced_quotes_are_a_command_error() {
        let argv = vec!["echo".to_string(), "'oops".to_string()];
        assert!(matches!(command_line(&argv), Err(ServeError::Command(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn single_string_command_runs() {
        let cli = Cli::try_parse_from(["classification-server", "echo hello"]).unwrap();
        let Commands::Exec(argv) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(argv, vec!["echo hello"]);
        assert!(run_command(&argv).await.is_ok());
    }
}
