//! taskgraph binary: parses the command line and dispatches to the library.

use clap::{Parser, Subcommand};
use taskgraph::RunnableConfig;
use taskgraph_cli::{
    build_llm, format_history, history, inspect, list_runs, parse_patch, resume_run, run_task,
    trace, Error, RunConfig, RunOptions,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "taskgraph")]
#[command(about = "Multi-agent article writer with checkpointed, resumable runs")]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite checkpoint database (overrides DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    db_path: Option<String>,

    /// Model name (overrides OPENAI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature 0-2 (overrides OPENAI_TEMPERATURE)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Artifact directory (overrides OUTPUT_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<String>,

    /// Revision cap (overrides MAX_REVISIONS)
    #[arg(long, global = true)]
    max_revisions: Option<u32>,

    /// Per-step timeout in seconds, 0 disables (overrides STEP_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    step_timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an article about TASK
    Run {
        /// Run id (default: random UUID)
        #[arg(long)]
        run_id: Option<String>,
        #[arg(trailing_var_arg = true, required = true)]
        task: Vec<String>,
    },
    /// List runs, or the checkpoints of RUN_ID
    History { run_id: Option<String> },
    /// Print one checkpoint as JSON
    Inspect { run_id: String, index: u64 },
    /// Continue from checkpoint INDEX of RUN_ID as a new run
    Resume {
        run_id: String,
        index: u64,
        /// JSON patch merged into the state first, e.g. '{"feedback":"be brief"}'
        #[arg(long)]
        patch: Option<String>,
        /// Id of the new run (default: random UUID)
        #[arg(long)]
        new_run_id: Option<String>,
    },
    /// Print the execution trace of RUN_ID
    Trace { run_id: String },
}

impl Cli {
    fn options(&self) -> RunOptions {
        RunOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            db_path: self.db_path.clone(),
            output_dir: self.output_dir.clone(),
            max_revisions: self.max_revisions,
            step_timeout_secs: self.step_timeout,
            verbose: self.verbose,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run config with its own run id and a token cancelled by Ctrl-C.
fn runnable(run_id: Option<String>) -> RunnableConfig {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling after the current step...");
            on_signal.cancel();
        }
    });
    let config = match run_id {
        Some(id) => RunnableConfig::with_run_id(id),
        None => RunnableConfig::default(),
    };
    config.with_cancel(token)
}

async fn dispatch(cli: Cli) -> Result<(), Error> {
    let options = cli.options();
    let model_config = || -> Result<RunConfig, Error> {
        let mut config = RunConfig::from_env()?;
        config.apply_options(&options);
        Ok(config)
    };
    let mut storage_config = RunConfig::storage_from_env();
    storage_config.apply_options(&options);

    match cli.command {
        Command::Run { run_id, task } => {
            let config = model_config()?;
            let task = task.join(" ").trim().to_string();
            let outcome = run_task(&config, build_llm(&config)?, &task, runnable(run_id)).await?;
            println!("---");
            println!("{}", outcome.state.final_output);
            if let Some(location) = &outcome.state.final_location {
                println!("---\nsaved to {}", location);
            }
            println!("run id: {}", outcome.run_id);
        }
        Command::History { run_id: None } => {
            for run in list_runs(&storage_config).await? {
                println!("{}", run);
            }
        }
        Command::History {
            run_id: Some(run_id),
        } => {
            println!("{}", format_history(&history(&storage_config, &run_id).await?));
        }
        Command::Inspect { run_id, index } => {
            println!("{}", inspect(&storage_config, &run_id, index).await?);
        }
        Command::Resume {
            run_id,
            index,
            patch,
            new_run_id,
        } => {
            let config = model_config()?;
            let patch = patch.as_deref().map(parse_patch).transpose()?;
            let outcome = resume_run(
                &config,
                build_llm(&config)?,
                &run_id,
                index,
                patch,
                runnable(new_run_id),
            )
            .await?;
            println!("---");
            println!("{}", outcome.state.final_output);
            println!("run id: {}", outcome.run_id);
        }
        Command::Trace { run_id } => {
            print!("{}", trace(&storage_config, &run_id).await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
