use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cascade_core::config::AppConfig;
use cascade_engine::{SessionManager, WorkflowEngine};
use cascade_gateway::{AppState, GatewayServer};
use cascade_nodes::NodeFactory;

#[derive(Parser)]
#[command(name = "cascade", version, about = "Sequential workflow engine for text pipelines")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "cascade.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow once and print the result
    Run {
        /// Workflow JSON file, relative to the configured workflow dir
        #[arg(short, long)]
        workflow: Option<String>,

        /// The input text to feed the pipeline
        #[arg(trailing_var_arg = true)]
        input: Vec<String>,
    },
    /// Start the HTTP gateway server
    Serve,
    /// Show current configuration
    Config,
}

fn build_factory(config: &AppConfig) -> anyhow::Result<Arc<NodeFactory>> {
    let completion = cascade_llm::create_completion_client(&config.model)?;
    let (search, max_results) = match &config.web_search {
        Some(ws) => (cascade_llm::create_search_client(ws)?, ws.max_results),
        None => (None, 5),
    };
    Ok(Arc::new(NodeFactory::with_builtins(
        config.model.clone(),
        completion,
        search,
        max_results,
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Run { workflow, input } => {
            let input = input.join(" ");
            let workflow = workflow.unwrap_or_else(|| config.default_workflow.clone());
            let path = PathBuf::from(&config.workflow_dir).join(&workflow);

            let spec = cascade_engine::graph::load_workflow(&path)?;
            let factory = build_factory(&config)?;
            let engine = WorkflowEngine::from_spec(&spec, &factory)?;

            let outcome = engine.run(&input).await?;
            println!("{}", outcome.output);
            info!(
                cost = outcome.context.total_cost(),
                tokens = outcome.context.total_tokens(),
                "Run complete"
            );
        }
        Commands::Serve => {
            let gateway = config.gateway.clone().unwrap_or_default();
            let state = Arc::new(AppState {
                factory: build_factory(&config)?,
                sessions: Arc::new(SessionManager::new()),
                config,
            });

            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl-C received, shutting down");
                    signal_token.cancel();
                }
            });

            GatewayServer::new(gateway, state).run(shutdown).await?;
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
