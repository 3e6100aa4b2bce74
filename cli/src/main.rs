//! CLI entrypoint for fleet-router
//!
//! Wires the layers together with dependency injection: config is loaded
//! through figment, the configured LLM provider and control-plane adapters
//! are constructed, and the request is driven through the router state
//! machine. Interactive runs suspend at the approval gate and are resumed
//! from stdin answers within the same process.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fleet_application::{RouteRequestUseCase, RouterInput, RouterOutcome, RouterOutput};
use fleet_domain::RunMode;
use fleet_infrastructure::{
    build_gateway, ConfigLoader, HttpWorkerClient, HttpWorkerRegistry, InMemoryRunStore,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fleet-router",
    about = "Route requests across a fleet of specialist workers",
    version
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route a request through the worker fleet
    Route {
        /// The request to route
        request: String,

        /// Approval mode: auto, interactive, or review
        #[arg(short, long, default_value = "auto")]
        mode: RunMode,

        /// Override the configured replan budget
        #[arg(long)]
        max_replans: Option<u32>,
    },

    /// List workers currently discoverable on the control plane
    Workers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref())?;
    info!("Control plane: {}", config.control_plane.base_url);

    let registry = Arc::new(HttpWorkerRegistry::new(
        config.control_plane.base_url.clone(),
    ));

    match cli.command {
        Command::Workers => {
            use fleet_application::WorkerRegistry;
            let workers = registry.list_workers().await;
            if workers.is_empty() {
                println!("No workers available.");
            } else {
                for worker in workers {
                    println!("{} ({})", worker.name, worker.worker_id);
                    if !worker.description.is_empty() {
                        println!("  {}", worker.description);
                    }
                    if !worker.capabilities.is_empty() {
                        println!("  capabilities: {}", worker.capabilities.join(", "));
                    }
                }
            }
        }

        Command::Route {
            request,
            mode,
            max_replans,
        } => {
            // === Dependency Injection ===
            let gateway = build_gateway(&config.llm)?;
            let worker_client = Arc::new(HttpWorkerClient::new(
                config.control_plane.base_url.clone(),
                Arc::clone(&registry) as _,
            ));
            let store = Arc::new(InMemoryRunStore::new());

            let router = RouteRequestUseCase::new(
                gateway,
                worker_client,
                registry,
                store,
                config.scope_policy(),
                config.router_params(),
            );

            let mut input = RouterInput::from_request(request).with_mode(mode);
            if let Some(max_replans) = max_replans {
                input = input.with_max_replans(max_replans);
            }

            let mut outcome = router.route(input).await?;
            loop {
                match outcome {
                    RouterOutcome::Completed(output) => {
                        print_output(&output);
                        break;
                    }
                    RouterOutcome::AwaitingApproval { run_id, prompt } => {
                        println!("\n{}", prompt);
                        let answer = read_answer()?;
                        outcome = router.resume(&run_id, &answer).await?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_output(output: &RouterOutput) {
    println!("{}", output.final_response);

    if let Some(agents) = &output.agents_used {
        println!("\nagents used: {}", agents.join(", "));
    }
    if let Some(strategy) = output.execution_strategy {
        println!("execution strategy: {}", strategy);
    }
}

fn read_answer() -> Result<String> {
    print!("> ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
