use std::path::PathBuf;

use clap::Parser;
use oci_orphan_finder::{
    AppState, build_app,
    config::FinderConfig,
    observability,
    routes::{AUTH_ERROR_BODY, InvokeResponse},
};

/// CLI arguments for the orphan finder
#[derive(Parser, Debug)]
#[command(version, about = "OCI boot volume backup orphan finder", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./orphan-finder.toml if it exists,
    /// otherwise built-in defaults plus environment overrides)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Serve the function on the Fn listener (default)
    Serve,
    /// Run one audit and print the result as JSON
    Scan,
    /// Export the JSON schema for the configuration file
    Schema {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

const DEFAULT_CONFIG_FILE: &str = "orphan-finder.toml";

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Schema { output }) => {
            #[cfg(feature = "json-schema")]
            run_schema_export(output);
            #[cfg(not(feature = "json-schema"))]
            {
                let _ = output;
                eprintln!("Error: JSON schema export requires the 'json-schema' feature");
                std::process::exit(1);
            }
        }
        Some(Command::Scan) => run_scan(args.config).await,
        Some(Command::Serve) | None => run_server(args.config).await,
    }
}

/// Load the configuration and initialize tracing, exiting on failure.
fn load_config(explicit_path: Option<PathBuf>) -> FinderConfig {
    let path = explicit_path.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });

    let config = match FinderConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if let Some(path) = path {
        tracing::info!(path = %path.display(), "Configuration loaded");
    }

    config
}

fn build_state(config: FinderConfig) -> AppState {
    match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    }
}

async fn run_scan(config_path: Option<PathBuf>) {
    let state = build_state(load_config(config_path));

    match state.run_scan().await {
        Ok(report) => match serde_json::to_string_pretty(&InvokeResponse::from(report)) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to obtain resource principal credentials");
            eprintln!("{AUTH_ERROR_BODY}");
            std::process::exit(1);
        }
    }
}

async fn run_server(config_path: Option<PathBuf>) {
    let config = load_config(config_path);
    let server = config.server.clone();
    let app = build_app(build_state(config));

    #[cfg(unix)]
    if let Some(socket_path) = server.unix_socket_path() {
        let listener =
            match oci_orphan_finder::listener::bind_fn_socket(std::path::Path::new(socket_path)) {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, socket = socket_path, "Failed to bind Fn listener");
                    std::process::exit(1);
                }
            };

        tracing::info!(socket = socket_path, "Function listening");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            tracing::error!(error = %e, "Server error");
        }
        return;
    }

    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %bind_addr, "Failed to bind to address");
            std::process::exit(1);
        }
    };

    tracing::info!("Function listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Export the config JSON schema to file or stdout
#[cfg(feature = "json-schema")]
fn run_schema_export(output: Option<PathBuf>) {
    let content = FinderConfig::json_schema_string();

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &content) {
                eprintln!("Error: failed to write to {}: {e}", path.display());
                std::process::exit(1);
            }
            eprintln!("Config JSON schema written to {}", path.display());
        }
        None => println!("{content}"),
    }
}
