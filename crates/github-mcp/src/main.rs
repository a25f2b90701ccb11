use anyhow::Context as _;
use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use unrelated_github_client::GitHubClient;
use unrelated_github_mcp::{AppState, Settings, router};

#[derive(Parser, Debug)]
#[command(name = "unrelated-github-mcp", version, about = "GitHub MCP server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.to_ascii_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::from_env().context("load settings")?;
    init_tracing(&settings.log_level);

    let github = GitHubClient::with_base_url(&settings.api_url, settings.github_token.clone());
    if !github.has_token() {
        tracing::warn!("GH_TOKEN is not set; GitHub calls are unauthenticated and rate-limited");
    }
    let state = AppState::new(settings, github);

    match state.github.get_authenticated_user().await {
        Ok(user) => tracing::info!(
            login = user.login.as_deref().unwrap_or("unknown"),
            "authenticated to GitHub"
        ),
        Err(e) => tracing::warn!(error = %e, "could not verify GitHub credentials"),
    }

    tracing::info!(
        server_name = %state.settings.server_name,
        api_key_auth = state.settings.auth_enabled(),
        default_owner = state.settings.default_owner.as_deref().unwrap_or(""),
        default_repo = state.settings.default_repo.as_deref().unwrap_or(""),
        allow_list_entries = state.settings.allowed_repos.entries().len(),
        "starting GitHub MCP server"
    );
    if !state.settings.auth_enabled() {
        tracing::warn!("MCP_API_KEY is not set; /mcp accepts unauthenticated requests");
    }

    let bind = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening; MCP endpoint at /mcp");

    let github = state.github.clone();
    let sessions = CancellationToken::new();
    let app = router(state, sessions.clone());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        // Open event streams never finish on their own.
        sessions.cancel();
    })
    .await
    .context("server error")?;

    github.close();
    tracing::info!(
        opened = github.connections_opened(),
        released = github.connections_released(),
        "GitHub client closed"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
