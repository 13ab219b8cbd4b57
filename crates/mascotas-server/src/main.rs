//! Mascotas Server: application entry point.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mascotas_auth::RegisterInput;
use mascotas_db::DbManager;
use mascotas_server::config::{AdminArgs, Cli, Command, CreateUserArgs, Settings};
use mascotas_server::{AppState, routes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mascotas=info".parse()?))
        .json()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { bind, admin } => serve(&cli.settings, &bind, &admin).await,
        Command::CreateUser(args) => create_user(&cli.settings, args).await,
    }
}

async fn connect(settings: &Settings) -> anyhow::Result<AppState> {
    let db = DbManager::connect(&settings.db_config())
        .await
        .context("connecting to SurrealDB")?;
    Ok(AppState::new(db.client().clone(), settings.auth_config()))
}

async fn serve(settings: &Settings, bind: &str, admin: &AdminArgs) -> anyhow::Result<()> {
    info!("Starting Mascotas server...");
    let state = connect(settings).await?;

    if let Some(input) = admin.registration() {
        if let Some(user) = state
            .auth
            .ensure_staff(input)
            .await
            .context("creating the staff account")?
        {
            info!(user_id = %user.id, username = %user.username, "Staff account created");
        }
    }

    let auth = state.auth.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(err) = auth.cleanup_expired().await {
                warn!(error = %err, "Session cleanup failed");
            }
        }
    });

    let app = routes().with_state(state);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(%bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Mascotas server stopped.");
    Ok(())
}

async fn create_user(settings: &Settings, args: CreateUserArgs) -> anyhow::Result<()> {
    let state = connect(settings).await?;

    let input = RegisterInput {
        username: args.username,
        email: args.email,
        password_confirmation: args.password.clone(),
        password: args.password,
        phone: args.phone,
        address: args.address,
    };
    let user = state
        .auth
        .register(input, args.staff)
        .await
        .context("creating user")?;

    info!(user_id = %user.id, username = %user.username, staff = user.is_staff, "User created");
    Ok(())
}
