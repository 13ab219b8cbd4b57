//! Command line and environment configuration.

use clap::{Args, Parser, Subcommand};
use mascotas_auth::{AuthConfig, RegisterInput};
use mascotas_db::DbConfig;

const MAX_SESSION_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Parser)]
#[command(name = "mascotas-server")]
#[command(about = "Pet adoption web application")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web application
    Serve {
        /// Address to listen on
        #[arg(long, env = "MASCOTAS_BIND", default_value = "127.0.0.1:8000")]
        bind: String,

        #[command(flatten)]
        admin: AdminArgs,
    },
    /// Create an account in the configured database.
    ///
    /// Needs a persistent `--db-url` (the default file store or a remote
    /// server); the embedded file store must not be open in a running
    /// `serve` at the same time.
    CreateUser(CreateUserArgs),
}

/// Staff account ensured at startup, for deployments that cannot run
/// `create-user` against the server's database.
#[derive(Debug, Args)]
pub struct AdminArgs {
    #[arg(long, env = "MASCOTAS_ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,
    #[arg(long, env = "MASCOTAS_ADMIN_EMAIL")]
    pub admin_email: Option<String>,
    #[arg(long, env = "MASCOTAS_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl AdminArgs {
    /// Registration input when both e-mail and password are configured.
    pub fn registration(&self) -> Option<RegisterInput> {
        let (Some(email), Some(password)) = (&self.admin_email, &self.admin_password) else {
            return None;
        };
        Some(RegisterInput {
            username: self.admin_username.clone(),
            email: email.clone(),
            password: password.clone(),
            password_confirmation: password.clone(),
            phone: None,
            address: None,
        })
    }
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Allow managing foundations and pets
    #[arg(long)]
    pub staff: bool,
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub struct Settings {
    /// SurrealDB endpoint (`surrealkv://path`, `ws://host:port`, `mem://`)
    #[arg(
        long,
        global = true,
        env = "MASCOTAS_DB_URL",
        default_value = "surrealkv://mascotas.db"
    )]
    pub db_url: String,
    #[arg(long, global = true, env = "MASCOTAS_DB_NAMESPACE", default_value = "mascotas")]
    pub db_namespace: String,
    #[arg(long, global = true, env = "MASCOTAS_DB_DATABASE", default_value = "main")]
    pub db_database: String,
    #[arg(long, global = true, env = "MASCOTAS_DB_USER")]
    pub db_user: Option<String>,
    #[arg(long, global = true, env = "MASCOTAS_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
    /// Server-side secret mixed into password hashes
    #[arg(long, global = true, env = "MASCOTAS_PEPPER", hide_env_values = true)]
    pub pepper: Option<String>,
    #[arg(long, global = true, env = "MASCOTAS_MIN_PASSWORD_LENGTH", default_value_t = 8)]
    pub min_password_length: usize,
    /// Session lifetime in seconds (at most one year)
    #[arg(
        long,
        global = true,
        env = "MASCOTAS_SESSION_LIFETIME_SECS",
        default_value_t = 1_209_600,
        value_parser = clap::value_parser!(u64).range(60..=MAX_SESSION_LIFETIME_SECS)
    )]
    pub session_lifetime_secs: u64,
}

impl Settings {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            pepper: self.pepper.clone(),
            min_password_length: self.min_password_length,
            session_lifetime_secs: self.session_lifetime_secs,
            ..AuthConfig::default()
        }
    }
}
