use anyhow::Result;
use bookstore_gateway::{AuthConfig, DEFAULT_BIND, HashCost, ServerConfig};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bookstore-gateway")]
#[command(about = "Token-gated BookStore service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the BookStore server
    Server {
        /// Bind address
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        /// HS256 signing secret for bearer tokens
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
        /// Bearer token lifetime in hours
        #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = bookstore_gateway::DEFAULT_TOKEN_TTL_HOURS)]
        token_ttl_hours: i64,
        /// Argon2 memory cost in KiB
        #[arg(long, default_value_t = HashCost::default().memory_kib)]
        hash_memory_kib: u32,
        /// Argon2 iteration count
        #[arg(long, default_value_t = HashCost::default().iterations)]
        hash_iterations: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bookstore_gateway=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            jwt_secret,
            token_ttl_hours,
            hash_memory_kib,
            hash_iterations,
        } => {
            let hash_cost = HashCost {
                memory_kib: hash_memory_kib,
                iterations: hash_iterations,
                ..HashCost::default()
            };

            // Missing secret or bad TTL aborts startup before anything binds.
            let auth = AuthConfig::new(jwt_secret, token_ttl_hours, hash_cost)?;
            let config = ServerConfig::new(&bind, auth)?;

            info!(
                "Starting BookStore server on {} (token ttl {}h)",
                config.bind, config.auth.token_ttl_hours
            );
            bookstore_gateway::serve(config).await?;
        }
    }

    Ok(())
}
