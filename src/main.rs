use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use book_reviews::{api, store, Config};

#[derive(Parser)]
#[command(name = "book-reviews")]
#[command(about = "Book review API with PostgreSQL storage and an in-memory fallback")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "book-reviews.yml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

impl Cli {
    /// Command-line values win over the config file
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = Some(url);
        }
    }
}

/// `RUST_LOG` plus our own logs and actix-web's request lines at info
fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("book_reviews=info".parse()?)
        .add_directive("actix_web=info".parse()?))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter(env_filter()?).init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    cli.apply(&mut config);

    let store = store::connect(&config.database).await;
    info!(backend = %store.backend(), "Review store ready");

    let (host, port) = config.bind_addr();
    info!("Server running on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::from(store.clone()))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await
    .context("HTTP server failed")?;

    Ok(())
}
