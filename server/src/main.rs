use anyhow::{bail, Result};
use axum::Router;
use cinematch_core::Engine;
use cinematch_server::build_app;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file (JSON or JSONL) to build the index from on first request
    #[arg(long, conflicts_with = "index")]
    corpus: Option<PathBuf>,
    /// Prebuilt index directory produced by the indexer
    #[arg(long)]
    index: Option<PathBuf>,
    /// Vocabulary cap for in-process builds
    #[arg(long, default_value_t = 8000)]
    max_vocabulary: usize,
    /// Build the index at startup instead of on the first request
    #[arg(long, default_value_t = false)]
    warm: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let engine = match (args.corpus, args.index) {
        (Some(corpus), None) => Engine::from_corpus(corpus, args.max_vocabulary),
        (None, Some(index)) => Engine::from_prebuilt(index)?,
        _ => bail!("exactly one of --corpus or --index is required"),
    };
    if args.warm {
        engine.warm()?;
    }
    let app: Router = build_app(Arc::new(engine));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
