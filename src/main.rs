use anyhow::Context;
use clap::Parser;
use colored::*;
use docjar::config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MEMO_CAPACITY, DEFAULT_MEMO_TTL,
    DEFAULT_METADATA_TIMEOUT, DEFAULT_MIRRORS,
};
use docjar::mirrors::MirrorList;
use docjar::{ArchiveLayout, DocService, DocsConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "docjar=info,tower_http=warn";

/// Serve javadoc archives from Maven repositories, cached locally.
#[derive(Debug, Parser)]
#[command(name = "docjar", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "DOCJAR_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Cache root; defaults to ~/jdoccache
    #[arg(long, env = "DOCJAR_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Repository base URL, tried in the order given. Replaces the defaults.
    #[arg(long = "mirror", env = "DOCJAR_MIRRORS", value_delimiter = ',')]
    mirrors: Vec<String>,

    #[arg(long, env = "DOCJAR_CLASSIFIER", default_value = "javadoc")]
    classifier: String,

    #[arg(long, env = "DOCJAR_EXTENSION", default_value = "jar")]
    extension: String,

    /// How long a resolved release version is reused
    #[arg(long, env = "DOCJAR_MEMO_TTL_SECS", default_value_t = DEFAULT_MEMO_TTL.as_secs())]
    memo_ttl_secs: u64,

    #[arg(long, env = "DOCJAR_MEMO_CAPACITY", default_value_t = DEFAULT_MEMO_CAPACITY)]
    memo_capacity: usize,

    #[arg(long, env = "DOCJAR_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    connect_timeout_secs: u64,

    #[arg(long, env = "DOCJAR_METADATA_TIMEOUT_SECS", default_value_t = DEFAULT_METADATA_TIMEOUT.as_secs())]
    metadata_timeout_secs: u64,

    #[arg(long, env = "DOCJAR_DOWNLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT.as_secs())]
    download_timeout_secs: u64,
}

impl Cli {
    fn into_config(self) -> DocsConfig {
        let cache_root = self.cache_dir.unwrap_or_else(DocsConfig::default_cache_root);
        let mirrors = if self.mirrors.is_empty() {
            MirrorList::from_urls(DEFAULT_MIRRORS.iter().copied())
        } else {
            MirrorList::from_urls(self.mirrors)
        };

        DocsConfig::new(cache_root)
            .with_mirrors(mirrors)
            .with_layout(ArchiveLayout::new(self.classifier, self.extension))
            .with_memo(Duration::from_secs(self.memo_ttl_secs), self.memo_capacity)
            .with_timeouts(
                Duration::from_secs(self.connect_timeout_secs),
                Duration::from_secs(self.metadata_timeout_secs),
                Duration::from_secs(self.download_timeout_secs),
            )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind = cli.bind.clone();
    let config = cli.into_config();

    println!("{}", "=".repeat(60).cyan());
    println!("{}", "  docjar - javadoc archive browser".bold().cyan());
    println!("{}", format!("  http://{bind}/").cyan());
    println!("{}", "=".repeat(60).cyan());
    println!("Cache: {}", config.cache_root.display());
    for mirror in config.mirrors.iter() {
        println!("Mirror: {}", mirror.base());
    }
    println!();

    let service = DocService::new(&config)
        .await
        .with_context(|| format!("failed to prepare cache at {}", config.cache_root.display()))?;

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    docjar::server::serve(listener, Arc::new(service))
        .await
        .context("server error")?;

    println!("Goodbye!");
    Ok(())
}
