use std::{path::PathBuf, time::Duration};

use block_qa_tracker::{
    config::{AppConfig, parse_interval},
    notification::create_notifier,
    persistence::FsArtifactStore,
    providers::{FirehoseSource, RpcFetcherSource},
    supervisor::Supervisor,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

/// Compares Solana blocks served by Firehose and by a JSON-RPC node.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Time between two comparisons (e.g. 30s, 5m, 1h30m).
    #[arg(value_parser = parse_interval)]
    interval: Duration,

    /// Firehose gRPC endpoint [default: mainnet.sol.streamingfast.io:443]
    #[arg(long)]
    firehose_endpoint: Option<String>,

    /// Solana JSON-RPC endpoint [default: https://api.mainnet-beta.solana.com]
    #[arg(long)]
    solana_rpc_endpoint: Option<Url>,

    /// Slack webhook URL for divergence notifications.
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    slack_webhook_url: Option<Url>,

    /// Slack channel for notifications [default: solana]
    #[arg(long)]
    slack_channel: Option<String>,

    /// Directory receiving the divergence artifacts [default: .]
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Directory containing an optional `app.yaml`.
    #[arg(long)]
    config_dir: Option<String>,
}

impl Cli {
    /// Layers the command-line flags over the loaded configuration.
    fn apply(self, config: &mut AppConfig) {
        config.interval = self.interval;
        if let Some(endpoint) = self.firehose_endpoint {
            config.firehose.endpoint = endpoint;
        }
        if let Some(endpoint) = self.solana_rpc_endpoint {
            config.rpc.endpoint = endpoint;
        }
        if let Some(url) = self.slack_webhook_url {
            config.notifier.webhook_url = Some(url);
        }
        if let Some(channel) = self.slack_channel {
            config.notifier.channel = channel;
        }
        if let Some(dir) = self.artifact_dir {
            config.artifact_dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let mut config = AppConfig::new(cli.config_dir.as_deref())?;
    cli.apply(&mut config);
    tracing::info!(
        interval = ?config.interval,
        firehose_endpoint = %config.firehose.uri(),
        firehose_auth = config.firehose_auth.scheme(),
        rpc_endpoint = %config.rpc.endpoint,
        artifact_dir = %config.artifact_dir.display(),
        "Configuration loaded."
    );

    let http_client = config.http_base_config.build_client()?;

    let streaming = FirehoseSource::connect(&config.firehose, config.firehose_auth.clone()).await?;
    let point = RpcFetcherSource::new(http_client.clone(), &config.rpc);
    let notifier = create_notifier(&config.notifier, http_client);
    let artifacts = FsArtifactStore::new(&config.artifact_dir);

    let supervisor = Supervisor::builder()
        .config(config)
        .streaming_source(Box::new(streaming))
        .point_source(Box::new(point))
        .artifact_store(Box::new(artifacts))
        .notifier(notifier)
        .build()?;

    supervisor.run().await?;
    Ok(())
}
