use anyhow::{Context, Result};
use clap::Parser;
use framecast::cli::Args;
use framecast::{
    logging, open_devices, ChannelsClient, FramecastConfig, MediaDevices, Protocol, Session,
    SessionSummary, SocketIoClient,
};
use tracing::{info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(config: &FramecastConfig, devices: Box<dyn MediaDevices>) -> Result<SessionSummary> {
    let summary = match config.protocol {
        Protocol::SocketIo => {
            let transport = SocketIoClient::connect(&config.url)
                .await
                .with_context(|| format!("failed to connect to {}", config.url))?;
            Session::new(transport, devices, config)?
                .run_until(shutdown_signal())
                .await?
        }
        Protocol::Channels => {
            let transport = ChannelsClient::connect(&config.url, config.session_id.as_deref())
                .await
                .with_context(|| format!("failed to connect to {}", config.url))?;
            Session::new(transport, devices, config)?
                .run_until(shutdown_signal())
                .await?
        }
    };
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose)?;

    let config = args.to_config();
    config.validate()?;
    info!(url = %config.url, protocol = %config.protocol, "Starting framecast");

    let devices = open_devices(&config.source).context("failed to open capture devices")?;
    let summary = run(&config, devices).await?;

    info!(
        frames = summary.emitter.frames_emitted,
        skipped = summary.emitter.frames_skipped,
        bytes = summary.emitter.bytes_sent,
        "Done"
    );
    Ok(())
}
