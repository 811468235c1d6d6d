//! live-build-status entry point.
//!
//! Connects to the configured realtime server, subscribes to the watched
//! page's feed, and prints every status update on its own line.

use tracing_subscriber::EnvFilter;

use live_build_status::config::{ClientConfig, LogFormat, SinkKind};
use live_build_status::presentation::{
    JsonUrlBuilder, LogNavigator, PresentationSink, TracingSink, WriterSink,
};
use live_build_status::session::Session;
use live_build_status::ws::TungsteniteTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ClientConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => logs.init(),
        LogFormat::Json => logs.json().init(),
    }

    tracing::info!(
        endpoint = %config.realtime_server,
        page = %config.page_location,
        sink = ?config.sink,
        "starting live-build-status"
    );

    match config.sink {
        SinkKind::Stdout => run(&config, WriterSink::new(std::io::stdout())).await,
        SinkKind::Log => run(&config, TracingSink).await,
    }
}

async fn run<S: PresentationSink>(config: &ClientConfig, sink: S) -> anyhow::Result<()> {
    let mut session = Session::new(
        config.host_page(),
        TungsteniteTransport::new(),
        sink,
        JsonUrlBuilder::new(config.json_api_prefix.clone()),
        LogNavigator::new(),
    );

    let info = session.run().await.into_result()?;
    tracing::info!(code = info.code, forwarded = session.router().forwarded(), "session ended");

    Ok(())
}
