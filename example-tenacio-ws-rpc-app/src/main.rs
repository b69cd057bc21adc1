use clap::{Args, Parser, Subcommand};
use example_tenacio_rpc_service_definition::format_reader::{
    Close, FormatReader, GetDimensionOrder, GetFormat, GetImageCount, GetPixelType,
    GetSeriesCount, GetSizeC, GetSizeT, GetSizeX, GetSizeY, GetSizeZ, IsRgb, SetId,
    SetMetadataCollected, SetSeries,
};
use example_tenacio_ws_rpc_app::{
    Catalogue, FormatReaderServant, reader_context, register_format_reader,
};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tenacio::{ProxyOptions, RetryIntervals};
use tenacio_rpc_service_caller::{RpcCallOperation, ServiceProxy};
use tenacio_tokio_rpc_client::{ClientConfig, RpcClient};
use tenacio_tokio_rpc_server::{RpcServer, ServerConfig};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log filter used when `RUST_LOG` is not set
    #[clap(long, env = "TENACIO_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the synthetic image catalogue
    Serve(ServeArgs),
    /// Open a file on a server and print its dimensions
    Probe(ProbeArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[clap(long, env = "TENACIO_HOST", default_value = "127.0.0.1")]
    host: String,

    #[clap(long, env = "TENACIO_PORT", default_value_t = 8080)]
    port: u16,

    /// Milliseconds between heartbeat pings
    #[clap(long, default_value_t = 5_000)]
    heartbeat_ms: u64,

    /// Milliseconds of client silence before disconnecting it
    #[clap(long, default_value_t = 15_000)]
    client_timeout_ms: u64,

    /// Seconds an untouched reader is kept before it may be evicted
    #[clap(long, default_value_t = 600)]
    reader_idle_secs: u64,
}

#[derive(Args)]
struct ProbeArgs {
    #[clap(long, env = "TENACIO_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Id of the file to open
    #[clap(long, default_value = "a.tif")]
    file: String,

    /// Delays in milliseconds between attempts, e.g. "0 100 500"; "-1"
    /// disables retries
    #[clap(long, env = "TENACIO_RETRY_INTERVALS", default_value = "0 100 500")]
    retry_intervals: String,

    /// Milliseconds to wait for each reply
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// Reader id to open the file on; defaults to one unique to this process
    #[clap(long)]
    reader: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Probe(args) => probe(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<(), BoxError> {
    let server = RpcServer::new(ServerConfig {
        heartbeat_interval: Duration::from_millis(args.heartbeat_ms),
        client_timeout: Duration::from_millis(args.client_timeout_ms),
    });

    let catalogue = Catalogue::synthetic();
    tracing::info!("Serving {} images", catalogue.len());
    let servant = Arc::new(
        FormatReaderServant::new(catalogue)
            .with_idle_timeout(Duration::from_secs(args.reader_idle_secs)),
    );
    register_format_reader(server.endpoint().as_ref(), servant).await?;

    server.serve_on(&args.host, args.port).await?;
    Ok(())
}

async fn probe(args: ProbeArgs) -> Result<(), BoxError> {
    let mut config = ClientConfig::new(args.url)
        .with_retry_intervals(RetryIntervals::parse(&args.retry_intervals)?);
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_invocation_timeout(Duration::from_millis(timeout_ms));
    }
    let reader_id = args
        .reader
        .unwrap_or_else(|| format!("probe-{}", std::process::id()));
    let context = reader_context(&reader_id);
    let client = RpcClient::new(config)
        .with_proxy_options(ProxyOptions::new().with_context(context.clone()));

    let Some(reader) = ServiceProxy::<_, FormatReader>::checked_cast(client.clone()).await? else {
        return Err("server does not serve image readers".into());
    };

    let one_way = client.with_proxy_options(ProxyOptions::new().with_one_way().with_context(context));
    SetMetadataCollected::call(&one_way, false).await?;

    reader.call::<SetId>(args.file.clone()).await?;
    println!("{}: {}", args.file, reader.call::<GetFormat>(()).await?);

    let series_count = GetSeriesCount::call(reader.client(), ()).await?;
    for series in 0..series_count {
        SetSeries::call(reader.client(), series).await?;
        let client = reader.client();
        println!(
            "  series {series}: {}x{}x{}x{}x{} ({}), {} planes, pixel type {}{}",
            GetSizeX::call(client, ()).await?,
            GetSizeY::call(client, ()).await?,
            GetSizeZ::call(client, ()).await?,
            GetSizeC::call(client, ()).await?,
            GetSizeT::call(client, ()).await?,
            GetDimensionOrder::call(client, ()).await?,
            GetImageCount::call(client, ()).await?,
            GetPixelType::call(client, ()).await?,
            if IsRgb::call(client, ()).await? { ", RGB" } else { "" },
        );
    }

    reader.call::<Close>(()).await?;
    Ok(())
}
