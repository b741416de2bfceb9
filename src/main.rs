use folder_agent::cli::{Args, ConfigDiscovery, ConsoleEventHandler, OutputFormat};
use folder_agent::workflow::{LoggingEventHandler, WorkflowEngine};
use folder_agent::LLMProviderFactory;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.show_config {
        ConfigDiscovery::show_discovery_info();
        return;
    }

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ConfigDiscovery::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.apply_env_credentials();

    info!(
        "Using {} backend with model {}",
        config.provider.provider_type,
        config.provider.effective_model()
    );
    let provider = LLMProviderFactory::create_provider(config.provider.clone())?;

    let mut engine = WorkflowEngine::with_provider(provider, config.workflow);
    if args.verbose || args.debug {
        let root = std::fs::canonicalize(&args.path).unwrap_or_else(|_| args.path.clone());
        engine.add_event_handler(Box::new(ConsoleEventHandler::with_root(root)));
    }
    if args.debug {
        engine.add_event_handler(Box::new(LoggingEventHandler));
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal_token.cancel();
        }
    });

    let report = engine.run_with_cancellation(&args.path, cancel).await?;

    match args.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
