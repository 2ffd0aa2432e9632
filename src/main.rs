use clap::Parser;
use weekend_fares::adapters::{amadeus, kiwi, AmadeusProvider, KiwiProvider, TelegramSink};
use weekend_fares::config::toml_config::{DeliveryKind, ProviderKind};
use weekend_fares::domain::ports::{FlightProvider, ReportSink};
use weekend_fares::utils::error::{ErrorSeverity, FareError};
use weekend_fares::utils::{logger, validation::Validate};
use weekend_fares::{Catalog, CliArgs, ConsoleSink, FaresConfig, FileSink, ScanEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    if args.list_regions {
        let catalog = Catalog::builtin();
        for region in Catalog::region_names() {
            let codes = catalog.region(region).unwrap_or_default();
            println!("{}: {}", region, codes.join(", "));
        }
        return Ok(());
    }

    tracing::info!("🚀 Starting weekend-fares");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match FaresConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);
    if args.stdout {
        config.delivery.kind = DeliveryKind::Stdout;
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }
    tracing::info!("✅ Configuration loaded and validated successfully");

    let token = if args.dry_run {
        String::new()
    } else {
        match config.provider_secret() {
            Ok(token) => token.to_string(),
            Err(e) => fail(&e),
        }
    };

    match config.provider.kind {
        ProviderKind::Amadeus => {
            let endpoint = config
                .provider
                .endpoint
                .clone()
                .unwrap_or_else(|| amadeus::DEFAULT_ENDPOINT.to_string());
            let mut provider = AmadeusProvider::new(endpoint, token);
            if let Some(max) = config.provider.max_results {
                provider = provider.with_max_results(max);
            }
            run(provider, &config, &args).await
        }
        ProviderKind::Kiwi => {
            let endpoint = config
                .provider
                .endpoint
                .clone()
                .unwrap_or_else(|| kiwi::DEFAULT_ENDPOINT.to_string());
            let mut provider = KiwiProvider::new(endpoint, token);
            if let Some(max) = config.provider.max_results {
                provider = provider.with_limit(max);
            }
            run(provider, &config, &args).await
        }
    }
}

async fn run<P: FlightProvider>(
    provider: P,
    config: &FaresConfig,
    args: &CliArgs,
) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let scan_config = match config.scan_config(&catalog) {
        Ok(scan_config) => scan_config,
        Err(e) => fail(&e),
    };
    let engine = ScanEngine::new(provider, scan_config, config.filter_config(), catalog);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No provider calls will be made");
        let plan = match engine.plan() {
            Ok(plan) => plan,
            Err(e) => fail(&e),
        };
        for query in &plan {
            println!(
                "{} → {}  {}  {} → {}{}",
                query.origin,
                query.destination,
                query.window.label,
                query.outbound_date,
                query.inbound_date,
                query
                    .profile
                    .as_deref()
                    .map(|p| format!("  [{}]", p))
                    .unwrap_or_default()
            );
        }
        println!("{} queries planned", plan.len());
        return Ok(());
    }

    let sink = build_sink(config);
    let assembler = config.report_assembler();

    match engine.run_cycle(&assembler, sink.as_ref()).await {
        Ok(cycle) => {
            if cycle.delivered == Some(false) {
                // The report was computed; only the push failed.
                println!("{}", cycle.rendered);
            }
            tracing::info!(
                "🏁 Cycle complete: {} deal(s), {} quer(ies) skipped",
                cycle.outcome.report.offers.len(),
                cycle.outcome.stats.rate_limited + cycle.outcome.stats.failed
            );
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn build_sink(config: &FaresConfig) -> Box<dyn ReportSink> {
    let delivery = &config.delivery;
    match delivery.kind {
        DeliveryKind::Stdout => Box::new(ConsoleSink),
        DeliveryKind::File => Box::new(FileSink::new(delivery.path.clone().unwrap_or_default())),
        DeliveryKind::Telegram => {
            let token = delivery.token.clone().unwrap_or_default();
            let chat_id = delivery.chat_id.clone().unwrap_or_default();
            match &delivery.api_base {
                Some(api_base) => Box::new(TelegramSink::with_api_base(api_base, token, chat_id)),
                None => Box::new(TelegramSink::new(token, chat_id)),
            }
        }
    }
}

fn fail(e: &FareError) -> ! {
    tracing::error!(
        "❌ weekend-fares failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
