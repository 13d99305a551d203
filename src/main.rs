use clap::Parser;
use datapush::core::scheduler::UNLIMITED;
use datapush::utils::{logger, validation::Validate};
use datapush::{
    AppConfig, CliArgs, DataLoader, HttpDispatcher, LocalStorage, PushError, Scheduler, Settings,
};
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    let log_dir = if args.no_log_file {
        None
    } else {
        Some(args.log_dir.as_path())
    };

    let log_context = match logger::init_run_logger(log_dir, args.verbose) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    tracing::info!("Starting datapush");
    if let Some(path) = log_context.log_file() {
        tracing::info!("Logging to {}", path.display());
    }

    let exit_code = match run(&args).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            let mut source = e.source();
            while let Some(cause) = source {
                tracing::error!("   caused by: {}", cause);
                source = cause.source();
            }
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    drop(log_context);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

async fn run(args: &CliArgs) -> Result<(), PushError> {
    tracing::info!("📁 Loading configuration from: {}", args.config.display());
    let config = AppConfig::from_file(&args.config)?;

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let settings = config.into_settings()?;
    log_api_summary(&settings);

    let loader = DataLoader::new(LocalStorage::default(), settings.delimiter);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be sent");
        return perform_dry_run(&settings, &loader).await;
    }

    let dispatcher = HttpDispatcher::new(settings.api.clone())?;
    let mut scheduler = Scheduler::new(settings.plan, loader, dispatcher);
    let summary = scheduler.run().await?;

    tracing::info!(
        "✅ Done: {} dispatches, {} bytes",
        summary.dispatches,
        summary.bytes_sent
    );
    Ok(())
}

fn log_api_summary(settings: &Settings) {
    let api = &settings.api;
    let auth = match &api.auth {
        Some(credentials) => format!("{} ({:?})", credentials.user, credentials.scheme),
        None => "none".to_string(),
    };
    let timeout = match api.timeout {
        Some(timeout) => format!("{:?}", timeout),
        None => "none".to_string(),
    };

    tracing::info!(
        "API: {} {} | auth: {} | timeout: {} | extra headers: {}",
        api.method,
        api.endpoint,
        auth,
        timeout,
        api.headers.len()
    );
    tracing::info!("Payload template: {}", settings.plan.template.to_value());
}

async fn perform_dry_run(
    settings: &Settings,
    loader: &DataLoader<LocalStorage>,
) -> Result<(), PushError> {
    println!("🔍 Dry Run Analysis:");
    println!("  Endpoint: {} {}", settings.api.method, settings.api.endpoint);
    println!(
        "  Placeholders in template: {}",
        settings.plan.template.placeholder_count()
    );
    println!("  CSV delimiter: {:?}", settings.delimiter as char);

    match &settings.plan.bootstrap {
        Some(source) => {
            let entries = loader.resolve_entries(source).await?;
            println!("  Initial delivery: {} entries", entries.len());
            for entry in &entries {
                println!("    - {}", entry);
            }
        }
        None => println!("  Initial delivery: none"),
    }

    match &settings.plan.schedule {
        Some(schedule) => {
            let entries = loader.resolve_entries(&schedule.source).await?;
            let budget = if schedule.budget == UNLIMITED {
                "unlimited".to_string()
            } else {
                schedule.budget.to_string()
            };
            println!(
                "  Schedule: {} entries, budget {}, every {:?}, {:?}",
                entries.len(),
                budget,
                schedule.delay,
                schedule.push_mode
            );
            for entry in &entries {
                println!("    - {}", entry);
            }
        }
        None => println!("  Schedule: none"),
    }

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
