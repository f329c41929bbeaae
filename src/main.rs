//! Reddit Saved Downloader - CLI entry point.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reddit_saved_downloader::{
    cli::Args,
    config::{validate_config, Config},
    download::{DownloadSession, YtDlp},
    error::{exit_codes, Result},
    listing::{load_posts, source_from_config},
    output::{
        create_spinner, print_banner, print_config_summary, print_error, print_info,
        print_run_summary, print_success, print_warning, BarReporter,
    },
    shutdown::{install_interrupt_handler, ShutdownCoordinator},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) if e.is_fatal_input() => {
            print_error(&format!("{}", e));
            print_info("Nothing was downloaded");
            ExitCode::from(exit_codes::ABORT as u8)
        }
        Err(e) => {
            print_error(&format!("Run aborted: {}", e));
            ExitCode::from(exit_codes::ABORT as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse_checked();

    // Set up logging
    init_logging(args.debug, args.log.as_deref())?;

    // Print banner
    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    let reset_ledger = args.reset_ledger;

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    // Fatal input errors stop here, before anything is scheduled
    let source = source_from_config(&config)?;
    print_config_summary(
        &source.describe(),
        &config.options.filename_style.to_string(),
        &config.options.output_directory.display().to_string(),
        config.options.concurrency,
    );

    let spinner = create_spinner("Loading saved posts...");
    let posts = load_posts(source.as_ref()).await;
    spinner.finish_and_clear();
    let posts = posts?;
    print_info(&format!("Loaded {} posts", posts.len()));

    // Hosted videos need the external downloader
    let ytdlp = YtDlp::from_config(&config.hosted_video);
    if !ytdlp.is_available().await {
        print_warning(&format!(
            "{} not found: Reddit-hosted videos will fail",
            config.hosted_video.program
        ));
    }

    let shutdown = ShutdownCoordinator::shared();
    install_interrupt_handler(shutdown.clone());

    let session = DownloadSession::new(&config)?
        .with_external_downloader(Arc::new(ytdlp))
        .with_reporter(Arc::new(BarReporter::new("Downloading")))
        .with_shutdown(shutdown.clone())
        .with_reset_ledger(reset_ledger);

    let summary = session.run(posts).await?;
    print_run_summary(&summary);

    if shutdown.is_shutdown_requested() {
        print_warning("Interrupted: cancelled downloads will be retried on the next run");
    } else if summary.failed == 0 {
        print_success("All downloads finished");
    }

    Ok(())
}

/// Console logging, plus a plain-text copy in `log_file` when given.
fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let log_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}
