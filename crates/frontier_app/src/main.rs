//! Frontier: follows document chains and keeps the remote feature store in
//! sync with the images they add and delete.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use engine_logging::{engine_error, engine_info, engine_warn};
use frontier_app::{logging, AppConfig};
use frontier_core::CrawlError;
use frontier_engine::{
    ensure_cache_dir, Bootstrapper, CancelToken, EngineError, EngineHandle, ReqwestStore,
    RunReport, TokenCache,
};

/// How a single bootstrap-and-crawl run ended.
enum RunEnd {
    /// The process was asked to stop.
    Stopped(RunReport),
    /// The run failed in a way a fresh bootstrap may fix.
    Restart(String),
}

fn main() -> Result<()> {
    let explicit = env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(explicit.as_deref())?;
    logging::initialize(config.log);

    let root = CancelToken::new();
    let handler_token = root.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("set Ctrl+C handler")?;

    supervise(&config, &root)
}

/// Bootstraps and runs the engine until Ctrl+C, starting over whenever the
/// credential stops working.
fn supervise(config: &AppConfig, root: &CancelToken) -> Result<()> {
    ensure_cache_dir(&config.auth_cache_dir).context("prepare auth cache directory")?;
    let cache = TokenCache::new(&config.auth_cache_dir);
    let bootstrapper = Bootstrapper::new(&config.store_settings(), cache)?;

    let mut attempt: u64 = 0;
    while !root.is_cancelled() {
        attempt += 1;
        engine_info!("starting run {attempt} against {}", config.base_url);
        match run_once(config, &bootstrapper, root)? {
            RunEnd::Stopped(report) => {
                engine_info!("stopped after {attempt} run(s)");
                log_report(&report);
                return Ok(());
            }
            RunEnd::Restart(reason) => {
                engine_warn!(
                    "run {attempt} ended: {reason}; restarting in {:?}",
                    config.restart_delay()
                );
                root.sleep(config.restart_delay());
            }
        }
    }
    engine_info!("stopped");
    Ok(())
}

fn run_once(
    config: &AppConfig,
    bootstrapper: &Bootstrapper,
    root: &CancelToken,
) -> Result<RunEnd> {
    let bootstrap = match bootstrapper.bootstrap_blocking(&config.api_key) {
        Ok(bootstrap) => bootstrap,
        Err(err) => return Ok(RunEnd::Restart(format!("bootstrap failed: {err}"))),
    };
    let store = ReqwestStore::new(config.store_settings(), bootstrap.token)?;

    let engine = match EngineHandle::start(
        config.engine_config(),
        Arc::new(store),
        bootstrap.seeds,
        root.child(),
    ) {
        Ok(engine) => engine,
        Err(EngineError::NoSeeds) => {
            return Ok(RunEnd::Restart("seed list was empty".to_string()));
        }
        Err(err) => return Err(err).context("start engine"),
    };

    let run_token = engine.cancel_token();
    while run_token.sleep(config.stats_interval()) {
        log_report(&engine.snapshots());
    }

    match engine.join() {
        Ok(report) => Ok(RunEnd::Stopped(report)),
        Err(CrawlError::Unauthorized) => Ok(RunEnd::Restart("credential rejected".to_string())),
        Err(err) => {
            engine_error!("run halted: {err}");
            Ok(RunEnd::Restart(err.to_string()))
        }
    }
}

fn log_report(report: &RunReport) {
    for partition in &report.partitions {
        engine_info!("{partition}");
    }
}
