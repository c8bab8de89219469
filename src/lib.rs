// src/lib.rs

pub mod chain;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod scheduler;
pub mod status;
pub mod types;
pub mod work;
pub mod workers;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::chain::Chain;
use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, validate_kinds, ConfigFile};
use crate::engine::{ManagerSettings, WorkManager};
use crate::types::{Constraint, ExistingChainPolicy};
use crate::work::{RunId, WorkInfo, WorkState};

/// A chain ready to be handed to the manager.
struct Submission {
    name: String,
    policy: ExistingChainPolicy,
    chain: Chain,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - worker registry / device state
/// - the work manager runtime
/// - a status printer subscribed to every unit
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    let workers = workers::sample_registry(&cfg.workers);
    validate_kinds(&cfg, &workers)?;

    let submissions = collect_submissions(&cfg, &args)?;
    if submissions.is_empty() {
        anyhow::bail!(
            "nothing to run: no chains selected from {} and --image was not given",
            args.config
        );
    }

    if args.dry_run {
        print_dry_run(&cfg, &submissions);
        return Ok(());
    }

    let device = Arc::new(cfg.device.to_device_state());
    if args.charging {
        device.set(Constraint::Charging, true);
    }
    debug!(?device, "initial device state");

    let settings = ManagerSettings {
        exit_when_idle: args.once,
        ..ManagerSettings::from(&cfg.config)
    };
    let (manager, runtime) = WorkManager::start(workers, device, settings);

    let printer = spawn_status_printer(manager.observe_all());

    // Ctrl-C → graceful shutdown.
    let ctrl_c = {
        let manager = manager.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = manager.shutdown().await;
        })
    };

    for Submission {
        name,
        policy,
        chain,
    } in submissions
    {
        info!(chain = %name, ?policy, units = chain.len(), "submitting chain");
        manager.submit_chain(name, policy, chain).await?;
    }

    let outcome = runtime.await.context("runtime task panicked")?;

    // The status stream ends once every bus handle is gone; drain it so the
    // final transitions are printed before we return.
    ctrl_c.abort();
    let _ = ctrl_c.await;
    drop(manager);
    printer.await.context("status printer panicked")?;

    outcome?;
    Ok(())
}

/// Load the config file, tolerating a missing *default* file when the
/// sample image pipeline was requested on the command line.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let path = Path::new(&args.config);
    if !path.exists() && args.image.is_some() && path == default_config_path() {
        debug!(path = %args.config, "no config file; using defaults");
        return Ok(ConfigFile::default());
    }

    load_and_validate(path).with_context(|| format!("loading config from {}", args.config))
}

/// Chains to submit, in order: config chains (optionally narrowed by
/// `--chain`), then the sample image pipeline if `--image` was given.
fn collect_submissions(cfg: &ConfigFile, args: &CliArgs) -> Result<Vec<Submission>> {
    let mut out = Vec::new();

    if let Some(only) = args.chain.as_deref() {
        if !cfg.chain.contains_key(only) {
            anyhow::bail!("chain '{only}' is not defined in {}", args.config);
        }
    }

    for (name, chain_cfg) in cfg.chain.iter() {
        if args.chain.as_deref().is_some_and(|only| only != name.as_str()) {
            continue;
        }
        out.push(Submission {
            name: name.clone(),
            policy: chain_cfg.policy,
            chain: chain_cfg.to_chain()?,
        });
    }

    if let Some(uri) = args.image.as_deref() {
        out.push(Submission {
            name: workers::IMAGE_MANIPULATION_WORK_NAME.to_string(),
            policy: ExistingChainPolicy::Replace,
            chain: workers::image_pipeline(uri, args.blur_level),
        });
    }

    Ok(out)
}

/// Print one line per unit whenever its state changes. The task ends when
/// the stream does.
fn spawn_status_printer<S>(mut updates: S) -> JoinHandle<()>
where
    S: Stream<Item = Vec<WorkInfo>> + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        let mut last: HashMap<RunId, WorkState> = HashMap::new();
        while let Some(units) = updates.next().await {
            for info in units {
                if last.insert(info.run_id, info.state) != Some(info.state) {
                    println!("{}", status_line(&info));
                }
            }
        }
    })
}

fn status_line(info: &WorkInfo) -> String {
    let mut line = format!(
        "[{}#{}] {:<8} {}",
        info.chain,
        info.index,
        info.kind.as_str(),
        info.state
    );
    if let Some(output) = &info.output {
        if !output.is_empty() {
            line.push_str(&format!(" {output}"));
        }
    }
    line
}

/// Simple dry-run output: print settings and the chains that would run.
fn print_dry_run(cfg: &ConfigFile, submissions: &[Submission]) {
    println!("workchain dry-run");
    println!("  config.max_workers = {}", cfg.config.max_workers);
    println!("  config.tick_interval_ms = {}", cfg.config.tick_interval_ms);
    println!("  config.retain_finished = {}", cfg.config.retain_finished);
    println!();

    println!("chains ({}):", submissions.len());
    for sub in submissions {
        println!("  - {} (policy: {:?})", sub.name, sub.policy);
        for (idx, unit) in sub.chain.units().iter().enumerate() {
            println!("      {idx}: {}", unit.kind());
            if !unit.input().is_empty() {
                println!("         input: {}", unit.input());
            }
            if !unit.tags().is_empty() {
                println!("         tags: {:?}", unit.tags());
            }
            if !unit.constraints().is_empty() {
                println!("         constraints: {:?}", unit.constraints());
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
