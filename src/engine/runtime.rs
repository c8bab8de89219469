// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::chain::ScheduledUnit;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::status::StatusBus;
use crate::work::RunId;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Shortest accepted tick interval; `tokio::time::interval` rejects zero.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Drives the chain scheduler in response to `RuntimeEvent`s and timer
/// ticks, publishes status, and delegates unit execution to an
/// `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// scheduling semantics. It is the only writer of chain state, so every
/// submission, cancellation and completion is applied one at a time.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    status: StatusBus,
    tick_interval: Duration,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        status: StatusBus,
        tick_interval: Duration,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            status,
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`, plus a periodic tick so
    ///   held units get their constraints re-checked.
    /// - Every other event is followed by an immediate `Advance`, so a chain
    ///   moves on as soon as its previous unit completes. Finished chains
    ///   are only expired on periodic ticks.
    /// - Executes commands returned by the core (publish, stop, dispatch).
    pub async fn run(mut self) -> Result<()> {
        info!(
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            "workchain runtime started"
        );

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                maybe_event = self.event_rx.recv() => match maybe_event {
                    Some(e) => e,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
                _ = ticker.tick() => RuntimeEvent::Tick,
            };

            let follow_up = !matches!(
                event,
                RuntimeEvent::Tick | RuntimeEvent::Advance | RuntimeEvent::ShutdownRequested
            );

            if !self.handle(event).await? {
                info!("core requested exit; stopping runtime");
                break;
            }

            if follow_up && !self.handle(RuntimeEvent::Advance).await? {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Feed one event into the core and execute the resulting commands.
    ///
    /// Returns whether the loop should keep running.
    async fn handle(&mut self, event: RuntimeEvent) -> Result<bool> {
        if matches!(event, RuntimeEvent::Tick | RuntimeEvent::Advance) {
            trace!("runtime tick");
        } else {
            debug!(event = event.name(), "runtime received event");
        }

        let step = self.core.step(event);

        for command in step.commands {
            self.execute_command(command).await?;
        }

        Ok(step.keep_running)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Publish(snapshot) => {
                self.status.publish(snapshot);
            }
            CoreCommand::StopUnits(units) => {
                self.stop(units).await?;
            }
            CoreCommand::DispatchUnits(units) => {
                self.dispatch(units).await?;
            }
            CoreCommand::RequestExit => {
                // keep_running=false already ends the loop; just log it.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, units: Vec<ScheduledUnit>) -> Result<()> {
        if units.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = units
            .iter()
            .map(|u| format!("{}#{}", u.chain, u.index))
            .collect();
        debug!(?names, "dispatching ready units");

        self.executor.dispatch_units(units).await
    }

    async fn stop(&mut self, units: Vec<RunId>) -> Result<()> {
        if units.is_empty() {
            return Ok(());
        }
        debug!(count = units.len(), "stopping interrupted units");
        self.executor.stop_units(units).await
    }
}
