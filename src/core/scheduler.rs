use crate::core::composer::Template;
use crate::core::loader::DataLoader;
use crate::core::{DataSource, Dispatcher, FileEntry, RunSummary, Storage};
use crate::utils::error::Result;
use std::time::Duration;

/// Budget value meaning "repeat forever".
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// Every schedule entry is sent each cycle.
    #[default]
    AllEachRound,
    /// One entry per cycle, rotating through the list.
    OnePerRound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    pub budget: i64,
    pub delay: Duration,
    pub push_mode: PushMode,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryPlan {
    pub template: Template,
    pub bootstrap: Option<DataSource>,
    pub schedule: Option<SchedulePlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Bootstrap,
    Cycling,
    Done,
}

/// Rotating entry index plus the remaining repeat budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCursor {
    index: usize,
    remaining: i64,
}

impl ScheduleCursor {
    pub fn new(budget: i64) -> Self {
        Self {
            index: 0,
            remaining: budget,
        }
    }

    /// Returns the current index modulo `len` and moves to the next one.
    /// `len` must be non-zero.
    pub fn select(&mut self, len: usize) -> usize {
        let current = self.index % len;
        self.index = (current + 1) % len;
        current
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Called after each cycle; `false` means the budget is spent.
    /// A budget of 1 or less (other than unlimited) stops after the current cycle.
    pub fn consume(&mut self) -> bool {
        if self.remaining == UNLIMITED {
            true
        } else if self.remaining > 1 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

pub struct Scheduler<S: Storage, D: Dispatcher> {
    plan: DeliveryPlan,
    loader: DataLoader<S>,
    dispatcher: D,
    state: SchedulerState,
    cycle_cap: Option<u64>,
    summary: RunSummary,
}

impl<S: Storage, D: Dispatcher> Scheduler<S, D> {
    pub fn new(plan: DeliveryPlan, loader: DataLoader<S>, dispatcher: D) -> Self {
        Self {
            plan,
            loader,
            dispatcher,
            state: SchedulerState::Bootstrap,
            cycle_cap: None,
            summary: RunSummary::default(),
        }
    }

    /// Stops the schedule after `cap` cycles even if the budget is unlimited.
    pub fn with_cycle_cap(mut self, cap: u64) -> Self {
        self.cycle_cap = Some(cap);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Drives the run to completion. The first error aborts the whole run.
    pub async fn run(&mut self) -> Result<RunSummary> {
        loop {
            self.state = match self.state {
                SchedulerState::Bootstrap => {
                    self.bootstrap().await?;
                    if self.plan.schedule.is_some() {
                        SchedulerState::Cycling
                    } else {
                        SchedulerState::Done
                    }
                }
                SchedulerState::Cycling => {
                    self.run_schedule().await?;
                    SchedulerState::Done
                }
                SchedulerState::Done => break,
            };
            tracing::debug!("Scheduler state: {:?}", self.state);
        }

        tracing::info!(
            "Run finished: {} dispatches over {} cycles, {} bytes sent",
            self.summary.dispatches,
            self.summary.cycles,
            self.summary.bytes_sent
        );
        Ok(self.summary.clone())
    }

    async fn bootstrap(&mut self) -> Result<()> {
        let Some(source) = self.plan.bootstrap.clone() else {
            return Ok(());
        };

        let entries = self.loader.resolve_entries(&source).await?;
        tracing::info!("Initial delivery of {} entries", entries.len());
        for entry in &entries {
            self.deliver(entry).await?;
        }
        Ok(())
    }

    async fn run_schedule(&mut self) -> Result<()> {
        let Some(schedule) = self.plan.schedule.clone() else {
            return Ok(());
        };

        let entries = self.loader.resolve_entries(&schedule.source).await?;
        if entries.is_empty() {
            tracing::info!("Schedule has no data files, nothing to send");
            return Ok(());
        }

        tracing::info!(
            "Running schedule: {} entries, budget {}, every {:?} ({:?})",
            entries.len(),
            if schedule.budget == UNLIMITED {
                "unlimited".to_string()
            } else {
                schedule.budget.to_string()
            },
            schedule.delay,
            schedule.push_mode
        );

        let mut cursor = ScheduleCursor::new(schedule.budget);
        loop {
            self.summary.cycles += 1;

            match schedule.push_mode {
                PushMode::AllEachRound => {
                    for entry in &entries {
                        self.deliver(entry).await?;
                    }
                }
                PushMode::OnePerRound => {
                    let index = cursor.select(entries.len());
                    self.deliver(&entries[index]).await?;
                }
            }

            if !cursor.consume() {
                break;
            }

            if let Some(cap) = self.cycle_cap {
                if self.summary.cycles >= cap {
                    tracing::warn!("Cycle cap of {} reached, stopping schedule", cap);
                    break;
                }
            }

            tracing::debug!(
                "Sleeping {:?}, remaining budget {}",
                schedule.delay,
                cursor.remaining()
            );
            if !schedule.delay.is_zero() {
                tokio::time::sleep(schedule.delay).await;
            }
        }

        Ok(())
    }

    async fn deliver(&mut self, entry: &FileEntry) -> Result<()> {
        let data = self.loader.load_entry(entry).await?.into_value();
        let payload = self.plan.template.compose(&data);
        let report = self.dispatcher.dispatch(&payload).await?;

        tracing::info!(
            "Sent {} ({}byte) in {:.3}s, status {}",
            entry,
            report.bytes,
            report.elapsed.as_secs_f64(),
            report.status
        );

        self.summary.dispatches += 1;
        self.summary.bytes_sent += report.bytes as u64;
        Ok(())
    }
}
