use log::{debug, info, warn};

use crate::config::{Config, DiscoveryConfig, ServerConfig, TransferConfig};
use crate::host::{Host, PlayerId};
use crate::rules::achievement::{evaluate_rule, AchievementRule};
use crate::rules::discovery::{check_milestones, reward_new_items, ObtainedItems};
use crate::rules::display::refresh_balances;
use crate::rules::ledger::Ledger;
use crate::rules::scheduler::{Job, Scheduler};
use crate::rules::transfer::{run_transfers, TransferOutcome};

/// Everything that happened during one tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub jobs: Vec<Job>,
    pub balances_refreshed: usize,
    pub transfers: Vec<TransferOutcome>,
    pub new_items: Vec<(PlayerId, String)>,
    pub milestones: Vec<(PlayerId, usize)>,
    /// `(achievement id, player)` pairs unlocked this tick.
    pub achievements: Vec<(String, PlayerId)>,
}

impl TickReport {
    /// No job ran on this tick.
    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Owns the rule set and its in-memory state; driven one tick at a time by the host.
pub struct RuleEngine {
    server: ServerConfig,
    ledger: Ledger,
    transfer: TransferConfig,
    discovery: DiscoveryConfig,
    achievements: Vec<AchievementRule>,
    obtained: ObtainedItems,
    scheduler: Scheduler,
}

impl RuleEngine {
    pub fn new(config: &Config) -> Self {
        let schedule = &config.schedule;
        let mut scheduler = Scheduler::new();
        scheduler.after(schedule.startup_delay_ticks, Job::Startup);
        scheduler.every(schedule.display_interval_ticks, Job::RefreshBalances);
        if config.transfer.enabled {
            scheduler.every(schedule.transfer_interval_ticks, Job::Transfers);
        }
        if config.discovery.enabled {
            scheduler.every(schedule.discovery_interval_ticks, Job::FirstItemRewards);
            scheduler.every(schedule.milestone_interval_ticks, Job::Milestones);
        }
        for (index, rule) in config.achievements.iter().enumerate() {
            scheduler.every(rule.interval_ticks, Job::Achievement(index));
        }
        debug!("Registered {} periodic jobs", scheduler.len());

        Self {
            server: config.server.clone(),
            ledger: Ledger::new(&config.ledger),
            transfer: config.transfer.clone(),
            discovery: config.discovery.clone(),
            achievements: config.achievements.clone(),
            obtained: ObtainedItems::new(),
            scheduler,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn obtained(&self) -> &ObtainedItems {
        &self.obtained
    }

    pub fn achievements(&self) -> &[AchievementRule] {
        &self.achievements
    }

    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Advance one tick and run every job due on it.
    pub fn tick(&mut self, host: &mut dyn Host) -> TickReport {
        let jobs = self.scheduler.advance();
        let mut report = TickReport {
            tick: self.scheduler.current_tick(),
            ..TickReport::default()
        };
        for job in jobs {
            self.run_job(host, job, &mut report);
            report.jobs.push(job);
        }
        report
    }

    /// Advance `ticks` ticks, returning the reports of ticks that ran a job.
    pub fn run_ticks(&mut self, host: &mut dyn Host, ticks: u64) -> Vec<TickReport> {
        (0..ticks)
            .map(|_| self.tick(host))
            .filter(|report| !report.is_idle())
            .collect()
    }

    /// Run a single job immediately, outside the schedule.
    pub fn run_job(&mut self, host: &mut dyn Host, job: Job, report: &mut TickReport) {
        match job {
            Job::Startup => {
                if let Err(e) = self.ledger.ensure_objective(host) {
                    warn!("Scoreboard setup failed: {}", e);
                }
                if !self.server.ready_message.is_empty() {
                    host.broadcast(&self.server.ready_message);
                }
                info!("{} rules ready", self.server.name);
            }
            Job::RefreshBalances => {
                report.balances_refreshed = refresh_balances(host, &self.ledger);
            }
            Job::Transfers => {
                report
                    .transfers
                    .extend(run_transfers(host, &self.ledger, &self.transfer));
            }
            Job::FirstItemRewards => {
                report.new_items.extend(reward_new_items(
                    host,
                    &self.ledger,
                    &mut self.obtained,
                    self.discovery.first_item_reward,
                ));
            }
            Job::Milestones => {
                report.milestones.extend(check_milestones(
                    host,
                    &self.ledger,
                    &self.obtained,
                    &self.discovery.milestones,
                ));
            }
            Job::Achievement(index) => {
                let Some(rule) = self.achievements.get(index) else {
                    warn!("No achievement registered at index {}", index);
                    return;
                };
                for player in evaluate_rule(host, &self.ledger, rule) {
                    report.achievements.push((rule.id.clone(), player));
                }
            }
        }
    }
}
