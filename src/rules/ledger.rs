/// Currency ledger backed by a host scoreboard objective
use log::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::host::{Host, HostError, PlayerSnapshot, SoundCue};
use crate::metrics;
use crate::rules::errors::RulesError;

/// Reads and writes player balances in one scoreboard objective.
#[derive(Debug, Clone)]
pub struct Ledger {
    objective: String,
    display_name: String,
    suffix: String,
    cue: SoundCue,
}

impl Ledger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            objective: config.objective.clone(),
            display_name: config.display_name.clone(),
            suffix: config.currency_suffix.clone(),
            cue: config.sound.clone(),
        }
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// Format an amount with the currency suffix, e.g. `30G`.
    pub fn format_amount(&self, amount: i64) -> String {
        format!("{}{}", amount, self.suffix)
    }

    /// Create the objective if the host does not have it yet.
    /// Returns true when it was created.
    pub fn ensure_objective(&self, host: &mut dyn Host) -> Result<bool, RulesError> {
        if host.has_objective(&self.objective) {
            return Ok(false);
        }
        host.add_objective(&self.objective, &self.display_name)?;
        info!("Created scoreboard objective '{}'", self.objective);
        host.broadcast(&format!(
            "§a[System] {} scoreboard created",
            self.display_name
        ));
        Ok(true)
    }

    /// Current balance. An unset score is initialized to zero; this never fails.
    pub fn balance(&self, host: &mut dyn Host, player: &PlayerSnapshot) -> i64 {
        match host.score(&self.objective, &player.id) {
            Ok(value) => value,
            Err(HostError::NoScore { .. }) => {
                if let Err(e) = host.set_score(&self.objective, &player.id, 0) {
                    warn!("Failed to initialize balance for {}: {}", player.name, e);
                }
                0
            }
            Err(e) => {
                debug!("Balance read for {} failed ({}); treating as 0", player.name, e);
                0
            }
        }
    }

    /// Apply `delta` (may be negative, unchecked) and play the feedback cue.
    /// Returns the new balance.
    pub fn add(
        &self,
        host: &mut dyn Host,
        player: &PlayerSnapshot,
        delta: i64,
    ) -> Result<i64, RulesError> {
        let updated = host.add_score(&self.objective, &player.id, delta)?;
        host.play_sound(&player.id, &self.cue, player.location);
        if delta > 0 {
            metrics::add_currency_granted(delta as u64);
        }
        debug!("Balance of {} changed by {} to {}", player.name, delta, updated);
        Ok(updated)
    }

    /// Fail with [`RulesError::InsufficientFunds`] unless the balance covers `amount`.
    pub fn ensure_funds(
        &self,
        host: &mut dyn Host,
        player: &PlayerSnapshot,
        amount: i64,
    ) -> Result<i64, RulesError> {
        let balance = self.balance(host, player);
        if balance < amount {
            return Err(RulesError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }
        Ok(balance)
    }
}
