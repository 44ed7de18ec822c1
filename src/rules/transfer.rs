//! Player-to-player transfers requested by holding a renamed marker item.
//!
//! A giver holds the configured marker (a stick by default) renamed to
//! `send<amount>G` in the selected hotbar slot. Every poll the first other
//! player within range receives the amount and the giver is debited. The
//! request stays active as long as the item is held, so one transfer happens
//! per poll until the giver runs out of funds or puts the item away.

use log::{debug, info, warn};

use crate::config::TransferConfig;
use crate::host::{Host, PlayerId, PlayerSnapshot};
use crate::logutil::escape_log;
use crate::metrics;
use crate::rules::errors::RulesError;
use crate::rules::ledger::Ledger;

const REQUEST_PREFIX: &str = "send";
const REQUEST_SUFFIX: char = 'G';

/// Result of one giver's request in a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed {
        giver: PlayerId,
        receiver: PlayerId,
        amount: i64,
    },
    /// Giver could not cover the amount; only the giver is told.
    Rejected {
        giver: PlayerId,
        amount: i64,
        balance: i64,
    },
    /// Nobody stood within range.
    NoRecipient { giver: PlayerId, amount: i64 },
}

/// Parse a `send<amount>G` display name. Returns `None` unless the amount is
/// a positive integer made only of ASCII digits.
pub fn parse_transfer_request(name: &str) -> Option<i64> {
    let digits = name
        .strip_prefix(REQUEST_PREFIX)?
        .strip_suffix(REQUEST_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: i64 = digits.parse().ok()?;
    (amount > 0).then_some(amount)
}

/// Amount requested by the item the player is holding, if it is a valid request.
pub fn pending_request(player: &PlayerSnapshot, config: &TransferConfig) -> Option<i64> {
    let item = player.held_item()?;
    if item.type_id != config.marker_item {
        return None;
    }
    let name = item.custom_name.as_deref()?;
    let amount = parse_transfer_request(name);
    if amount.is_none() {
        debug!(
            "Ignoring marker held by {} with name '{}'",
            player.name,
            escape_log(name)
        );
    }
    amount
}

/// Process every pending transfer request once.
pub fn run_transfers(
    host: &mut dyn Host,
    ledger: &Ledger,
    config: &TransferConfig,
) -> Vec<TransferOutcome> {
    let mut outcomes = Vec::new();
    let givers = host.players();

    for giver in &givers {
        let Some(amount) = pending_request(giver, config) else {
            continue;
        };

        match ledger.ensure_funds(host, giver, amount) {
            Ok(_) => {}
            Err(RulesError::InsufficientFunds { balance, .. }) => {
                host.send_message(&giver.id, "§cInsufficient funds!");
                metrics::inc_transfer_rejected();
                outcomes.push(TransferOutcome::Rejected {
                    giver: giver.id.clone(),
                    amount,
                    balance,
                });
                continue;
            }
            Err(e) => {
                warn!("Funds check for {} failed: {}", giver.name, e);
                continue;
            }
        }

        let candidates = host.players();
        let receiver = candidates.iter().find(|r| {
            r.id != giver.id && giver.location.distance(&r.location) <= config.range
        });

        let Some(receiver) = receiver else {
            if config.notify_no_recipient {
                host.send_message(
                    &giver.id,
                    "§7No player is close enough to receive the transfer.",
                );
            }
            outcomes.push(TransferOutcome::NoRecipient {
                giver: giver.id.clone(),
                amount,
            });
            continue;
        };

        match move_funds(host, ledger, giver, receiver, amount) {
            Ok(()) => {
                host.send_message(
                    &giver.id,
                    &format!("§6Sent {} to {}!", ledger.format_amount(amount), receiver.name),
                );
                host.send_message(
                    &receiver.id,
                    &format!("§aReceived {} from {}!", ledger.format_amount(amount), giver.name),
                );
                metrics::inc_transfer_completed();
                info!("Transfer of {} from {} to {}", amount, giver.name, receiver.name);
                outcomes.push(TransferOutcome::Completed {
                    giver: giver.id.clone(),
                    receiver: receiver.id.clone(),
                    amount,
                });
            }
            Err(e) => warn!(
                "Transfer of {} from {} to {} failed: {}",
                amount, giver.name, receiver.name, e
            ),
        }
    }

    outcomes
}

/// Credit the receiver then debit the giver. A failed debit reverts the credit.
fn move_funds(
    host: &mut dyn Host,
    ledger: &Ledger,
    giver: &PlayerSnapshot,
    receiver: &PlayerSnapshot,
    amount: i64,
) -> Result<(), RulesError> {
    ledger.add(host, receiver, amount)?;
    if let Err(e) = ledger.add(host, giver, -amount) {
        if let Err(revert) = host.add_score(ledger.objective(), &receiver.id, -amount) {
            warn!("Could not revert credit to {}: {}", receiver.name, revert);
        }
        return Err(e);
    }
    Ok(())
}
