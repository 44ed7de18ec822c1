//! Gameplay rules layered on the host: a currency ledger, player transfers,
//! first-of-type item rewards, item-variety milestones and one-time
//! inventory achievements, all driven by a tick scheduler.

pub mod achievement;
pub mod discovery;
pub mod display;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod scheduler;
pub mod transfer;

pub use achievement::{
    default_catalogue, evaluate_player, evaluate_rule, is_complete, AchievementRule,
    Requirement, RuleOutcome, MONSTER_DROPS,
};
pub use discovery::{check_milestones, milestone_tag, reward_new_items, ObtainedItems};
pub use display::refresh_balances;
pub use engine::{RuleEngine, TickReport};
pub use errors::RulesError;
pub use ledger::Ledger;
pub use scheduler::{Job, Scheduler};
pub use transfer::{parse_transfer_request, pending_request, run_transfers, TransferOutcome};
