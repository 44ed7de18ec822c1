/// Balance overlay shown on every player's action bar
use crate::host::Host;
use crate::rules::ledger::Ledger;

/// Overwrite each connected player's action bar with their current balance.
/// Returns the number of players updated.
pub fn refresh_balances(host: &mut dyn Host, ledger: &Ledger) -> usize {
    let players = host.players();
    for player in &players {
        let balance = ledger.balance(host, player);
        let text = format!("§6Balance: {}", ledger.format_amount(balance));
        host.set_action_bar(&player.id, &text);
    }
    players.len()
}
