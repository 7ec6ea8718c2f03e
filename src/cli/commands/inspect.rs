//! inspect command - Show what the bridge resolves from a snapshot

use std::path::Path;

use anyhow::Result;

use super::open_bridge;
use crate::core::config::Credentials;
use crate::export::transform::{game_info, normalize};
use crate::harvest::Harvester;

/// Print the module verdict and a harvest summary.
pub fn inspect(snapshot: &Path) -> Result<()> {
    let bridge = open_bridge(snapshot)?;
    let handle = bridge.handle();

    println!(
        "Module:   {} {}",
        handle.module_name(),
        handle.module_version().as_deref().unwrap_or("(no version)")
    );
    println!("Verdict:  {}", bridge.verdict());
    println!(
        "Optional: kill log {}, winning faction {}",
        present(handle.killed_players().is_some()),
        present(handle.winning_faction().is_some())
    );

    let harvested = Harvester::new(&bridge).harvest();
    let session = &harvested.session;
    println!(
        "Match:    lobby {} / {} / map {} / {:.0}s",
        session.lobby_code, session.game_mode, session.map_id, session.duration_secs
    );

    if harvested.roster.is_empty() {
        println!("No roster found.");
        return Ok(());
    }

    let record = normalize(&harvested, game_info(session), &Credentials::default());
    println!();
    for p in &record.players {
        let mods = if p.modifiers.is_empty() {
            String::new()
        } else {
            format!(" ({})", p.modifiers.join(", "))
        };
        println!(
            "{:>3}  {:<16} {}{}  kills {}{}",
            p.player_id,
            p.player_name,
            p.role,
            mods,
            p.stats.kills,
            if p.is_winner { "  [winner]" } else { "" }
        );
    }
    println!();
    println!("Winning team: {}", record.game_result.winning_team);

    Ok(())
}

fn present(found: bool) -> &'static str {
    if found {
        "found"
    } else {
        "missing"
    }
}
