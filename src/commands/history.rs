use crate::{HistoryStore, Result};

/// Handle the history command: list recent queries, newest first.
pub fn handle_history_command(limit: usize) -> Result<()> {
    let history = HistoryStore::load();
    if history.is_empty() {
        println!("📭 No analyses recorded yet");
        return Ok(());
    }

    println!("🕘 Recent analyses (newest first):");
    for (index, entry) in history.iter().take(limit).enumerate() {
        println!(
            "{:>3}. {} ({})",
            index + 1,
            entry.artist_name,
            entry.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
    }

    if history.len() > limit {
        println!("   ({} more not shown)", history.len() - limit);
    }
    Ok(())
}

/// Handle the clear-history command.
pub fn handle_clear_history_command() -> Result<()> {
    HistoryStore::clear()?;
    println!("🧹 Query history cleared");
    Ok(())
}
