use anyhow::Result;

use crate::cache::CacheManager;
use crate::ui::Style;

pub fn run_clear_cache() -> Result<()> {
    let removed = CacheManager::new()?.clear()?;
    println!(
        "{} Removed {} cached {}",
        Style::success("✓"),
        Style::value(removed),
        if removed == 1 { "reply" } else { "replies" }
    );
    Ok(())
}
