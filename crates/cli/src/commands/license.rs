//! `license` subcommands.

use std::sync::Arc;

use ship_restrict_engine::license::{CallBudget, LicenseClient, LicenseManager};
use ship_restrict_engine::store::{JsonStore, SettingsStore};
use ship_restrict_engine::{Clock, EngineConfig, SystemClock};

/// Build the production license manager over the JSON store.
pub fn manager(
    store: &Arc<JsonStore>,
) -> Result<LicenseManager<LicenseClient>, Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let clock = Arc::new(SystemClock) as Arc<dyn Clock>;
    let settings = Arc::clone(store) as Arc<dyn SettingsStore>;

    let client = LicenseClient::new(
        &config,
        Arc::clone(&settings),
        CallBudget::new(Arc::clone(&clock)),
    )?;
    Ok(LicenseManager::new(settings, clock, client))
}

pub async fn status(store: &Arc<JsonStore>) -> Result<(), Box<dyn std::error::Error>> {
    let manager = manager(store)?;
    // Revalidates when the cached check is older than the cache window.
    manager.ensure_fresh().await?;

    let state = manager.current()?;
    if state.key.is_empty() {
        println!("No license key configured.");
        return Ok(());
    }
    println!("Key:          {}", mask(&state.key));
    println!("Active:       {}", if state.valid { "yes" } else { "no" });
    match state.last_checked_at {
        Some(checked) => println!("Last checked: {checked}"),
        None => println!("Last checked: never"),
    }
    if !state.error.is_empty() {
        println!("Error:        {}", state.error);
    }
    Ok(())
}

pub async fn save(store: &Arc<JsonStore>, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = manager(store)?.save_key(key).await?;
    if state.key.is_empty() {
        println!("License key cleared.");
    } else if state.valid {
        println!("License saved and active.");
    } else {
        println!("License saved but not active: {}", state.error);
    }
    Ok(())
}

fn mask(key: &str) -> String {
    if key.len() <= 4 {
        "****".to_string()
    } else {
        let visible: String = key.chars().rev().take(4).collect();
        let visible: String = visible.chars().rev().collect();
        format!("****{visible}")
    }
}
