//! `message` subcommands.

use std::sync::Arc;

use ship_restrict_engine::settings::DEFAULT_MESSAGE_TEMPLATE;
use ship_restrict_engine::store::{JsonStore, SettingsStore};

pub fn set(store: &Arc<JsonStore>, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut record = store.load()?;
    record.message = text.to_string();
    record.sanitize();
    store.save(&record)?;

    if record.message.is_empty() {
        println!("Message cleared; using the default:");
        println!("  {DEFAULT_MESSAGE_TEMPLATE}");
    } else {
        println!("Message saved:");
        println!("  {}", record.message);
    }
    Ok(())
}
