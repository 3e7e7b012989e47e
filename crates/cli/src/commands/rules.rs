//! `rules` subcommands.

use std::sync::Arc;

use ship_restrict_core::{RestrictionSpec, RuleId, RuleLogic, TermId};
use ship_restrict_engine::rules::{NewRule, RuleError};
use ship_restrict_engine::store::{Catalog, JsonStore, SettingsStore};
use ship_restrict_engine::RuleStore;

fn rule_store(store: &Arc<JsonStore>) -> RuleStore {
    RuleStore::new(
        Arc::clone(store) as Arc<dyn SettingsStore>,
        Arc::clone(store) as Arc<dyn Catalog>,
    )
}

fn summarize(spec: &RestrictionSpec) -> String {
    let mut parts = Vec::new();
    if !spec.states.is_empty() {
        parts.push(format!(
            "states: {}",
            spec.states.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    if !spec.state_cities.is_empty() {
        let pairs: Vec<String> = spec
            .state_cities
            .iter()
            .map(|pair| format!("{}, {}", pair.city, pair.state))
            .collect();
        parts.push(format!("cities: {}", pairs.join("; ")));
    }
    if !spec.cities.is_empty() {
        parts.push(format!(
            "cities: {}",
            spec.cities.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    if !spec.zip_codes.is_empty() {
        parts.push(format!(
            "zips: {}",
            spec.zip_codes.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    if parts.is_empty() {
        "no locations".to_string()
    } else {
        parts.join(" | ")
    }
}

pub async fn list(store: &Arc<JsonStore>) -> Result<(), Box<dyn std::error::Error>> {
    // Settings access revalidates a stale license before capacity is shown.
    super::license::manager(store)?.ensure_fresh().await?;

    let views = rule_store(store).rules_for_display()?;
    if views.is_empty() {
        println!("No rules configured.");
        return Ok(());
    }
    for view in views {
        println!(
            "{}  {}  [{} / {}]  {}",
            view.rule.id,
            view.rule.name,
            view.rule.logic.label(),
            view.target_name,
            summarize(&view.rule.spec)
        );
    }
    Ok(())
}

pub async fn add(
    store: &Arc<JsonStore>,
    name: &str,
    term_id: TermId,
    logic: RuleLogic,
    states: Vec<String>,
    zips: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // A stale license is rechecked so the ceiling reflects reality.
    super::license::manager(store)?.ensure_fresh().await?;

    let zip_codes = zips
        .split(',')
        .map(|zip| zip.trim().to_string())
        .filter(|zip| !zip.is_empty())
        .collect();

    let result = rule_store(store).add_rule(NewRule {
        name: name.to_string(),
        term_id,
        logic,
        spec: RestrictionSpec {
            states: states.into_iter().collect(),
            zip_codes,
            ..RestrictionSpec::default()
        },
    });

    match result {
        Ok(rule) => {
            println!("Rule added successfully. ({})", rule.id);
            Ok(())
        }
        Err(RuleError::Store(error)) => Err(error.into()),
        Err(error) => {
            println!("{error}");
            Ok(())
        }
    }
}

pub fn delete(store: &Arc<JsonStore>, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: RuleId = id.parse()?;
    match rule_store(store).delete_rule(id) {
        Ok(rule) => {
            println!("Rule deleted successfully. ({})", rule.name);
            Ok(())
        }
        Err(RuleError::Store(error)) => Err(error.into()),
        Err(error) => {
            println!("{error}");
            Ok(())
        }
    }
}
