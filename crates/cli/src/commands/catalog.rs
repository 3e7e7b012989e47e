//! `catalog` subcommands for seeding fixture data.

use std::sync::Arc;

use ship_restrict_core::{ProductId, TargetKind, Term, TermId, VariationId};
use ship_restrict_engine::store::JsonStore;

pub fn add_term(
    store: &Arc<JsonStore>,
    id: i64,
    name: &str,
    kind: TargetKind,
) -> Result<(), Box<dyn std::error::Error>> {
    store.upsert_term(Term {
        id: TermId::new(id),
        name: name.to_string(),
        kind,
    })?;
    println!("{} {name} saved as term {id}.", kind.label());
    Ok(())
}

pub fn add_product(
    store: &Arc<JsonStore>,
    id: i64,
    name: &str,
    terms: &[i64],
    variations: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let terms: Vec<TermId> = terms.iter().map(|term| TermId::new(*term)).collect();
    let variations: Vec<VariationId> = variations
        .iter()
        .map(|variation| VariationId::new(*variation))
        .collect();
    store.upsert_product(ProductId::new(id), name, &terms, &variations)?;
    println!("Product {name} saved as {id}.");
    Ok(())
}
