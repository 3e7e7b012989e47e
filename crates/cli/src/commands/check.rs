//! `check` subcommand: evaluate a cart against an address.

use std::sync::Arc;

use ship_restrict_core::{CartItem, ProductId, ShippingAddress, VariationId};
use ship_restrict_engine::store::{Catalog, JsonStore, MetadataStore, SettingsStore};
use ship_restrict_engine::{CheckoutHooks, Evaluator};

fn parse_line(raw: &str) -> Result<CartItem, Box<dyn std::error::Error>> {
    match raw.split_once(':') {
        Some((product, variation)) => Ok(CartItem::variation(
            ProductId::new(product.trim().parse()?),
            VariationId::new(variation.trim().parse()?),
        )),
        None => Ok(CartItem::product(ProductId::new(raw.trim().parse()?))),
    }
}

pub fn run(
    store: &Arc<JsonStore>,
    state: &str,
    city: &str,
    zip: &str,
    products: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let cart: Vec<CartItem> = products
        .iter()
        .map(|raw| parse_line(raw))
        .collect::<Result<_, _>>()?;
    let address = ShippingAddress::us(state, city, zip);

    let hooks = CheckoutHooks::new(Evaluator::new(
        Arc::clone(store) as Arc<dyn SettingsStore>,
        Arc::clone(store) as Arc<dyn MetadataStore>,
        Arc::clone(store) as Arc<dyn Catalog>,
    ));

    let errors = hooks.collect_validation_errors(&cart, &address);
    if errors.is_empty() {
        println!("All items can ship to this address.");
        return Ok(());
    }
    for line in errors {
        println!("{line}");
    }
    Ok(())
}
