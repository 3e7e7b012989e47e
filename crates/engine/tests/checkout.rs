//! Checkout hook behavior over the in-memory store.

use std::sync::Arc;

use ship_restrict_core::{CartItem, ProductId, ShippingAddress};
use ship_restrict_engine::hooks::CART_ERRORS_HEADER;
use ship_restrict_engine::store::{
    Catalog, MemoryStore, MetaField, MetaOwner, MetadataStore, SettingsStore,
};
use ship_restrict_engine::{CheckoutHooks, Evaluator};

fn hooks(store: &Arc<MemoryStore>) -> CheckoutHooks {
    CheckoutHooks::new(Evaluator::new(
        Arc::clone(store) as Arc<dyn SettingsStore>,
        Arc::clone(store) as Arc<dyn MetadataStore>,
        Arc::clone(store) as Arc<dyn Catalog>,
    ))
}

fn restrict_in_ca(store: &MemoryStore, id: i64, name: &str) -> CartItem {
    let product = ProductId::new(id);
    store.insert_product(product, name);
    store
        .write(
            MetaOwner::Product(product),
            MetaField::States,
            &["CA".to_string()],
        )
        .expect("write");
    CartItem::product(product)
}

#[test]
fn clean_cart_produces_no_errors() {
    let store = Arc::new(MemoryStore::new());
    let product = ProductId::new(1);
    store.insert_product(product, "Widget");
    let hooks = hooks(&store);

    let errors = hooks.collect_validation_errors(
        &[CartItem::product(product)],
        &ShippingAddress::us("CA", "", ""),
    );
    assert!(errors.is_empty());
}

#[test]
fn restricted_items_produce_a_header_and_one_line_each() {
    let store = Arc::new(MemoryStore::new());
    let first = restrict_in_ca(&store, 1, "Widget");
    let second = restrict_in_ca(&store, 2, "Gadget");
    let hooks = hooks(&store);

    let errors =
        hooks.collect_validation_errors(&[first, second], &ShippingAddress::us("CA", "", ""));
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0], CART_ERRORS_HEADER);
    assert!(errors[1].contains("Widget"));
    assert!(errors[2].contains("Gadget"));
}

#[test]
fn cart_change_notices_match_the_blocking_errors() {
    let store = Arc::new(MemoryStore::new());
    let item = restrict_in_ca(&store, 1, "Widget");
    let hooks = hooks(&store);
    let address = ShippingAddress::us("CA", "", "");

    assert_eq!(
        hooks.cart_items_changed(&[item], &address),
        hooks.collect_validation_errors(&[item], &address)
    );
}
