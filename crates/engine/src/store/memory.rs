//! In-memory store used by tests and fixtures.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use ship_restrict_core::{ProductId, TargetKind, Term, TermId, VariationId};

use crate::settings::SettingsRecord;

use super::{Catalog, MetaField, MetaOwner, MetadataStore, SettingsStore, StoreError, StoredList};

#[derive(Debug, Default)]
struct Inner {
    settings: Option<SettingsRecord>,
    device_id: Option<Uuid>,
    metadata: HashMap<(MetaOwner, &'static str), StoredList>,
    terms: HashMap<TermId, Term>,
    product_terms: HashMap<ProductId, Vec<TermId>>,
    product_names: HashMap<ProductId, String>,
    variation_parents: HashMap<VariationId, ProductId>,
}

/// All three storage gateways backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_inner<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        f(&self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn write_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        f(&mut self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    // Fixture helpers ---------------------------------------------------

    /// Register a product with a display name.
    pub fn insert_product(&self, id: ProductId, name: &str) {
        self.write_inner(|inner| {
            inner.product_names.insert(id, name.to_string());
        });
    }

    /// Register a variation under its owning product.
    pub fn insert_variation(&self, id: VariationId, parent: ProductId) {
        self.write_inner(|inner| {
            inner.variation_parents.insert(id, parent);
        });
    }

    /// Register a taxonomy term.
    pub fn insert_term(&self, id: TermId, name: &str, kind: TargetKind) {
        self.write_inner(|inner| {
            inner.terms.insert(
                id,
                Term {
                    id,
                    name: name.to_string(),
                    kind,
                },
            );
        });
    }

    /// Remove a term, simulating taxonomy deletion after rules were made.
    pub fn remove_term(&self, id: TermId) {
        self.write_inner(|inner| {
            inner.terms.remove(&id);
        });
    }

    /// Attach terms to a product.
    pub fn set_product_terms(&self, product_id: ProductId, term_ids: &[TermId]) {
        self.write_inner(|inner| {
            inner.product_terms.insert(product_id, term_ids.to_vec());
        });
    }

    /// Seed a metadata field in an arbitrary stored shape (used to set up
    /// legacy comma-joined values).
    pub fn seed_metadata(&self, owner: MetaOwner, field: MetaField, value: StoredList) {
        self.write_inner(|inner| {
            inner.metadata.insert((owner, field.key()), value);
        });
    }

    /// Raw stored value for a metadata field, for asserting migrations.
    #[must_use]
    pub fn raw_metadata(&self, owner: MetaOwner, field: MetaField) -> Option<StoredList> {
        self.read_inner(|inner| inner.metadata.get(&(owner, field.key())).cloned())
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<SettingsRecord, StoreError> {
        Ok(self.read_inner(|inner| inner.settings.clone().unwrap_or_default()))
    }

    fn save(&self, record: &SettingsRecord) -> Result<(), StoreError> {
        self.write_inner(|inner| inner.settings = Some(record.clone()));
        Ok(())
    }

    fn device_id(&self) -> Result<Option<Uuid>, StoreError> {
        Ok(self.read_inner(|inner| inner.device_id))
    }

    fn set_device_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.write_inner(|inner| inner.device_id = Some(id));
        Ok(())
    }
}

impl MetadataStore for MemoryStore {
    fn read(&self, owner: MetaOwner, field: MetaField) -> Result<Option<StoredList>, StoreError> {
        Ok(self.read_inner(|inner| inner.metadata.get(&(owner, field.key())).cloned()))
    }

    fn write(
        &self,
        owner: MetaOwner,
        field: MetaField,
        items: &[String],
    ) -> Result<(), StoreError> {
        self.write_inner(|inner| {
            if items.is_empty() {
                inner.metadata.remove(&(owner, field.key()));
            } else {
                inner
                    .metadata
                    .insert((owner, field.key()), StoredList::Items(items.to_vec()));
            }
        });
        Ok(())
    }

    fn count_restricted_products(&self) -> Result<usize, StoreError> {
        Ok(self.read_inner(|inner| {
            let mut products: Vec<ProductId> = inner
                .metadata
                .keys()
                .map(|(owner, _)| match owner {
                    MetaOwner::Product(id) => *id,
                    MetaOwner::Variation(id) => inner
                        .variation_parents
                        .get(id)
                        .copied()
                        .unwrap_or_else(|| ProductId::new(id.as_i64())),
                })
                .collect();
            products.sort_unstable();
            products.dedup();
            products.len()
        }))
    }
}

impl Catalog for MemoryStore {
    fn resolve_term(&self, term_id: TermId) -> Result<Option<Term>, StoreError> {
        Ok(self.read_inner(|inner| inner.terms.get(&term_id).cloned()))
    }

    fn product_terms(
        &self,
        product_id: ProductId,
        kind: TargetKind,
    ) -> Result<Vec<TermId>, StoreError> {
        Ok(self.read_inner(|inner| {
            inner
                .product_terms
                .get(&product_id)
                .map(|ids| {
                    ids.iter()
                        .filter(|id| {
                            inner.terms.get(id).is_some_and(|term| term.kind == kind)
                        })
                        .copied()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    fn product_name(&self, product_id: ProductId) -> Result<Option<String>, StoreError> {
        Ok(self.read_inner(|inner| inner.product_names.get(&product_id).cloned()))
    }
}
