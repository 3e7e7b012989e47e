//! Single-document JSON store backing the CLI.
//!
//! The whole installation lives in one JSON file: settings record, device
//! identifier, catalog fixtures, and per-entity metadata. Every mutation
//! rewrites the file, mirroring the host platform's read-modify-write
//! option semantics.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ship_restrict_core::{ProductId, TargetKind, Term, TermId, VariationId};

use crate::settings::SettingsRecord;

use super::{Catalog, MetaField, MetaOwner, MetadataStore, SettingsStore, StoreError, StoredList};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDoc {
    id: ProductId,
    name: String,
    #[serde(default)]
    terms: Vec<TermId>,
    #[serde(default)]
    variations: Vec<VariationId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetaEntry {
    owner: MetaOwner,
    field: String,
    value: StoredList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    settings: SettingsRecord,
    #[serde(default)]
    device_id: Option<Uuid>,
    #[serde(default)]
    terms: Vec<Term>,
    #[serde(default)]
    products: Vec<ProductDoc>,
    #[serde(default)]
    metadata: Vec<MetaEntry>,
}

/// File-backed implementation of all three storage gateways.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonStore {
    /// Open a store at `path`, reading the existing document or starting
    /// from an empty one if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            Document::default()
        };
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    fn with_document<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> T) -> Result<T, StoreError> {
        let mut document = self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let result = f(&mut document);
        let json = serde_json::to_string_pretty(&*document)?;
        std::fs::write(&self.path, json)?;
        Ok(result)
    }

    /// Insert or replace a taxonomy term.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn upsert_term(&self, term: Term) -> Result<(), StoreError> {
        self.mutate(|document| {
            document.terms.retain(|existing| existing.id != term.id);
            document.terms.push(term);
        })
    }

    /// Insert or replace a product with its attached terms and variations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn upsert_product(
        &self,
        id: ProductId,
        name: &str,
        terms: &[TermId],
        variations: &[VariationId],
    ) -> Result<(), StoreError> {
        self.mutate(|document| {
            document.products.retain(|existing| existing.id != id);
            document.products.push(ProductDoc {
                id,
                name: name.to_string(),
                terms: terms.to_vec(),
                variations: variations.to_vec(),
            });
        })
    }

    fn owner_product(document: &Document, owner: MetaOwner) -> Option<ProductId> {
        match owner {
            MetaOwner::Product(id) => Some(id),
            MetaOwner::Variation(variation) => document
                .products
                .iter()
                .find(|product| product.variations.contains(&variation))
                .map(|product| product.id),
        }
    }
}

impl SettingsStore for JsonStore {
    fn load(&self) -> Result<SettingsRecord, StoreError> {
        Ok(self.with_document(|document| document.settings.clone()))
    }

    fn save(&self, record: &SettingsRecord) -> Result<(), StoreError> {
        self.mutate(|document| document.settings = record.clone())
    }

    fn device_id(&self) -> Result<Option<Uuid>, StoreError> {
        Ok(self.with_document(|document| document.device_id))
    }

    fn set_device_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.mutate(|document| document.device_id = Some(id))
    }
}

impl MetadataStore for JsonStore {
    fn read(&self, owner: MetaOwner, field: MetaField) -> Result<Option<StoredList>, StoreError> {
        Ok(self.with_document(|document| {
            document
                .metadata
                .iter()
                .find(|entry| entry.owner == owner && entry.field == field.key())
                .map(|entry| entry.value.clone())
        }))
    }

    fn write(
        &self,
        owner: MetaOwner,
        field: MetaField,
        items: &[String],
    ) -> Result<(), StoreError> {
        self.mutate(|document| {
            document
                .metadata
                .retain(|entry| !(entry.owner == owner && entry.field == field.key()));
            if !items.is_empty() {
                document.metadata.push(MetaEntry {
                    owner,
                    field: field.key().to_string(),
                    value: StoredList::Items(items.to_vec()),
                });
            }
        })
    }

    fn count_restricted_products(&self) -> Result<usize, StoreError> {
        Ok(self.with_document(|document| {
            let mut products: Vec<ProductId> = document
                .metadata
                .iter()
                .filter_map(|entry| Self::owner_product(document, entry.owner))
                .collect();
            products.sort_unstable();
            products.dedup();
            products.len()
        }))
    }
}

impl Catalog for JsonStore {
    fn resolve_term(&self, term_id: TermId) -> Result<Option<Term>, StoreError> {
        Ok(self.with_document(|document| {
            document.terms.iter().find(|term| term.id == term_id).cloned()
        }))
    }

    fn product_terms(
        &self,
        product_id: ProductId,
        kind: TargetKind,
    ) -> Result<Vec<TermId>, StoreError> {
        Ok(self.with_document(|document| {
            document
                .products
                .iter()
                .find(|product| product.id == product_id)
                .map(|product| {
                    product
                        .terms
                        .iter()
                        .filter(|id| {
                            document
                                .terms
                                .iter()
                                .any(|term| term.id == **id && term.kind == kind)
                        })
                        .copied()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    fn product_name(&self, product_id: ProductId) -> Result<Option<String>, StoreError> {
        Ok(self.with_document(|document| {
            document
                .products
                .iter()
                .find(|product| product.id == product_id)
                .map(|product| product.name.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ship-restrict-{name}-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn settings_survive_reopen() {
        let path = temp_path("settings");
        {
            let store = JsonStore::open(&path).expect("open");
            let record = SettingsRecord {
                message: "Custom {product} message".to_string(),
                ..SettingsRecord::default()
            };
            store.save(&record).expect("save");
        }
        let reopened = JsonStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.load().expect("load").message,
            "Custom {product} message"
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_starts_empty_and_device_id_persists() {
        let path = temp_path("device");
        let store = JsonStore::open(&path).expect("open");
        assert_eq!(store.device_id().expect("read"), None);

        let id = Uuid::new_v4();
        store.set_device_id(id).expect("write");
        assert_eq!(store.device_id().expect("read"), Some(id));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn metadata_round_trips_through_the_file() {
        let path = temp_path("meta");
        let store = JsonStore::open(&path).expect("open");
        let owner = MetaOwner::Product(ProductId::new(5));
        store
            .write(owner, MetaField::ZipCodes, &["90210".to_string()])
            .expect("write");

        let reopened = JsonStore::open(&path).expect("reopen");
        let value = reopened
            .read(owner, MetaField::ZipCodes)
            .expect("read")
            .expect("present");
        assert_eq!(value.into_items(), vec!["90210"]);
        assert_eq!(reopened.count_restricted_products().expect("count"), 1);
        std::fs::remove_file(&path).ok();
    }
}
