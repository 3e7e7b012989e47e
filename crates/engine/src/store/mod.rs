//! Gateways to the host platform's storage.
//!
//! The host is treated as a key-value store and event source: one settings
//! record per installation, three metadata fields per product/variation,
//! and a taxonomy catalog. The traits here are the seam the engine is
//! tested through; [`MemoryStore`] backs tests and fixtures, [`JsonStore`]
//! backs the CLI.

mod json_file;
mod memory;

pub use json_file::JsonStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use ship_restrict_core::{ProductId, TargetKind, Term, TermId, VariationId};

use crate::settings::SettingsRecord;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// The entity owning a piece of restriction metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaOwner {
    Product(ProductId),
    Variation(VariationId),
}

/// The three independently-keyed restriction fields per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    States,
    Cities,
    ZipCodes,
}

impl MetaField {
    /// Storage key, matching the host platform's metadata naming.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::States => "_restricted_states",
            Self::Cities => "_restricted_cities",
            Self::ZipCodes => "_restricted_zip_codes",
        }
    }
}

/// A stored list value that may still be in its legacy shape.
///
/// Old records stored these fields as one comma-joined string; new records
/// store a structured list. The union is resolved once at the storage
/// boundary instead of with type checks scattered through evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredList {
    Items(Vec<String>),
    Joined(String),
}

impl StoredList {
    /// Whether this value is in the legacy comma-joined shape and should
    /// be migrated on next read.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Joined(_))
    }

    /// Normalize into a trimmed, non-empty item list.
    #[must_use]
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Items(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            Self::Joined(joined) => joined
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Persisted settings gateway.
///
/// `load` defaults to an empty record when nothing is stored yet. The
/// device identifier lives beside the record and is generated once per
/// installation.
pub trait SettingsStore: Send + Sync {
    /// Read the whole settings record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or decoded.
    fn load(&self) -> Result<SettingsRecord, StoreError>;

    /// Write the whole settings record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, record: &SettingsRecord) -> Result<(), StoreError>;

    /// The persisted per-installation device identifier, if generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn device_id(&self) -> Result<Option<Uuid>, StoreError>;

    /// Persist the per-installation device identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_device_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Per-entity restriction metadata gateway.
pub trait MetadataStore: Send + Sync {
    /// Read one metadata field, in whatever shape it was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, owner: MetaOwner, field: MetaField) -> Result<Option<StoredList>, StoreError>;

    /// Write one metadata field in structured form. An empty list clears
    /// the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, owner: MetaOwner, field: MetaField, items: &[String])
    -> Result<(), StoreError>;

    /// How many products currently carry any item-level restriction.
    /// Variations count toward their owning product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn count_restricted_products(&self) -> Result<usize, StoreError>;
}

/// Catalog gateway: taxonomy terms and product display data.
pub trait Catalog: Send + Sync {
    /// Resolve a term to its name and kind, or `None` if it no longer
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn resolve_term(&self, term_id: TermId) -> Result<Option<Term>, StoreError>;

    /// The term ids of the given kind attached to a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn product_terms(&self, product_id: ProductId, kind: TargetKind)
    -> Result<Vec<TermId>, StoreError>;

    /// A product's display name, or `None` for an unknown product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn product_name(&self, product_id: ProductId) -> Result<Option<String>, StoreError>;
}
