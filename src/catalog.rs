//! Hand-off of parsed records to whatever stores the catalog.

use crate::model::{Material, ProductInput};
use crate::normalize::slugify;
use crate::{CatalogImportError, CatalogResult};
use std::collections::HashSet;
use tracing::{error, info};

/// A parsed record with the identifier it will be stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub id: String,
    pub product: ProductInput,
}

/// Hands out `material-slug` ids, suffixing `-1`, `-2`, ... on collisions.
#[derive(Debug, Default)]
pub struct ProductIdAllocator {
    taken: HashSet<String>,
}

impl ProductIdAllocator {
    pub fn new<I: IntoIterator<Item = String>>(existing: I) -> Self {
        Self {
            taken: existing.into_iter().collect(),
        }
    }

    pub fn allocate(&mut self, name: &str, material: Material) -> String {
        let slug = slugify(name);
        let slug = if slug.is_empty() { "pieza" } else { slug.as_str() };
        let base = format!("{material}-{slug}");
        let mut candidate = base.clone();
        let mut suffix = 1u32;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Storage collaborator for imported products.
pub trait CatalogStore {
    /// Ids already in use.
    fn existing_ids(&self) -> Vec<String>;

    /// Insert the whole batch or nothing. Returns how many rows were stored.
    fn insert_batch(&mut self, batch: &[NewProduct]) -> CatalogResult<usize>;
}

/// In-memory store; rejects a batch that reuses an id.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: Vec<NewProduct>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[NewProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogStore for MemoryCatalog {
    fn existing_ids(&self) -> Vec<String> {
        self.products.iter().map(|p| p.id.clone()).collect()
    }

    fn insert_batch(&mut self, batch: &[NewProduct]) -> CatalogResult<usize> {
        let mut seen: HashSet<&str> = self.products.iter().map(|p| p.id.as_str()).collect();
        for entry in batch {
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogImportError::Rejected(format!(
                    "duplicate id {}",
                    entry.id
                )));
            }
        }
        self.products.extend_from_slice(batch);
        Ok(batch.len())
    }
}

/// What the admin UI is told after an import attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportNotice {
    /// Records were stored.
    Queued { count: usize },
    /// The file had nothing importable.
    NoValidRows,
    /// The store refused the batch; nothing was kept.
    InsertFailed { reason: String },
}

/// Assign ids and hand the records to `store` in one batch. No retries.
pub fn submit_import<S: CatalogStore + ?Sized>(
    records: Vec<ProductInput>,
    store: &mut S,
) -> ImportNotice {
    if records.is_empty() {
        info!("import found no valid rows");
        return ImportNotice::NoValidRows;
    }
    let mut ids = ProductIdAllocator::new(store.existing_ids());
    let batch: Vec<NewProduct> = records
        .into_iter()
        .map(|product| NewProduct {
            id: ids.allocate(&product.name, product.material),
            product,
        })
        .collect();
    match store.insert_batch(&batch) {
        Ok(count) => {
            info!(count, "imported products");
            ImportNotice::Queued { count }
        }
        Err(e) => {
            error!(error = %e, rows = batch.len(), "catalog import failed");
            ImportNotice::InsertFailed {
                reason: e.to_string(),
            }
        }
    }
}
