use crate::CatalogImportError;
use crc32fast::Hasher as Crc32;
use std::fmt;
use std::str::FromStr;

/// Category assigned when a row has no category value.
pub const DEFAULT_CATEGORY: &str = "Sin categoría";

/// Which side of the catalog a product belongs to (gold or silver theme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Material {
    #[default]
    Gold,
    Silver,
}

impl Material {
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Gold => "gold",
            Material::Silver => "silver",
        }
    }

    /// Spanish folder label used by the image store.
    pub fn folder(self) -> &'static str {
        match self {
            Material::Gold => "oro",
            Material::Silver => "plata",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = CatalogImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" | "oro" => Ok(Material::Gold),
            "silver" | "plata" => Ok(Material::Silver),
            other => Err(CatalogImportError::UnknownMaterial(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// One product parsed from a data row, ready to be handed to a catalog store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: f64,
    pub category: String,
    pub status: ProductStatus,
    pub image_url: String,
    pub material: Material,
    pub featured: bool,
}

/// A field value that could not be read and fell back to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    UnparsedPrice { line: usize, raw: String },
    UnparsedStock { line: usize, raw: String },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::UnparsedPrice { line, raw } => {
                write!(f, "line {line}: price {raw:?} not understood, using 0")
            }
            ImportWarning::UnparsedStock { line, raw } => {
                write!(f, "line {line}: stock {raw:?} not understood, using 0")
            }
        }
    }
}

/// Result of one import pass.
///
/// `records` keeps file order. `skipped_rows` lists the 1-based physical line
/// numbers of data rows dropped for lacking a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub records: Vec<ProductInput>,
    /// `None` when nothing could be imported: no data rows, or a header
    /// without a name column.
    pub delimiter: Option<char>,
    /// Non-empty lines after the header.
    pub data_lines: usize,
    pub skipped_rows: Vec<usize>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// CRC32 over every record's fields, unit-separated. Two imports of the same
    /// content produce the same value.
    pub fn checksum(&self) -> u32 {
        let mut crc = Crc32::new();
        for record in &self.records {
            let price = record.price.to_string();
            let stock = record.stock.to_string();
            let fields: [&str; 9] = [
                &record.name,
                &record.description,
                &price,
                &stock,
                &record.category,
                record.status.as_str(),
                &record.image_url,
                record.material.as_str(),
                if record.featured { "1" } else { "0" },
            ];
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    crc.update(&[0x1f]);
                }
                crc.update(field.as_bytes());
            }
            crc.update(&[0x1e]);
        }
        crc.finalize()
    }

    #[cfg_attr(not(feature = "fast_local"), allow(dead_code))]
    pub(crate) fn absorb(&mut self, chunk: ImportReport) {
        self.records.extend(chunk.records);
        self.data_lines += chunk.data_lines;
        self.skipped_rows.extend(chunk.skipped_rows);
        self.warnings.extend(chunk.warnings);
    }
}

/// Active products at or below this stock (and above zero) count as low stock.
pub const LOW_STOCK_THRESHOLD: f64 = 3.0;

/// Dashboard counters over a set of products.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventorySummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    /// Sum of `price * stock`.
    pub total_value: f64,
}

impl InventorySummary {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductInput>,
    {
        let mut summary = InventorySummary::default();
        for p in products {
            summary.total += 1;
            match p.status {
                ProductStatus::Active => {
                    summary.active += 1;
                    if p.stock > 0.0 && p.stock <= LOW_STOCK_THRESHOLD {
                        summary.low_stock += 1;
                    }
                }
                ProductStatus::Inactive => summary.inactive += 1,
            }
            if p.stock == 0.0 {
                summary.out_of_stock += 1;
            }
            summary.total_value += p.price * p.stock;
        }
        summary
    }
}

impl fmt::Display for InventorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} active={} inactive={} low_stock={} out_of_stock={} value={:.2}",
            self.total,
            self.active,
            self.inactive,
            self.low_stock,
            self.out_of_stock,
            self.total_value
        )
    }
}
