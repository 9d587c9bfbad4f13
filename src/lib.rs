//! Jewelry catalog import: delimited text in, typed product records out.
//!
//! - In-memory path: [`parse_catalog`] over a `&str`, pure and infallible.
//! - Streaming path: [`CatalogStream`] over any tokio `AsyncRead` (gzip/zstd and
//!   non-UTF-8 charsets handled by [`build_source_reader`]).
//! - Fast local path: feature `fast_local`, uncompressed local UTF-8 only.
//!
//! Data shape:
//! - [`ImportReport`] `{ records, delimiter, data_lines, skipped_rows, warnings }`
//! - Records are [`ProductInput`]; ids are assigned at hand-off by [`submit_import`].
#![cfg_attr(docsrs, feature(doc_cfg))]
//
pub mod catalog;
mod codec;
pub mod export;
#[cfg(feature = "fast_local")]
mod fast;
mod io;
pub mod media;
pub mod model;
pub mod normalize;
pub mod parse;
mod stream;

pub use crate::catalog::{
    submit_import, CatalogStore, ImportNotice, MemoryCatalog, NewProduct, ProductIdAllocator,
};
pub use crate::export::write_catalog_csv;
#[cfg(feature = "fast_local")]
pub use crate::fast::fast_local_import;
pub use crate::io::{
    build_source_reader, read_source_text, reader_from_path, Compression, SourceMeta,
};
pub use crate::model::{
    ImportReport, ImportWarning, InventorySummary, Material, ProductInput, ProductStatus,
    DEFAULT_CATEGORY, LOW_STOCK_THRESHOLD,
};
pub use crate::parse::{parse_catalog, parse_products, HeaderMap};
pub use crate::stream::{CatalogStream, MAX_LINE_LENGTH};

use thiserror::Error;

/// Error type returned by this crate when not using `anyhow`.
#[derive(Debug, Error)]
pub enum CatalogImportError {
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error("Image is {size} bytes, limit is {max}")]
    ImageTooLarge { size: u64, max: u64 },
    #[error("Catalog store rejected the batch: {0}")]
    Rejected(String),
    #[error("Import worker panicked")]
    WorkerPanicked,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lines(#[from] tokio_util::codec::LinesCodecError),
    #[error(transparent)]
    Csv(#[from] csv_async::Error),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogImportError>;
