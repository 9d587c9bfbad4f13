use crate::CatalogResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::codec::Utf8Transcoder;

/// How the catalog bytes are packed on the wire or on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Plain,
    Gzip,
    Zstd,
}

impl Compression {
    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" | "application/gzip" | "application/x-gzip" => Some(Compression::Gzip),
            "zstd" | "application/zstd" => Some(Compression::Zstd),
            _ => None,
        }
    }

    fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("gz") => Compression::Gzip,
            Some("zst") => Compression::Zstd,
            _ => Compression::Plain,
        }
    }
}

/// Where an uploaded catalog came from and how its bytes are packed.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// e.g. "text/csv" or "application/gzip"
    pub content_type: String,
    /// e.g. "gzip", "zstd", or empty
    pub content_encoding: String,
    /// original file name (extension fallback)
    pub name_hint: String,
    /// Character encoding of the text (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl SourceMeta {
    /// Encoding header wins, then the content type, then the file extension.
    pub fn compression(&self) -> Compression {
        self.content_encoding
            .split(',')
            .find_map(Compression::from_token)
            .or_else(|| Compression::from_token(&self.content_type))
            .unwrap_or_else(|| Compression::from_file_name(&self.name_hint))
    }
}

/// Wrap a raw byte source with decompression and decoding to UTF-8.
///
/// Decoding always runs, also for UTF-8 sources: malformed bytes become
/// U+FFFD instead of failing the whole import, and a BOM is dropped.
pub fn build_source_reader<R>(raw: R, meta: &SourceMeta) -> impl AsyncRead + Unpin + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let compression = meta.compression();
    let buf = BufReader::with_capacity(1 << 16, raw);
    let unpacked: Box<dyn AsyncRead + Unpin + Send> = match compression {
        Compression::Gzip => Box::new(GzipDecoder::new(buf)),
        Compression::Zstd => Box::new(ZstdDecoder::new(buf)),
        Compression::Plain => Box::new(buf),
    };
    debug!(
        name = %meta.name_hint,
        charset = meta.charset.name(),
        ?compression,
        "opened catalog source"
    );
    StreamReader::new(FramedRead::new(unpacked, Utf8Transcoder::new(meta.charset)))
}

/// Open a local catalog file; compression comes from the extension.
pub async fn reader_from_path(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> CatalogResult<(impl AsyncRead + Unpin + Send, SourceMeta)> {
    let file = File::open(path).await?;
    let name_hint = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let (content_type, content_encoding) = match Compression::from_file_name(&name_hint) {
        Compression::Gzip => ("application/gzip", "gzip"),
        Compression::Zstd => ("application/zstd", "zstd"),
        Compression::Plain => ("text/csv", ""),
    };
    let meta = SourceMeta {
        content_type: content_type.to_string(),
        content_encoding: content_encoding.to_string(),
        name_hint,
        charset,
    };

    let reader = build_source_reader(file, &meta);
    Ok((reader, meta))
}

/// Read the whole (decoded) source into memory, dropping a leading BOM.
pub async fn read_source_text<R>(mut reader: R) -> CatalogResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    if text.starts_with('\u{feff}') {
        text.replace_range(..'\u{feff}'.len_utf8(), "");
    }
    Ok(text)
}
