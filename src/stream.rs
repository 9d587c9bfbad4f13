use crate::model::{ImportReport, ImportWarning, Material, ProductInput};
use crate::normalize::trim_text;
use crate::parse::RowParser;
use crate::CatalogResult;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::debug;

/// Longest line accepted by the streaming reader (bytes).
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Line-at-a-time catalog import over an async reader.
///
/// Produces the same records as [`crate::parse_catalog`] on the same text
/// without holding the whole file in memory. The reader must yield UTF-8;
/// wrap raw bytes with [`crate::build_source_reader`] first.
pub struct CatalogStream<R> {
    lines: FramedRead<R, LinesCodec>,
    parser: Option<RowParser>,
    line_no: usize,
    data_lines: usize,
    skipped_rows: Vec<usize>,
    warnings: Vec<ImportWarning>,
}

impl<R> CatalogStream<R>
where
    R: AsyncRead + Unpin,
{
    /// Read up to and including the header line.
    pub async fn open(reader: R, fallback: Material) -> CatalogResult<Self> {
        let mut stream = CatalogStream {
            lines: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            parser: None,
            line_no: 0,
            data_lines: 0,
            skipped_rows: Vec::new(),
            warnings: Vec::new(),
        };
        while let Some(line) = stream.next_line().await? {
            let header = trim_text(&line);
            if header.is_empty() {
                continue;
            }
            stream.parser = RowParser::from_header(header, fallback);
            break;
        }
        Ok(stream)
    }

    async fn next_line(&mut self) -> CatalogResult<Option<String>> {
        match self.lines.next().await {
            Some(line) => {
                self.line_no += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    /// Delimiter picked from the header, `None` if nothing can be imported.
    pub fn delimiter(&self) -> Option<char> {
        self.parser.as_ref().map(RowParser::delimiter)
    }

    /// Next product, skipping blank lines and rows without a name.
    pub async fn next_record(&mut self) -> CatalogResult<Option<ProductInput>> {
        if self.parser.is_none() {
            return Ok(None);
        }
        while let Some(raw) = self.next_line().await? {
            let line = trim_text(&raw);
            if line.is_empty() {
                continue;
            }
            self.data_lines += 1;
            let Some(parser) = self.parser.as_ref() else {
                return Ok(None);
            };
            match parser.parse_row(self.line_no, line, &mut self.warnings) {
                Some(record) => return Ok(Some(record)),
                None => {
                    debug!(line = self.line_no, "dropping row without a name");
                    self.skipped_rows.push(self.line_no);
                }
            }
        }
        Ok(None)
    }

    /// Drain the remaining rows into a report.
    pub async fn into_report(mut self) -> CatalogResult<ImportReport> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        if self.data_lines == 0 {
            return Ok(ImportReport::default());
        }
        Ok(ImportReport {
            records,
            delimiter: self.delimiter(),
            data_lines: self.data_lines,
            skipped_rows: self.skipped_rows,
            warnings: self.warnings,
        })
    }
}
