use crate::model::{ImportReport, Material};
use crate::normalize::trim_text;
use crate::parse::{find_header, RowParser};
use crate::{CatalogImportError, CatalogResult};
use memchr::{memchr, memchr_iter};
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::thread;
use tracing::{debug, warn};

/// Fast local import for uncompressed UTF-8 catalogs using mmap and parallel chunking.
/// Output matches [`crate::parse_catalog`] on the same content, in file order.
pub fn fast_local_import(path: &Path, fallback: Material) -> CatalogResult<ImportReport> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(ImportReport::default());
    }
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    // Malformed bytes become U+FFFD, like the streaming path.
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&mmap[..]);
    if had_errors {
        warn!(path = %path.display(), "malformed UTF-8 in catalog replaced with U+FFFD");
    }
    let text: &str = &text;

    let Some((header, header_line, body_start)) = find_header(text) else {
        return Ok(ImportReport::default());
    };
    let body = &text[body_start..];
    if trim_text(body).is_empty() {
        return Ok(ImportReport::default());
    }
    let Some(parser) = RowParser::from_header(header, fallback) else {
        return Ok(ImportReport::default());
    };

    // Chunk boundaries sit just after a '\n', so every slice is valid UTF-8.
    let data = body.as_bytes();
    let len = data.len();
    let cores = num_cpus::get().max(1);
    let approx = (len / cores).max(1);
    let mut starts = vec![0usize];
    let mut pos = approx;
    while starts.len() < cores && pos < len {
        let next = memchr(b'\n', &data[pos..])
            .map(|off| pos + off + 1)
            .unwrap_or(len);
        if next >= len {
            break;
        }
        starts.push(next);
        pos = next + approx;
    }
    starts.push(len);

    // physical line number of each chunk's first line
    let mut first_lines = Vec::with_capacity(starts.len());
    let mut line = header_line + 1;
    let mut prev = 0usize;
    for &start in &starts[..starts.len() - 1] {
        line += memchr_iter(b'\n', &data[prev..start]).count();
        first_lines.push(line);
        prev = start;
    }

    let chunks = thread::scope(|s| {
        let handles: Vec<_> = starts
            .windows(2)
            .zip(&first_lines)
            .map(|(w, &first_line)| {
                let slice = &body[w[0]..w[1]];
                let parser = &parser;
                s.spawn(move || parser.parse_body(slice.trim_end_matches('\n'), first_line))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| CatalogImportError::WorkerPanicked))
            .collect::<CatalogResult<Vec<_>>>()
    })?;
    debug!(chunks = chunks.len(), path = %path.display(), "fast local import finished");

    let mut report = ImportReport {
        delimiter: Some(parser.delimiter()),
        ..Default::default()
    };
    for chunk in chunks {
        report.absorb(chunk);
    }
    Ok(report)
}
