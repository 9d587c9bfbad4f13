//! Delimited-text catalog parser.
//!
//! Line framing: split on `\n`, trim every line (whitespace and stray BOMs),
//! ignore blank lines. The first remaining line is the header. Quoted fields
//! never span lines.

use crate::model::{
    ImportReport, ImportWarning, Material, ProductInput, ProductStatus, DEFAULT_CATEGORY,
};
use crate::normalize::{fold_key, trim_text};
use tracing::{debug, warn};

const DELIMITER_CANDIDATES: [char; 3] = [',', ';', '\t'];

/// Pick the field separator from the header line: the most frequent of comma,
/// semicolon and tab, earlier candidates winning ties. Defaults to comma.
pub fn detect_delimiter(header: &str) -> char {
    let mut detected = ',';
    let mut max_count = 0usize;
    for candidate in DELIMITER_CANDIDATES {
        let count = header.matches(candidate).count();
        if count > max_count {
            detected = candidate;
            max_count = count;
        }
    }
    detected
}

/// Split one line on `delimiter`, honoring `"`-wrapped fields and `""` escapes.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }
        if c == delimiter && !in_quotes {
            values.push(finish_field(&current));
            current.clear();
            continue;
        }
        current.push(c);
    }
    values.push(finish_field(&current));
    values
}

fn finish_field(raw: &str) -> String {
    let trimmed = trim_text(raw);
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trim_text(trimmed).to_string()
}

/// Column index of each canonical field, resolved once from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub name: Option<usize>,
    pub description: Option<usize>,
    pub price: Option<usize>,
    pub stock: Option<usize>,
    pub category: Option<usize>,
    pub status: Option<usize>,
    pub image_url: Option<usize>,
    pub material: Option<usize>,
    pub featured: Option<usize>,
}

impl HeaderMap {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| fold_key(h.as_ref())).collect();
        let find = |aliases: &[&str]| keys.iter().position(|k| aliases.contains(&k.as_str()));
        HeaderMap {
            name: find(&["nombre", "name"]),
            description: find(&["descripcion", "description"]),
            price: find(&["precio", "price"]),
            stock: find(&["stock"]),
            category: find(&["categoria", "category"]),
            status: find(&["estado", "status"]),
            image_url: find(&["imagen", "image", "imageurl"]),
            material: find(&["material"]),
            featured: find(&["destacado", "featured"]),
        }
    }
}

/// Turns data lines into products once the header has been seen.
#[derive(Debug, Clone)]
pub struct RowParser {
    delimiter: char,
    columns: HeaderMap,
    name_column: usize,
    fallback: Material,
}

impl RowParser {
    /// `None` when the header has no name column; such a file imports nothing.
    pub fn from_header(header: &str, fallback: Material) -> Option<Self> {
        let delimiter = detect_delimiter(header);
        let columns = HeaderMap::resolve(&split_line(header, delimiter));
        debug!(?delimiter, ?columns, "resolved catalog header");
        let Some(name_column) = columns.name else {
            warn!("catalog header has no name column, nothing to import");
            return None;
        };
        Some(RowParser {
            delimiter,
            columns,
            name_column,
            fallback,
        })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn columns(&self) -> &HeaderMap {
        &self.columns
    }

    /// Parse an already-trimmed, non-empty data line. `None` means the row had no
    /// name and was dropped.
    pub fn parse_row(
        &self,
        line_no: usize,
        line: &str,
        warnings: &mut Vec<ImportWarning>,
    ) -> Option<ProductInput> {
        let values = split_line(line, self.delimiter);
        let cell = |idx: Option<usize>| idx.and_then(|i| values.get(i)).map(String::as_str);

        let name = cell(Some(self.name_column)).filter(|n| !n.is_empty())?;

        let price_raw = cell(self.columns.price).unwrap_or_default();
        let price = parse_price(price_raw).unwrap_or_else(|| {
            warnings.push(ImportWarning::UnparsedPrice {
                line: line_no,
                raw: price_raw.to_string(),
            });
            0.0
        });
        let stock_raw = cell(self.columns.stock).unwrap_or_default();
        let stock = parse_stock(stock_raw).unwrap_or_else(|| {
            warnings.push(ImportWarning::UnparsedStock {
                line: line_no,
                raw: stock_raw.to_string(),
            });
            0.0
        });

        let category = match cell(self.columns.category) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };

        Some(ProductInput {
            name: name.to_string(),
            description: cell(self.columns.description).unwrap_or_default().to_string(),
            price,
            stock,
            category,
            status: to_status(cell(self.columns.status).unwrap_or_default()),
            image_url: cell(self.columns.image_url).unwrap_or_default().to_string(),
            material: to_material(cell(self.columns.material).unwrap_or_default(), self.fallback),
            featured: to_featured(cell(self.columns.featured).unwrap_or_default()),
        })
    }

    /// Parse a run of raw lines whose first line is physical line `first_line_no`.
    pub fn parse_body(&self, body: &str, first_line_no: usize) -> ImportReport {
        let mut report = ImportReport {
            delimiter: Some(self.delimiter),
            ..Default::default()
        };
        for (offset, raw) in body.split('\n').enumerate() {
            let line = trim_text(raw);
            if line.is_empty() {
                continue;
            }
            let line_no = first_line_no + offset;
            report.data_lines += 1;
            match self.parse_row(line_no, line, &mut report.warnings) {
                Some(record) => report.records.push(record),
                None => report.skipped_rows.push(line_no),
            }
        }
        report
    }
}

/// Locate the header: first non-blank line. Returns its trimmed text, its
/// 1-based line number and the byte offset where the body starts.
pub(crate) fn find_header(content: &str) -> Option<(&str, usize, usize)> {
    let mut offset = 0usize;
    for (i, raw) in content.split('\n').enumerate() {
        let next = (offset + raw.len() + 1).min(content.len());
        let line = trim_text(raw);
        if !line.is_empty() {
            return Some((line, i + 1, next));
        }
        offset = next;
    }
    None
}

/// Parse a whole catalog file held in memory.
///
/// Never fails: files without data rows or without a name column yield an
/// empty report, malformed fields take their defaults.
pub fn parse_catalog(content: &str, fallback: Material) -> ImportReport {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some((header, header_line, body_start)) = find_header(content) else {
        return ImportReport::default();
    };
    let body = &content[body_start..];
    if trim_text(body).is_empty() {
        debug!("catalog has a header but no data rows");
        return ImportReport::default();
    }
    let Some(parser) = RowParser::from_header(header, fallback) else {
        return ImportReport::default();
    };
    let report = parser.parse_body(body, header_line + 1);
    debug!(
        records = report.records.len(),
        skipped = report.skipped_rows.len(),
        warnings = report.warnings.len(),
        "parsed catalog"
    );
    report
}

/// Same as [`parse_catalog`] but only the records.
pub fn parse_products(content: &str, fallback: Material) -> Vec<ProductInput> {
    parse_catalog(content, fallback).records
}

/// Keep digits, `,` and `.`, read the first comma as a decimal point.
/// Empty input is zero; `None` means the remaining text is not a number.
pub fn parse_price(raw: &str) -> Option<f64> {
    parse_number(raw, |c| c.is_ascii_digit() || c == ',' || c == '.')
}

/// Like [`parse_price`] but keeps `-`. Negative stock reads as zero.
pub fn parse_stock(raw: &str) -> Option<f64> {
    parse_number(raw, |c| c.is_ascii_digit() || c == ',' || c == '.' || c == '-')
        .map(|stock| stock.max(0.0))
}

fn parse_number(raw: &str, keep: impl Fn(char) -> bool) -> Option<f64> {
    let kept: String = raw.chars().filter(|c| keep(*c)).collect();
    if kept.is_empty() {
        return Some(0.0);
    }
    kept.replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn to_status(raw: &str) -> ProductStatus {
    match fold_key(raw).as_str() {
        "inactivo" | "inactive" => ProductStatus::Inactive,
        _ => ProductStatus::Active,
    }
}

pub fn to_material(raw: &str, fallback: Material) -> Material {
    let key = fold_key(raw);
    if key.contains("plata") || key.contains("silver") {
        Material::Silver
    } else if key.contains("oro") || key.contains("gold") {
        Material::Gold
    } else {
        fallback
    }
}

pub fn to_featured(raw: &str) -> bool {
    matches!(fold_key(raw).as_str(), "si" | "sí" | "true" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_delimiters() {
        assert_eq!(detect_delimiter("Nombre,Precio,Stock"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("Nombre"), ',');
        // tie goes to the earlier candidate
        assert_eq!(detect_delimiter("a,b;c"), ',');
    }

    #[test]
    fn split_keeps_quoted_delimiters() {
        assert_eq!(
            split_line("\"Anillo, Oro\",1200,5", ','),
            vec!["Anillo, Oro", "1200", "5"]
        );
        assert_eq!(
            split_line("\"Anillo, Oro\";1200;5", ';'),
            vec!["Anillo, Oro", "1200", "5"]
        );
    }

    #[test]
    fn split_handles_escaped_quotes_and_blanks() {
        assert_eq!(
            split_line("\"Dije \"\"Luna\"\" oro\", ,x", ','),
            vec!["Dije \"Luna\" oro", "", "x"]
        );
        // one layer of surrounding quotes is stripped after scanning
        assert_eq!(split_line("\"\"\"Luna\"\"\"", ','), vec!["Luna"]);
        assert_eq!(split_line("a,", ','), vec!["a", ""]);
    }

    #[test]
    fn header_map_accepts_both_languages() {
        let map = HeaderMap::resolve(&["Nombre", "DESCRIPCIÓN", "price", "Categoría", "ImageUrl"]);
        assert_eq!(map.name, Some(0));
        assert_eq!(map.description, Some(1));
        assert_eq!(map.price, Some(2));
        assert_eq!(map.category, Some(3));
        assert_eq!(map.image_url, Some(4));
        assert_eq!(map.stock, None);
        assert_eq!(map.featured, None);
    }

    #[test]
    fn price_rules() {
        assert_eq!(parse_price("1200,50"), Some(1200.5));
        assert_eq!(parse_price("S/ 350"), Some(350.0));
        assert_eq!(parse_price(""), Some(0.0));
        assert_eq!(parse_price("1,234.50"), None);
        assert_eq!(parse_price("-15"), Some(15.0));
    }

    #[test]
    fn stock_rules() {
        assert_eq!(parse_stock("12 uds"), Some(12.0));
        assert_eq!(parse_stock("2,5"), Some(2.5));
        assert_eq!(parse_stock("-3"), Some(0.0));
        assert_eq!(parse_stock("3-"), None);
    }

    #[test]
    fn token_coercions() {
        assert_eq!(to_status("INACTIVO"), ProductStatus::Inactive);
        assert_eq!(to_status("Inactive"), ProductStatus::Inactive);
        assert_eq!(to_status(""), ProductStatus::Active);
        assert_eq!(to_status("Disponible"), ProductStatus::Active);

        assert_eq!(to_material("Plata 925", Material::Gold), Material::Silver);
        assert_eq!(to_material("ORO 18k", Material::Silver), Material::Gold);
        assert_eq!(to_material("", Material::Silver), Material::Silver);
        assert_eq!(to_material("acero", Material::Gold), Material::Gold);

        assert!(to_featured("Sí"));
        assert!(to_featured("TRUE"));
        assert!(to_featured("1"));
        assert!(!to_featured("no"));
        assert!(!to_featured(""));
    }

    #[test]
    fn header_only_and_empty_files_yield_nothing() {
        assert!(parse_catalog("", Material::Gold).is_empty());
        assert!(parse_catalog("Nombre,Precio\n\n", Material::Gold).is_empty());
        assert!(parse_catalog("\n\n   \n", Material::Gold).is_empty());
    }

    #[test]
    fn skipped_rows_keep_physical_line_numbers() {
        let content = "Nombre,Precio\r\n\r\nAnillo,10\r\n,20\r\nCollar,30\r\n";
        let report = parse_catalog(content, Material::Gold);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.data_lines, 3);
        assert_eq!(report.skipped_rows, vec![4]);
    }

    #[test]
    fn stray_byte_order_marks_are_blank() {
        let report = parse_catalog("Nombre,Precio\nAnillo,10\n\u{feff}\n", Material::Gold);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "Anillo");
        assert_eq!(report.data_lines, 1);

        // BOM glued to a header cell that is not the first one in the file
        let report = parse_catalog("\n\u{feff}Nombre;\u{feff}Precio\nAro;5\n", Material::Gold);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].price, 5.0);
    }

    #[test]
    fn short_rows_drop_missing_name() {
        let report = parse_catalog("Precio,Nombre\n10\n20,Aro\n", Material::Gold);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "Aro");
        assert_eq!(report.skipped_rows, vec![2]);
    }
}
