use catalog_ingest::parse::{detect_delimiter, split_line};
use catalog_ingest::{
    parse_catalog, parse_products, submit_import, CatalogImportError, CatalogResult, CatalogStore,
    ImportNotice, ImportWarning, Material, MemoryCatalog, NewProduct, ProductStatus,
    DEFAULT_CATEGORY,
};

#[test]
fn comma_header_with_nombre_picks_comma() {
    assert_eq!(detect_delimiter("Nombre,Precio,Stock,Categoría"), ',');
    assert_eq!(detect_delimiter("a;b;c"), ';');
}

#[test]
fn quoted_comma_survives_split() {
    assert_eq!(
        split_line("\"Anillo, Oro\",1200,5", ','),
        vec!["Anillo, Oro", "1200", "5"]
    );
}

#[test]
fn minimal_header_fills_defaults() {
    let records = parse_products("Nombre,Precio\nAnillo Luna,1200\nCollar,80\n", Material::Silver);
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.stock, 0.0);
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert_eq!(record.status, ProductStatus::Active);
        assert_eq!(record.material, Material::Silver);
        assert!(!record.featured);
        assert!(record.description.is_empty());
        assert!(record.image_url.is_empty());
    }
    assert_eq!(records[0].price, 1200.0);
}

#[test]
fn thousands_separator_reads_as_zero_with_warning() {
    let report = parse_catalog("Nombre;Precio\nCollar;1,234.50\nAro;1200,50\n", Material::Gold);
    assert_eq!(report.records[0].price, 0.0);
    assert_eq!(report.records[1].price, 1200.5);
    assert_eq!(
        report.warnings,
        vec![ImportWarning::UnparsedPrice {
            line: 2,
            raw: "1,234.50".to_string()
        }]
    );
}

#[test]
fn rows_without_name_are_dropped() {
    let content = "Nombre,Precio,Categoría\nAnillo,10,Anillos\n,20,Collares\n   ,30,\nDije,40,\n";
    let report = parse_catalog(content, Material::Gold);
    assert_eq!(report.data_lines, 4);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped_rows, vec![3, 4]);
    assert_eq!(report.records[1].category, DEFAULT_CATEGORY);
}

#[test]
fn status_and_featured_tokens() {
    let content = "Name\tStatus\tFeatured\n\
                   A\tINACTIVO\tSí\n\
                   B\tinactívo\tno\n\
                   C\t\t1\n\
                   D\tDisponible\tyes\n";
    let records = parse_products(content, Material::Gold);
    let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
    let featured: Vec<_> = records.iter().map(|r| r.featured).collect();
    assert_eq!(
        statuses,
        vec![
            ProductStatus::Inactive,
            ProductStatus::Inactive,
            ProductStatus::Active,
            ProductStatus::Active
        ]
    );
    assert_eq!(featured, vec![true, false, true, false]);
}

#[test]
fn material_column_overrides_fallback() {
    let content = "nombre;material\nA;Plata 950\nB;oro rosado\nC;\nD;acero\n";
    let materials: Vec<_> = parse_products(content, Material::Silver)
        .into_iter()
        .map(|r| r.material)
        .collect();
    assert_eq!(
        materials,
        vec![Material::Silver, Material::Gold, Material::Silver, Material::Silver]
    );
}

#[test]
fn missing_name_column_imports_nothing() {
    let report = parse_catalog("Producto,Precio\nAnillo,10\n", Material::Gold);
    assert!(report.is_empty());
    assert_eq!(report.delimiter, None);
}

#[test]
fn empty_and_single_line_files_are_empty() {
    assert!(parse_products("", Material::Gold).is_empty());
    assert!(parse_products("Nombre,Precio", Material::Gold).is_empty());
}

#[test]
fn reparsing_gives_same_fields_and_fresh_ids() {
    let content = "Nombre,Material\nAnillo Luna,oro\nAnillo Luna,oro\n";
    let first = parse_catalog(content, Material::Gold);
    let second = parse_catalog(content, Material::Gold);
    assert_eq!(first.records, second.records);
    assert_eq!(first.checksum(), second.checksum());

    let mut a = MemoryCatalog::new();
    let mut b = MemoryCatalog::new();
    submit_import(first.records, &mut a);
    submit_import(second.records, &mut b);
    let ids: Vec<_> = a.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["gold-anillo-luna", "gold-anillo-luna-1"]);
    assert_eq!(a.products(), b.products());
}

#[test]
fn ids_avoid_existing_catalog_entries() {
    let mut store = MemoryCatalog::new();
    submit_import(parse_products("Nombre\nAro Sol\n", Material::Silver), &mut store);
    submit_import(parse_products("Nombre\nAro Sol\n", Material::Silver), &mut store);
    let ids: Vec<_> = store.products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["silver-aro-sol", "silver-aro-sol-1"]);
}

struct RejectingStore;

impl CatalogStore for RejectingStore {
    fn existing_ids(&self) -> Vec<String> {
        Vec::new()
    }

    fn insert_batch(&mut self, _batch: &[NewProduct]) -> CatalogResult<usize> {
        Err(CatalogImportError::Rejected("permission denied".into()))
    }
}

#[test]
fn notices_cover_empty_and_failed_imports() {
    let mut store = MemoryCatalog::new();
    assert_eq!(submit_import(Vec::new(), &mut store), ImportNotice::NoValidRows);

    let records = parse_products("Nombre\nAnillo\n", Material::Gold);
    match submit_import(records, &mut RejectingStore) {
        ImportNotice::InsertFailed { reason } => assert!(reason.contains("permission denied")),
        other => panic!("unexpected notice {other:?}"),
    }
}

#[cfg(feature = "fast_local")]
#[test]
fn fast_local_matches_in_memory_parse() -> anyhow::Result<()> {
    use std::fmt::Write as _;

    let mut content = String::from("Nombre,Precio,Stock\n");
    for i in 0..5_000 {
        if i % 97 == 0 {
            writeln!(content, ",{i},1")?;
        } else if i % 89 == 0 {
            content.push('\n');
        } else {
            writeln!(content, "\"Pieza {i}, oro\",{i},{}", i % 13)?;
        }
    }
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalogo.csv");
    std::fs::write(&path, &content)?;

    let fast = catalog_ingest::fast_local_import(&path, Material::Gold)?;
    assert_eq!(fast, parse_catalog(&content, Material::Gold));
    Ok(())
}
