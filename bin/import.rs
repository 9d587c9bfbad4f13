use anyhow::Context;
use catalog_ingest::{
    parse_catalog, read_source_text, reader_from_path, submit_import, write_catalog_csv,
    CatalogStream, ImportNotice, ImportReport, InventorySummary, Material, MemoryCatalog,
    MAX_LINE_LENGTH,
};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("import")
        .about("Parse a jewelry catalog export and report what would be imported")
        .arg(Arg::new("path").long("path").required(true).value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("material").long("material").help("Material for rows without one: gold|silver (oro|plata)").default_value("gold"))
        .arg(Arg::new("charset").long("charset").help("Source charset label, e.g. utf-8, windows-1252").default_value("utf-8"))
        .arg(Arg::new("out").long("out").help("Write the normalized catalog, with ids, to this CSV file").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("stream").long("stream").help(format!("Parse line by line instead of reading the whole file; rejects lines over {} KiB", MAX_LINE_LENGTH / 1024)).action(ArgAction::SetTrue))
        .arg(Arg::new("fast-local").long("fast-local").help("Use mmap+parallel fast path for local uncompressed UTF-8 files (feature: fast_local)").action(ArgAction::SetTrue))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap();
    let fallback: Material = matches.get_one::<String>("material").unwrap().parse()?;
    let label = matches.get_one::<String>("charset").unwrap();
    let charset = encoding_rs::Encoding::for_label(label.as_bytes())
        .with_context(|| format!("unknown charset {label:?}"))?;

    let start = Instant::now();
    let report = load(path, fallback, charset, &matches).await?;
    let elapsed = start.elapsed().as_secs_f64();

    for warning in &report.warnings {
        info!(%warning, "field defaulted");
    }
    println!(
        "source={} delimiter={:?} lines={} records={} skipped={:?} crc=0x{:08x}\nelapsed={:.3}s",
        path.display(),
        report.delimiter,
        report.data_lines,
        report.records.len(),
        report.skipped_rows,
        report.checksum(),
        elapsed
    );

    let mut store = MemoryCatalog::new();
    match submit_import(report.records, &mut store) {
        ImportNotice::Queued { count } => println!("{count} product(s) ready to import"),
        ImportNotice::NoValidRows => println!("no valid rows found"),
        ImportNotice::InsertFailed { reason } => anyhow::bail!("import failed: {reason}"),
    }
    let summary = InventorySummary::from_products(store.products().iter().map(|p| &p.product));
    println!("inventory {summary}");

    if let Some(out) = matches.get_one::<PathBuf>("out") {
        let file = tokio::fs::File::create(out)
            .await
            .with_context(|| format!("create {}", out.display()))?;
        write_catalog_csv(file, store.products()).await?;
        info!(path = %out.display(), rows = store.len(), "wrote normalized catalog");
    }
    Ok(())
}

async fn load(
    path: &Path,
    fallback: Material,
    charset: &'static encoding_rs::Encoding,
    matches: &clap::ArgMatches,
) -> anyhow::Result<ImportReport> {
    #[cfg(feature = "fast_local")]
    if matches.get_flag("fast-local")
        && charset == encoding_rs::UTF_8
        && path.extension().and_then(|s| s.to_str()) == Some("csv")
    {
        return Ok(catalog_ingest::fast_local_import(path, fallback)?);
    }
    #[cfg(not(feature = "fast_local"))]
    if matches.get_flag("fast-local") {
        tracing::warn!("built without fast_local, using the in-memory path");
    }

    let (reader, _meta) = reader_from_path(path, charset).await?;
    if matches.get_flag("stream") {
        let stream = CatalogStream::open(reader, fallback).await?;
        return Ok(stream.into_report().await?);
    }
    let text = read_source_text(reader).await?;
    Ok(parse_catalog(&text, fallback))
}
