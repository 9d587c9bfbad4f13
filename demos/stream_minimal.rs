use catalog_ingest::{reader_from_path, CatalogStream, Material};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Path::new("./data/catalogo.csv.gz");
    let (reader, _meta) = reader_from_path(path, encoding_rs::UTF_8).await?;

    let mut stream = CatalogStream::open(reader, Material::Silver).await?;
    let mut featured = 0usize;
    while let Some(product) = stream.next_record().await? {
        if product.featured {
            featured += 1;
        }
    }
    println!("featured={featured}");
    Ok(())
}
