use crate::catalog::NewProduct;
use crate::CatalogResult;
use csv_async::AsyncWriterBuilder;
use tokio::io::AsyncWrite;

const EXPORT_HEADER: [&str; 10] = [
    "id",
    "name",
    "description",
    "price",
    "stock",
    "category",
    "status",
    "imageUrl",
    "material",
    "featured",
];

/// Write products as comma-separated text with an English header. The output
/// imports back to the same field values.
pub async fn write_catalog_csv<W>(writer: W, products: &[NewProduct]) -> CatalogResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut wtr = AsyncWriterBuilder::new()
        .delimiter(b',')
        .create_writer(writer);
    wtr.write_record(&EXPORT_HEADER).await?;
    for entry in products {
        let p = &entry.product;
        let price = p.price.to_string();
        let stock = p.stock.to_string();
        wtr.write_record(&[
            entry.id.as_str(),
            p.name.as_str(),
            p.description.as_str(),
            price.as_str(),
            stock.as_str(),
            p.category.as_str(),
            p.status.as_str(),
            p.image_url.as_str(),
            p.material.as_str(),
            if p.featured { "true" } else { "false" },
        ])
        .await?;
    }
    wtr.flush().await?;
    Ok(())
}
