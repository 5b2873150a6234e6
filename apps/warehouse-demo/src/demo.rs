//! The catalog walkthrough.
//!
//! ```text
//! insert "Sport Hat"  →  insert_many red/X, green/M, green/L
//!        →  get_with_variants  →  find(name = green AND size LIKE L)
//!        →  update_omit_zero("new name", "new brand")
//! ```

use tracing::{debug, info};
use warehouse_core::{NewProduct, NewProductVariant, ProductUpdate};
use warehouse_db::{Database, DbResult, VariantFilter};

/// What a run produced, for the final summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoReport {
    pub variants_inserted: usize,
    pub variants_preloaded: usize,
    pub filter_matches: usize,
    pub rows_updated: u64,
}

/// Runs every step in order; the first error stops the run.
pub async fn run(db: &Database) -> DbResult<DemoReport> {
    let products = db.products();
    let variants = db.variants();

    let mut hat = products
        .insert(&NewProduct::new("Sport Hat", "brand"))
        .await?;
    info!(id = %hat.id, created_at = %hat.created_at(), "Inserted product");

    let batch = [("red", "X"), ("green", "M"), ("green", "L")]
        .into_iter()
        .map(|(color, size)| {
            NewProductVariant::new(color, hat.id)
                .property("color", color)
                .property("size", size)
        })
        .collect::<Vec<_>>();
    let inserted = variants.insert_many(&batch).await?;
    for variant in &inserted {
        debug!(id = %variant.id, name = %variant.name, properties = ?variant.properties, "Inserted variant");
    }
    info!(count = inserted.len(), "Inserted variants");

    let loaded = products.get_with_variants(hat.id).await?;
    info!(
        id = %loaded.id,
        name = %loaded.name,
        brand = %loaded.brand,
        variants = loaded.variants.len(),
        "Loaded product with variants"
    );
    for variant in &loaded.variants {
        info!(name = %variant.name, size = ?variant.property("size"), "  variant");
    }

    let filter = VariantFilter::new()
        .name_eq("green")
        .property_like("size", "L");
    let matches = variants.find(&filter).await?;
    for variant in &matches {
        info!(id = %variant.id, name = %variant.name, properties = ?variant.properties, "Filter match");
    }
    info!(count = matches.len(), "Filtered variants");

    hat.name = "new name".to_string();
    hat.brand = "new brand".to_string();
    let rows_updated = products
        .update_omit_zero(&ProductUpdate::omit_zero(&hat))
        .await?;
    info!(id = %hat.id, rows_affected = rows_updated, "Updated product");

    Ok(DemoReport {
        variants_inserted: inserted.len(),
        variants_preloaded: loaded.variants.len(),
        filter_matches: matches.len(),
        rows_updated,
    })
}
