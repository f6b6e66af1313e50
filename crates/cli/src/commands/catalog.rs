//! Catalog listing.

use pasarku_storefront::api::{ApiError, PasarkuClient};

/// Print the catalog rows matching `query`, one per line.
///
/// # Errors
///
/// Returns an error if the search request fails.
#[allow(clippy::print_stdout)]
pub async fn list(client: &PasarkuClient, query: &str) -> Result<(), ApiError> {
    let products = client.search_products(query).await?;
    tracing::info!("Found {} products", products.len());

    for product in &products {
        println!(
            "{}\t{}\t{}\tstok {}\t{}",
            product.id,
            product.item.name,
            product.item.base_price,
            product.quantity,
            product.merchant_name()
        );
    }
    Ok(())
}
