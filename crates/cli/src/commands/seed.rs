//! Sample catalog data.
//!
//! ```bash
//! shop-cli seed
//! ```
//!
//! Skipped when the catalog already has products.

use rust_decimal::Decimal;

use simple_shop_core::{ProductFilter, ProductStatus};
use simple_shop_core::write::{NewImage, NewTag, NewVariant, ProductCreate};
use simple_shop_server::db::ProductRepository;

use super::{CommandError, connect};

fn image(src: &str, alt: &str) -> NewImage {
    NewImage {
        src: src.to_owned(),
        alt: alt.to_owned(),
    }
}

fn variant(title: &str, centavos: i64, sku: &str, quantity: i32) -> NewVariant {
    NewVariant {
        title: Some(title.to_owned()),
        price: Decimal::new(centavos, 2),
        sku: Some(sku.to_owned()),
        inventory_quantity: Some(quantity),
    }
}

fn tags(names: &[&str]) -> Vec<NewTag> {
    names
        .iter()
        .map(|name| NewTag {
            name: (*name).to_owned(),
        })
        .collect()
}

/// The three sample products.
fn sample_products() -> Vec<ProductCreate> {
    vec![
        ProductCreate {
            title: "Wireless Headphones".to_owned(),
            body_html: "High-quality wireless headphones with noise-canceling feature.".to_owned(),
            vendor: "AudioTech".to_owned(),
            product_type: Some("Electronics".to_owned()),
            status: Some(ProductStatus::Active),
            images: vec![
                image("/images/headphones1.jpg", "Wireless Headphones"),
                image("/images/headphones2.jpg", "Side View"),
            ],
            variants: vec![
                variant("Black", 299_900, "WH-BLK-001", 20),
                variant("White", 299_900, "WH-WHT-001", 15),
            ],
            tags: tags(&["Audio", "Wireless"]),
        },
        ProductCreate {
            title: "Smartphone Case".to_owned(),
            body_html: "Durable TPU smartphone case with anti-slip grip and raised camera edges."
                .to_owned(),
            vendor: "CaseCo".to_owned(),
            product_type: Some("Accessories".to_owned()),
            status: Some(ProductStatus::Active),
            images: vec![image("/images/case1.jpg", "Smartphone Case")],
            variants: vec![
                variant("Black", 49_900, "SC-BLK-001", 50),
                variant("Blue", 49_900, "SC-BLU-001", 35),
            ],
            tags: tags(&["Phone", "Case"]),
        },
        ProductCreate {
            title: "Coffee Mug".to_owned(),
            body_html: "Ceramic coffee mug with 350ml capacity, dishwasher and microwave safe."
                .to_owned(),
            vendor: "Kitchenware Co".to_owned(),
            product_type: Some("Home & Kitchen".to_owned()),
            status: Some(ProductStatus::Active),
            images: vec![image("/images/mug1.jpg", "Coffee Mug")],
            variants: vec![variant("Standard", 25_000, "MUG-STD-001", 100)],
            tags: tags(&["Kitchen", "Drinkware"]),
        },
    ]
}

/// Insert the sample products into an empty catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    let existing = repo.count(&ProductFilter::default()).await?;
    if existing > 0 {
        tracing::info!(existing, "Catalog already has products, skipping seed");
        return Ok(());
    }

    for product in sample_products() {
        let created = repo.create(&product.normalized()).await?;
        tracing::info!(product_id = %created.id, title = %created.title, "Seeded product");
    }

    tracing::info!("Seed complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use simple_shop_core::validation::Validate;

    use super::*;

    #[test]
    fn test_sample_products_pass_validation() {
        for product in sample_products() {
            assert!(product.validate().is_ok(), "{} is invalid", product.title);
        }
    }
}
