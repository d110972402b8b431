//! Catalog records as read back from the database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ImageId, Price, ProductId, ProductStatus, SupplierId, TagId, VariantId};

/// Collection name for products without a product type.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A product together with its ordered child collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub images: Vec<Image>,
    pub variants: Vec<Variant>,
    pub tags: Vec<Tag>,
}

impl Product {
    /// Price of the first variant, which listings show as the product price.
    #[must_use]
    pub fn headline_price(&self) -> Option<Decimal> {
        self.variants.first().map(|v| v.price)
    }

    /// First image source, if any non-blank one exists.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.iter().find(|img| !img.src.trim().is_empty())
    }

    /// Tag names in display order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    /// Collection this product is listed under.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.product_type.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// Total stock across variants.
    #[must_use]
    pub fn total_inventory(&self) -> i64 {
        self.variants.iter().map(|v| i64::from(v.inventory_quantity)).sum()
    }

    /// Formatted headline price, e.g. `₱29.99` (`₱0.00` when there are no variants).
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::display(self.headline_price().unwrap_or_default())
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub title: Option<String>,
    pub price: Decimal,
    pub sku: Option<String>,
    pub inventory_quantity: i32,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Image {
    pub id: ImageId,
    pub product_id: ProductId,
    pub src: String,
    pub alt: String,
}

/// A product tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: TagId,
    pub product_id: ProductId,
    pub name: String,
}

/// A supplier. Suppliers are not linked to products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact: String,
    pub address: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Filters for product listings.
///
/// All filters are optional and combine with AND. Blank values are treated as
/// absent so an empty search box does not filter anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the title.
    pub q: Option<String>,
    /// Exact tag name.
    pub tag: Option<String>,
    /// Exact product type; [`UNCATEGORIZED`] selects products without one.
    pub product_type: Option<String>,
    /// Publication status. The storefront only lists active products.
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Drop blank values and the storefront's "All" tag sentinel.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }

        Self {
            q: keep(self.q),
            tag: keep(self.tag).filter(|t| t != "All"),
            product_type: keep(self.product_type),
            status: self.status,
        }
    }

    /// Filter used by storefront pages.
    #[must_use]
    pub fn storefront(q: Option<String>, tag: Option<String>, product_type: Option<String>) -> Self {
        Self {
            q,
            tag,
            product_type,
            status: Some(ProductStatus::Active),
        }
        .normalized()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    /// A product shaped like the seeded headphones.
    pub fn headphones() -> Product {
        let id = ProductId::new(1);
        Product {
            id,
            title: "Wireless Headphones".to_owned(),
            body_html: "High-quality wireless headphones with noise-canceling feature.".to_owned(),
            vendor: "AudioTech".to_owned(),
            product_type: Some("Electronics".to_owned()),
            status: ProductStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            images: vec![Image {
                id: ImageId::new(10),
                product_id: id,
                src: "/images/headphones1.jpg".to_owned(),
                alt: "Wireless Headphones".to_owned(),
            }],
            variants: vec![
                Variant {
                    id: VariantId::new(20),
                    product_id: id,
                    title: Some("Black".to_owned()),
                    price: Decimal::new(2999, 0),
                    sku: Some("WH-BLK-001".to_owned()),
                    inventory_quantity: 20,
                },
                Variant {
                    id: VariantId::new(21),
                    product_id: id,
                    title: Some("White".to_owned()),
                    price: Decimal::new(2999, 0),
                    sku: None,
                    inventory_quantity: 15,
                },
            ],
            tags: vec![
                Tag {
                    id: TagId::new(30),
                    product_id: id,
                    name: "Audio".to_owned(),
                },
                Tag {
                    id: TagId::new(31),
                    product_id: id,
                    name: "Wireless".to_owned(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::headphones;
    use super::*;

    #[test]
    fn test_normalized_drops_blank_and_all() {
        let filter = ProductFilter {
            q: Some("   ".to_owned()),
            tag: Some("All".to_owned()),
            product_type: Some(" Electronics ".to_owned()),
            status: None,
        }
        .normalized();
        assert_eq!(filter.q, None);
        assert_eq!(filter.tag, None);
        assert_eq!(filter.product_type.as_deref(), Some("Electronics"));
    }

    #[test]
    fn test_storefront_filter_hides_drafts() {
        let filter = ProductFilter::storefront(None, Some("All".to_owned()), None);
        assert_eq!(filter.status, Some(ProductStatus::Active));
        assert_eq!(filter.tag, None);
    }

    #[test]
    fn test_missing_type_is_uncategorized() {
        let mut product = headphones();
        assert_eq!(product.collection(), "Electronics");

        product.product_type = None;
        assert_eq!(product.collection(), UNCATEGORIZED);
        assert_eq!(product.total_inventory(), 35);
    }

    #[test]
    fn test_headline_price_uses_first_variant() {
        let product = headphones();
        assert_eq!(product.headline_price(), Some(Decimal::new(2999, 0)));
        assert_eq!(product.display_price(), "₱2999.00");
    }
}
