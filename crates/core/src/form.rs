//! The admin product form.
//!
//! The form edits the full desired state of a product: every submission
//! carries all images, variants and tags, so the nested-write instruction it
//! produces is always `Clear` or `Replace`, never `Keep`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductStatus;
use crate::write::{ChildWrite, NewImage, NewTag, NewVariant, ProductCreate, ProductUpdate};

/// An image row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// An option row (e.g. `Color: Black, White`). Checked, not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionField {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A variant row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub inventory_quantity: i32,
}

/// The product form as edited in the admin UI and posted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub images: Vec<ImageField>,
    #[serde(default)]
    pub options: Vec<OptionField>,
    #[serde(default)]
    pub variants: Vec<VariantField>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl ProductForm {
    /// An empty form with a single zero-priced variant row.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            body_html: String::new(),
            vendor: String::new(),
            product_type: String::new(),
            tags: String::new(),
            images: Vec::new(),
            options: Vec::new(),
            variants: vec![VariantField::default()],
        }
    }

    /// A form pre-filled from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let variants: Vec<VariantField> = product
            .variants
            .iter()
            .map(|v| VariantField {
                title: v.title.clone().unwrap_or_default(),
                price: v.price,
                sku: v.sku.clone().unwrap_or_default(),
                inventory_quantity: v.inventory_quantity,
            })
            .collect();

        Self {
            title: product.title.clone(),
            body_html: product.body_html.clone(),
            vendor: product.vendor.clone(),
            product_type: product.product_type.clone().unwrap_or_default(),
            tags: product.tag_names().collect::<Vec<_>>().join(", "),
            images: product
                .images
                .iter()
                .map(|img| ImageField {
                    src: img.src.clone(),
                    alt: img.alt.clone(),
                })
                .collect(),
            options: Vec::new(),
            variants: if variants.is_empty() {
                vec![VariantField::default()]
            } else {
                variants
            },
        }
    }

    /// Split the tags field on commas, dropping blanks.
    #[must_use]
    pub fn tag_list(&self) -> Vec<NewTag> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|name| NewTag {
                name: name.to_owned(),
            })
            .collect()
    }

    fn new_images(&self) -> Vec<NewImage> {
        self.images
            .iter()
            .map(|img| NewImage {
                src: img.src.clone(),
                alt: img.alt.clone(),
            })
            .collect()
    }

    fn new_variants(&self) -> Vec<NewVariant> {
        self.variants
            .iter()
            .map(|v| NewVariant {
                title: Some(v.title.clone()),
                price: v.price,
                sku: Some(v.sku.clone()),
                inventory_quantity: Some(v.inventory_quantity),
            })
            .collect()
    }

    /// Payload for creating a product. Normalized, ready to persist.
    #[must_use]
    pub fn to_create(&self) -> ProductCreate {
        ProductCreate {
            title: self.title.clone(),
            body_html: self.body_html.clone(),
            vendor: self.vendor.clone(),
            product_type: Some(self.product_type.clone()),
            status: Some(ProductStatus::Active),
            images: self.new_images(),
            variants: self.new_variants(),
            tags: self.tag_list(),
        }
        .normalized()
    }

    /// Nested-write payload replacing every field of an existing product.
    ///
    /// Saving the form republishes the product.
    #[must_use]
    pub fn to_update(&self) -> ProductUpdate {
        ProductUpdate {
            title: Some(self.title.clone()),
            body_html: Some(self.body_html.clone()),
            vendor: Some(self.vendor.clone()),
            product_type: Some(self.product_type.clone()),
            status: Some(ProductStatus::Active),
            images: ChildWrite::from_desired(self.new_images()),
            variants: ChildWrite::from_desired(self.new_variants()),
            tags: ChildWrite::from_desired(self.tag_list()),
        }
        .normalized()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::fixtures::headphones;
    use crate::validation::Validate;

    #[test]
    fn test_blank_form_has_one_variant_and_fails_validation() {
        let form = ProductForm::blank();
        assert_eq!(form.variants.len(), 1);
        let errors = form.validate().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("variants[0].price"));
    }

    #[test]
    fn test_from_product_prefills_fields() {
        let form = ProductForm::from_product(&headphones());
        assert_eq!(form.tags, "Audio, Wireless");
        assert_eq!(form.product_type, "Electronics");
        assert_eq!(form.images[0].src, "/images/headphones1.jpg");
        assert_eq!(form.variants.len(), 2);
        assert_eq!(form.variants[1].sku, "");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_tags_are_split_and_trimmed() {
        let form = ProductForm {
            tags: " Audio ,Wireless,, ".to_owned(),
            ..ProductForm::blank()
        };
        let names: Vec<_> = form.tag_list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Audio", "Wireless"]);
    }

    #[test]
    fn test_update_is_full_replacement() {
        let mut form = ProductForm::from_product(&headphones());
        form.images.clear();
        form.tags = String::new();

        let update = form.to_update();
        assert_eq!(update.images, ChildWrite::Clear);
        assert_eq!(update.tags, ChildWrite::Clear);
        assert_eq!(update.variants.to_create().len(), 2);
        assert_eq!(update.status, Some(ProductStatus::Active));
    }

    #[test]
    fn test_update_serializes_nested_writes() {
        let form = ProductForm::from_product(&headphones());
        let value = serde_json::to_value(form.to_update()).unwrap();
        assert_eq!(
            value["tags"],
            json!({ "deleteMany": {}, "create": [{ "name": "Audio" }, { "name": "Wireless" }] })
        );
        assert_eq!(value["variants"]["create"][1]["sku"], json!(null));
    }

    #[test]
    fn test_option_without_values_is_rejected() {
        let mut form = ProductForm::from_product(&headphones());
        form.options.push(OptionField {
            name: "Color".to_owned(),
            values: vec![" ".to_owned()],
        });
        assert!(form.validate().unwrap_err().has("options[0].values"));
    }

    #[test]
    fn test_form_posts_deserialize_with_missing_fields() {
        let form: ProductForm = serde_json::from_value(json!({ "title": "Mug" })).unwrap();
        assert!(form.variants.is_empty());
        assert_eq!(
            form.validate().unwrap_err().errors().last().unwrap().message,
            crate::validation::VARIANTS_REQUIRED
        );
    }
}
