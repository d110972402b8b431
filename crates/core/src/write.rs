//! Wire payloads for creating and updating products.
//!
//! # Nested writes
//!
//! A product update carries one instruction per child collection (images,
//! variants, tags). On the wire an instruction looks like:
//!
//! ```json
//! { "deleteMany": {}, "create": [ { "src": "/a.jpg", "alt": "" } ] }
//! ```
//!
//! Child collections are never merged. An instruction always deletes every
//! existing child row first, so child ids change on every update that touches
//! the collection. [`ChildWrite`] makes the three possible intents explicit:
//!
//! | wire value                              | intent                    |
//! |-----------------------------------------|---------------------------|
//! | field absent or `null`                  | [`ChildWrite::Keep`]      |
//! | `[]` or `{ "deleteMany": {} }`          | [`ChildWrite::Clear`]     |
//! | `[..]` or `{ "deleteMany": {}, "create": [..] }` | [`ChildWrite::Replace`] |
//!
//! A `create` list without `deleteMany` is rejected: appending children is not
//! a supported operation.

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::ProductStatus;

/// Instruction for one child collection of a product update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildWrite<T> {
    /// Leave existing children untouched.
    Keep,
    /// Delete every existing child.
    Clear,
    /// Delete every existing child, then create these (never empty).
    Replace(Vec<T>),
}

impl<T> Default for ChildWrite<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> ChildWrite<T> {
    /// Build an instruction from the full desired child list.
    ///
    /// An empty list means "no children", not "leave alone".
    #[must_use]
    pub fn from_desired(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Clear
        } else {
            Self::Replace(items)
        }
    }

    /// Whether this instruction leaves the collection untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Whether existing child rows must be deleted.
    #[must_use]
    pub const fn deletes_existing(&self) -> bool {
        !self.is_keep()
    }

    /// Rows to create after the delete (empty for `Keep` and `Clear`).
    #[must_use]
    pub fn to_create(&self) -> &[T] {
        match self {
            Self::Replace(items) => items,
            Self::Keep | Self::Clear => &[],
        }
    }

    /// Transform the rows to create.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ChildWrite<U> {
        match self {
            Self::Keep => ChildWrite::Keep,
            Self::Clear => ChildWrite::Clear,
            Self::Replace(items) => ChildWrite::from_desired(items.into_iter().map(f).collect()),
        }
    }
}

/// Marker object for `"deleteMany": {}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteAll {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NestedWriteOut<'a, T> {
    delete_many: DeleteAll,
    create: &'a [T],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NestedWriteIn<T> {
    delete_many: Option<DeleteAll>,
    #[serde(default = "Vec::new")]
    create: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChildWriteRepr<T> {
    List(Vec<T>),
    Nested(NestedWriteIn<T>),
}

impl<T: Serialize> Serialize for ChildWrite<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Keep => serializer.serialize_none(),
            Self::Clear | Self::Replace(_) => NestedWriteOut {
                delete_many: DeleteAll {},
                create: self.to_create(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ChildWrite<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = Option::<ChildWriteRepr<T>>::deserialize(deserializer)?;
        match repr {
            None => Ok(Self::Keep),
            Some(ChildWriteRepr::List(items)) => Ok(Self::from_desired(items)),
            Some(ChildWriteRepr::Nested(nested)) => {
                if nested.delete_many.is_none() {
                    return Err(D::Error::custom(
                        "nested write must include \"deleteMany\": {}; appending children is not supported",
                    ));
                }
                Ok(Self::from_desired(nested.create))
            }
        }
    }
}

/// An image to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// A variant to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    #[serde(default)]
    pub title: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i32>,
}

/// A tag to create. Accepts either `"name"` or `{ "name": "name" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTag {
    pub name: String,
}

impl<'de> Deserialize<'de> for NewTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Object { name: String },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(name) | Repr::Object { name } => Self { name },
        })
    }
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub images: Vec<NewImage>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
    #[serde(default)]
    pub tags: Vec<NewTag>,
}

impl ProductCreate {
    /// Trim text fields and drop blank images and tags.
    ///
    /// Call after validation; the result is what gets persisted.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_owned(),
            body_html: self.body_html.trim().to_owned(),
            vendor: self.vendor.trim().to_owned(),
            product_type: non_blank(self.product_type),
            status: self.status,
            images: normalize_images(self.images),
            variants: self.variants.into_iter().map(normalize_variant).collect(),
            tags: normalize_tags(self.tags),
        }
    }
}

/// Body of `PUT /api/products/{id}`.
///
/// Scalar fields are optional: `None` keeps the stored value. `product_type`
/// set to a blank string clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "ChildWrite::is_keep")]
    pub images: ChildWrite<NewImage>,
    #[serde(default, skip_serializing_if = "ChildWrite::is_keep")]
    pub variants: ChildWrite<NewVariant>,
    #[serde(default, skip_serializing_if = "ChildWrite::is_keep")]
    pub tags: ChildWrite<NewTag>,
}

impl ProductUpdate {
    /// Trim text fields and drop blank images and tags.
    ///
    /// Dropping blanks can turn a `Replace` into a `Clear`, never into `Keep`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|s| s.trim().to_owned()),
            body_html: self.body_html.map(|s| s.trim().to_owned()),
            vendor: self.vendor.map(|s| s.trim().to_owned()),
            product_type: self.product_type.map(|s| s.trim().to_owned()),
            status: self.status,
            images: match self.images {
                ChildWrite::Replace(items) => ChildWrite::from_desired(normalize_images(items)),
                other => other,
            },
            variants: self.variants.map(normalize_variant),
            tags: match self.tags {
                ChildWrite::Replace(items) => ChildWrite::from_desired(normalize_tags(items)),
                other => other,
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn normalize_images(images: Vec<NewImage>) -> Vec<NewImage> {
    images
        .into_iter()
        .filter(|img| !img.src.trim().is_empty())
        .map(|img| NewImage {
            src: img.src.trim().to_owned(),
            alt: img.alt.trim().to_owned(),
        })
        .collect()
}

fn normalize_variant(variant: NewVariant) -> NewVariant {
    NewVariant {
        title: non_blank(variant.title),
        price: variant.price,
        sku: non_blank(variant.sku),
        inventory_quantity: Some(variant.inventory_quantity.unwrap_or(0)),
    }
}

fn normalize_tags(tags: Vec<NewTag>) -> Vec<NewTag> {
    let mut seen = Vec::<String>::with_capacity(tags.len());
    for tag in tags {
        let name = tag.name.trim();
        if !name.is_empty() && !seen.iter().any(|s| s == name) {
            seen.push(name.to_owned());
        }
    }
    seen.into_iter().map(|name| NewTag { name }).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn update(value: serde_json::Value) -> ProductUpdate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_and_null_keep_children() {
        assert_eq!(update(json!({})).images, ChildWrite::Keep);
        assert_eq!(update(json!({ "tags": null })).tags, ChildWrite::Keep);
    }

    #[test]
    fn test_empty_list_clears_children() {
        assert_eq!(update(json!({ "images": [] })).images, ChildWrite::Clear);
        assert_eq!(
            update(json!({ "tags": { "deleteMany": {} } })).tags,
            ChildWrite::Clear
        );
        assert_eq!(
            update(json!({ "tags": { "deleteMany": {}, "create": [] } })).tags,
            ChildWrite::Clear
        );
    }

    #[test]
    fn test_nested_instruction_replaces_children() {
        let parsed = update(json!({
            "images": { "deleteMany": {}, "create": [{ "src": "/a.jpg", "alt": "A" }] }
        }));
        assert_eq!(
            parsed.images,
            ChildWrite::Replace(vec![NewImage {
                src: "/a.jpg".to_owned(),
                alt: "A".to_owned(),
            }])
        );
    }

    #[test]
    fn test_bare_list_replaces_children() {
        let parsed = update(json!({ "tags": ["sale", { "name": "new" }] }));
        assert_eq!(
            parsed.tags.to_create(),
            &[
                NewTag {
                    name: "sale".to_owned()
                },
                NewTag {
                    name: "new".to_owned()
                }
            ]
        );
    }

    #[test]
    fn test_create_without_delete_many_is_rejected() {
        let result = serde_json::from_value::<ProductUpdate>(json!({
            "images": { "create": [{ "src": "/a.jpg" }] }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_to_nested_write_shape() {
        let payload = ProductUpdate {
            title: Some("Mug".to_owned()),
            tags: ChildWrite::Replace(vec![NewTag {
                name: "Kitchen".to_owned(),
            }]),
            images: ChildWrite::Clear,
            ..ProductUpdate::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Mug",
                "images": { "deleteMany": {}, "create": [] },
                "tags": { "deleteMany": {}, "create": [{ "name": "Kitchen" }] }
            })
        );
    }

    #[test]
    fn test_normalizing_blank_images_turns_replace_into_clear() {
        let normalized = update(json!({ "images": [{ "src": "   " }] })).normalized();
        assert_eq!(normalized.images, ChildWrite::Clear);
    }

    #[test]
    fn test_create_normalization_trims_and_defaults() {
        let create: ProductCreate = serde_json::from_value(json!({
            "title": "  Coffee Mug ",
            "body_html": "Ceramic coffee mug with 350ml capacity, dishwasher safe and sturdy.",
            "vendor": " Kitchenware Co ",
            "product_type": "  ",
            "images": [{ "src": " /images/mug1.jpg " }, { "src": "" }],
            "variants": [{ "price": 250, "sku": " " }],
            "tags": ["Kitchen", " Kitchen ", ""]
        }))
        .unwrap();

        let normalized = create.normalized();
        assert_eq!(normalized.title, "Coffee Mug");
        assert_eq!(normalized.vendor, "Kitchenware Co");
        assert_eq!(normalized.product_type, None);
        assert_eq!(normalized.images.len(), 1);
        assert_eq!(normalized.images[0].src, "/images/mug1.jpg");
        assert_eq!(normalized.variants[0].sku, None);
        assert_eq!(normalized.variants[0].inventory_quantity, Some(0));
        assert_eq!(normalized.tags.len(), 1);
    }
}
