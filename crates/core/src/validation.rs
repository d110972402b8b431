//! The product and supplier validation contract.
//!
//! One set of rules, consumed by the admin product form, `POST /api/products`
//! and `PUT /api/products/{id}`. The rules are data ([`TextRule`] tables plus
//! the variant and image constraints) so every entry point reports the same
//! message for the same problem.
//!
//! Updates only check what they carry: a missing `title` keeps the stored
//! one, but a present blank `title` is rejected exactly like on create.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::form::ProductForm;
use crate::types::{Price, PriceError};
use crate::write::{ChildWrite, NewImage, NewVariant, ProductCreate, ProductUpdate};

/// Minimum description length, in characters, after trimming.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Minimum number of variants a product must have.
pub const MIN_VARIANTS: usize = 1;

/// Constraint on a single text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCheck {
    /// Non-empty after trimming.
    Required,
    /// At least this many characters after trimming.
    MinChars(usize),
}

impl TextCheck {
    /// Whether `value` satisfies the constraint.
    #[must_use]
    pub fn passes(self, value: &str) -> bool {
        let trimmed = value.trim();
        match self {
            Self::Required => !trimmed.is_empty(),
            Self::MinChars(min) => trimmed.chars().count() >= min,
        }
    }
}

/// A named text field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRule {
    pub field: &'static str,
    pub check: TextCheck,
    pub message: &'static str,
}

/// Text rules for products, in reporting order.
pub const PRODUCT_TEXT_RULES: &[TextRule] = &[
    TextRule {
        field: "title",
        check: TextCheck::Required,
        message: "Title is required",
    },
    TextRule {
        field: "body_html",
        check: TextCheck::MinChars(MIN_DESCRIPTION_CHARS),
        message: "Description must be at least 50 characters",
    },
    TextRule {
        field: "vendor",
        check: TextCheck::Required,
        message: "Vendor is required",
    },
];

/// Text rules for suppliers.
pub const SUPPLIER_TEXT_RULES: &[TextRule] = &[
    TextRule {
        field: "name",
        check: TextCheck::Required,
        message: "Name is required",
    },
    TextRule {
        field: "contact",
        check: TextCheck::Required,
        message: "Contact is required",
    },
    TextRule {
        field: "address",
        check: TextCheck::Required,
        message: "Address is required",
    },
];

pub const VARIANTS_REQUIRED: &str = "At least one variant is required";
pub const PRICE_TOO_LOW: &str = "Price must be at least 0.01";
pub const PRICE_TOO_HIGH: &str = "Price must be at most 9999999999.99";
pub const PRICE_TOO_PRECISE: &str = "Price can have at most two decimal places";
pub const IMAGE_SRC_INVALID: &str = "Image must be a valid URL";
pub const OPTION_VALUES_REQUIRED: &str = "At least one value required";

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path, e.g. `title` or `variants[1].price`.
    pub field: String,
    pub message: &'static str,
}

/// Every rule a submission failed, in reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", self.message())]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record a failure.
    pub fn push(&mut self, field: impl Into<String>, message: &'static str) {
        self.0.push(FieldError {
            field: field.into(),
            message,
        });
    }

    /// Message of the first failure, used as the API's `error` string.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.0.first().map_or("Invalid input", |e| e.message)
    }

    /// All failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether the failures include one for `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Types checked against the contract.
pub trait Validate {
    /// Check every rule.
    ///
    /// # Errors
    ///
    /// Returns all failed rules, in reporting order.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Apply `rules` to the fields `lookup` yields. Fields it returns `None` for
/// are skipped.
fn check_text<'a>(
    errors: &mut ValidationErrors,
    rules: &[TextRule],
    lookup: impl Fn(&str) -> Option<&'a str>,
) {
    for rule in rules {
        if let Some(value) = lookup(rule.field)
            && !rule.check.passes(value)
        {
            errors.push(rule.field, rule.message);
        }
    }
}

fn check_variant_prices(errors: &mut ValidationErrors, prices: impl Iterator<Item = Decimal>) {
    let mut count = 0usize;
    for (index, price) in prices.enumerate() {
        count += 1;
        if let Err(e) = Price::new(price) {
            let message = match e {
                PriceError::BelowMinimum => PRICE_TOO_LOW,
                PriceError::AboveMaximum => PRICE_TOO_HIGH,
                PriceError::TooPrecise => PRICE_TOO_PRECISE,
            };
            errors.push(format!("variants[{index}].price"), message);
        }
    }
    if count < MIN_VARIANTS {
        errors.push("variants", VARIANTS_REQUIRED);
    }
}

fn check_images<'a>(errors: &mut ValidationErrors, sources: impl Iterator<Item = &'a str>) {
    for (index, src) in sources.enumerate() {
        let src = src.trim();
        // Blank rows are dropped before persisting.
        if !src.is_empty() && !is_image_url(src) {
            errors.push(format!("images[{index}].src"), IMAGE_SRC_INVALID);
        }
    }
}

/// Whether `src` can be used as an image source.
///
/// Accepts absolute `http`/`https` URLs, root-relative paths such as
/// `/images/mug1.jpg` (what the seed data uses), and `data:image/...` URLs
/// produced by the form's file picker.
#[must_use]
pub fn is_image_url(src: &str) -> bool {
    if src.starts_with('/') && !src.starts_with("//") {
        return !src.chars().any(char::is_whitespace);
    }
    if src.starts_with("data:image/") {
        return true;
    }
    url::Url::parse(src).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

fn product_field<'a>(title: &'a str, body_html: &'a str, vendor: &'a str) -> impl Fn(&str) -> Option<&'a str> {
    move |field| match field {
        "title" => Some(title),
        "body_html" => Some(body_html),
        "vendor" => Some(vendor),
        _ => None,
    }
}

fn image_sources(images: &[NewImage]) -> impl Iterator<Item = &str> {
    images.iter().map(|img| img.src.as_str())
}

fn variant_prices(variants: &[NewVariant]) -> impl Iterator<Item = Decimal> + '_ {
    variants.iter().map(|v| v.price)
}

impl Validate for ProductCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(
            &mut errors,
            PRODUCT_TEXT_RULES,
            product_field(&self.title, &self.body_html, &self.vendor),
        );
        check_variant_prices(&mut errors, variant_prices(&self.variants));
        check_images(&mut errors, image_sources(&self.images));
        errors.into_result()
    }
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(&mut errors, PRODUCT_TEXT_RULES, |field| match field {
            "title" => self.title.as_deref(),
            "body_html" => self.body_html.as_deref(),
            "vendor" => self.vendor.as_deref(),
            _ => None,
        });
        match &self.variants {
            ChildWrite::Keep => {}
            write => check_variant_prices(&mut errors, variant_prices(write.to_create())),
        }
        check_images(&mut errors, image_sources(self.images.to_create()));
        errors.into_result()
    }
}

impl Validate for ProductForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(
            &mut errors,
            PRODUCT_TEXT_RULES,
            product_field(&self.title, &self.body_html, &self.vendor),
        );
        check_variant_prices(&mut errors, self.variants.iter().map(|v| v.price));
        check_images(&mut errors, self.images.iter().map(|img| img.src.as_str()));
        for (index, option) in self.options.iter().enumerate() {
            if !option.values.iter().any(|v| !v.trim().is_empty()) {
                errors.push(format!("options[{index}].values"), OPTION_VALUES_REQUIRED);
            }
        }
        errors.into_result()
    }
}

/// Body of supplier create and update requests.
///
/// On create all fields must be present; on update absent fields keep their
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct SupplierInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SupplierInput {
    fn lookup(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            "contact" => self.contact.as_deref(),
            "address" => self.address.as_deref(),
            _ => None,
        }
    }

    /// Check a supplier creation: every field present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns the failed presence rules.
    pub fn validate_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(&mut errors, SUPPLIER_TEXT_RULES, |field| {
            Some(self.lookup(field).unwrap_or(""))
        });
        errors.into_result()
    }

    /// Check a supplier update: present fields must be non-blank.
    ///
    /// # Errors
    ///
    /// Returns the failed presence rules.
    pub fn validate_update(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(&mut errors, SUPPLIER_TEXT_RULES, |field| self.lookup(field));
        errors.into_result()
    }

    /// Trim every present field.
    #[must_use]
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_owned());
        Self {
            name: trim(self.name),
            contact: trim(self.contact),
            address: trim(self.address),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_create() -> ProductCreate {
        serde_json::from_value(json!({
            "title": "Wireless Headphones",
            "body_html": "x".repeat(MIN_DESCRIPTION_CHARS),
            "vendor": "AudioTech",
            "variants": [{ "price": "29.99" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_description_boundary() {
        let mut create = valid_create();
        create.body_html = "x".repeat(49);
        let errors = create.validate().unwrap_err();
        assert_eq!(errors.message(), "Description must be at least 50 characters");

        create.body_html = "x".repeat(50);
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_description_counts_characters_not_bytes() {
        let mut create = valid_create();
        // 49 two-byte characters is still too short.
        create.body_html = "é".repeat(49);
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_price_boundary() {
        let mut create = valid_create();
        create.variants[0].price = Decimal::new(1, 2);
        assert!(create.validate().is_ok());

        create.variants[0].price = Decimal::ZERO;
        let errors = create.validate().unwrap_err();
        assert!(errors.has("variants[0].price"));

        create.variants[0].price = Decimal::new(-100, 2);
        assert_eq!(create.validate().unwrap_err().message(), PRICE_TOO_LOW);
    }

    #[test]
    fn test_price_must_fit_the_column() {
        let mut create = valid_create();
        create.variants[0].price = Decimal::new(999_999_999_999, 2);
        assert!(create.validate().is_ok());

        create.variants[0].price = Decimal::new(100_000_000_000, 0);
        assert_eq!(create.validate().unwrap_err().message(), PRICE_TOO_HIGH);

        create.variants[0].price = Decimal::new(14, 3);
        let errors = create.validate().unwrap_err();
        assert!(errors.has("variants[0].price"));
        assert_eq!(errors.message(), PRICE_TOO_PRECISE);
    }

    #[test]
    fn test_missing_fields_report_in_order() {
        let create: ProductCreate = serde_json::from_value(json!({})).unwrap();
        let errors = create.validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "body_html", "vendor", "variants"]);
        assert_eq!(errors.message(), "Title is required");
    }

    #[test]
    fn test_whitespace_title_is_rejected() {
        let mut create = valid_create();
        create.title = "   ".to_owned();
        assert!(create.validate().unwrap_err().has("title"));
    }

    #[test]
    fn test_image_sources() {
        assert!(is_image_url("https://cdn.example.com/a.jpg"));
        assert!(is_image_url("/images/mug1.jpg"));
        assert!(is_image_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_image_url("not a url"));
        assert!(!is_image_url("ftp://example.com/a.jpg"));
        assert!(!is_image_url("//evil.example/a.jpg"));
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        assert!(ProductUpdate::default().validate().is_ok());

        let update: ProductUpdate = serde_json::from_value(json!({ "vendor": "" })).unwrap();
        assert!(update.validate().unwrap_err().has("vendor"));
    }

    #[test]
    fn test_update_cannot_clear_variants() {
        let update: ProductUpdate = serde_json::from_value(json!({ "variants": [] })).unwrap();
        assert_eq!(update.validate().unwrap_err().message(), VARIANTS_REQUIRED);
    }

    #[test]
    fn test_update_checks_replacement_prices() {
        let update: ProductUpdate = serde_json::from_value(json!({
            "variants": { "deleteMany": {}, "create": [{ "price": 0 }] }
        }))
        .unwrap();
        assert!(update.validate().unwrap_err().has("variants[0].price"));
    }

    #[test]
    fn test_supplier_create_requires_all_fields() {
        let input = SupplierInput {
            name: Some("Acme".to_owned()),
            ..SupplierInput::default()
        };
        let errors = input.validate_create().unwrap_err();
        assert!(errors.has("contact"));
        assert!(errors.has("address"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn test_supplier_update_allows_partial() {
        let input = SupplierInput {
            address: Some("12 Rizal Ave".to_owned()),
            ..SupplierInput::default()
        };
        assert!(input.validate_update().is_ok());
    }
}
