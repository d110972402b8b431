//! Product repository.
//!
//! Products are read in two steps: the filtered product rows, then every
//! child row for those products in one query per child table. Writes run in a
//! single transaction; child collections are replaced, never merged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use simple_shop_core::write::{ChildWrite, NewImage, NewTag, NewVariant, ProductCreate, ProductUpdate};
use simple_shop_core::{Image, Product, ProductFilter, ProductId, ProductStatus, Tag, Variant};

use super::RepositoryError;

/// Filter predicate shared by the listing and count queries.
///
/// `$1` title pattern, `$2` tag name, `$3` collection, `$4` status.
const FILTER_PREDICATE: &str = r"
    ($1::text IS NULL OR p.title ILIKE $1)
    AND ($2::text IS NULL OR EXISTS (
        SELECT 1 FROM catalog.tag t WHERE t.product_id = p.id AND t.name = $2
    ))
    AND ($3::text IS NULL OR COALESCE(p.product_type, 'Uncategorized') = $3)
    AND ($4::catalog.product_status IS NULL OR p.status = $4)
";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    body_html: String,
    vendor: String,
    product_type: Option<String>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
}

/// One collection (distinct product type) with its product count.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CollectionSummary {
    pub product_type: Option<String>,
    pub product_count: i64,
}

/// Catalog totals for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogCounts {
    pub products: i64,
    pub active_products: i64,
    pub variants: i64,
    pub suppliers: i64,
}

/// Escape `q` for use inside an `ILIKE` pattern and wrap it in wildcards.
fn contains_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// `limit` of `None` returns every match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT p.id, p.title, p.body_html, p.vendor, p.product_type, p.status, p.created_at
             FROM catalog.product p
             WHERE {FILTER_PREDICATE}
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $5 OFFSET $6"
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.q.as_deref().map(contains_pattern))
            .bind(filter.tag.as_deref())
            .bind(filter.product_type.as_deref())
            .bind(filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        self.with_children(rows).await
    }

    /// Count products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM catalog.product p WHERE {FILTER_PREDICATE}");

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.q.as_deref().map(contains_pattern))
            .bind(filter.tag.as_deref())
            .bind(filter.product_type.as_deref())
            .bind(filter.status)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Get a product with its images, variants and tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, body_html, vendor, product_type, status, created_at
            FROM catalog.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.with_children(vec![row]).await?.into_iter().next())
    }

    /// Create a product and its children in one transaction.
    ///
    /// Expects a validated, normalized payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create(&self, input: &ProductCreate) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO catalog.product (title, body_html, vendor, product_type, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&input.title)
        .bind(&input.body_html)
        .bind(&input.vendor)
        .bind(input.product_type.as_deref())
        .bind(input.status.unwrap_or_default())
        .fetch_one(&mut *tx)
        .await?;

        insert_images(&mut tx, id, &input.images).await?;
        insert_variants(&mut tx, id, &input.variants).await?;
        insert_tags(&mut tx, id, &input.tags).await?;

        tx.commit().await?;
        tracing::info!(product_id = %id, "Product created");

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply an update: scalar fields plus one nested-write instruction per
    /// child collection, all in one transaction.
    ///
    /// Expects a validated, normalized payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in either case.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_scalar::<_, ProductId>(
            r"
            UPDATE catalog.product SET
                title = COALESCE($2, title),
                body_html = COALESCE($3, body_html),
                vendor = COALESCE($4, vendor),
                product_type = CASE WHEN $5::text IS NULL THEN product_type ELSE NULLIF($5, '') END,
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.body_html.as_deref())
        .bind(input.vendor.as_deref())
        .bind(input.product_type.as_deref())
        .bind(input.status)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }

        if clear_for_write(&mut tx, ChildTable::Image, id, &input.images).await? {
            insert_images(&mut tx, id, input.images.to_create()).await?;
        }
        if clear_for_write(&mut tx, ChildTable::Variant, id, &input.variants).await? {
            insert_variants(&mut tx, id, input.variants.to_create()).await?;
        }
        if clear_for_write(&mut tx, ChildTable::Tag, id, &input.tags).await? {
            insert_tags(&mut tx, id, input.tags.to_create()).await?;
        }

        tx.commit().await?;
        tracing::info!(product_id = %id, "Product updated");

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product; its children go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Distinct product types of active products, with counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn collections(&self) -> Result<Vec<CollectionSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CollectionSummary>(
            r"
            SELECT product_type, COUNT(*) AS product_count
            FROM catalog.product
            WHERE status = 'active'
            GROUP BY product_type
            ORDER BY product_type NULLS LAST
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Distinct tag names on active products, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tag_names(&self) -> Result<Vec<String>, RepositoryError> {
        let names = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT t.name
            FROM catalog.tag t
            JOIN catalog.product p ON p.id = t.product_id
            WHERE p.status = 'active'
            ORDER BY t.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(names)
    }

    /// Totals for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<CatalogCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, CatalogCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM catalog.product) AS products,
                (SELECT COUNT(*) FROM catalog.product WHERE status = 'active') AS active_products,
                (SELECT COUNT(*) FROM catalog.variant) AS variants,
                (SELECT COUNT(*) FROM catalog.supplier) AS suppliers
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Load children for `rows` and assemble products, keeping row order.
    async fn with_children(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();

        let images = sqlx::query_as::<_, Image>(
            "SELECT id, product_id, src, alt FROM catalog.image WHERE product_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let variants = sqlx::query_as::<_, Variant>(
            r"
            SELECT id, product_id, title, price, sku, inventory_quantity
            FROM catalog.variant
            WHERE product_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, product_id, name FROM catalog.tag WHERE product_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut images = group_by_product(images, |i| i.product_id);
        let mut variants = group_by_product(variants, |v| v.product_id);
        let mut tags = group_by_product(tags, |t| t.product_id);

        Ok(rows
            .into_iter()
            .map(|row| Product {
                images: images.remove(&row.id).unwrap_or_default(),
                variants: variants.remove(&row.id).unwrap_or_default(),
                tags: tags.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                body_html: row.body_html,
                vendor: row.vendor,
                product_type: row.product_type,
                status: row.status,
                created_at: row.created_at,
            })
            .collect())
    }
}

fn group_by_product<T>(
    items: Vec<T>,
    key: impl Fn(&T) -> ProductId,
) -> HashMap<ProductId, Vec<T>> {
    let mut grouped: HashMap<ProductId, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(key(&item)).or_default().push(item);
    }
    grouped
}

/// Child tables replaced by nested writes.
#[derive(Debug, Clone, Copy)]
enum ChildTable {
    Image,
    Variant,
    Tag,
}

impl ChildTable {
    const fn delete_sql(self) -> &'static str {
        match self {
            Self::Image => "DELETE FROM catalog.image WHERE product_id = $1",
            Self::Variant => "DELETE FROM catalog.variant WHERE product_id = $1",
            Self::Tag => "DELETE FROM catalog.tag WHERE product_id = $1",
        }
    }
}

/// Delete every child row of `id` in `table` when `write` asks for it.
///
/// Returns whether the caller should insert `write.to_create()`.
async fn clear_for_write<T>(
    conn: &mut PgConnection,
    table: ChildTable,
    id: ProductId,
    write: &ChildWrite<T>,
) -> Result<bool, RepositoryError> {
    if !write.deletes_existing() {
        return Ok(false);
    }

    let deleted = sqlx::query(table.delete_sql())
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    tracing::debug!(
        product_id = %id,
        ?table,
        deleted,
        created = write.to_create().len(),
        "Replacing child rows"
    );
    Ok(true)
}

async fn insert_images(
    conn: &mut PgConnection,
    id: ProductId,
    images: &[NewImage],
) -> Result<(), RepositoryError> {
    for image in images {
        sqlx::query("INSERT INTO catalog.image (product_id, src, alt) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&image.src)
            .bind(&image.alt)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_variants(
    conn: &mut PgConnection,
    id: ProductId,
    variants: &[NewVariant],
) -> Result<(), RepositoryError> {
    for variant in variants {
        sqlx::query(
            r"
            INSERT INTO catalog.variant (product_id, title, price, sku, inventory_quantity)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(variant.title.as_deref())
        .bind(variant.price)
        .bind(variant.sku.as_deref())
        .bind(variant.inventory_quantity.unwrap_or(0))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_tags(
    conn: &mut PgConnection,
    id: ProductId,
    tags: &[NewTag],
) -> Result<(), RepositoryError> {
    for tag in tags {
        sqlx::query("INSERT INTO catalog.tag (product_id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(&tag.name)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
