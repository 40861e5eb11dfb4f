use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::catalog::Product;
use crate::db::PersistenceError;

/// Storage contract for catalog products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, oldest first
    async fn list(&self) -> Result<Vec<Product>, PersistenceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, PersistenceError>;

    /// Products whose ids are in `ids`; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, PersistenceError>;

    async fn insert(&self, product: &Product) -> Result<(), PersistenceError>;

    /// Replace a stored product; `false` when no product has that id
    async fn update(&self, product: &Product) -> Result<bool, PersistenceError>;

    /// `false` when no product has that id
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;
}

const PRODUCT_COLUMNS: &str = "id, name, description, category, retail_price, wholesale_price, \
     minimum_wholesale_quantity, stock_quantity, in_stock, featured, image, images, benefits, \
     ingredients, created_at, updated_at";

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new PgProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> Result<Vec<Product>, PersistenceError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY created_at, id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, PersistenceError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, PersistenceError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ANY($1)",
            PRODUCT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, retail_price, wholesale_price,
                minimum_wholesale_quantity, stock_quantity, in_stock, featured, image, images,
                benefits, ingredients, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.retail_price)
        .bind(product.wholesale_price)
        .bind(product.minimum_wholesale_quantity)
        .bind(product.stock_quantity)
        .bind(product.in_stock)
        .bind(product.featured)
        .bind(&product.image)
        .bind(&product.images)
        .bind(&product.benefits)
        .bind(&product.ingredients)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => PersistenceError::Duplicate {
                entity: "product",
                id: product.id.clone(),
            },
            other => other.into(),
        })?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, category = $4, retail_price = $5,
                wholesale_price = $6, minimum_wholesale_quantity = $7, stock_quantity = $8,
                in_stock = $9, featured = $10, image = $11, images = $12, benefits = $13,
                ingredients = $14, updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.retail_price)
        .bind(product.wholesale_price)
        .bind(product.minimum_wholesale_quantity)
        .bind(product.stock_quantity)
        .bind(product.in_stock)
        .bind(product.featured)
        .bind(&product.image)
        .bind(&product.images)
        .bind(&product.benefits)
        .bind(&product.ingredients)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Process-local product repository, used without a database and in tests
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, PersistenceError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, PersistenceError> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, PersistenceError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(PersistenceError::Duplicate {
                entity: "product",
                id: product.id.clone(),
            });
        }
        products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, PersistenceError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed::default_products;
    use chrono::Utc;

    #[tokio::test]
    async fn test_in_memory_crud() {
        let repo = InMemoryProductRepository::new();
        let mut products = default_products(Utc::now());
        let serum = products.remove(0);

        repo.insert(&serum).await.unwrap();
        assert!(matches!(
            repo.insert(&serum).await,
            Err(PersistenceError::Duplicate { .. })
        ));

        let mut renamed = serum.clone();
        renamed.name = "Vitamin C Serum 30ml".to_string();
        assert!(repo.update(&renamed).await.unwrap());
        assert_eq!(repo.find_by_id("prod_1").await.unwrap().unwrap().name, "Vitamin C Serum 30ml");

        assert!(repo.delete("prod_1").await.unwrap());
        assert!(!repo.delete("prod_1").await.unwrap());
        assert!(repo.find_by_id("prod_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let repo = InMemoryProductRepository::with_products(default_products(Utc::now()));
        let found = repo
            .find_by_ids(&["prod_1".to_string(), "prod_404".to_string(), "prod_3".to_string()])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["prod_1", "prod_3"]);
    }
}
