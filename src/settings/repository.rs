use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::db::PersistenceError;
use crate::settings::AdminSettings;

/// Storage contract for the single settings record
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored settings, `None` until the admin saves them once
    async fn get(&self) -> Result<Option<AdminSettings>, PersistenceError>;

    async fn save(&self, settings: &AdminSettings) -> Result<(), PersistenceError>;

    /// Stored settings or the built-in defaults
    async fn load(&self) -> Result<AdminSettings, PersistenceError> {
        Ok(self.get().await?.unwrap_or_default())
    }
}

/// PostgreSQL-backed settings stored as one JSONB document
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    /// Create a new PgSettingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get(&self) -> Result<Option<AdminSettings>, PersistenceError> {
        let document: Option<Json<AdminSettings>> =
            sqlx::query_scalar("SELECT document FROM store_settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(document.map(|Json(settings)| settings))
    }

    async fn save(&self, settings: &AdminSettings) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO store_settings (id, document, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()
            "#,
        )
        .bind(Json(settings))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Process-local settings record
#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<Option<AdminSettings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AdminSettings) -> Self {
        Self {
            settings: RwLock::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get(&self) -> Result<Option<AdminSettings>, PersistenceError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: &AdminSettings) -> Result<(), PersistenceError> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }
}
