use crate::error::{Error, Result};
use crate::models::tenant::Tenant;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Master pool plus a lazily-populated cache of per-tenant pools. The cache
/// is read-mostly; the write lock is taken only on first contact with a
/// tenant.
#[derive(Clone)]
pub struct ConnectionManager {
    master: PgPool,
    tenants: Arc<RwLock<HashMap<String, PgPool>>>,
}

impl ConnectionManager {
    pub async fn connect(master_url: &str) -> Result<Self> {
        let master = connect_pool(master_url).await?;
        Ok(Self {
            master,
            tenants: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn master(&self) -> PgPool {
        self.master.clone()
    }

    /// Resolves a tenant key to its database pool, connecting and running
    /// tenant migrations on first use.
    pub async fn tenant_db(&self, key: &str) -> Result<PgPool> {
        {
            let cache = self.tenants.read().await;
            if let Some(pool) = cache.get(key) {
                return Ok(pool.clone());
            }
        }

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"SELECT id, key, name, database_url, is_active, created_at, updated_at
               FROM tenants WHERE key = $1 AND is_active = TRUE"#,
        )
        .bind(key)
        .fetch_optional(&self.master)
        .await?
        .ok_or_else(|| Error::UnknownTenant(key.to_string()))?;

        let pool = connect_pool(&tenant.database_url).await?;
        sqlx::migrate!("./migrations/tenant")
            .run(&pool)
            .await
            .map_err(|e| Error::Internal(format!("Tenant migration failed: {}", e)))?;
        tracing::info!(tenant = %key, "connected tenant database");

        let mut cache = self.tenants.write().await;
        // Another request may have raced us here; keep the first pool.
        let pool = cache.entry(key.to_string()).or_insert(pool).clone();
        Ok(pool)
    }

    pub async fn run_master_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations/master")
            .run(&self.master)
            .await
            .map_err(|e| Error::Internal(format!("Master migration failed: {}", e)))?;
        Ok(())
    }
}

async fn connect_pool(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(url)
        .await?;
    Ok(pool)
}
