//! # Client Directory
//!
//! Client lookup and creation. Order creation resolves its client through
//! [`resolve_client_in`] so a new client is only kept if the order commits.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::ServiceResult;
use crate::repository::client;
use dairy_core::order::ClientLookup;
use dairy_core::validation::{normalize_email, validate_client_name, validate_email};
use dairy_core::{new_id, Client, CoreError, NewClient};

#[derive(Debug, Clone)]
pub struct ClientDirectory {
    pool: SqlitePool,
}

impl ClientDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        ClientDirectory { pool }
    }

    /// Gets a client, active or not.
    pub async fn get_client(&self, tenant_id: &str, id: &str) -> ServiceResult<Client> {
        client::find(&self.pool, tenant_id, id)
            .await?
            .ok_or_else(|| CoreError::ClientNotFound(id.to_string()).into())
    }

    /// Active client with this email, compared case-insensitively.
    pub async fn find_client_by_email(
        &self,
        tenant_id: &str,
        email: &str,
    ) -> ServiceResult<Option<Client>> {
        Ok(client::find_active_by_email(&self.pool, tenant_id, email).await?)
    }

    pub async fn create_client(&self, tenant_id: &str, input: &NewClient) -> ServiceResult<Client> {
        let mut conn = self.pool.acquire().await?;
        create_client_in(&mut conn, tenant_id, input).await
    }

    /// Soft delete.
    pub async fn deactivate_client(&self, tenant_id: &str, id: &str) -> ServiceResult<()> {
        if !client::deactivate(&self.pool, tenant_id, id, Utc::now()).await? {
            return Err(CoreError::ClientNotFound(id.to_string()).into());
        }
        info!(tenant_id = %tenant_id, client_id = %id, "Client deactivated");
        Ok(())
    }
}

pub async fn create_client_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    input: &NewClient,
) -> ServiceResult<Client> {
    validate_client_name(&input.name)?;
    let email = match input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) => {
            validate_email(email)?;
            Some(normalize_email(email))
        }
        None => None,
    };

    let now = Utc::now();
    let created = Client {
        id: new_id(),
        tenant_id: tenant_id.to_string(),
        name: input.name.trim().to_string(),
        email,
        phone: input.phone.clone(),
        is_active: true,
        total_purchases_cents: 0,
        created_at: now,
        updated_at: now,
    };

    client::insert(&mut *conn, &created).await?;

    info!(tenant_id = %tenant_id, client_id = %created.id, "Client created");
    Ok(created)
}

/// Finds or creates the ordering client.
///
/// ```text
/// ById(id)          → active client or ClientNotFound
/// ByEmail{email,..} → active match, else create (needs a name) or ClientRequired
/// Create(new)       → create
/// ```
pub async fn resolve_client_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    lookup: &ClientLookup,
) -> ServiceResult<Client> {
    match lookup {
        ClientLookup::ById(id) => client::find(&mut *conn, tenant_id, id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| CoreError::ClientNotFound(id.clone()).into()),

        ClientLookup::ByEmail { email, create } => {
            if let Some(found) = client::find_active_by_email(&mut *conn, tenant_id, email).await? {
                return Ok(found);
            }
            match create {
                Some(new_client) => create_client_in(conn, tenant_id, new_client).await,
                None => Err(CoreError::ClientRequired.into()),
            }
        }

        ClientLookup::Create(new_client) => create_client_in(conn, tenant_id, new_client).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, TENANT};
    use crate::ServiceError;

    fn asha() -> NewClient {
        NewClient {
            name: "Asha Patel".into(),
            email: Some("Asha@Example.com".into()),
            phone: Some("+91 98765 43210".into()),
        }
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let db = test_db().await;
        let created = db.clients().create_client(TENANT, &asha()).await.unwrap();
        assert_eq!(created.email.as_deref(), Some("asha@example.com"));

        let found = db
            .clients()
            .find_client_by_email(TENANT, "ASHA@example.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(db
            .clients()
            .find_client_by_email("tenant-other", "asha@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_deactivated_client_is_not_resolved() {
        let db = test_db().await;
        let created = db.clients().create_client(TENANT, &asha()).await.unwrap();
        db.clients().deactivate_client(TENANT, &created.id).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = resolve_client_in(&mut conn, TENANT, &ClientLookup::ById(created.id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::ClientNotFound(_))));

        let err = resolve_client_in(
            &mut conn,
            TENANT,
            &ClientLookup::ByEmail {
                email: "asha@example.com".into(),
                create: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(CoreError::ClientRequired)));
    }

    #[tokio::test]
    async fn test_email_miss_creates_client() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let lookup = ClientLookup::ByEmail {
            email: "ravi@example.com".into(),
            create: Some(NewClient {
                name: "Ravi".into(),
                email: Some("ravi@example.com".into()),
                phone: None,
            }),
        };
        let first = resolve_client_in(&mut conn, TENANT, &lookup).await.unwrap();
        let second = resolve_client_in(&mut conn, TENANT, &lookup).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_unknown_client_deactivate() {
        let db = test_db().await;
        assert!(matches!(
            db.clients().deactivate_client(TENANT, "missing").await,
            Err(ServiceError::Domain(CoreError::ClientNotFound(_)))
        ));
    }
}
