//! # Address Directory and Shipping Resolver
//!
//! Saved addresses for clients (admin console) and users (storefront), and
//! the shipping lookup used by order creation.
//!
//! ## Default Address Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Per owner, at most one address has is_default = 1.                    │
//! │                                                                         │
//! │  create (first address)      → becomes default                         │
//! │  create/update isDefault     → clear siblings, mark target   (one tx)  │
//! │  set_default                 → clear siblings, mark target   (one tx)  │
//! │  delete the default          → newest remaining becomes default        │
//! │                                                                         │
//! │  The schema's partial unique index rejects a second default, so a      │
//! │  bug here fails loudly instead of leaving two.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::repository::{address, client};
use crate::service::begin_write;
use dairy_core::order::ShippingChoice;
use dairy_core::validation::validate_address;
use dairy_core::{new_id, AddressInput, AddressOwner, ClientAddress, CoreError};

#[derive(Debug, Clone)]
pub struct AddressDirectory {
    pool: SqlitePool,
}

impl AddressDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        AddressDirectory { pool }
    }

    /// Default first, then newest.
    pub async fn list(&self, tenant_id: &str, owner: &AddressOwner) -> ServiceResult<Vec<ClientAddress>> {
        let mut conn = self.pool.acquire().await?;
        ensure_owner(&mut conn, tenant_id, owner).await?;
        Ok(address::list(&mut *conn, tenant_id, owner).await?)
    }

    pub async fn create(
        &self,
        tenant_id: &str,
        owner: &AddressOwner,
        input: &AddressInput,
    ) -> ServiceResult<ClientAddress> {
        let mut tx = begin_write(&self.pool).await?;
        ensure_owner(&mut tx, tenant_id, owner).await?;
        let created = create_address_in(&mut tx, tenant_id, owner, input).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Rewrites an address. `isDefault: true` makes it the default;
    /// `false` never unsets the current default.
    pub async fn update(
        &self,
        tenant_id: &str,
        owner: &AddressOwner,
        id: &str,
        input: &AddressInput,
    ) -> ServiceResult<ClientAddress> {
        validate_address(input)?;

        let mut tx = begin_write(&self.pool).await?;
        let mut existing = find_owned(&mut tx, tenant_id, owner, id).await?;

        existing.label = input.label.clone();
        existing.name = input.name.trim().to_string();
        existing.phone = input.phone.clone();
        existing.line1 = input.line1.trim().to_string();
        existing.line2 = input.line2.clone();
        existing.city = input.city.trim().to_string();
        existing.state = input.state.clone();
        existing.postal_code = input.postal_code.clone();
        existing.country = input.country.clone();
        existing.updated_at = Utc::now();

        address::update_fields(&mut *tx, &existing).await?;

        if input.is_default && !existing.is_default {
            make_default_in(&mut tx, tenant_id, owner, id).await?;
            existing.is_default = true;
        }

        tx.commit().await?;
        Ok(existing)
    }

    pub async fn set_default(
        &self,
        tenant_id: &str,
        owner: &AddressOwner,
        id: &str,
    ) -> ServiceResult<ClientAddress> {
        let mut tx = begin_write(&self.pool).await?;
        let mut target = find_owned(&mut tx, tenant_id, owner, id).await?;

        if !target.is_default {
            make_default_in(&mut tx, tenant_id, owner, id).await?;
            target.is_default = true;
        }

        tx.commit().await?;

        info!(tenant_id = %tenant_id, address_id = %id, "Default address set");
        Ok(target)
    }

    /// Deletes an address, promoting the newest remaining one if the
    /// default was removed.
    pub async fn delete(&self, tenant_id: &str, owner: &AddressOwner, id: &str) -> ServiceResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        let target = find_owned(&mut tx, tenant_id, owner, id).await?;

        address::delete(&mut *tx, tenant_id, id).await?;

        if target.is_default {
            if let Some(next) = address::most_recent_id(&mut *tx, tenant_id, owner).await? {
                address::mark_default(&mut *tx, tenant_id, &next, Utc::now()).await?;
                debug!(address_id = %next, "Promoted address to default");
            }
        }

        tx.commit().await?;

        info!(tenant_id = %tenant_id, address_id = %id, "Address deleted");
        Ok(())
    }
}

/// Client owners must exist in the tenant. User owners are trusted as given.
async fn ensure_owner(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    owner: &AddressOwner,
) -> ServiceResult<()> {
    if let AddressOwner::Client(client_id) = owner {
        if client::find(&mut *conn, tenant_id, client_id).await?.is_none() {
            return Err(CoreError::ClientNotFound(client_id.clone()).into());
        }
    }
    Ok(())
}

async fn find_owned(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    owner: &AddressOwner,
    id: &str,
) -> ServiceResult<ClientAddress> {
    address::find(&mut *conn, tenant_id, owner, id)
        .await?
        .ok_or_else(|| CoreError::AddressNotFound(id.to_string()).into())
}

async fn make_default_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    owner: &AddressOwner,
    id: &str,
) -> ServiceResult<()> {
    let now = Utc::now();
    address::clear_default(&mut *conn, tenant_id, owner, now).await?;
    address::mark_default(&mut *conn, tenant_id, id, now).await?;
    Ok(())
}

/// Inserts an address. The owner's first address is always the default.
pub async fn create_address_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    owner: &AddressOwner,
    input: &AddressInput,
) -> ServiceResult<ClientAddress> {
    validate_address(input)?;

    let existing = address::count(&mut *conn, tenant_id, owner).await?;
    let is_default = existing == 0 || input.is_default;

    let now = Utc::now();
    if is_default && existing > 0 {
        address::clear_default(&mut *conn, tenant_id, owner, now).await?;
    }

    let (client_id, user_id) = match owner {
        AddressOwner::Client(id) => (Some(id.clone()), None),
        AddressOwner::User(id) => (None, Some(id.clone())),
    };

    let created = ClientAddress {
        id: new_id(),
        tenant_id: tenant_id.to_string(),
        client_id,
        user_id,
        label: input.label.clone(),
        is_default,
        name: input.name.trim().to_string(),
        phone: input.phone.clone(),
        line1: input.line1.trim().to_string(),
        line2: input.line2.clone(),
        city: input.city.trim().to_string(),
        state: input.state.clone(),
        postal_code: input.postal_code.clone(),
        country: input.country.clone(),
        created_at: now,
        updated_at: now,
    };

    address::insert(&mut *conn, &created).await?;

    debug!(address_id = %created.id, is_default, "Address created");
    Ok(created)
}

/// Resolves the shipping address of a new order.
///
/// A saved id must belong to the client. An inline payload is stored as a
/// new address of the client, default only if it is the client's first.
pub async fn resolve_shipping_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    client_id: &str,
    choice: &ShippingChoice,
) -> ServiceResult<ClientAddress> {
    let owner = AddressOwner::Client(client_id.to_string());

    match choice {
        ShippingChoice::Saved(id) => find_owned(conn, tenant_id, &owner, id).await,
        ShippingChoice::Inline(input) => {
            let input = AddressInput {
                is_default: false,
                ..input.clone()
            };
            create_address_in(conn, tenant_id, &owner, &input).await
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
