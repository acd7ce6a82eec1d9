use super::{DeviceRepository, Upserted};
use crate::error::AppError;
use crate::model::{Device, DevicePatch, DeviceReplace};
use crate::page::{DeviceFilter, Page, PageRequest};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres, Row};
use uuid::Uuid;

/// PostgreSQL-backed repository. Mutations lock the row with `SELECT ... FOR UPDATE`,
/// apply the domain rules and write within one transaction.
#[derive(Clone, Debug)]
pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        PgDeviceRepository { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn device_from_row(row: &PgRow) -> Result<Device, sqlx::Error> {
    Ok(Device {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        brand: row.try_get("brand")?,
        state: row.try_get("state")?,
        creation_time: row.try_get("creation_time")?,
        last_modified: row.try_get("last_modified")?,
    })
}

fn bound(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    q.params
        .iter()
        .fold(sqlx::query(&q.sql), |query, p| query.bind(p.clone()))
}

/// Unique violations become `Conflict` on `id`; the database message stays in the log.
fn write_error(id: Uuid) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            tracing::warn!(%id, constraint = ?db.constraint(), error = %db.message(), "unique violation");
            AppError::Conflict(format!("device {} already exists", id))
        }
        _ => AppError::Db(e),
    }
}

async fn is_tombstoned(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
    tracing::debug!(sql = sql::TOMBSTONE_EXISTS, %id, "query (tx)");
    let deleted: bool = sqlx::query_scalar(sql::TOMBSTONE_EXISTS)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(deleted)
}

async fn lock_device(conn: &mut PgConnection, id: Uuid) -> Result<Option<Device>, AppError> {
    tracing::debug!(sql = sql::SELECT_BY_ID_FOR_UPDATE, %id, "query (tx)");
    let row = sqlx::query(sql::SELECT_BY_ID_FOR_UPDATE)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.as_ref().map(device_from_row).transpose()?)
}

async fn insert_device(conn: &mut PgConnection, device: &Device) -> Result<(), AppError> {
    tracing::debug!(sql = sql::INSERT, id = %device.id, "query (tx)");
    sqlx::query(sql::INSERT)
        .bind(device.id)
        .bind(&device.name)
        .bind(&device.brand)
        .bind(device.state)
        .bind(device.creation_time)
        .bind(device.last_modified)
        .execute(&mut *conn)
        .await
        .map_err(write_error(device.id))?;
    Ok(())
}

async fn update_device(conn: &mut PgConnection, device: &Device) -> Result<(), AppError> {
    tracing::debug!(sql = sql::UPDATE, id = %device.id, "query (tx)");
    sqlx::query(sql::UPDATE)
        .bind(device.id)
        .bind(&device.name)
        .bind(&device.brand)
        .bind(device.state)
        .bind(device.last_modified)
        .execute(&mut *conn)
        .await
        .map_err(write_error(device.id))?;
    Ok(())
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn insert(&self, device: Device) -> Result<Device, AppError> {
        let mut conn = self.pool.acquire().await?;
        insert_device(&mut conn, &device).await?;
        Ok(device)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, AppError> {
        tracing::debug!(sql = sql::SELECT_BY_ID, %id, "query");
        let row = sqlx::query(sql::SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(device_from_row).transpose()?)
    }

    async fn list(&self, filter: &DeviceFilter, page: &PageRequest) -> Result<Page<Device>, AppError> {
        let count_q = sql::count(filter);
        let total: i64 = bound(&count_q).fetch_one(&self.pool).await?.try_get(0)?;

        let page_q = sql::select_page(filter, page);
        let rows = bound(&page_q).fetch_all(&self.pool).await?;
        let items = rows
            .iter()
            .map(device_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn update(&self, id: Uuid, patch: &DevicePatch, now: NaiveDateTime) -> Result<Device, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut device = lock_device(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(id))?;
        device.apply_patch(patch, now)?;
        update_device(&mut tx, &device).await?;
        tx.commit().await?;
        Ok(device)
    }

    async fn replace_or_create(
        &self,
        id: Uuid,
        replace: &DeviceReplace,
        now: NaiveDateTime,
    ) -> Result<Upserted, AppError> {
        let mut tx = self.pool.begin().await?;
        let upserted = match lock_device(&mut tx, id).await? {
            Some(mut device) => {
                device.apply_replace(replace, now)?;
                update_device(&mut tx, &device).await?;
                Upserted { created: false, device }
            }
            None => {
                if is_tombstoned(&mut tx, id).await? {
                    return Err(AppError::deleted_id(id));
                }
                let device = Device::from_replace(id, replace, now)?;
                insert_device(&mut tx, &device).await?;
                Upserted { created: true, device }
            }
        };
        tx.commit().await?;
        Ok(upserted)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let device = lock_device(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(id))?;
        device.ensure_deletable()?;
        tracing::debug!(sql = sql::DELETE, %id, "query (tx)");
        sqlx::query(sql::DELETE).bind(id).execute(&mut *tx).await?;
        tracing::debug!(sql = sql::INSERT_TOMBSTONE, %id, "query (tx)");
        sqlx::query(sql::INSERT_TOMBSTONE).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
