use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use device_catalog::{
    DeviceEntity, DeviceFilter, DeviceGateway, DeviceId, GatewayError, WriteOutcome,
};
use rust_decimal::Decimal;

use crate::schema;

const SELECT_DEVICES: &str = "SELECT id, name, color, capacity, price FROM devices";

/// A SQLite-backed device store that implements `DeviceGateway`.
///
/// Names are unique at the table level, so a create that races another
/// writer fails for that row instead of producing a duplicate.
pub struct DeviceStore {
    conn: Mutex<rusqlite::Connection>,
}

impl DeviceStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, StoreError> {
        let mut store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .get_mut()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))?;
        schema::migrations()
            .to_latest(conn)
            .map_err(|e| StoreError::Migration(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }

    /// Persisted devices matching `filter`, oldest first.
    pub fn list(&self, filter: &DeviceFilter) -> Result<Vec<DeviceEntity>, StoreError> {
        let conn = self.lock()?;

        let (sql, params): (String, Vec<&dyn rusqlite::ToSql>) = match filter {
            DeviceFilter::All => (format!("{SELECT_DEVICES} ORDER BY id"), vec![]),
            DeviceFilter::CapacityEquals(capacity) => (
                format!("{SELECT_DEVICES} WHERE capacity = ?1 ORDER BY id"),
                vec![capacity as &dyn rusqlite::ToSql],
            ),
        };

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let devices = stmt
            .query_map(params.as_slice(), Self::row_to_device)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(devices)
    }

    /// Distinct names of all persisted devices.
    pub fn names(&self) -> Result<HashSet<String>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT name FROM devices WHERE name IS NOT NULL")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(names)
    }

    /// Insert devices in one transaction. Each row succeeds or fails on its own.
    pub fn insert_all(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let now = now_epoch_secs();

        let mut outcomes = Vec::with_capacity(devices.len());
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO devices (name, color, capacity, price, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;

            for device in devices {
                let result = stmt.execute(rusqlite::params![
                    device.name,
                    device.color,
                    device.capacity,
                    device.price.to_string(),
                    now,
                ]);

                match result {
                    Ok(_) => outcomes.push(WriteOutcome::Success(DeviceId::new(
                        tx.last_insert_rowid(),
                    ))),
                    Err(e) => outcomes.push(WriteOutcome::Failure(e.to_string())),
                }
            }
        }

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(outcomes)
    }

    /// Write back the capacity of persisted devices, matched by id.
    ///
    /// Capacity is the only column a persisted device may change; the other
    /// fields of each input are ignored.
    pub fn update_capacities(
        &self,
        devices: &[DeviceEntity],
    ) -> Result<Vec<WriteOutcome>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut outcomes = Vec::with_capacity(devices.len());
        {
            let mut stmt = tx
                .prepare("UPDATE devices SET capacity = ?1 WHERE id = ?2")
                .map_err(|e| StoreError::Database(e.to_string()))?;

            for device in devices {
                let Some(id) = device.id else {
                    outcomes.push(WriteOutcome::Failure(format!(
                        "{} has not been persisted",
                        device.name
                    )));
                    continue;
                };

                match stmt.execute(rusqlite::params![device.capacity, id.get()]) {
                    Ok(0) => outcomes.push(WriteOutcome::Failure(format!("no device with id {id}"))),
                    Ok(_) => outcomes.push(WriteOutcome::Success(id)),
                    Err(e) => outcomes.push(WriteOutcome::Failure(e.to_string())),
                }
            }
        }

        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(outcomes)
    }

    fn row_to_device(row: &rusqlite::Row) -> rusqlite::Result<DeviceEntity> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let color: Option<String> = row.get(2)?;
        let capacity: Option<String> = row.get(3)?;
        let price_text: String = row.get(4)?;

        let price = Decimal::from_str(&price_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(DeviceEntity {
            id: Some(DeviceId::new(id)),
            name,
            color,
            capacity,
            price,
        })
    }
}

fn to_gateway(e: StoreError) -> GatewayError {
    GatewayError::Storage(e.to_string())
}

#[async_trait::async_trait]
impl DeviceGateway for DeviceStore {
    async fn existing_names(&self) -> Result<HashSet<String>, GatewayError> {
        self.names().map_err(to_gateway)
    }

    async fn find(&self, filter: &DeviceFilter) -> Result<Vec<DeviceEntity>, GatewayError> {
        self.list(filter).map_err(to_gateway)
    }

    async fn create_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        self.insert_all(devices).map_err(to_gateway)
    }

    async fn update_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        self.update_capacities(devices).map_err(to_gateway)
    }
}

/// Errors specific to store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),
}

fn now_epoch_secs() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    now.to_string()
}
