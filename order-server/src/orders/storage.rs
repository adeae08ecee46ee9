//! redb-based order store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `(order_number, year)` | `NormalizedUnitOrder` (JSON) | Unit orders |
//! | `orders_by_date` | `(yyyymmdd, order_number)` | `()` | Per-day index |
//! | `day_cursor` | `yyyymmdd` | `u16` | Next ticket slot index of the day |
//!
//! # Durability
//!
//! Every write runs in its own transaction and is durable once `commit()`
//! returns. A checkout batch is a single transaction, so it is either fully
//! visible or not at all.
//!
//! `MMDD` order numbers repeat every year; the year of the order date is
//! part of the key, and lookups by number alone resolve to the latest year.

use super::gateway::{OrderGateway, check_transition, sort_orders};
use super::order_number::{SLOT_COUNT, TicketSlot};
use chrono::{Datelike, NaiveDate};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::error::ErrorCode;
use shared::order::{NormalizedUnitOrder, OrderStatus};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = (order_number, year of order_date), value = JSON-serialized NormalizedUnitOrder
const ORDERS_TABLE: TableDefinition<(&str, i32), &[u8]> = TableDefinition::new("orders");

/// key = (date, order_number), value = empty (index)
const ORDERS_BY_DATE_TABLE: TableDefinition<(u32, &str), ()> =
    TableDefinition::new("orders_by_date");

/// key = date as YYYYMMDD, value = index of the next slot to hand out
const DAY_CURSOR_TABLE: TableDefinition<u32, u16> = TableDefinition::new("day_cursor");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate order number: {0}")]
    DuplicateOrderNumber(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid status transition for {order_number}: {from} -> {to}")]
    InvalidTransition {
        order_number: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Map to an error code (frontend handles localization)
    pub fn code(&self) -> ErrorCode {
        // 先按枚举变体精确匹配
        match self {
            StorageError::Serialization(_) => return ErrorCode::InternalError,
            StorageError::DuplicateOrderNumber(_) => return ErrorCode::PersistenceBatchFailed,
            StorageError::OrderNotFound(_) => return ErrorCode::OrderNotFound,
            StorageError::InvalidTransition { .. } => return ErrorCode::InvalidStatusTransition,
            _ => {}
        }

        // redb 错误通过字符串匹配分类
        let err_str = self.to_string().to_lowercase();

        // 磁盘空间不足
        if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
        {
            return ErrorCode::StorageFull;
        }

        // 数据损坏
        if err_str.contains("corrupt") || err_str.contains("invalid database") {
            return ErrorCode::StorageCorrupted;
        }

        // 默认：系统繁忙
        ErrorCode::SystemBusy
    }
}

/// Date key used by the cursor and index tables
fn date_key(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Order store backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_BY_DATE_TABLE)?;
            let _ = write_txn.open_table(DAY_CURSOR_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

/// Latest year in which `order_number` is stored
fn latest_year<T>(table: &T, order_number: &str) -> StorageResult<Option<i32>>
where
    T: ReadableTable<(&'static str, i32), &'static [u8]>,
{
    match table
        .range((order_number, i32::MIN)..=(order_number, i32::MAX))?
        .next_back()
    {
        Some(entry) => {
            let (key, _) = entry?;
            Ok(Some(key.value().1))
        }
        None => Ok(None),
    }
}

impl OrderGateway for OrderStorage {
    /// Day cursor (叫号)
    ///
    /// The read and the write happen in one write transaction; redb
    /// serializes writers, so concurrent callers never see the same value.
    fn advance_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
        let key = date_key(date);

        let txn = self.db.begin_write()?;
        let mut table = txn.open_table(DAY_CURSOR_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = (current + 1) % SLOT_COUNT;
        table.insert(key, next)?;
        drop(table);
        txn.commit()?;

        Ok(TicketSlot::from_index(current))
    }

    fn peek_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DAY_CURSOR_TABLE)?;
        let index = table
            .get(date_key(date))?
            .map(|g| g.value())
            .unwrap_or(0);
        Ok(TicketSlot::from_index(index))
    }

    fn set_cursor(&self, date: NaiveDate, next: TicketSlot) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DAY_CURSOR_TABLE)?;
            table.insert(date_key(date), next.index())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn order_number_exists(&self, year: i32, order_number: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.get((order_number, year))?.is_some())
    }

    fn insert_batch(&self, orders: &[NormalizedUnitOrder]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let mut index = txn.open_table(ORDERS_BY_DATE_TABLE)?;
            for order in orders {
                let key = (order.order_number.as_str(), order.order_date.year());
                if table.get(key)?.is_some() {
                    // txn 未提交即丢弃 = 回滚
                    return Err(StorageError::DuplicateOrderNumber(
                        order.order_number.clone(),
                    ));
                }
                let value = serde_json::to_vec(order)?;
                table.insert(key, value.as_slice())?;
                index.insert((date_key(order.order_date), order.order_number.as_str()), ())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn get_order(&self, order_number: &str) -> StorageResult<Option<NormalizedUnitOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let Some(year) = latest_year(&table, order_number)? else {
            return Ok(None);
        };
        match table.get((order_number, year))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn update_status(
        &self,
        order_number: &str,
        to: OrderStatus,
        now_millis: i64,
    ) -> StorageResult<(OrderStatus, NormalizedUnitOrder)> {
        let txn = self.db.begin_write()?;
        let result = {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let not_found = || StorageError::OrderNotFound(order_number.to_string());
            let year = latest_year(&table, order_number)?.ok_or_else(not_found)?;
            let mut order: NormalizedUnitOrder = match table.get((order_number, year))? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(not_found()),
            };
            check_transition(&order, to)?;

            let from = order.status;
            order.status = to;
            order.updated_at = now_millis;
            let value = serde_json::to_vec(&order)?;
            table.insert((order_number, year), value.as_slice())?;
            (from, order)
        };
        txn.commit()?;
        Ok(result)
    }

    fn list_orders(
        &self,
        date: NaiveDate,
        status: Option<OrderStatus>,
    ) -> StorageResult<Vec<NormalizedUnitOrder>> {
        let key = date_key(date);
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ORDERS_BY_DATE_TABLE)?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for entry in index.range((key, "")..(key + 1, ""))? {
            let (entry_key, _) = entry?;
            let (_, order_number) = entry_key.value();
            let Some(guard) = table.get((order_number, date.year()))? else {
                continue;
            };
            let order: NormalizedUnitOrder = serde_json::from_slice(guard.value())?;
            if status.is_none_or(|s| order.status == s) {
                orders.push(order);
            }
        }

        sort_orders(&mut orders);
        Ok(orders)
    }
}
