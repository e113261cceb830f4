use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::models::*;

/// Async-safe handle to the order database.
///
/// Wraps `HugDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O
/// never ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<HugDb>>,
}

impl DbHandle {
    pub fn new(db: HugDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&HugDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database mutex synchronously. Only for startup, CLI
    /// commands and tests; never from a request handler.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, HugDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

/// Fixed-width RFC 3339 so that text ordering in SQLite is chronological.
pub fn to_db_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_db_time(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp in database: {}", s))?
        .with_timezone(&Utc))
}

const ORDER_COLUMNS: &str = "id, name, email, phone, recipient_name, recipient_address, service_type, delivery_type, feelings, story, specific_details, status, latitude, longitude, city, country, device, created_at";

const REPLY_COLUMNS: &str =
    "id, order_id, created_at, sender_type, sender_name, message, email_sent, email_message_id, is_read";

pub struct HugDb {
    conn: Connection,
}

impl HugDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS orders (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    recipient_name TEXT NOT NULL,
                    recipient_address TEXT NOT NULL,
                    service_type TEXT NOT NULL,
                    delivery_type TEXT NOT NULL,
                    feelings TEXT NOT NULL,
                    story TEXT NOT NULL,
                    specific_details TEXT,
                    status TEXT NOT NULL DEFAULT 'New',
                    latitude REAL,
                    longitude REAL,
                    city TEXT,
                    country TEXT,
                    device TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS replies (
                    id TEXT PRIMARY KEY,
                    order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    sender_type TEXT NOT NULL,
                    sender_name TEXT NOT NULL,
                    message TEXT NOT NULL,
                    email_sent INTEGER NOT NULL DEFAULT 0,
                    email_message_id TEXT,
                    is_read INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS admin_logins (
                    id TEXT PRIMARY KEY,
                    created_at TEXT NOT NULL,
                    location TEXT,
                    ip_address TEXT NOT NULL,
                    user_agent TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_replies_order ON replies(order_id, created_at);
                CREATE INDEX IF NOT EXISTS idx_replies_unread ON replies(sender_type, is_read);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Orders ────────────────────────────────────────────────────────

    pub fn insert_order(&self, order: &NewOrder, created_at: DateTime<Utc>) -> Result<Order> {
        let id = Uuid::new_v4().to_string();
        let (latitude, longitude, city, country) = match &order.location {
            Some(loc) => (
                Some(loc.latitude),
                Some(loc.longitude),
                loc.city.as_deref(),
                loc.country.as_deref(),
            ),
            None => (None, None, None, None),
        };
        self.conn
            .execute(
                &format!(
                    "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                    ORDER_COLUMNS
                ),
                params![
                    id,
                    order.name,
                    order.email,
                    order.phone,
                    order.recipient_name,
                    order.recipient_address,
                    order.service_type.as_str(),
                    order.delivery_type.as_str(),
                    order.feelings,
                    order.story,
                    order.specific_details,
                    OrderStatus::New.as_str(),
                    latitude,
                    longitude,
                    city,
                    country,
                    order.device,
                    to_db_time(&created_at),
                ],
            )
            .context("Failed to insert order")?;
        self.get_order(&id)?.context("Order not found after insert")
    }

    pub fn get_order(&self, id: &str) -> Result<Option<Order>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
                params![id],
                OrderRow::from_row,
            )
            .optional()
            .context("Failed to query order")?;
        row.map(OrderRow::into_order).transpose()
    }

    /// Every order in insertion order.
    pub fn list_orders(&self) -> Result<Vec<Order>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM orders ORDER BY rowid", ORDER_COLUMNS))
            .context("Failed to prepare list_orders")?;
        let rows = stmt
            .query_map([], OrderRow::from_row)
            .context("Failed to query orders")?;
        let mut orders = Vec::new();
        for row in rows {
            let r = row.context("Failed to read order row")?;
            orders.push(r.into_order()?);
        }
        Ok(orders)
    }

    pub fn count_orders(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .context("Failed to count orders")
    }

    /// Overwrite the status. Returns `None` when the order does not exist.
    pub fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Option<Order>> {
        let count = self
            .conn
            .execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )
            .context("Failed to update order status")?;
        if count == 0 {
            return Ok(None);
        }
        self.get_order(id)
    }

    // ── Replies ───────────────────────────────────────────────────────

    /// Append a reply and move the order to `status_after` atomically.
    /// Returns `None` when the order does not exist.
    pub fn insert_reply(
        &self,
        order_id: &str,
        reply: &NewReply,
        created_at: DateTime<Utc>,
        status_after: OrderStatus,
    ) -> Result<Option<Reply>> {
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let updated = tx
            .execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status_after.as_str(), order_id],
            )
            .context("Failed to update order status for reply")?;
        if updated == 0 {
            return Ok(None);
        }

        // Admin replies are authored by staff and never show up as unread.
        let is_read = reply.sender_type == SenderType::Admin;
        let id = Uuid::new_v4().to_string();
        tx.execute(
            &format!(
                "INSERT INTO replies ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7)",
                REPLY_COLUMNS
            ),
            params![
                id,
                order_id,
                to_db_time(&created_at),
                reply.sender_type.as_str(),
                reply.sender_name,
                reply.message,
                is_read,
            ],
        )
        .context("Failed to insert reply")?;

        tx.commit().context("Failed to commit reply")?;
        self.get_reply(&id)
    }

    pub fn get_reply(&self, id: &str) -> Result<Option<Reply>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM replies WHERE id = ?1", REPLY_COLUMNS),
                params![id],
                ReplyRow::from_row,
            )
            .optional()
            .context("Failed to query reply")?;
        row.map(ReplyRow::into_reply).transpose()
    }

    /// Replies of one order, oldest first.
    pub fn list_replies(&self, order_id: &str) -> Result<Vec<Reply>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM replies WHERE order_id = ?1 ORDER BY created_at ASC, rowid ASC",
                REPLY_COLUMNS
            ))
            .context("Failed to prepare list_replies")?;
        let rows = stmt
            .query_map(params![order_id], ReplyRow::from_row)
            .context("Failed to query replies")?;
        let mut replies = Vec::new();
        for row in rows {
            let r = row.context("Failed to read reply row")?;
            replies.push(r.into_reply()?);
        }
        Ok(replies)
    }

    pub fn mark_email_sent(&self, id: &str, message_id: Option<&str>) -> Result<Reply> {
        self.conn
            .execute(
                "UPDATE replies SET email_sent = 1, email_message_id = ?1 WHERE id = ?2",
                params![message_id, id],
            )
            .context("Failed to mark reply email as sent")?;
        self.get_reply(id)?
            .context("Reply not found after email update")
    }

    pub fn mark_reply_read(&self, id: &str) -> Result<Option<Reply>> {
        self.conn
            .execute("UPDATE replies SET is_read = 1 WHERE id = ?1", params![id])
            .context("Failed to mark reply read")?;
        self.get_reply(id)
    }

    pub fn count_unread_client_replies(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM replies WHERE sender_type = 'client' AND is_read = 0",
                [],
                |row| row.get(0),
            )
            .context("Failed to count unread replies")
    }

    // ── Admin login audit ─────────────────────────────────────────────

    pub fn insert_admin_login(
        &self,
        location: Option<&str>,
        ip_address: &str,
        user_agent: &str,
        created_at: DateTime<Utc>,
    ) -> Result<AdminLogin> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO admin_logins (id, created_at, location, ip_address, user_agent) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, to_db_time(&created_at), location, ip_address, user_agent],
            )
            .context("Failed to insert admin login")?;
        Ok(AdminLogin {
            id,
            created_at,
            location: location.map(str::to_string),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Most recent logins first.
    pub fn recent_admin_logins(&self, limit: i64) -> Result<Vec<AdminLogin>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, created_at, location, ip_address, user_agent
                 FROM admin_logins ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )
            .context("Failed to prepare recent_admin_logins")?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .context("Failed to query admin logins")?;
        let mut logins = Vec::new();
        for row in rows {
            let (id, created_at, location, ip_address, user_agent) =
                row.context("Failed to read admin login row")?;
            logins.push(AdminLogin {
                id,
                created_at: from_db_time(&created_at)?,
                location,
                ip_address,
                user_agent,
            });
        }
        Ok(logins)
    }
}

// ── Row mapping ───────────────────────────────────────────────────────

struct OrderRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    recipient_name: String,
    recipient_address: String,
    service_type: String,
    delivery_type: String,
    feelings: String,
    story: String,
    specific_details: Option<String>,
    status: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country: Option<String>,
    device: Option<String>,
    created_at: String,
}

impl OrderRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            recipient_name: row.get(4)?,
            recipient_address: row.get(5)?,
            service_type: row.get(6)?,
            delivery_type: row.get(7)?,
            feelings: row.get(8)?,
            story: row.get(9)?,
            specific_details: row.get(10)?,
            status: row.get(11)?,
            latitude: row.get(12)?,
            longitude: row.get(13)?,
            city: row.get(14)?,
            country: row.get(15)?,
            device: row.get(16)?,
            created_at: row.get(17)?,
        })
    }

    fn into_order(self) -> Result<Order> {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
                city: self.city,
                country: self.country,
            }),
            _ => None,
        };
        Ok(Order {
            service_type: ServiceType::from_str(&self.service_type)
                .map_err(|e| anyhow::anyhow!(e))?,
            delivery_type: DeliveryType::from_str(&self.delivery_type)
                .map_err(|e| anyhow::anyhow!(e))?,
            status: OrderStatus::from_str(&self.status).map_err(|e| anyhow::anyhow!(e))?,
            created_at: from_db_time(&self.created_at)?,
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            recipient_name: self.recipient_name,
            recipient_address: self.recipient_address,
            feelings: self.feelings,
            story: self.story,
            specific_details: self.specific_details,
            location,
            device: self.device,
        })
    }
}

struct ReplyRow {
    id: String,
    order_id: String,
    created_at: String,
    sender_type: String,
    sender_name: String,
    message: String,
    email_sent: bool,
    email_message_id: Option<String>,
    is_read: bool,
}

impl ReplyRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            order_id: row.get(1)?,
            created_at: row.get(2)?,
            sender_type: row.get(3)?,
            sender_name: row.get(4)?,
            message: row.get(5)?,
            email_sent: row.get(6)?,
            email_message_id: row.get(7)?,
            is_read: row.get(8)?,
        })
    }

    fn into_reply(self) -> Result<Reply> {
        Ok(Reply {
            sender_type: SenderType::from_str(&self.sender_type)
                .map_err(|e| anyhow::anyhow!(e))?,
            created_at: from_db_time(&self.created_at)?,
            id: self.id,
            order_id: self.order_id,
            sender_name: self.sender_name,
            message: self.message,
            email_sent: self.email_sent,
            email_message_id: self.email_message_id,
            is_read: self.is_read,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn sample_order(name: &str) -> NewOrder {
        NewOrder {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "+91 98765 43210".to_string(),
            recipient_name: "Asha".to_string(),
            recipient_address: "12 Lake Road, Pune".to_string(),
            service_type: ServiceType::LoveLetter,
            delivery_type: DeliveryType::Standard,
            feelings: "Grateful".to_string(),
            story: "We met at a bookshop.".to_string(),
            specific_details: None,
            location: None,
            device: None,
        }
    }

    fn admin_reply(message: &str) -> NewReply {
        NewReply {
            sender_type: SenderType::Admin,
            sender_name: "Staff".to_string(),
            message: message.to_string(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_create_database_and_run_migrations() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let tables: Vec<String> = {
            let mut stmt = db
                .conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            names
        };
        assert!(tables.contains(&"orders".to_string()));
        assert!(tables.contains(&"replies".to_string()));
        assert!(tables.contains(&"admin_logins".to_string()));
        Ok(())
    }

    #[test]
    fn test_migrations_are_rerunnable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hug.db");
        let db = HugDb::new(&path)?;
        db.insert_order(&sample_order("Ravi"), t0())?;
        drop(db);
        let db = HugDb::new(&path)?;
        assert_eq!(db.count_orders()?, 1);
        Ok(())
    }

    #[test]
    fn test_insert_order_defaults() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.created_at, t0());
        assert!(!order.id.is_empty());
        assert!(order.location.is_none());

        let fetched = db.get_order(&order.id)?.unwrap();
        assert_eq!(fetched, order);
        Ok(())
    }

    #[test]
    fn test_insert_order_with_location_and_device() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let mut new = sample_order("Meera");
        new.location = Some(Location {
            latitude: 18.52,
            longitude: 73.85,
            city: Some("Pune".into()),
            country: None,
        });
        new.device = Some("Android 14 | Chrome 120.0".into());
        let order = db.insert_order(&new, t0())?;
        let loc = order.location.unwrap();
        assert_eq!(loc.city.as_deref(), Some("Pune"));
        assert!(loc.country.is_none());
        assert_eq!(order.device.as_deref(), Some("Android 14 | Chrome 120.0"));
        Ok(())
    }

    #[test]
    fn test_list_orders_in_insertion_order() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        db.insert_order(&sample_order("Zed"), t0())?;
        db.insert_order(&sample_order("Amy"), t0() - Duration::days(3))?;
        let names: Vec<String> = db.list_orders()?.into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
        Ok(())
    }

    #[test]
    fn test_get_missing_order_is_none() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        assert!(db.get_order("nope")?.is_none());
        assert!(db.update_order_status("nope", OrderStatus::Completed)?.is_none());
        Ok(())
    }

    #[test]
    fn test_update_order_status() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        let updated = db
            .update_order_status(&order.id, OrderStatus::InProgress)?
            .unwrap();
        assert_eq!(updated.status, OrderStatus::InProgress);
        Ok(())
    }

    #[test]
    fn test_insert_reply_moves_status() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        let reply = db
            .insert_reply(&order.id, &admin_reply("Hello"), t0(), OrderStatus::Replied)?
            .unwrap();
        assert_eq!(reply.sender_type, SenderType::Admin);
        assert!(!reply.email_sent);
        assert!(reply.is_read);
        assert_eq!(
            db.get_order(&order.id)?.unwrap().status,
            OrderStatus::Replied
        );
        Ok(())
    }

    #[test]
    fn test_insert_reply_for_missing_order_writes_nothing() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let result = db.insert_reply("ghost", &admin_reply("Hi"), t0(), OrderStatus::Replied)?;
        assert!(result.is_none());
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM replies", [], |row| row.get(0))?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[test]
    fn test_list_replies_ordering() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        db.insert_reply(
            &order.id,
            &admin_reply("second"),
            t0() + Duration::minutes(5),
            OrderStatus::Replied,
        )?;
        db.insert_reply(&order.id, &admin_reply("first"), t0(), OrderStatus::Replied)?;
        db.insert_reply(
            &order.id,
            &admin_reply("third"),
            t0() + Duration::minutes(5),
            OrderStatus::Replied,
        )?;
        let messages: Vec<String> = db
            .list_replies(&order.id)?
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn test_mark_email_sent_and_read() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        let client = NewReply {
            sender_type: SenderType::Client,
            sender_name: "Ravi".into(),
            message: "Thanks!".into(),
        };
        let reply = db
            .insert_reply(&order.id, &client, t0(), OrderStatus::ClientReplied)?
            .unwrap();
        assert!(!reply.is_read);
        assert_eq!(db.count_unread_client_replies()?, 1);

        let read = db.mark_reply_read(&reply.id)?.unwrap();
        assert!(read.is_read);
        assert_eq!(db.count_unread_client_replies()?, 0);

        let sent = db.mark_email_sent(&reply.id, Some("msg-1"))?;
        assert!(sent.email_sent);
        assert_eq!(sent.email_message_id.as_deref(), Some("msg-1"));
        Ok(())
    }

    #[test]
    fn test_delete_order_cascades_replies() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        let order = db.insert_order(&sample_order("Ravi"), t0())?;
        db.insert_reply(&order.id, &admin_reply("Hi"), t0(), OrderStatus::Replied)?;
        db.conn
            .execute("DELETE FROM orders WHERE id = ?1", params![order.id])?;
        assert!(db.list_replies(&order.id)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_admin_login_audit() -> Result<()> {
        let db = HugDb::new_in_memory()?;
        db.insert_admin_login(None, "10.0.0.1", "curl/8", t0())?;
        db.insert_admin_login(
            Some("Pune, India (18.52, 73.85)"),
            "10.0.0.2",
            "Firefox",
            t0() + Duration::hours(1),
        )?;
        let logins = db.recent_admin_logins(10)?;
        assert_eq!(logins.len(), 2);
        assert_eq!(logins[0].ip_address, "10.0.0.2");
        assert_eq!(logins[1].location, None);
        assert_eq!(db.recent_admin_logins(1)?.len(), 1);
        Ok(())
    }
}
