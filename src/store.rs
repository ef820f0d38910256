// SQLite persistence for locally recorded subscriptions.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::flow::SubscriptionRecord;

/// A subscription row as read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSubscription {
    pub id: i64,
    pub donor_id: i64,
    pub campaign_id: i64,
    pub payment_gateway: String,
    pub gateway_subscription_id: String,
    pub amount: i64,
    pub currency: String,
    pub payment_interval: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed persistence for subscription records.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS subscriptions (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                donor_id                INTEGER NOT NULL,
                campaign_id             INTEGER NOT NULL,
                payment_gateway         TEXT NOT NULL,
                gateway_subscription_id TEXT NOT NULL UNIQUE,
                amount                  INTEGER NOT NULL,
                currency                TEXT NOT NULL,
                payment_interval        TEXT NOT NULL,
                created_at              TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_subscriptions_campaign
                ON subscriptions(campaign_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    /// Record a subscription. Uses INSERT OR IGNORE on the unique gateway
    /// subscription id, so re-recording the same subscription is a no-op.
    /// Timestamp is auto-generated by SQLite.
    pub fn record_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO subscriptions
                (donor_id, campaign_id, payment_gateway, gateway_subscription_id,
                 amount, currency, payment_interval)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.donor_id,
                record.campaign_id,
                record.payment_gateway,
                record.gateway_subscription_id,
                record.amount,
                record.currency,
                record.payment_interval,
            ],
        )
        .context("failed to record subscription")?;
        Ok(())
    }

    /// Load all subscriptions for a campaign, oldest first.
    pub fn load_subscriptions_for_campaign(
        &self,
        campaign_id: i64,
    ) -> Result<Vec<StoredSubscription>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, donor_id, campaign_id, payment_gateway,
                        gateway_subscription_id, amount, currency,
                        payment_interval, created_at
                 FROM subscriptions WHERE campaign_id = ?1 ORDER BY id",
            )
            .context("failed to prepare campaign subscriptions query")?;

        let subscriptions = stmt
            .query_map(params![campaign_id], row_to_subscription)
            .context("failed to query campaign subscriptions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map subscription rows")?;

        Ok(subscriptions)
    }

    /// Look up a subscription by its gateway-side id. Returns `None` if the
    /// id was never recorded.
    pub fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<StoredSubscription>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, donor_id, campaign_id, payment_gateway,
                        gateway_subscription_id, amount, currency,
                        payment_interval, created_at
                 FROM subscriptions WHERE gateway_subscription_id = ?1",
            )
            .context("failed to prepare gateway id lookup")?;

        let subscription = stmt
            .query_row(params![gateway_subscription_id], row_to_subscription)
            .optional()
            .context("failed to query subscription by gateway id")?;

        Ok(subscription)
    }
}

fn row_to_subscription(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredSubscription> {
    let created_at_text: String = row.get(8)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_text)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(StoredSubscription {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        campaign_id: row.get(2)?,
        payment_gateway: row.get(3)?,
        gateway_subscription_id: row.get(4)?,
        amount: row.get(5)?,
        currency: row.get(6)?,
        payment_interval: row.get(7)?,
        created_at,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
