//! Reference identifier resolution.
//!
//! Domain codes (market/instrument/unit/currency codes, location slugs) map
//! to numeric ids in the reference tables. Ids are stable while the process
//! runs, so every resolution is memoized for the process lifetime; picking
//! up newly seeded rows requires a restart.

use parking_lot::{Mutex, RwLock};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::entities::{currencies, instruments, locations, markets, prelude::*, units};

/// Rows fetched per lookup: enough to notice duplicate codes without
/// enumerating them.
const DUPLICATE_PROBE_LIMIT: u64 = 5;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no {table} row with {key_kind} = {key}")]
    NotFound {
        table: &'static str,
        key_kind: &'static str,
        key: String,
    },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RefTable {
    Market,
    Instrument,
    Unit,
    Currency,
    Location,
}

impl RefTable {
    fn as_str(self) -> &'static str {
        match self {
            RefTable::Market => "markets",
            RefTable::Instrument => "instruments",
            RefTable::Unit => "units",
            RefTable::Currency => "currencies",
            RefTable::Location => "locations",
        }
    }

    fn key_kind(self) -> &'static str {
        match self {
            RefTable::Location => "slug",
            _ => "code",
        }
    }
}

type RefKey = (RefTable, String);

#[derive(Default)]
struct ResolverInner {
    ids: RwLock<HashMap<RefKey, i32>>,
    /// Keys already reported as missing or ambiguous; each is logged once
    /// per process, not on every retry or cache miss.
    reported: Mutex<HashSet<RefKey>>,
}

#[derive(Clone, Default)]
pub struct RefResolver {
    inner: Arc<ResolverInner>,
}

impl RefResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn market_id(&self, db: &DatabaseConnection, code: &str) -> Result<i32, ResolveError> {
        self.resolve(db, RefTable::Market, code).await
    }

    pub async fn instrument_id(&self, db: &DatabaseConnection, code: &str) -> Result<i32, ResolveError> {
        self.resolve(db, RefTable::Instrument, code).await
    }

    pub async fn unit_id(&self, db: &DatabaseConnection, code: &str) -> Result<i32, ResolveError> {
        self.resolve(db, RefTable::Unit, code).await
    }

    pub async fn currency_id(&self, db: &DatabaseConnection, code: &str) -> Result<i32, ResolveError> {
        self.resolve(db, RefTable::Currency, code).await
    }

    pub async fn location_id(&self, db: &DatabaseConnection, slug: &str) -> Result<i32, ResolveError> {
        self.resolve(db, RefTable::Location, slug).await
    }

    async fn resolve(
        &self,
        db: &DatabaseConnection,
        table: RefTable,
        key: &str,
    ) -> Result<i32, ResolveError> {
        let cache_key = (table, key.to_string());
        if let Some(id) = self.inner.ids.read().get(&cache_key) {
            return Ok(*id);
        }

        let candidates = fetch_candidate_ids(db, table, key).await?;

        match candidates.split_first() {
            None => {
                if self.inner.reported.lock().insert(cache_key) {
                    tracing::error!(
                        "No {} row with {} = {}",
                        table.as_str(),
                        table.key_kind(),
                        key
                    );
                }
                Err(ResolveError::NotFound {
                    table: table.as_str(),
                    key_kind: table.key_kind(),
                    key: key.to_string(),
                })
            }
            Some((&id, rest)) => {
                if !rest.is_empty() && self.inner.reported.lock().insert(cache_key.clone()) {
                    tracing::warn!(
                        "{} {} = {} matches more than one row, using lowest id {}",
                        table.as_str(),
                        table.key_kind(),
                        key,
                        id
                    );
                }
                // Racing first-writes insert the same id; last write wins.
                self.inner.ids.write().insert(cache_key, id);
                Ok(id)
            }
        }
    }
}

/// Candidate ids for a key, ordered ascending so the lowest wins on
/// duplicates.
async fn fetch_candidate_ids(
    db: &DatabaseConnection,
    table: RefTable,
    key: &str,
) -> Result<Vec<i32>, sea_orm::DbErr> {
    let ids = match table {
        RefTable::Market => Markets::find()
            .filter(markets::Column::Code.eq(key))
            .order_by(markets::Column::Id, Order::Asc)
            .limit(DUPLICATE_PROBE_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect(),
        RefTable::Instrument => Instruments::find()
            .filter(instruments::Column::Code.eq(key))
            .order_by(instruments::Column::Id, Order::Asc)
            .limit(DUPLICATE_PROBE_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect(),
        RefTable::Unit => Units::find()
            .filter(units::Column::Code.eq(key))
            .order_by(units::Column::Id, Order::Asc)
            .limit(DUPLICATE_PROBE_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect(),
        RefTable::Currency => Currencies::find()
            .filter(currencies::Column::Code.eq(key))
            .order_by(currencies::Column::Id, Order::Asc)
            .limit(DUPLICATE_PROBE_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect(),
        RefTable::Location => Locations::find()
            .filter(locations::Column::Slug.eq(key))
            .order_by(locations::Column::Id, Order::Asc)
            .limit(DUPLICATE_PROBE_LIMIT)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect(),
    };

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn market_rows(ids: &[i32]) -> Vec<markets::Model> {
        ids.iter()
            .map(|&id| markets::Model {
                id,
                code: "FOO".to_string(),
                name: None,
                created_at: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_codes_resolve_to_lowest_id_and_cache() {
        // The store returns candidates ordered by id ascending.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([market_rows(&[3, 7, 9])])
            .into_connection();

        let resolver = RefResolver::new();
        assert_eq!(resolver.market_id(&db, "FOO").await.unwrap(), 3);
        // Served from cache: the mock has no second result set queued, so a
        // re-query would error.
        assert_eq!(resolver.market_id(&db, "FOO").await.unwrap(), 3);

        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_code_is_not_found_and_not_cached() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([market_rows(&[]), market_rows(&[4])])
            .into_connection();

        let resolver = RefResolver::new();
        let err = resolver.market_id(&db, "FOO").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));

        // A later run may find the row; failures are reported once but do
        // not poison the cache.
        assert_eq!(resolver.market_id(&db, "FOO").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_tables_cached_independently() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([market_rows(&[2])])
            .append_query_results([vec![units::Model {
                id: 11,
                code: "OZ".to_string(),
                name: None,
                created_at: None,
            }]])
            .into_connection();

        let resolver = RefResolver::new();
        assert_eq!(resolver.market_id(&db, "OZ").await.unwrap(), 2);
        assert_eq!(resolver.unit_id(&db, "OZ").await.unwrap(), 11);
    }
}
