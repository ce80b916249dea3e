// src/lib.rs

use sea_orm::DatabaseConnection;
use services::resolver::RefResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub resolver: RefResolver,
    pub job_locks: Arc<jobs::JobLocks>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            http: scrapers::fetch::build_client(),
            resolver: RefResolver::new(),
            job_locks: Arc::new(jobs::JobLocks::default()),
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod currencies;
    pub mod gold_cross_rates;
    pub mod instrument_prices;
    pub mod instruments;
    pub mod locations;
    pub mod markets;
    pub mod units;
}

pub mod services {
    pub mod cross_rate;
    pub mod persist;
    pub mod price_change;
    pub mod resolver;
    pub mod seed_check;
}

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod scrapers;
