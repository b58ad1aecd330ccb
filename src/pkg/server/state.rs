use std::sync::Arc;

use aws_sdk_s3::config::{Credentials, Region};
use sqlx::{postgres::PgPoolOptions, PgPool, Pool, Postgres};

use crate::conf::Settings;
use crate::pkg::internal::analyze::ResumeAnalyzer;
use crate::pkg::internal::ingest::{IngestPipeline, PgResumeStore};
use crate::pkg::internal::storage::ResumeStorage;
use crate::prelude::Result;

pub fn db_pool(settings: &Settings) -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

fn s3_client(settings: &Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.s3_access_key,
        &settings.s3_secret_key,
        None,
        None,
        "settings",
    );
    let config = aws_sdk_s3::config::Builder::new()
        .region(Region::new(settings.s3_region.clone()))
        .endpoint_url(&settings.s3_endpoint)
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
    pub storage: ResumeStorage,
    pub ingest: IngestPipeline<ResumeStorage, PgResumeStore>,
}

impl AppState {
    pub async fn new(settings: Settings) -> Result<AppState> {
        let db_pool = Arc::new(db_pool(&settings)?);
        let storage = ResumeStorage::new(Arc::new(s3_client(&settings)), &settings);
        let analyzer = ResumeAnalyzer::new(&settings)?;
        let ingest = IngestPipeline::new(
            storage.clone(),
            PgResumeStore::new(db_pool.clone()),
            analyzer,
        );
        Ok(AppState {
            settings: Arc::new(settings),
            db_pool,
            storage,
            ingest,
        })
    }
}
