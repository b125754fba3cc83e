use mongodb::{Client, Database, bson::doc, error::Error as MongoError, options::ClientOptions};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::RwLock,
    time::{MissedTickBehavior, interval, sleep},
};
use tracing::{error, info, warn};

const DEFAULT_DB: &str = "streakr";
const MAX_CONNECT_ATTEMPTS: u32 = 10;
const BASE_RETRY_DELAY_MS: u64 = 250;
const HEALTH_CHECK_INTERVAL_SECS: u64 = 30;

/// Collection holding round definitions.
pub const ROUNDS_COLLECTION: &str = "rounds";
/// Collection holding the per-season current-round pointer.
pub const SEASON_CONFIG_COLLECTION: &str = "season_config";
/// Collection holding raw question-status records.
pub const STATUS_COLLECTION: &str = "question_statuses";
/// Collection holding picks.
pub const PICKS_COLLECTION: &str = "picks";
/// Collection holding per-season bonus-action markers.
pub const BONUS_COLLECTION: &str = "bonus_markers";

/// Shared handle to the MongoDB connection, safe to clone across requests.
#[derive(Clone)]
pub struct MongoManager {
    inner: Arc<MongoManagerInner>,
}

struct MongoManagerInner {
    state: RwLock<MongoState>,
    options: ClientOptions,
    database_name: String,
    uri: String,
}

struct MongoState {
    client: Client,
    database: Database,
}

type Result<T> = std::result::Result<T, StoreError>;

/// Error raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection URI did not parse.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The client could not be built from parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// Initial connection pings kept failing.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// How many pings were attempted.
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// A read against a collection failed.
    #[error("failed to read from `{collection}`")]
    Read {
        /// Target collection.
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    /// A write against a collection failed.
    #[error("failed to write to `{collection}`")]
    Write {
        /// Target collection.
        collection: &'static str,
        #[source]
        source: MongoError,
    },
}

/// Detect the duplicate-key write error used by conditional inserts.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

/// Connect to MongoDB and start a watcher that keeps the connection healthy.
pub async fn connect(uri: &str, db_name: Option<&str>) -> Result<MongoManager> {
    let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();
    let options = ClientOptions::parse(uri)
        .await
        .map_err(|source| StoreError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;

    let (client, database) = establish_connection(&options, &database_name).await?;

    let state = MongoState { client, database };
    let inner = Arc::new(MongoManagerInner {
        state: RwLock::new(state),
        options,
        database_name,
        uri: uri.to_owned(),
    });

    MongoManagerInner::spawn_health_task(&inner);

    Ok(MongoManager { inner })
}

/// Ensure the indexes required by the application are present.
///
/// The unique bonus-marker `_id` already enforces one claim per season and
/// user; the remaining indexes exist for the round-scoped scans.
pub async fn ensure_indexes(database: &Database) -> Result<()> {
    create_index(database, STATUS_COLLECTION, "round", doc! {"round": 1}).await?;
    create_index(
        database,
        STATUS_COLLECTION,
        "question_id",
        doc! {"question_id": 1},
    )
    .await?;
    create_index(database, PICKS_COLLECTION, "round", doc! {"round": 1}).await?;
    create_index(database, PICKS_COLLECTION, "user", doc! {"user": 1}).await?;
    Ok(())
}

async fn create_index(
    database: &Database,
    collection: &'static str,
    index: &'static str,
    keys: mongodb::bson::Document,
) -> Result<()> {
    let model = mongodb::IndexModel::builder().keys(keys).build();
    database
        .collection::<mongodb::bson::Document>(collection)
        .create_index(model)
        .await
        .map_err(|source| StoreError::EnsureIndex {
            collection,
            index,
            source,
        })?;
    Ok(())
}

impl MongoManager {
    /// Clone the current database handle.
    pub async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    /// Issue a ping against the current MongoDB connection.
    pub async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }
}

impl MongoManagerInner {
    fn spawn_health_task(inner: &Arc<Self>) {
        let weak = Arc::downgrade(inner);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(HEALTH_CHECK_INTERVAL_SECS));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };

                if let Err(err) = inner.ping().await {
                    warn!(error = %err, "MongoDB health ping failed; attempting reconnect");
                    inner.reconnect().await;
                }
            }
        });
    }

    async fn ping(&self) -> Result<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| StoreError::HealthPing { source })?;

        Ok(())
    }

    async fn reconnect(&self) {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match establish_connection(&self.options, &self.database_name).await {
                Ok((client, database)) => {
                    {
                        let mut guard = self.state.write().await;
                        guard.client = client;
                        guard.database = database;
                    }
                    info!(attempt, "reconnected to MongoDB");
                    break;
                }
                Err(err) => {
                    error!(
                        attempt,
                        error = %err,
                        uri = %self.uri,
                        "MongoDB reconnect attempt failed"
                    );

                    let backoff_multiplier = 1u64 << (attempt.saturating_sub(1).min(4));
                    let wait = Duration::from_millis(BASE_RETRY_DELAY_MS * backoff_multiplier)
                        .min(Duration::from_secs(5));

                    sleep(wait).await;
                }
            }
        }
    }
}

async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> Result<(Client, Database)> {
    let options = options.clone();
    let client =
        Client::with_options(options).map_err(|source| StoreError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;

        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                if attempt > 1 {
                    info!(attempt, "connected to MongoDB after retry");
                }
                return Ok((client.clone(), database.clone()));
            }
            Err(err) if attempt < MAX_CONNECT_ATTEMPTS => {
                let backoff_multiplier = 1u64 << (attempt.saturating_sub(1).min(4));
                let wait = Duration::from_millis(BASE_RETRY_DELAY_MS * backoff_multiplier)
                    .min(Duration::from_secs(5));
                warn!(
                    attempt,
                    wait_ms = wait.as_millis(),
                    error = %err,
                    "MongoDB ping failed during initial connection; retrying"
                );
                sleep(wait).await;
            }
            Err(err) => {
                return Err(StoreError::InitialPing {
                    attempts: attempt,
                    source: err,
                });
            }
        }
    }
}
