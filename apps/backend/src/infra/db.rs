//! Database bootstrap.
//!
//! The history store is embedded SQLite; the schema is derived from the
//! entities at startup, so there is no separate migration step.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::entities::completed_rounds;
use crate::error::AppError;

/// Connect to the history database. `sqlite::memory:` is valid and used by
/// the test suites.
pub async fn connect_db(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(database_url.to_string());
    if database_url.contains(":memory:") {
        // A pooled in-memory SQLite would give every pooled connection its
        // own empty database.
        options.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Create the history table if it does not exist yet.
pub async fn init_schema(conn: &DatabaseConnection) -> Result<(), AppError> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(completed_rounds::Entity);
    statement.if_not_exists();
    conn.execute(backend.build(&statement)).await?;
    Ok(())
}
