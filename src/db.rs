use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;
use std::path::Path;

/// Open a read-only connection to a snapshot of a history database.
///
/// The snapshot is private scratch input, so the connection is opened
/// immutable: no locks are taken and nothing is ever written back.
pub async fn open_readonly(path: &Path) -> Result<SqliteConnection> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .immutable(true);

    let conn = options.connect().await?;
    Ok(conn)
}
