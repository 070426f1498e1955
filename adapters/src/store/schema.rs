use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS snapshots (
  snapshot_key TEXT PRIMARY KEY,
  payload TEXT NOT NULL,
  saved_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
