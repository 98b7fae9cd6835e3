//! Retention sweeps: report expiry and snapshot purging.

use sqlx::PgPool;

use crate::IngestError;

/// Snapshots older than this are deleted; reports keep their rows and only
/// flip status, so the 30-day report horizon lives in the insert SQL.
pub const SNAPSHOT_RETENTION_DAYS: i32 = 90;

/// Counts from one maintenance sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepStats {
    pub reports_expired: u64,
    pub snapshots_purged: u64,
}

/// Expires stale reports and purges snapshots past retention.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if either sweep fails.
pub async fn run_sweep(pool: &PgPool) -> Result<SweepStats, IngestError> {
    let reports_expired = canasta_db::expire_stale_reports(pool).await?;
    let snapshots_purged =
        canasta_db::purge_snapshots_older_than(pool, SNAPSHOT_RETENTION_DAYS).await?;

    tracing::info!(reports_expired, snapshots_purged, "maintenance sweep finished");

    Ok(SweepStats {
        reports_expired,
        snapshots_purged,
    })
}
