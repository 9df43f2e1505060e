// region:    --- Imports
use crate::database::DatabaseManager;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Postgres, Transaction};
// endregion: --- Imports

// region:    --- Model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}
// endregion: --- Model

// region:    --- Notifications
/// Inserts a notification inside the caller's transaction so it commits or
/// rolls back together with the action that produced it.
pub async fn notify(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    message: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO notifications (user_id, message) VALUES ($1, $2)")
        .bind(user_id)
        .bind(message)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Marks one of the user's own notifications read. Returns false when the
/// notification does not exist or belongs to someone else.
pub async fn mark_read(
    db: &DatabaseManager,
    notification_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    db.transaction(|tx| {
        Box::pin(async move {
            let updated = sqlx::query_scalar::<_, i64>(
                "UPDATE notifications SET is_read = TRUE
                 WHERE id = $1 AND user_id = $2
                 RETURNING id",
            )
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
            Ok(updated.is_some())
        })
    })
    .await
}

/// Dollar rendering for notification messages; amounts are integer cents.
pub fn fmt_usd(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
// endregion: --- Notifications

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cents_as_dollars() {
        assert_eq!(fmt_usd(1000), "$10.00");
        assert_eq!(fmt_usd(1001), "$10.01");
        assert_eq!(fmt_usd(5), "$0.05");
        assert_eq!(fmt_usd(123456), "$1234.56");
    }
}
