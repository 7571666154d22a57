use serde::Serialize;

use crate::db::operations::characters;
use crate::db::DatabaseProxy;
use crate::error::{ReviewError, ReviewResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayReport {
    pub user_id: String,
    pub records_decayed: u64,
}

/// Lowers every mastery score of one user by one decay step. A user with no
/// records is a successful no-op.
pub async fn drop_marks(proxy: &DatabaseProxy, user_id: &str) -> ReviewResult<DecayReport> {
    if user_id.trim().is_empty() {
        return Err(ReviewError::validation("user id must not be empty"));
    }

    let records_decayed = characters::decay(proxy.pool(), user_id).await?;
    tracing::info!(user_id, records_decayed, "mastery marks dropped");

    Ok(DecayReport {
        user_id: user_id.to_string(),
        records_decayed,
    })
}
