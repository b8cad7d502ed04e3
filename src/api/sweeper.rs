//! Background sweep that hard-deletes expired invitations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::store::DataStore;

/// Periodically delete invitations past their expiry. The first
/// sweep runs immediately so a restart cleans up right away. Errors are
/// logged and the loop keeps going; a failed sweep only delays cleanup.
pub fn spawn_expiry_sweeper(store: Arc<dyn DataStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.delete_expired_invitations(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired invitations removed"),
                Err(e) => warn!("invitation expiry sweep failed: {e}"),
            }
        }
    });
}
