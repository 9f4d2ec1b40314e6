use deploy_core::contract::{NotificationAction, NotificationBinding};
use serde_json::json;

use crate::adapters::bucket_store::BucketStore;
use crate::logging::log_info;

/// Replaces the bucket's notification configuration with exactly one function
/// trigger. Rules configured by anyone else on the bucket are dropped: last
/// writer wins.
pub fn bind_bucket_trigger(
    bucket_name: &str,
    action: NotificationAction,
    store: &impl BucketStore,
) -> Result<(), String> {
    let binding = NotificationBinding::replace_with(bucket_name, action);
    store.put_bucket_notification(&binding)?;
    log_info("trigger_binder", "trigger_bound", json!(binding));
    Ok(())
}
