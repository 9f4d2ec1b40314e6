use deploy_core::permissions::{build_permission_grant, StatementIdStrategy};
use serde_json::json;

use crate::adapters::function_registry::FunctionRegistry;
use crate::logging::log_info;

/// Lets the storage service invoke `function_name` for events coming from
/// `bucket_name` only. No duplicate detection is performed.
pub fn grant_bucket_invoke(
    bucket_name: &str,
    function_name: &str,
    strategy: StatementIdStrategy,
    registry: &impl FunctionRegistry,
) -> Result<(), String> {
    let grant = build_permission_grant(bucket_name, function_name, strategy);
    registry.add_permission(&grant)?;
    log_info("permission_grantor", "permission_granted", json!(grant));
    Ok(())
}
