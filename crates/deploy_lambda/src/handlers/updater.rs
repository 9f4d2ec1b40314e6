use deploy_core::contract::{build_update_request, DeploymentDocument, FunctionDetails};
use serde_json::json;

use crate::adapters::function_registry::FunctionRegistry;
use crate::logging::log_info;

/// Points an existing function at the uploaded package and publishes a new
/// version. Failures are returned to the caller without local recovery.
pub fn update_function(
    document: &DeploymentDocument,
    current: &FunctionDetails,
    registry: &impl FunctionRegistry,
) -> Result<FunctionDetails, String> {
    let request = build_update_request(document, current);
    let response = registry.update_function_code(&request)?;
    log_info(
        "updater",
        "function_updated",
        json!({
            "request": request,
            "response": response,
        }),
    );
    Ok(response)
}
