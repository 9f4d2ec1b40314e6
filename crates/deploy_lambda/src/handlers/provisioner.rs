use deploy_core::contract::{CreateFunctionRequest, FunctionDetails};
use serde_json::json;

use crate::adapters::function_registry::FunctionRegistry;
use crate::logging::log_info;

/// Issues a single create-function call. Provider rejections propagate to
/// the caller untouched.
pub fn provision_function(
    request: &CreateFunctionRequest,
    registry: &impl FunctionRegistry,
) -> Result<FunctionDetails, String> {
    let response = registry.create_function(request)?;
    log_info(
        "provisioner",
        "function_created",
        json!({
            "request": request,
            "response": response,
        }),
    );
    Ok(response)
}
