use deploy_core::contract::{CreateFunctionRequest, FunctionDetails, UpdateFunctionCodeRequest};
use deploy_core::permissions::PermissionGrant;

/// Control-plane operations on serverless functions.
pub trait FunctionRegistry {
    fn create_function(&self, request: &CreateFunctionRequest) -> Result<FunctionDetails, String>;

    /// Fails when the function does not exist, among other reasons.
    fn get_function(&self, function_name: &str) -> Result<FunctionDetails, String>;

    fn update_function_code(
        &self,
        request: &UpdateFunctionCodeRequest,
    ) -> Result<FunctionDetails, String>;

    fn add_permission(&self, grant: &PermissionGrant) -> Result<(), String>;
}
