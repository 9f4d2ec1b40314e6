use aws_sdk_lambda::error::DisplayErrorContext;

pub mod bucket_store;
pub mod function_registry;

/// Formats an SDK failure with its whole source chain, so the provider's
/// error code and message survive into the logs.
pub fn describe_provider_error(operation: &str, error: &impl std::error::Error) -> String {
    format!("failed to {operation}: {}", DisplayErrorContext(error))
}
