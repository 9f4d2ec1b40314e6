use deploy_core::contract::{parse_deployment_document, FunctionDetails, CONFIG_OBJECT_KEY};
use deploy_core::event::extract_upload;
use deploy_core::permissions::StatementIdStrategy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::bucket_store::BucketStore;
use crate::adapters::function_registry::FunctionRegistry;
use crate::handlers::decider::{create_deployment, CreationOutcome};
use crate::handlers::updater::update_function;
use crate::logging::{log_error, log_info};

pub const CONFIG_KEY_ENV: &str = "DEPLOYER_CONFIG_KEY";
pub const STATEMENT_IDS_ENV: &str = "DEPLOYER_STATEMENT_IDS";
pub const UPDATE_FAILURE_ENV: &str = "DEPLOYER_ON_UPDATE_FAILURE";

/// What to do when the probe found the function but the code update failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateFailurePolicy {
    /// Treat the failure like a missing function and run the creation path.
    #[default]
    Create,
    /// Stop after the failed update.
    Report,
}

impl UpdateFailurePolicy {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "report" => Ok(Self::Report),
            other => Err(format!(
                "{UPDATE_FAILURE_ENV} must be 'create' or 'report', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerSettings {
    pub config_object_key: String,
    pub statement_ids: StatementIdStrategy,
    pub on_update_failure: UpdateFailurePolicy,
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            config_object_key: CONFIG_OBJECT_KEY.to_string(),
            statement_ids: StatementIdStrategy::default(),
            on_update_failure: UpdateFailurePolicy::default(),
        }
    }
}

impl DeployerSettings {
    /// Builds settings from a variable lookup; unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut settings = Self::default();
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = read(CONFIG_KEY_ENV) {
            settings.config_object_key = key.trim().to_string();
        }
        if let Some(value) = read(STATEMENT_IDS_ENV) {
            settings.statement_ids = StatementIdStrategy::parse(&value)
                .map_err(|error| format!("{STATEMENT_IDS_ENV}: {error}"))?;
        }
        if let Some(value) = read(UPDATE_FAILURE_ENV) {
            settings.on_update_failure = UpdateFailurePolicy::parse(&value)?;
        }
        Ok(settings)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPath {
    Update,
    Create,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated { function: FunctionDetails },
    Failed { message: String },
}

/// Lambda response describing which branch ran and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentReport {
    pub bucket: String,
    pub key: String,
    pub function_name: String,
    pub path: DeploymentPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<CreationOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointError {
    pub message: String,
    pub bucket: Option<String>,
}

impl std::fmt::Display for EntryPointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EntryPointError {}

/// Handles one storage-upload event: loads the deployment document from the
/// triggering bucket, then updates the named function if the probe finds it
/// or creates it otherwise.
///
/// Only a malformed event or a deployment document that is not a JSON object
/// is returned as an error. Fields used only for creation are validated on
/// the creation path, so an existing function is still updated when they are
/// malformed. Provider failures end up in the report.
pub fn handle_upload_event(
    event: Value,
    settings: &DeployerSettings,
    registry: &impl FunctionRegistry,
    store: &impl BucketStore,
) -> Result<DeploymentReport, EntryPointError> {
    let extracted = extract_upload(&event).map_err(|error| EntryPointError {
        message: error.to_string(),
        bucket: None,
    })?;
    let upload = extracted.upload;
    log_info(
        "entry_point",
        "upload_received",
        json!({
            "bucket": upload.bucket.clone(),
            "key": upload.key.clone(),
        }),
    );
    if extracted.ignored_records > 0 {
        log_info(
            "entry_point",
            "extra_records_ignored",
            json!({ "ignored_records": extracted.ignored_records }),
        );
    }

    let body = store
        .read_object(&upload.bucket, &settings.config_object_key)
        .map_err(|error| EntryPointError {
            message: format!(
                "Failed to load {} from {}: {error}",
                settings.config_object_key, upload.bucket
            ),
            bucket: Some(upload.bucket.clone()),
        })?;
    let document = parse_deployment_document(&body)
        .map_err(|error| EntryPointError {
            message: error.to_string(),
            bucket: Some(upload.bucket.clone()),
        })?
        .with_code_location(upload.bucket.clone(), upload.key.clone());
    log_info("entry_point", "config_loaded", json!(document.fields()));

    let function_name = document.lookup_name().to_string();
    let mut report = DeploymentReport {
        bucket: upload.bucket,
        key: upload.key,
        function_name: function_name.clone(),
        path: DeploymentPath::Create,
        update: None,
        creation: None,
    };

    match registry.get_function(&function_name) {
        Ok(current) => {
            report.path = DeploymentPath::Update;
            match update_function(&document, &current, registry) {
                Ok(function) => {
                    report.update = Some(UpdateOutcome::Updated { function });
                    return Ok(report);
                }
                Err(message) => {
                    log_error(
                        "entry_point",
                        "update_failed",
                        json!({
                            "function_name": function_name,
                            "message": message.clone(),
                        }),
                    );
                    report.update = Some(UpdateOutcome::Failed { message });
                    if settings.on_update_failure == UpdateFailurePolicy::Report {
                        return Ok(report);
                    }
                }
            }
        }
        Err(message) => {
            log_error(
                "entry_point",
                "probe_failed",
                json!({
                    "function_name": function_name,
                    "message": message,
                }),
            );
        }
    }

    report.creation = Some(create_deployment(
        &document,
        settings.statement_ids,
        registry,
        store,
    ));
    Ok(report)
}
