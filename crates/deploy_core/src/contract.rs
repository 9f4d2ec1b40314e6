use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONFIG_OBJECT_KEY: &str = "function.json";
pub const DEFAULT_FUNCTION_NAME: &str = "default-function";
pub const DEFAULT_RUNTIME: &str = "python3.8";
pub const DEFAULT_ROLE: &str = "< Lambda Role >";
pub const DEFAULT_DESCRIPTION: &str = "default details";
pub const DEFAULT_HANDLER: &str = "lambda_function.lambda_handler";
pub const DEFAULT_TIMEOUT_SECONDS: i32 = 500;
pub const DEFAULT_MEMORY_SIZE_MB: i32 = 300;

/// The `function.json` document describing how an uploaded package should be
/// deployed. Field names follow the provider API casing; unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(alias = "Details", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationSpec>,
    #[serde(rename = "bucket_name", skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(rename = "key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl DeploymentConfig {
    /// Points the code package at the uploaded object, replacing whatever
    /// location the document carried.
    pub fn with_code_location(mut self, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket.into());
        self.key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfig {
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

impl VpcConfig {
    pub fn is_empty(&self) -> bool {
        self.subnet_ids.is_empty() && self.security_group_ids.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationSpec {
    pub bucket_name: String,
    pub action: NotificationAction,
}

/// One function-trigger entry of a bucket notification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_function_arn: Option<String>,
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<NotificationFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationFilter {
    pub key: KeyFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct KeyFilter {
    #[serde(default)]
    pub filter_rules: Vec<FilterRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FilterRule {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCodeLocation {
    pub s3_bucket: String,
    pub s3_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentVariables {
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateFunctionRequest {
    pub function_name: String,
    pub runtime: String,
    pub role: String,
    pub handler: String,
    pub code: FunctionCodeLocation,
    pub description: String,
    pub timeout: i32,
    pub memory_size: i32,
    pub publish: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentVariables>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateFunctionCodeRequest {
    pub function_name: String,
    pub s3_bucket: String,
    pub s3_key: String,
    pub publish: bool,
}

/// The parts of a provider function response the deployer reads or logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
}

/// A bucket notification configuration holding exactly one function trigger.
/// Submitting it replaces every rule previously configured on the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationBinding {
    pub bucket_name: String,
    pub lambda_function_configurations: Vec<NotificationAction>,
}

impl NotificationBinding {
    pub fn replace_with(bucket_name: impl Into<String>, action: NotificationAction) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            lambda_function_configurations: vec![action],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Optional fields that only reach the create request when truthy. An empty
/// or zero value is treated as if the key were missing.
const ADDITIVE_FIELDS: [&str; 4] = ["Layers", "Variables", "VpcConfig", "Notification"];

/// `function.json` as loaded from the bucket. Only the function name and the
/// code location are read before the existence check; the creation-only
/// fields are typed by [`DeploymentDocument::deployment_config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentDocument {
    fields: Map<String, Value>,
}

impl DeploymentDocument {
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ConfigError::new(
                "Deployment configuration must be a JSON object",
            )),
        }
    }

    pub fn with_code_location(mut self, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        self.fields
            .insert("bucket_name".to_string(), Value::String(bucket.into()));
        self.fields
            .insert("key".to_string(), Value::String(key.into()));
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn function_name(&self) -> Option<&str> {
        self.string_field("FunctionName")
    }

    /// Name used for the existence check. A missing or non-string name looks up
    /// the empty string, which the provider always rejects.
    pub fn lookup_name(&self) -> &str {
        self.function_name().unwrap_or("")
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.string_field("bucket_name")
    }

    pub fn key(&self) -> Option<&str> {
        self.string_field("key")
    }

    /// Types the whole document for the creation path. `Description` wins
    /// when both it and `Details` are present.
    pub fn deployment_config(&self) -> Result<DeploymentConfig, ConfigError> {
        let mut fields = self.fields.clone();
        for name in ADDITIVE_FIELDS {
            if fields.get(name).is_some_and(is_falsy) {
                fields.remove(name);
            }
        }
        if fields.contains_key("Description") {
            fields.remove("Details");
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|error| ConfigError::new(format!("Invalid deployment configuration: {error}")))
    }

    fn string_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

pub fn parse_deployment_document(body: &[u8]) -> Result<DeploymentDocument, ConfigError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|error| ConfigError::new(format!("Malformed deployment configuration: {error}")))?;
    DeploymentDocument::from_value(value)
}

pub fn build_create_request(config: &DeploymentConfig) -> CreateFunctionRequest {
    let layers = config
        .layers
        .as_ref()
        .filter(|layers| !layers.is_empty())
        .cloned();
    let environment = config
        .variables
        .as_ref()
        .filter(|variables| !variables.is_empty())
        .map(|variables| EnvironmentVariables {
            variables: variables.clone(),
        });
    let vpc_config = config
        .vpc_config
        .as_ref()
        .filter(|vpc| !vpc.is_empty())
        .cloned();

    CreateFunctionRequest {
        function_name: config
            .function_name
            .clone()
            .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string()),
        runtime: config
            .runtime
            .clone()
            .unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
        role: config
            .role
            .clone()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        handler: config
            .handler
            .clone()
            .unwrap_or_else(|| DEFAULT_HANDLER.to_string()),
        code: FunctionCodeLocation {
            s3_bucket: config.bucket_name.clone().unwrap_or_default(),
            s3_key: config.key.clone().unwrap_or_default(),
        },
        description: config
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        timeout: config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        memory_size: config.memory_size.unwrap_or(DEFAULT_MEMORY_SIZE_MB),
        publish: config.publish.unwrap_or(false),
        layers,
        environment,
        vpc_config,
    }
}

/// Code updates always publish a new version. The document's function name
/// wins over the one reported by the provider.
pub fn build_update_request(
    document: &DeploymentDocument,
    current: &FunctionDetails,
) -> UpdateFunctionCodeRequest {
    let function_name = document
        .function_name()
        .map(str::to_string)
        .or_else(|| current.function_name.clone())
        .unwrap_or_default();

    UpdateFunctionCodeRequest {
        function_name,
        s3_bucket: document.bucket_name().unwrap_or_default().to_string(),
        s3_key: document.key().unwrap_or_default().to_string(),
        publish: true,
    }
}

pub fn merge_function_arn(action: &NotificationAction, function_arn: &str) -> NotificationAction {
    NotificationAction {
        lambda_function_arn: Some(function_arn.to_string()),
        ..action.clone()
    }
}
