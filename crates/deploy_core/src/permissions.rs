use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::ConfigError;

pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";
pub const STORAGE_PRINCIPAL: &str = "s3.amazonaws.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionGrant {
    pub function_name: String,
    pub statement_id: String,
    pub action: String,
    pub principal: String,
    pub source_arn: String,
}

/// How permission statement identifiers are minted.
///
/// `Random` gives every grant a fresh UUID, so repeated deployments
/// accumulate statements. `Deterministic` derives the identifier from the
/// bucket and function, so a repeated grant is rejected by the provider as a
/// duplicate instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementIdStrategy {
    #[default]
    Random,
    Deterministic,
}

impl StatementIdStrategy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "deterministic" => Ok(Self::Deterministic),
            other => Err(ConfigError::new(format!(
                "Unknown statement id strategy '{other}' (expected 'random' or 'deterministic')"
            ))),
        }
    }

    pub fn statement_id(self, bucket_name: &str, function_name: &str) -> String {
        match self {
            Self::Random => uuid::Uuid::new_v4().to_string(),
            Self::Deterministic => {
                let mut hasher = Sha256::new();
                hasher.update(bucket_name.as_bytes());
                hasher.update(b"\n");
                hasher.update(function_name.as_bytes());
                let digest = format!("{:x}", hasher.finalize());
                format!("s3-invoke-{}", &digest[..32])
            }
        }
    }
}

pub fn bucket_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{bucket_name}")
}

pub fn build_permission_grant(
    bucket_name: &str,
    function_name: &str,
    strategy: StatementIdStrategy,
) -> PermissionGrant {
    PermissionGrant {
        function_name: function_name.to_string(),
        statement_id: strategy.statement_id(bucket_name, function_name),
        action: INVOKE_ACTION.to_string(),
        principal: STORAGE_PRINCIPAL.to_string(),
        source_arn: bucket_arn(bucket_name),
    }
}
