use deploy_core::contract::{
    build_create_request, merge_function_arn, DeploymentDocument, FunctionDetails,
};
use deploy_core::permissions::StatementIdStrategy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::bucket_store::BucketStore;
use crate::adapters::function_registry::FunctionRegistry;
use crate::handlers::permissions::grant_bucket_invoke;
use crate::handlers::provisioner::provision_function;
use crate::handlers::trigger::bind_bucket_trigger;
use crate::logging::log_error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStep {
    GrantPermission,
    BindTrigger,
}

/// What the creation path achieved. Failures are reported here instead of
/// being returned as errors, and nothing is rolled back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreationOutcome {
    Created {
        function: FunctionDetails,
        trigger_bound: bool,
    },
    PartiallyCreated {
        function: FunctionDetails,
        failed_step: DeploymentStep,
        message: String,
    },
    Failed {
        message: String,
    },
}

/// Creates a new function from the deployment document and, when the document
/// carries a notification, wires the bucket to invoke it. A document whose
/// creation fields do not type is reported as a failed creation.
pub fn create_deployment(
    document: &DeploymentDocument,
    statement_ids: StatementIdStrategy,
    registry: &impl FunctionRegistry,
    store: &impl BucketStore,
) -> CreationOutcome {
    let config = match document.deployment_config() {
        Ok(value) => value,
        Err(error) => {
            let message = error.to_string();
            log_error(
                "decider",
                "creation_failed",
                json!({
                    "function_name": document.lookup_name(),
                    "message": message,
                }),
            );
            return CreationOutcome::Failed { message };
        }
    };

    let request = build_create_request(&config);
    let function = match provision_function(&request, registry) {
        Ok(value) => value,
        Err(message) => {
            log_error(
                "decider",
                "creation_failed",
                json!({
                    "function_name": request.function_name,
                    "message": message,
                }),
            );
            return CreationOutcome::Failed { message };
        }
    };

    let Some(notification) = &config.notification else {
        return CreationOutcome::Created {
            function,
            trigger_bound: false,
        };
    };

    let granted = function
        .function_name
        .as_deref()
        .ok_or_else(|| "create-function response did not include FunctionName".to_string())
        .and_then(|function_name| {
            grant_bucket_invoke(
                &notification.bucket_name,
                function_name,
                statement_ids,
                registry,
            )
        });
    if let Err(message) = granted {
        return partial(function, DeploymentStep::GrantPermission, message);
    }

    let bound = function
        .function_arn
        .as_deref()
        .ok_or_else(|| "create-function response did not include FunctionArn".to_string())
        .and_then(|function_arn| {
            bind_bucket_trigger(
                &notification.bucket_name,
                merge_function_arn(&notification.action, function_arn),
                store,
            )
        });
    if let Err(message) = bound {
        return partial(function, DeploymentStep::BindTrigger, message);
    }

    CreationOutcome::Created {
        function,
        trigger_bound: true,
    }
}

fn partial(
    function: FunctionDetails,
    failed_step: DeploymentStep,
    message: String,
) -> CreationOutcome {
    log_error(
        "decider",
        "creation_failed",
        json!({
            "function": function,
            "failed_step": failed_step,
            "message": message,
        }),
    );
    CreationOutcome::PartiallyCreated {
        function,
        failed_step,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fakes::{function_arn, RecordingBucketStore, RecordingRegistry};

    fn document_with_notification() -> DeploymentDocument {
        DeploymentDocument::from_value(json!({
            "FunctionName": "thumbs",
            "Notification": {
                "BucketName": "B",
                "Action": {
                    "Events": ["s3:ObjectCreated:*"],
                    "Filter": {"Key": {"FilterRules": [{"Name": "suffix", "Value": ".jpg"}]}}
                }
            }
        }))
        .expect("document should be an object")
        .with_code_location("uploads", "thumbs.zip")
    }

    #[test]
    fn creates_without_trigger_when_no_notification() {
        let registry = RecordingRegistry::new();
        let store = RecordingBucketStore::new();
        let document = DeploymentDocument::default().with_code_location("B", "report.csv");

        let outcome = create_deployment(&document, StatementIdStrategy::Random, &registry, &store);

        assert!(matches!(
            outcome,
            CreationOutcome::Created {
                trigger_bound: false,
                ..
            }
        ));
        assert_eq!(registry.creates().len(), 1);
        assert!(registry.grants().is_empty());
        assert!(store.bindings().is_empty());
    }

    #[test]
    fn grants_permission_and_binds_trigger_with_created_arn() {
        let registry = RecordingRegistry::new();
        let store = RecordingBucketStore::new();

        let outcome = create_deployment(
            &document_with_notification(),
            StatementIdStrategy::Random,
            &registry,
            &store,
        );

        assert!(matches!(
            outcome,
            CreationOutcome::Created {
                trigger_bound: true,
                ..
            }
        ));

        let grants = registry.grants();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].source_arn, "arn:aws:s3:::B");
        assert_eq!(grants[0].function_name, "thumbs");

        let bindings = store.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].bucket_name, "B");
        assert_eq!(bindings[0].lambda_function_configurations.len(), 1);
        let entry = &bindings[0].lambda_function_configurations[0];
        assert_eq!(entry.lambda_function_arn, Some(function_arn("thumbs")));
        assert_eq!(entry.events, vec!["s3:ObjectCreated:*".to_string()]);
    }

    #[test]
    fn swallows_creation_failure() {
        let registry = RecordingRegistry::new().failing_create("InvalidParameterValueException");
        let store = RecordingBucketStore::new();

        let outcome = create_deployment(
            &document_with_notification(),
            StatementIdStrategy::Random,
            &registry,
            &store,
        );

        assert_eq!(
            outcome,
            CreationOutcome::Failed {
                message: "InvalidParameterValueException".to_string()
            }
        );
        assert!(registry.grants().is_empty());
        assert!(store.bindings().is_empty());
    }

    #[test]
    fn reports_partial_deployment_when_permission_fails() {
        let registry = RecordingRegistry::new().failing_permission("AccessDeniedException");
        let store = RecordingBucketStore::new();

        let outcome = create_deployment(
            &document_with_notification(),
            StatementIdStrategy::Random,
            &registry,
            &store,
        );

        match outcome {
            CreationOutcome::PartiallyCreated {
                failed_step,
                message,
                ..
            } => {
                assert_eq!(failed_step, DeploymentStep::GrantPermission);
                assert_eq!(message, "AccessDeniedException");
            }
            other => panic!("expected partial deployment, got {other:?}"),
        }
        assert!(store.bindings().is_empty());
    }

    #[test]
    fn keeps_created_function_when_trigger_binding_fails() {
        let registry = RecordingRegistry::new();
        let store = RecordingBucketStore::new().failing_notification("InvalidArgument");

        let outcome = create_deployment(
            &document_with_notification(),
            StatementIdStrategy::Deterministic,
            &registry,
            &store,
        );

        assert!(matches!(
            outcome,
            CreationOutcome::PartiallyCreated {
                failed_step: DeploymentStep::BindTrigger,
                ..
            }
        ));
        assert_eq!(registry.creates().len(), 1);
        assert_eq!(registry.grants().len(), 1);
    }

    #[test]
    fn uses_provider_reported_identity_for_grant_and_trigger() {
        let registry = RecordingRegistry::new().reporting_created_as("thumbs-prod");
        let store = RecordingBucketStore::new();

        let outcome = create_deployment(
            &document_with_notification(),
            StatementIdStrategy::Random,
            &registry,
            &store,
        );

        assert!(matches!(outcome, CreationOutcome::Created { .. }));
        assert_eq!(registry.creates()[0].function_name, "thumbs");
        assert_eq!(registry.grants()[0].function_name, "thumbs-prod");
        assert_eq!(
            store.bindings()[0].lambda_function_configurations[0].lambda_function_arn,
            Some(function_arn("thumbs-prod"))
        );
    }

    #[test]
    fn untyped_creation_fields_fail_without_provider_calls() {
        let registry = RecordingRegistry::new();
        let store = RecordingBucketStore::new();
        let document = DeploymentDocument::from_value(json!({
            "FunctionName": "f1",
            "Variables": {"PORT": 8080}
        }))
        .expect("document should be an object");

        let outcome = create_deployment(&document, StatementIdStrategy::Random, &registry, &store);

        match outcome {
            CreationOutcome::Failed { message } => {
                assert!(message.starts_with("Invalid deployment configuration"));
            }
            other => panic!("expected failed creation, got {other:?}"),
        }
        assert!(registry.creates().is_empty());
    }

    #[test]
    fn empty_notification_creates_without_trigger() {
        let registry = RecordingRegistry::new();
        let store = RecordingBucketStore::new();
        let document = DeploymentDocument::from_value(json!({"Notification": {}}))
            .expect("document should be an object");

        let outcome = create_deployment(&document, StatementIdStrategy::Random, &registry, &store);

        assert!(matches!(
            outcome,
            CreationOutcome::Created {
                trigger_bound: false,
                ..
            }
        ));
        assert!(registry.grants().is_empty());
        assert!(store.bindings().is_empty());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(CreationOutcome::Failed {
            message: "boom".to_string(),
        })
        .expect("outcome should serialize");

        assert_eq!(value, json!({"status": "failed", "message": "boom"}));
    }
}
