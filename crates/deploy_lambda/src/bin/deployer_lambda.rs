use std::collections::HashMap;
use std::future::Future;

use aws_sdk_lambda::types::{Environment, FunctionCode, Runtime};
use aws_sdk_s3::types::{
    Event, FilterRule, FilterRuleName, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationConfigurationFilter, S3KeyFilter,
};
use deploy_core::contract::{
    CreateFunctionRequest, FunctionDetails, NotificationAction, NotificationBinding,
    UpdateFunctionCodeRequest,
};
use deploy_core::permissions::PermissionGrant;
use deploy_lambda::adapters::bucket_store::BucketStore;
use deploy_lambda::adapters::describe_provider_error;
use deploy_lambda::adapters::function_registry::FunctionRegistry;
use deploy_lambda::handlers::entry::{handle_upload_event, DeployerSettings, DeploymentReport};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct AwsFunctionRegistry {
    lambda_client: aws_sdk_lambda::Client,
}

struct S3BucketStore {
    s3_client: aws_sdk_s3::Client,
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn function_details(
    function_name: Option<&str>,
    function_arn: Option<&str>,
    version: Option<&str>,
    code_sha256: Option<&str>,
    revision_id: Option<&str>,
) -> FunctionDetails {
    FunctionDetails {
        function_name: function_name.map(str::to_string),
        function_arn: function_arn.map(str::to_string),
        version: version.map(str::to_string),
        code_sha256: code_sha256.map(str::to_string),
        revision_id: revision_id.map(str::to_string),
    }
}

impl FunctionRegistry for AwsFunctionRegistry {
    fn create_function(&self, request: &CreateFunctionRequest) -> Result<FunctionDetails, String> {
        let client = self.lambda_client.clone();
        let environment = request.environment.as_ref().map(|environment| {
            Environment::builder()
                .set_variables(Some(
                    environment
                        .variables
                        .clone()
                        .into_iter()
                        .collect::<HashMap<_, _>>(),
                ))
                .build()
        });
        let vpc_config = request.vpc_config.as_ref().map(|vpc| {
            aws_sdk_lambda::types::VpcConfig::builder()
                .set_subnet_ids(Some(vpc.subnet_ids.clone()))
                .set_security_group_ids(Some(vpc.security_group_ids.clone()))
                .build()
        });

        block_on(async move {
            client
                .create_function()
                .function_name(&request.function_name)
                .runtime(Runtime::from(request.runtime.as_str()))
                .role(&request.role)
                .handler(&request.handler)
                .code(
                    FunctionCode::builder()
                        .s3_bucket(&request.code.s3_bucket)
                        .s3_key(&request.code.s3_key)
                        .build(),
                )
                .description(&request.description)
                .timeout(request.timeout)
                .memory_size(request.memory_size)
                .publish(request.publish)
                .set_layers(request.layers.clone())
                .set_environment(environment)
                .set_vpc_config(vpc_config)
                .send()
                .await
                .map(|output| {
                    function_details(
                        output.function_name(),
                        output.function_arn(),
                        output.version(),
                        output.code_sha256(),
                        output.revision_id(),
                    )
                })
                .map_err(|error| describe_provider_error("create function", &error))
        })
    }

    fn get_function(&self, function_name: &str) -> Result<FunctionDetails, String> {
        let client = self.lambda_client.clone();

        block_on(async move {
            let output = client
                .get_function()
                .function_name(function_name)
                .send()
                .await
                .map_err(|error| describe_provider_error("get function", &error))?;
            Ok::<_, String>(
                output
                    .configuration()
                    .map(|configuration| {
                        function_details(
                            configuration.function_name(),
                            configuration.function_arn(),
                            configuration.version(),
                            configuration.code_sha256(),
                            configuration.revision_id(),
                        )
                    })
                    .unwrap_or_default(),
            )
        })
    }

    fn update_function_code(
        &self,
        request: &UpdateFunctionCodeRequest,
    ) -> Result<FunctionDetails, String> {
        let client = self.lambda_client.clone();

        block_on(async move {
            client
                .update_function_code()
                .function_name(&request.function_name)
                .s3_bucket(&request.s3_bucket)
                .s3_key(&request.s3_key)
                .publish(request.publish)
                .send()
                .await
                .map(|output| {
                    function_details(
                        output.function_name(),
                        output.function_arn(),
                        output.version(),
                        output.code_sha256(),
                        output.revision_id(),
                    )
                })
                .map_err(|error| describe_provider_error("update function code", &error))
        })
    }

    fn add_permission(&self, grant: &PermissionGrant) -> Result<(), String> {
        let client = self.lambda_client.clone();

        block_on(async move {
            client
                .add_permission()
                .function_name(&grant.function_name)
                .statement_id(&grant.statement_id)
                .action(&grant.action)
                .principal(&grant.principal)
                .source_arn(&grant.source_arn)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| describe_provider_error("add permission", &error))
        })
    }
}

fn lambda_function_configuration(
    action: &NotificationAction,
) -> Result<LambdaFunctionConfiguration, String> {
    let filter = action.filter.as_ref().map(|filter| {
        let rules = filter
            .key
            .filter_rules
            .iter()
            .map(|rule| {
                FilterRule::builder()
                    .name(FilterRuleName::from(rule.name.to_ascii_lowercase().as_str()))
                    .value(&rule.value)
                    .build()
            })
            .collect::<Vec<_>>();
        NotificationConfigurationFilter::builder()
            .key(S3KeyFilter::builder().set_filter_rules(Some(rules)).build())
            .build()
    });

    LambdaFunctionConfiguration::builder()
        .set_id(action.id.clone())
        .set_lambda_function_arn(action.lambda_function_arn.clone())
        .set_events(Some(
            action
                .events
                .iter()
                .map(|event| Event::from(event.as_str()))
                .collect(),
        ))
        .set_filter(filter)
        .build()
        .map_err(|error| format!("invalid function notification: {error}"))
}

impl BucketStore for S3BucketStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let client = self.s3_client.clone();

        block_on(async move {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|error| describe_provider_error("read object from s3", &error))?;
            let body = output
                .body
                .collect()
                .await
                .map_err(|error| describe_provider_error("read object body from s3", &error))?;
            Ok::<_, String>(body.into_bytes().to_vec())
        })
    }

    fn put_bucket_notification(&self, binding: &NotificationBinding) -> Result<(), String> {
        let configurations = binding
            .lambda_function_configurations
            .iter()
            .map(lambda_function_configuration)
            .collect::<Result<Vec<_>, _>>()?;
        let notification = NotificationConfiguration::builder()
            .set_lambda_function_configurations(Some(configurations))
            .build();
        let client = self.s3_client.clone();

        block_on(async move {
            client
                .put_bucket_notification_configuration()
                .bucket(&binding.bucket_name)
                .notification_configuration(notification)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| describe_provider_error("put bucket notification", &error))
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<DeploymentReport, Error> {
    let settings = DeployerSettings::from_lookup(|name| std::env::var(name).ok())
        .map_err(Error::from)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let registry = AwsFunctionRegistry {
        lambda_client: aws_sdk_lambda::Client::new(&aws_config),
    };
    let store = S3BucketStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };

    handle_upload_event(event.payload, &settings, &registry, &store)
        .map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
