use std::collections::HashMap;
use std::sync::Mutex;

use deploy_core::contract::{
    CreateFunctionRequest, FunctionDetails, NotificationBinding, UpdateFunctionCodeRequest,
};
use deploy_core::permissions::PermissionGrant;

use crate::adapters::bucket_store::BucketStore;
use crate::adapters::function_registry::FunctionRegistry;

pub(crate) fn function_arn(function_name: &str) -> String {
    format!("arn:aws:lambda:us-east-1:123456789012:function:{function_name}")
}

pub(crate) fn deployed(function_name: &str) -> FunctionDetails {
    FunctionDetails {
        function_name: Some(function_name.to_string()),
        function_arn: Some(function_arn(function_name)),
        version: Some("1".to_string()),
        ..FunctionDetails::default()
    }
}

#[derive(Default)]
pub(crate) struct RecordingRegistry {
    existing: HashMap<String, FunctionDetails>,
    created_as: Option<String>,
    create_error: Option<String>,
    update_error: Option<String>,
    permission_error: Option<String>,
    probes: Mutex<Vec<String>>,
    creates: Mutex<Vec<CreateFunctionRequest>>,
    updates: Mutex<Vec<UpdateFunctionCodeRequest>>,
    grants: Mutex<Vec<PermissionGrant>>,
}

impl RecordingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_function(mut self, function_name: &str) -> Self {
        self.existing
            .insert(function_name.to_string(), deployed(function_name));
        self
    }

    /// Makes the provider report a different name than the one requested.
    pub(crate) fn reporting_created_as(mut self, function_name: &str) -> Self {
        self.created_as = Some(function_name.to_string());
        self
    }

    pub(crate) fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_update(mut self, message: &str) -> Self {
        self.update_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_permission(mut self, message: &str) -> Self {
        self.permission_error = Some(message.to_string());
        self
    }

    pub(crate) fn probes(&self) -> Vec<String> {
        self.probes.lock().expect("poisoned mutex").clone()
    }

    pub(crate) fn creates(&self) -> Vec<CreateFunctionRequest> {
        self.creates.lock().expect("poisoned mutex").clone()
    }

    pub(crate) fn updates(&self) -> Vec<UpdateFunctionCodeRequest> {
        self.updates.lock().expect("poisoned mutex").clone()
    }

    pub(crate) fn grants(&self) -> Vec<PermissionGrant> {
        self.grants.lock().expect("poisoned mutex").clone()
    }
}

impl FunctionRegistry for RecordingRegistry {
    fn create_function(&self, request: &CreateFunctionRequest) -> Result<FunctionDetails, String> {
        self.creates
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());
        match &self.create_error {
            Some(message) => Err(message.clone()),
            None => Ok(deployed(
                self.created_as.as_deref().unwrap_or(&request.function_name),
            )),
        }
    }

    fn get_function(&self, function_name: &str) -> Result<FunctionDetails, String> {
        self.probes
            .lock()
            .expect("poisoned mutex")
            .push(function_name.to_string());
        self.existing.get(function_name).cloned().ok_or_else(|| {
            format!("ResourceNotFoundException: Function not found: {function_name}")
        })
    }

    fn update_function_code(
        &self,
        request: &UpdateFunctionCodeRequest,
    ) -> Result<FunctionDetails, String> {
        self.updates
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());
        match &self.update_error {
            Some(message) => Err(message.clone()),
            None => Ok(FunctionDetails {
                version: Some("2".to_string()),
                ..deployed(&request.function_name)
            }),
        }
    }

    fn add_permission(&self, grant: &PermissionGrant) -> Result<(), String> {
        self.grants
            .lock()
            .expect("poisoned mutex")
            .push(grant.clone());
        match &self.permission_error {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingBucketStore {
    objects: HashMap<(String, String), Vec<u8>>,
    notification_error: Option<String>,
    reads: Mutex<Vec<(String, String)>>,
    bindings: Mutex<Vec<NotificationBinding>>,
}

impl RecordingBucketStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object(mut self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        self
    }

    pub(crate) fn failing_notification(mut self, message: &str) -> Self {
        self.notification_error = Some(message.to_string());
        self
    }

    pub(crate) fn reads(&self) -> Vec<(String, String)> {
        self.reads.lock().expect("poisoned mutex").clone()
    }

    pub(crate) fn bindings(&self) -> Vec<NotificationBinding> {
        self.bindings.lock().expect("poisoned mutex").clone()
    }
}

impl BucketStore for RecordingBucketStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        self.reads
            .lock()
            .expect("poisoned mutex")
            .push((bucket.to_string(), key.to_string()));
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| format!("NoSuchKey: {bucket}/{key}"))
    }

    fn put_bucket_notification(&self, binding: &NotificationBinding) -> Result<(), String> {
        self.bindings
            .lock()
            .expect("poisoned mutex")
            .push(binding.clone());
        match &self.notification_error {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}
