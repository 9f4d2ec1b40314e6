use deploy_core::contract::NotificationBinding;

pub trait BucketStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;

    /// Replaces the bucket's whole notification configuration.
    fn put_bucket_notification(&self, binding: &NotificationBinding) -> Result<(), String>;
}
