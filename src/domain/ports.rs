use crate::domain::model::DispatchReport;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Every file under `dir`, recursively, sorted by path.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, payload: &Value) -> Result<DispatchReport>;
}
