mod client;
#[cfg(test)]
pub(crate) mod fake;
mod sdk;

pub use client::{
    decode_authorization_token, format_server_address, image_references, RegistryClient,
    RegistryInfo,
};
pub use sdk::EcrApi;

use async_trait::async_trait;

use crate::error::Result;

/// A repository as returned by describe-repositories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySummary {
    pub name: Option<String>,
    pub uri: Option<String>,
}

/// One page of a list-images response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePage {
    /// Tags in response order; `None` for untagged images
    pub tags: Vec<Option<String>>,
    pub next_token: Option<String>,
}

/// Remote calls against the ECR control plane
///
/// Each method is a single request. Post-processing (formatting, decoding,
/// pagination) lives in [`RegistryClient`].
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Registry id (the AWS account id) of the default registry
    async fn describe_registry(&self) -> Result<String>;

    /// Repositories matching `name`; empty if the repository does not exist
    async fn describe_repositories(&self, name: &str) -> Result<Vec<RepositorySummary>>;

    async fn list_images(&self, name: &str, next_token: Option<String>) -> Result<ImagePage>;

    /// The base64 token of the first authorization-data entry, if any
    async fn get_authorization_token(&self) -> Result<Option<String>>;
}
