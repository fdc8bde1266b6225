use aws_config::SdkConfig;
use base64::Engine;
use serde::Serialize;
use tracing::{debug, info};

use super::{EcrApi, RegistryApi};
use crate::error::{EcrError, Result};

/// Prefix of a decoded ECR authorization token ("AWS:<password>")
const TOKEN_PREFIX: &str = "AWS:";

/// Identity of the registry the client talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryInfo {
    pub registry_id: String,
    pub region: String,
    pub server_address: String,
}

/// Registry operations on top of a [`RegistryApi`]
pub struct RegistryClient<A = EcrApi> {
    api: A,
    region: String,
}

impl RegistryClient<EcrApi> {
    /// Create a client using the SDK configuration's region
    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Result<Self> {
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .ok_or_else(|| EcrError::ConfigLoadFailure("no AWS region configured".into()))?;
        Ok(Self::new(EcrApi::new(sdk_config), region))
    }
}

impl<A: RegistryApi> RegistryClient<A> {
    pub fn new(api: A, region: impl Into<String>) -> Self {
        Self {
            api,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Describe the registry: its id, region and login server address
    pub async fn registry_info(&self) -> Result<RegistryInfo> {
        let registry_id = self.api.describe_registry().await?;
        let server_address = format_server_address(&registry_id, &self.region);
        debug!(registry_id = %registry_id, server_address = %server_address, "Resolved registry");

        Ok(RegistryInfo {
            registry_id,
            region: self.region.clone(),
            server_address,
        })
    }

    /// The address `docker login` expects for this registry
    pub async fn server_address(&self) -> Result<String> {
        Ok(self.registry_info().await?.server_address)
    }

    /// Look up the URI of exactly one repository named `repository_name`
    pub async fn repository_uri(&self, repository_name: &str) -> Result<String> {
        let repositories: Vec<_> = self
            .api
            .describe_repositories(repository_name)
            .await?
            .into_iter()
            .filter(|repo| {
                repo.name
                    .as_deref()
                    .map_or(true, |name| name == repository_name)
            })
            .collect();

        match repositories.as_slice() {
            [] => Err(EcrError::RepositoryNotFound(repository_name.to_string())),
            [repository] => repository.uri.clone().ok_or_else(|| {
                EcrError::remote("describe the repository", "no repository URI returned")
            }),
            _ => Err(EcrError::AmbiguousRepository {
                name: repository_name.to_string(),
                count: repositories.len(),
            }),
        }
    }

    /// List the tagged images in a repository as `<repository uri>:<tag>`
    ///
    /// All result pages are fetched. Untagged images are skipped.
    pub async fn list_images(&self, repository_name: &str) -> Result<Vec<String>> {
        let uri = self.repository_uri(repository_name).await?;
        self.list_images_at(repository_name, &uri).await
    }

    /// Like [`Self::list_images`] for a repository whose URI is already known
    pub async fn list_images_at(&self, repository_name: &str, uri: &str) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = self.api.list_images(repository_name, next_token).await?;
            tags.extend(page.tags.into_iter().flatten());

            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
        }

        let images = image_references(uri, tags);
        info!(
            repository = repository_name,
            count = images.len(),
            "Listed repository images"
        );
        Ok(images)
    }

    /// A password that `docker login --username AWS --password-stdin` accepts
    pub async fn get_authorization_token(&self) -> Result<String> {
        let token = self
            .api
            .get_authorization_token()
            .await?
            .ok_or_else(|| EcrError::DecodeFailure("no authorization data returned".into()))?;

        decode_authorization_token(&token)
    }
}

/// `<registry id>.dkr.ecr.<region>.amazonaws.com`
pub fn format_server_address(registry_id: &str, region: &str) -> String {
    format!("{}.dkr.ecr.{}.amazonaws.com", registry_id, region)
}

/// Combine a repository URI with each non-empty tag
pub fn image_references<I, S>(uri: &str, tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if uri.is_empty() {
        return Vec::new();
    }
    tags.into_iter()
        .filter(|tag| !tag.as_ref().is_empty())
        .map(|tag| format!("{}:{}", uri, tag.as_ref()))
        .collect()
}

/// Decode a base64 ECR token ("AWS:<password>") into the password
pub fn decode_authorization_token(token: &str) -> Result<String> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token.trim())
        .map_err(|e| EcrError::DecodeFailure(e.to_string()))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| EcrError::DecodeFailure("token is not valid UTF-8".into()))?;

    decoded
        .strip_prefix(TOKEN_PREFIX)
        .map(String::from)
        .ok_or_else(|| EcrError::DecodeFailure("token does not start with 'AWS:'".into()))
}
