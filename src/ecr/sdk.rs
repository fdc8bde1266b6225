use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecr::types::{ListImagesFilter, TagStatus};
use aws_sdk_ecr::Client as EcrClient;
use tracing::debug;

use super::{ImagePage, RegistryApi, RepositorySummary};
use crate::error::{format_sdk_error, EcrError, Result};

/// [`RegistryApi`] backed by the AWS SDK
pub struct EcrApi {
    client: EcrClient,
}

impl EcrApi {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: EcrClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl RegistryApi for EcrApi {
    async fn describe_registry(&self) -> Result<String> {
        debug!("Calling ECR DescribeRegistry");

        let response = self
            .client
            .describe_registry()
            .send()
            .await
            .map_err(|e| EcrError::remote("describe the registry", format_sdk_error(&e)))?;

        response
            .registry_id()
            .map(String::from)
            .ok_or_else(|| EcrError::remote("describe the registry", "no registry id returned"))
    }

    async fn describe_repositories(&self, name: &str) -> Result<Vec<RepositorySummary>> {
        debug!(repository = name, "Calling ECR DescribeRepositories");

        match self
            .client
            .describe_repositories()
            .repository_names(name)
            .send()
            .await
        {
            Ok(response) => Ok(response
                .repositories()
                .iter()
                .map(|repo| RepositorySummary {
                    name: repo.repository_name().map(String::from),
                    uri: repo.repository_uri().map(String::from),
                })
                .collect()),
            Err(err) => {
                if let Some(service_err) = err.as_service_error() {
                    if service_err.is_repository_not_found_exception() {
                        return Ok(Vec::new());
                    }
                }
                Err(EcrError::remote(
                    "describe the repository",
                    format_sdk_error(&err),
                ))
            }
        }
    }

    async fn list_images(&self, name: &str, next_token: Option<String>) -> Result<ImagePage> {
        debug!(
            repository = name,
            paginated = next_token.is_some(),
            "Calling ECR ListImages"
        );

        let response = self
            .client
            .list_images()
            .repository_name(name)
            .filter(
                ListImagesFilter::builder()
                    .tag_status(TagStatus::Tagged)
                    .build(),
            )
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| EcrError::remote("list the images", format_sdk_error(&e)))?;

        Ok(ImagePage {
            tags: response
                .image_ids()
                .iter()
                .map(|image| image.image_tag().map(String::from))
                .collect(),
            next_token: response.next_token().map(String::from),
        })
    }

    async fn get_authorization_token(&self) -> Result<Option<String>> {
        debug!("Calling ECR GetAuthorizationToken");

        let response = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| {
                EcrError::remote("get the authorization token", format_sdk_error(&e))
            })?;

        Ok(response
            .authorization_data()
            .first()
            .and_then(|data| data.authorization_token())
            .map(String::from))
    }
}
