//! In-memory [`RegistryApi`] for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ImagePage, RegistryApi, RepositorySummary};
use crate::error::{EcrError, Result};

#[derive(Default)]
pub(crate) struct FakeRegistryApi {
    /// `None` makes describe-registry fail
    pub registry_id: Option<String>,
    pub repositories: Vec<RepositorySummary>,
    pub pages: Mutex<VecDeque<ImagePage>>,
    pub fail_list_images: bool,
    pub token: Option<String>,
    pub fail_token: bool,
    pub tokens_seen: Mutex<Vec<Option<String>>>,
}

impl FakeRegistryApi {
    pub fn with_repository(uri: &str) -> Self {
        Self {
            registry_id: Some("123".into()),
            repositories: vec![RepositorySummary {
                name: uri.rsplit('/').next().map(String::from),
                uri: Some(uri.to_string()),
            }],
            ..Self::default()
        }
    }

    pub fn with_pages(self, pages: Vec<ImagePage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..self
        }
    }

    /// Pagination tokens passed to list-images, in call order
    pub fn seen_tokens(&self) -> Vec<Option<String>> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryApi for FakeRegistryApi {
    async fn describe_registry(&self) -> Result<String> {
        self.registry_id
            .clone()
            .ok_or_else(|| EcrError::remote("describe the registry", "access denied"))
    }

    async fn describe_repositories(&self, _name: &str) -> Result<Vec<RepositorySummary>> {
        Ok(self.repositories.clone())
    }

    async fn list_images(&self, _name: &str, next_token: Option<String>) -> Result<ImagePage> {
        self.tokens_seen.lock().unwrap().push(next_token);
        if self.fail_list_images {
            return Err(EcrError::remote("list the images", "throttled"));
        }
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn get_authorization_token(&self) -> Result<Option<String>> {
        if self.fail_token {
            return Err(EcrError::remote("get the authorization token", "expired"));
        }
        Ok(self.token.clone())
    }
}
