use serde::Serialize;

use crate::ecr::RegistryInfo;

/// Outcome of the registry login step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoginStatus {
    Skipped,
    Succeeded(String),
    Failed(String),
}

/// Everything a run prints to stdout
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub repository: String,
    #[serde(flatten)]
    pub registry: RegistryInfo,
    pub images: Vec<String>,
    pub login: LoginStatus,
    /// Decoded registry password, only present when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Report {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("registry id: {}\n", self.registry.registry_id));
        out.push_str(&format!("region: {}\n", self.registry.region));
        out.push_str(&format!(
            "server address: {}\n",
            self.registry.server_address
        ));
        out.push_str(&format!("images ({}):\n", self.images.len()));
        for image in &self.images {
            let tag = image.rsplit_once(':').map_or("", |(_, tag)| tag);
            out.push_str(&format!("  {}\t{}\n", tag, image));
        }
        let login = match &self.login {
            LoginStatus::Skipped => "skipped".to_string(),
            LoginStatus::Succeeded(status) => status.clone(),
            LoginStatus::Failed(reason) => format!("failed ({})", reason),
        };
        out.push_str(&format!("login: {}\n", login));
        if let Some(password) = &self.password {
            out.push_str(&format!("password: {}\n", password));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
