use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::ValueEnum;
use tracing::debug;

use crate::error::{EcrError, Result};

/// How the final report is written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings for one invocation, built once from the command line
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS shared-config profile (None uses the default credential chain)
    pub profile: Option<String>,
    pub verbose: bool,
    pub repository: String,
    /// Overrides the region resolved from the profile or environment
    pub region: Option<String>,
    /// Container runtime CLI used for `login` (docker or podman)
    pub container_cli: String,
    pub skip_login: bool,
    /// Include the decoded registry password in the output
    pub print_password: bool,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: None,
            verbose: false,
            repository: String::new(),
            region: None,
            container_cli: "docker".to_string(),
            skip_login: false,
            print_password: false,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        validate_repository_name(&self.repository)
    }
}

/// Reject an empty (or blank) repository name
pub fn validate_repository_name(repository_name: &str) -> Result<()> {
    if repository_name.trim().is_empty() {
        return Err(EcrError::MissingArgument);
    }
    Ok(())
}

/// Resolve credentials and region through the AWS default chain
///
/// The named profile and the region override are applied when present. A
/// configuration without a region is rejected because the registry server
/// address cannot be derived from it.
pub async fn load_aws_config(config: &Config) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = config.profile.as_deref().filter(|p| !p.is_empty()) {
        debug!(profile = profile, "Using AWS profile");
        loader = loader.profile_name(profile);
    }
    if let Some(region) = config.region.as_deref().filter(|r| !r.is_empty()) {
        loader = loader.region(Region::new(region.to_string()));
    }

    let sdk_config = loader.load().await;

    match sdk_config.region() {
        Some(region) => {
            debug!(region = %region, "Loaded AWS configuration");
            Ok(sdk_config)
        }
        None => Err(EcrError::ConfigLoadFailure(
            "no AWS region configured (set AWS_REGION, a profile region or --region)".into(),
        )),
    }
}
