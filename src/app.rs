use tracing::{error, info, warn};

use crate::config::Config;
use crate::ecr::{RegistryApi, RegistryClient};
use crate::error::Result;
use crate::login::{RegistryLogin, ECR_USERNAME};
use crate::report::{LoginStatus, Report};

/// Query the registry and log the container runtime in
///
/// Registry, repository and token failures abort the run. A failed image
/// listing or login is logged and reflected in the report. The decoded
/// password is only put in the report when asked for or when there is no
/// login to hand it to.
pub async fn run<A: RegistryApi>(
    config: &Config,
    client: &RegistryClient<A>,
    login: Option<&dyn RegistryLogin>,
) -> Result<Report> {
    let repository = config.repository.as_str();

    let registry = client.registry_info().await?;
    info!(
        registry_id = %registry.registry_id,
        region = %registry.region,
        "Using registry"
    );

    // Repository existence is fatal, the listing itself is not
    let uri = client.repository_uri(repository).await?;
    let images = match client.list_images_at(repository, &uri).await {
        Ok(images) => images,
        Err(e) => {
            error!(repository = repository, error = %e, "Listing the images failed");
            Vec::new()
        }
    };

    let password = client.get_authorization_token().await?;

    let reported_password =
        (config.print_password || login.is_none()).then(|| password.clone());

    let login = match login {
        None => LoginStatus::Skipped,
        Some(login) => match login.login(&registry.server_address, ECR_USERNAME, &password) {
            Ok(status) => {
                info!(server_address = %registry.server_address, "Logged in to the registry");
                LoginStatus::Succeeded(status)
            }
            Err(e) => {
                warn!(server_address = %registry.server_address, error = %e, "Logging in to the registry failed");
                LoginStatus::Failed(e.to_string())
            }
        },
    };

    Ok(Report {
        repository: repository.to_string(),
        registry,
        images,
        login,
        password: reported_password,
    })
}
