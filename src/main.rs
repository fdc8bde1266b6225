use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use ecr_backup::app;
use ecr_backup::config::{load_aws_config, Config, OutputFormat};
use ecr_backup::ecr::RegistryClient;
use ecr_backup::logging::init_logging;
use ecr_backup::login::{ContainerCli, RegistryLogin};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// AWS profile to use
    #[arg(short = 'p', long)]
    profile: Option<String>,
    /// Be verbose (debug logging)
    #[arg(short = 'v', long)]
    verbose: bool,
    /// Repository name (required)
    #[arg(short = 'r', long, default_value = "")]
    repository: String,
    /// AWS region, overrides the profile and environment
    #[arg(long)]
    region: Option<String>,
    /// Container CLI used for the registry login (docker or podman)
    #[arg(long, default_value = "docker")]
    container_cli: String,
    /// Only list images, do not log in to the registry
    #[arg(long)]
    skip_login: bool,
    /// Print the decoded registry password (always done with --skip-login)
    #[arg(long)]
    print_password: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            profile: cli.profile,
            verbose: cli.verbose,
            repository: cli.repository,
            region: cli.region,
            container_cli: cli.container_cli,
            skip_login: cli.skip_login,
            print_password: cli.print_password,
            output: cli.output,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(config.verbose);
    debug!(?config, "Parsed command line");

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid command line arguments were passed");
        std::process::exit(1);
    }

    let sdk_config = match load_aws_config(&config).await {
        Ok(sdk_config) => sdk_config,
        Err(e) => {
            error!(profile = ?config.profile, error = %e, "loading aws configuration failed");
            std::process::exit(1);
        }
    };

    let client = match RegistryClient::from_sdk_config(&sdk_config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "creating the ECR client failed");
            std::process::exit(1);
        }
    };
    debug!(region = client.region(), "Created ECR client");

    let container_cli = ContainerCli::new(config.container_cli.clone());
    let login = (!config.skip_login).then_some(&container_cli as &dyn RegistryLogin);

    let report = match app::run(&config, &client, login).await {
        Ok(report) => report,
        Err(e) => {
            error!(repository = %config.repository, error = %e, "querying the registry failed");
            std::process::exit(1);
        }
    };

    match config.output {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            report.to_json().context("Failed to serialize report")?
        ),
    }

    Ok(())
}
