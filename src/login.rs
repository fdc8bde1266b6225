// Container registry login

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{EcrError, Result};

/// Username ECR expects alongside the decoded token
pub const ECR_USERNAME: &str = "AWS";

/// Presents registry credentials to a container runtime
pub trait RegistryLogin {
    /// Log in and return the runtime's status message
    fn login(&self, server_address: &str, username: &str, password: &str) -> Result<String>;
}

/// Logs in through a container CLI (`docker` or `podman`)
#[derive(Debug, Clone)]
pub struct ContainerCli {
    program: String,
}

impl ContainerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl RegistryLogin for ContainerCli {
    fn login(&self, server_address: &str, username: &str, password: &str) -> Result<String> {
        registry_login(&self.program, server_address, username, password)
    }
}

/// Login to container registry, passing the password on stdin
pub fn registry_login(
    container_cli: &str,
    registry: &str,
    username: &str,
    password: &str,
) -> Result<String> {
    debug!(
        "Executing: {} login {} --username {} --password-stdin",
        container_cli, registry, username
    );

    let mut child = Command::new(container_cli)
        .arg("login")
        .arg(registry)
        .arg("--username")
        .arg(username)
        .arg("--password-stdin")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            EcrError::LoginFailure(format!("failed to execute {} login: {}", container_cli, e))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // The CLI may exit before reading; its exit status tells the story
        if let Err(e) = stdin.write_all(password.as_bytes()) {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(EcrError::LoginFailure(format!(
                    "failed to write password to {}: {}",
                    container_cli, e
                )));
            }
        }
    }

    let output = child.wait_with_output().map_err(|e| {
        EcrError::LoginFailure(format!("failed to wait for {} login: {}", container_cli, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EcrError::LoginFailure(format!(
            "{} login exited with {}: {}",
            container_cli,
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("Login Succeeded")
        .to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    // Serialises script creation and spawning so no forked child keeps a
    // write handle to another test's script open (ETXTBSY).
    static SPAWN_LOCK: Mutex<()> = Mutex::new(());

    fn fake_cli(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-docker");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_registry_login_passes_password_on_stdin() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(
            dir.path(),
            r#"dir=$(dirname "$0")
echo "$@" > "$dir/args"
cat > "$dir/stdin"
echo "Login Succeeded""#,
        );

        let status = ContainerCli::new(cli.to_string_lossy())
            .login(
                "123.dkr.ecr.us-east-1.amazonaws.com",
                ECR_USERNAME,
                "secret123",
            )
            .unwrap();

        assert_eq!(status, "Login Succeeded");
        assert_eq!(
            fs::read_to_string(dir.path().join("args")).unwrap().trim(),
            "login 123.dkr.ecr.us-east-1.amazonaws.com --username AWS --password-stdin"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("stdin")).unwrap(),
            "secret123"
        );
    }

    #[test]
    fn test_registry_login_failure_status() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(
            dir.path(),
            "cat > /dev/null\necho \"unauthorized: bad token\" >&2\nexit 1",
        );

        let err = registry_login(&cli.to_string_lossy(), "registry", "AWS", "bad").unwrap_err();
        match err {
            EcrError::LoginFailure(message) => assert!(message.contains("unauthorized")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_registry_login_missing_cli() {
        let err = registry_login("/nonexistent/ecrbk-docker", "registry", "AWS", "pw").unwrap_err();
        assert!(matches!(err, EcrError::LoginFailure(_)));
    }
}
