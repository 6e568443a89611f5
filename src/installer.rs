//! External installer integration for provisioning a resolved manifest
//!
//! This module provides:
//! - The install command line for each supported installer
//! - Execution of that command in the manifest's directory

use crate::config::Installer;
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};

/// Result of running the installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub installer: Installer,
    /// The command that was executed
    pub command: String,
    pub success: bool,
    /// Exit code, when the process ran to completion
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl InstallResult {
    /// Build a result from a finished process
    pub fn from_output(installer: Installer, command: String, output: &Output) -> Self {
        Self {
            installer,
            command,
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Create a failed result for a process that could not be started
    pub fn failure(installer: Installer, command: String, stderr: String) -> Self {
        Self {
            installer,
            command,
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Trait for running the install command
pub trait InstallRunner {
    /// Install the manifest at `manifest` with `installer`
    fn run_install(&self, installer: Installer, manifest: &Path) -> InstallResult;
}

/// Runner that executes real commands
#[derive(Debug, Default)]
pub struct SystemInstaller;

impl SystemInstaller {
    pub fn new() -> Self {
        Self
    }
}

/// Command line installing `manifest_file` (relative to the working directory)
pub fn install_command(installer: Installer, manifest_file: &str) -> Vec<String> {
    let parts: &[&str] = match installer {
        Installer::Pip => &["pip", "install", "-r"],
        Installer::Uv => &["uv", "pip", "install", "-r"],
    };
    parts
        .iter()
        .map(|p| p.to_string())
        .chain(std::iter::once(manifest_file.to_string()))
        .collect()
}

/// Directory the installer runs in and the manifest path relative to it
fn split_manifest(manifest: &Path) -> (&Path, String) {
    let dir = match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = manifest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| manifest.display().to_string());
    (dir, file)
}

impl InstallRunner for SystemInstaller {
    fn run_install(&self, installer: Installer, manifest: &Path) -> InstallResult {
        let (working_dir, file) = split_manifest(manifest);
        let command = install_command(installer, &file);
        let command_str = command.join(" ");

        match Command::new(&command[0])
            .args(&command[1..])
            .current_dir(working_dir)
            .output()
        {
            Ok(output) => InstallResult::from_output(installer, command_str, &output),
            Err(e) => InstallResult::failure(
                installer,
                command_str,
                format!("Failed to execute command: {}", e),
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records calls instead of running anything
    pub(crate) struct MockInstaller {
        pub should_succeed: bool,
        pub calls: RefCell<Vec<(Installer, PathBuf)>>,
    }

    impl MockInstaller {
        pub(crate) fn new(should_succeed: bool) -> Self {
            Self {
                should_succeed,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl InstallRunner for MockInstaller {
        fn run_install(&self, installer: Installer, manifest: &Path) -> InstallResult {
            self.calls
                .borrow_mut()
                .push((installer, manifest.to_path_buf()));
            let command = install_command(installer, "requirements.txt").join(" ");
            InstallResult {
                installer,
                command,
                success: self.should_succeed,
                exit_code: Some(if self.should_succeed { 0 } else { 1 }),
                stdout: String::new(),
                stderr: if self.should_succeed {
                    String::new()
                } else {
                    "ERROR: No matching distribution found".to_string()
                },
            }
        }
    }

    #[test]
    fn test_install_command_pip() {
        assert_eq!(
            install_command(Installer::Pip, "requirements.txt"),
            vec!["pip", "install", "-r", "requirements.txt"]
        );
    }

    #[test]
    fn test_install_command_uv() {
        assert_eq!(
            install_command(Installer::Uv, "reqs.txt"),
            vec!["uv", "pip", "install", "-r", "reqs.txt"]
        );
    }

    #[test]
    fn test_split_manifest() {
        let (dir, file) = split_manifest(Path::new("/srv/app/requirements.txt"));
        assert_eq!(dir, Path::new("/srv/app"));
        assert_eq!(file, "requirements.txt");

        let (dir, file) = split_manifest(Path::new("requirements.txt"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(file, "requirements.txt");
    }

    #[test]
    fn test_missing_program_is_failure() {
        let result = InstallResult::failure(
            Installer::Uv,
            "uv pip install -r requirements.txt".to_string(),
            "Failed to execute command: not found".to_string(),
        );
        assert!(!result.success);
        assert!(result.exit_code.is_none());
    }

    #[test]
    fn test_mock_installer_records_calls() {
        let mock = MockInstaller::new(false);
        let result = mock.run_install(Installer::Pip, Path::new("/tmp/requirements.txt"));
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(mock.calls.borrow().len(), 1);
    }

    #[test]
    fn test_serialize_result() {
        let result = MockInstaller::new(true).run_install(Installer::Uv, Path::new("requirements.txt"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["installer"], "uv");
        assert_eq!(json["success"], true);
    }
}
