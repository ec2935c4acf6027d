//! Refuse to run with privileges borrowed from another user

use crate::core::constants::error_messages;
use crate::core::error::{HealthCheckError, Result};

/// The identity facts the guard looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub uid: u32,
    pub euid: u32,
    /// `SUDO_UID`, when set and non-empty
    pub sudo_uid: Option<String>,
    /// `SUDO_USER`, as sudo reports it
    pub sudo_user: Option<String>,
}

impl ExecutionContext {
    /// Snapshot of the running process.
    pub fn current() -> Self {
        let (uid, euid) = process_ids();
        Self {
            uid,
            euid,
            sudo_uid: non_empty_var("SUDO_UID"),
            sudo_user: std::env::var("SUDO_USER").ok(),
        }
    }
}

#[cfg(unix)]
fn process_ids() -> (u32, u32) {
    use nix::unistd::{geteuid, getuid};
    (getuid().as_raw(), geteuid().as_raw())
}

#[cfg(not(unix))]
fn process_ids() -> (u32, u32) {
    (0, 0)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Reject setuid/setgid binaries and runs started through sudo.
pub fn validate_execution(context: &ExecutionContext) -> Result<()> {
    if context.euid != context.uid {
        return Err(HealthCheckError::ExecutionDenied(
            error_messages::SETUID_DENIED.to_string(),
        ));
    }

    if context.sudo_uid.is_some() {
        return Err(HealthCheckError::ExecutionDenied(format!(
            "{} (user: {})",
            error_messages::SUDO_DENIED,
            context.sudo_user.as_deref().unwrap_or_default()
        )));
    }

    Ok(())
}
