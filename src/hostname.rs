use std::process::Command;

use crate::error::Error;

/// The machine's short hostname, as printed by `hostname -s`.
pub fn short_hostname() -> Result<String, Error> {
    let output = Command::new("hostname")
        .arg("-s")
        .output()
        .map_err(|e| Error::Hostname(format!("failed to run hostname: {}", e)))?;

    if !output.status.success() {
        return Err(Error::Hostname(format!(
            "hostname exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_hostname_output(&output.stdout)
}

fn parse_hostname_output(stdout: &[u8]) -> Result<String, Error> {
    let name = String::from_utf8_lossy(stdout).trim().to_string();
    if name.is_empty() {
        return Err(Error::Hostname("hostname printed nothing".to_string()));
    }
    tracing::debug!(hostname = %name, "resolved short hostname");
    Ok(name)
}
