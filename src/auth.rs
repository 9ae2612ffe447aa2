//! Credential acquisition: authfile, shell environment, or prompt.
//!
//! Order of precedence matches the historical tool: an explicit authfile
//! wins, then the `SATELLITE_LOGIN` / `SATELLITE_PASSWORD` variables, then
//! an interactive prompt on stdin.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::session::Credentials;

pub const LOGIN_VAR: &str = "SATELLITE_LOGIN";
pub const PASSWORD_VAR: &str = "SATELLITE_PASSWORD";

pub fn acquire(authfile: Option<&Path>) -> Result<Credentials> {
    if let Some(path) = authfile {
        return from_authfile(path);
    }
    if let (Ok(username), Ok(password)) =
        (std::env::var(LOGIN_VAR), std::env::var(PASSWORD_VAR))
    {
        return Ok(Credentials { username, password });
    }
    prompt()
}

/// Read credentials from a two-line file: username, then password. The file
/// must be mode 0600; anything looser is refused.
fn from_authfile(path: &Path) -> Result<Credentials> {
    check_permissions(path)?;

    let file =
        std::fs::File::open(path).with_context(|| format!("reading {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let username = lines
        .next()
        .transpose()
        .with_context(|| format!("reading {}", path.display()))?
        .unwrap_or_default()
        .trim()
        .to_string();
    let password = lines
        .next()
        .transpose()
        .with_context(|| format!("reading {}", path.display()))?
        .unwrap_or_default()
        .trim()
        .to_string();

    if username.is_empty() || password.is_empty() {
        bail!(
            "{}: expected username on line 1 and password on line 2",
            path.display()
        );
    }
    Ok(Credentials { username, password })
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("checking permissions of {}", path.display()))?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o600 {
        bail!(
            "{}: file permissions {:03o} do not match the required 0600",
            path.display(),
            mode
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn prompt() -> Result<Credentials> {
    eprint!("Username: ");
    std::io::stderr().flush()?;
    let mut username = String::new();
    std::io::stdin().read_line(&mut username)?;

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;

    Ok(Credentials {
        username: username.trim().to_string(),
        password: password.trim().to_string(),
    })
}
