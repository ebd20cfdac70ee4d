//! Channel address resolution.
//!
//! A bare name such as `json.schema.validator` lives in the runtime
//! directory as `<name>.sock`. Anything containing a path separator is
//! taken as a literal socket path.

use std::path::{Path, PathBuf};

use crate::error::{Result, WireError};

/// Address the service listens on when nothing else is configured.
pub const DEFAULT_ADDRESS: &str = "json.schema.validator";

const SOCKET_SUFFIX: &str = ".sock";
const RUNTIME_DIR_ENV: &str = "XDG_RUNTIME_DIR";

/// Resolve an address against the current runtime directory.
pub fn resolve_address(address: &str) -> Result<PathBuf> {
    resolve_address_in(address, &runtime_dir())
}

/// Resolve an address against an explicit base directory.
pub fn resolve_address_in(address: &str, base: &Path) -> Result<PathBuf> {
    let address = address.trim();
    if address.is_empty() {
        return Err(WireError::EmptyAddress);
    }

    if address.contains('/') || address.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(address));
    }

    Ok(base.join(format!("{address}{SOCKET_SUFFIX}")))
}

/// `$XDG_RUNTIME_DIR` when set and non-empty, otherwise the system temp dir.
pub fn runtime_dir() -> PathBuf {
    std::env::var_os(RUNTIME_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}
