//! Target platform information.
//!
//! Flag and env templates occasionally need platform facts: the shared
//! library extension (`libpq.dylib` vs `libpq.so`) and the search-path
//! separator. Everything else about the platform belongs to the external
//! build system.

use serde::{Deserialize, Serialize};

/// The platform a configuration is being planned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system: "linux", "macos", "windows".
    pub os: String,

    /// CPU architecture: "x86_64", "aarch64".
    pub arch: String,
}

impl Platform {
    /// Detect the current host platform.
    pub fn host() -> Self {
        Platform {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// A platform for a named OS with the host architecture. Used by the
    /// CLI `--os` override for reproducible cross-host planning.
    pub fn for_os(os: impl Into<String>) -> Self {
        Platform {
            os: os.into(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Shared-library filename extension for this OS.
    pub fn shared_lib_ext(&self) -> &'static str {
        match self.os.as_str() {
            "macos" => "dylib",
            "windows" => "dll",
            _ => "so",
        }
    }

    /// Separator for PATH-like search-path lists.
    pub fn path_separator(&self) -> char {
        if self.os == "windows" {
            ';'
        } else {
            ':'
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::host()
    }
}
