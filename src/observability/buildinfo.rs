//! Build provenance captured by `build.rs`.

use serde::{Deserialize, Serialize};

const EMBEDDED: &str = include_str!(concat!(env!("OUT_DIR"), "/build_info.json"));

/// Version string injected at build time (`CHAT_SERVICE_VERSION`, or the
/// package version when unset).
pub const VERSION: &str = env!("CHAT_SERVICE_BUILD_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub module_path: String,
    pub main: Module,
    pub dependencies: Vec<Module>,
    pub settings: Vec<Setting>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub path: String,
    pub version: String,
    pub sum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl BuildInfo {
    /// Decode the snapshot embedded in this binary.
    pub fn from_build() -> Result<Self, serde_json::Error> {
        serde_json::from_str(EMBEDDED)
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.as_str())
    }
}
