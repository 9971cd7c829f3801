use serde::Serialize;
use std::path::Path;

use crate::translator::HOST_NAME;

pub const HOST_DESCRIPTION: &str = "Flamingo Downloader native messaging bridge";

/// Native messaging host manifest as browsers expect to find it on disk.
///
/// Chromium browsers read `allowed_origins`, Firefox reads `allowed_extensions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostManifest {
    pub name: String,
    pub description: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_extensions: Vec<String>,
}

impl HostManifest {
    pub fn new(binary_path: &Path) -> Self {
        Self {
            name: HOST_NAME.to_string(),
            description: HOST_DESCRIPTION.to_string(),
            path: binary_path.to_string_lossy().into_owned(),
            kind: "stdio".to_string(),
            allowed_origins: Vec::new(),
            allowed_extensions: Vec::new(),
        }
    }

    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_origins = origins
            .into_iter()
            .filter_map(|origin| normalize_origin(origin.as_ref()))
            .collect();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        self
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Chromium only matches `chrome-extension://<id>/`, a bare id or a missing
/// trailing slash is fixed up here.
fn normalize_origin(origin: &str) -> Option<String> {
    let origin = origin.trim();
    if origin.is_empty() {
        return None;
    }
    let origin = if origin.contains("://") {
        origin.to_string()
    } else {
        format!("chrome-extension://{}", origin)
    };
    if origin.ends_with('/') {
        Some(origin)
    } else {
        Some(format!("{}/", origin))
    }
}
