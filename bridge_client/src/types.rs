use serde::Serialize;

/// JSON body posted to the download bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadSubmission {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<String>,
}

impl DownloadSubmission {
    /// Trims both fields; blank `save_dir` is dropped. `None` when `url` is blank.
    pub fn new(url: &str, save_dir: Option<&str>) -> Option<Self> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        Some(Self {
            url: url.to_string(),
            save_dir: save_dir
                .map(str::trim)
                .filter(|dir| !dir.is_empty())
                .map(str::to_string),
        })
    }
}

/// Raw answer from the bridge: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeReply {
    pub status: u16,
    pub body: String,
}

impl BridgeReply {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submission_trims_and_drops_blank_save_dir() {
        let submission = DownloadSubmission::new("  http://x/a.zip ", Some("   ")).unwrap();
        assert_eq!(submission.url, "http://x/a.zip");
        assert_eq!(submission.save_dir, None);
        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({"url": "http://x/a.zip"})
        );

        let submission = DownloadSubmission::new("http://x/a.zip", Some(" /tmp ")).unwrap();
        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({"url": "http://x/a.zip", "save_dir": "/tmp"})
        );
    }

    #[test]
    fn blank_url_is_rejected() {
        assert_eq!(DownloadSubmission::new("", None), None);
        assert_eq!(DownloadSubmission::new(" \n", Some("/tmp")), None);
    }
}
