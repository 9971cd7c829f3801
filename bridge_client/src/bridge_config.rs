use std::fmt;

/// Endpoint used when neither the environment nor the config file names one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:16789/add";

/// Where download submissions are posted and the token that authorises them.
///
/// Built once at startup and shared by reference with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub endpoint: String,
    pub token: String,
}

impl BridgeConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Trimmed endpoint, falling back to [`DEFAULT_ENDPOINT`] when blank.
    pub fn endpoint(&self) -> &str {
        match self.endpoint.trim() {
            "" => DEFAULT_ENDPOINT,
            endpoint => endpoint,
        }
    }

    pub fn token(&self) -> &str {
        self.token.trim()
    }

    pub fn has_token(&self) -> bool {
        !self.token().is_empty()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
        }
    }
}

// the token ends up in log lines otherwise
impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &if self.has_token() { "<set>" } else { "<empty>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_endpoint_falls_back_to_default() {
        let config = BridgeConfig::new("   ", "abc");
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);

        let config = BridgeConfig::new(" http://127.0.0.1:9000/add ", "abc");
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/add");
    }

    #[test]
    fn whitespace_token_counts_as_missing() {
        assert!(!BridgeConfig::new(DEFAULT_ENDPOINT, " \t").has_token());
        assert!(BridgeConfig::new(DEFAULT_ENDPOINT, " t0k ").has_token());
        assert_eq!(BridgeConfig::new(DEFAULT_ENDPOINT, " t0k ").token(), "t0k");
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", BridgeConfig::new(DEFAULT_ENDPOINT, "super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<set>"));
    }
}
