//! Compiler configuration.
//!
//! A single [`CompilerConfig`] is shared (through the [`Session`](crate::session::Session))
//! by every compilation unit of a build, including imported modules.

/// Error reporting limits for the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Parse errors recorded per file before the parser gives up on the file.
    pub max_parse_errors: usize,
    /// Semantic errors recorded per analysis. `None` records every error.
    pub max_semantic_errors: Option<usize>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            max_parse_errors: 10,
            max_semantic_errors: None,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_parse_errors(mut self, max: usize) -> Self {
        self.max_parse_errors = max.max(1);
        self
    }

    pub fn with_max_semantic_errors(mut self, max: Option<usize>) -> Self {
        self.max_semantic_errors = max;
        self
    }

    /// Whether another semantic error may be recorded after `recorded` ones.
    pub fn accepts_semantic_error(&self, recorded: usize) -> bool {
        match self.max_semantic_errors {
            Some(max) => recorded < max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompilerConfig;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.max_parse_errors, 10);
        assert_eq!(config.max_semantic_errors, None);
        assert!(config.accepts_semantic_error(10_000));
    }

    #[test]
    fn test_semantic_error_cap() {
        let config = CompilerConfig::default().with_max_semantic_errors(Some(2));
        assert!(config.accepts_semantic_error(1));
        assert!(!config.accepts_semantic_error(2));
    }

    #[test]
    fn test_parse_error_cap_is_at_least_one() {
        let config = CompilerConfig::default().with_max_parse_errors(0);
        assert_eq!(config.max_parse_errors, 1);
    }
}
