//! Client and pipeline configuration
//!
//! Both types follow a consuming builder style: start from `new()` (or
//! `Default`) and chain `with_*` calls.

use std::path::PathBuf;
use std::time::Duration;

use crate::cloud::WordCloudOptions;

/// Default NCBI E-utilities endpoint
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default maximum number of identifiers requested from ESearch
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Default `tool` etiquette parameter sent with every request
pub const DEFAULT_TOOL: &str = "pubmed-wordcloud";

/// Configuration for the E-utilities HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Override for the E-utilities base URL (used by tests)
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Contact email sent with every request, as NCBI asks
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with NCBI defaults
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_wordcloud::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new()
    ///     .with_email("researcher@university.edu")
    ///     .with_timeout(Duration::from_secs(10));
    /// assert_eq!(config.effective_tool(), "pubmed-wordcloud");
    /// ```
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            user_agent: None,
            email: None,
            tool: None,
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Base URL with any trailing slash removed
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_user_agent(&self) -> String {
        match &self.user_agent {
            Some(agent) => agent.clone(),
            None => format!("pubmed-wordcloud/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// Etiquette parameters appended to every E-utilities request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which tabular artifacts a pipeline run writes to disk
///
/// The word cloud image is written regardless of these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOptions {
    pub persist_articles: bool,
    pub persist_errors: bool,
    pub persist_entities: bool,
}

impl PersistOptions {
    /// Persist every tabular artifact (the CLI behaviour)
    pub const fn all() -> Self {
        Self {
            persist_articles: true,
            persist_errors: true,
            persist_entities: true,
        }
    }

    /// Persist no tabular artifact (the library-call behaviour)
    pub const fn none() -> Self {
        Self {
            persist_articles: false,
            persist_errors: false,
            persist_entities: false,
        }
    }
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of identifiers requested from the search endpoint
    pub max_results: usize,
    /// Directory all artifacts are written into
    pub output_dir: PathBuf,
    pub persist: PersistOptions,
    pub cloud: WordCloudOptions,
    /// Open the rendered image in the platform viewer after writing it
    pub display: bool,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            output_dir: PathBuf::from("."),
            persist: PersistOptions::all(),
            cloud: WordCloudOptions::default(),
            display: false,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_persist(mut self, persist: PersistOptions) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_cloud(mut self, cloud: WordCloudOptions) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
