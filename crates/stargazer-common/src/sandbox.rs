use reqwest::blocking::{Client, ClientBuilder, RequestBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::StargazerError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP client that only talks to approved evidence services.
/// Every upstream call in a query goes through one of these.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Client with the default allowlist and a 30 s timeout.
    pub fn new() -> Result<Self, StargazerError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, StargazerError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "api.platform.opentargets.org", // OpenTargets
            "string-db.org",                // STRING
            "pharos-api.ncats.io",          // Pharos
            "www.ebi.ac.uk",                // GWAS catalog
            "localhost",
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("stargazer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StargazerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of a configured endpoint URL.
    pub fn allow_url_host(&mut self, url: &str) {
        if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
            self.allow_domain(&host);
        }
    }

    /// Exact host match or a subdomain of an allowed host.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), StargazerError> {
        if !self.is_allowed(url) {
            return Err(StargazerError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }

    pub fn get(&self, url: &str) -> Result<RequestBuilder, StargazerError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<RequestBuilder, StargazerError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}
