//! One keyword, one search round-trip.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

use crate::clients::browser::{BrowserError, BrowserSession};
use crate::config::SearchConfig;
use crate::domain::{Keyword, SearchOutcome};

/// Runs a search for a keyword and picks the link of the first organic result.
///
/// Only the first result container is ever inspected. A container without a
/// usable link yields `NotFound` even if later containers carry one.
#[derive(Debug, Clone)]
pub struct SearchExecutor {
    base_url: Url,
    query_suffix: String,
    result_selector: String,
    link_selector: String,
    result_wait: Duration,
}

impl SearchExecutor {
    pub fn new(
        base_url: &str,
        query_suffix: impl Into<String>,
        result_selector: impl Into<String>,
        link_selector: impl Into<String>,
        result_wait: Duration,
    ) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid search base URL: {base_url}"))?;

        Ok(Self {
            base_url,
            query_suffix: query_suffix.into(),
            result_selector: result_selector.into(),
            link_selector: link_selector.into(),
            result_wait,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.query_suffix,
            &config.result_selector,
            &config.link_selector,
            config.result_wait(),
        )
    }

    #[must_use]
    pub fn query_url(&self, keyword: &Keyword) -> Url {
        let query = if self.query_suffix.is_empty() {
            keyword.to_string()
        } else {
            format!("{} {}", keyword, self.query_suffix)
        };

        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", &query);
        url
    }

    /// Searches one keyword.
    ///
    /// Per-keyword problems come back as `NotFound` or `Faulted`. Only a lost
    /// session is returned as an error, since no later keyword could succeed.
    pub async fn search<S>(
        &self,
        keyword: &Keyword,
        session: &S,
    ) -> Result<SearchOutcome, BrowserError>
    where
        S: BrowserSession,
    {
        info!("Searching for: {}", keyword);

        match self.first_link(keyword, session).await {
            Ok(Some(url)) => {
                info!("Found URL for {}: {}", keyword, url);
                Ok(SearchOutcome::Found(url))
            }
            Ok(None) => Ok(SearchOutcome::NotFound),
            Err(e) if e.is_session_lost() => Err(e),
            Err(BrowserError::Timeout(..)) => {
                warn!("No results found for: {}", keyword);
                Ok(SearchOutcome::NotFound)
            }
            Err(e) => {
                error!("Error searching for {}: {}", keyword, e);
                Ok(SearchOutcome::Faulted(e.to_string()))
            }
        }
    }

    async fn first_link<S>(
        &self,
        keyword: &Keyword,
        session: &S,
    ) -> Result<Option<String>, BrowserError>
    where
        S: BrowserSession,
    {
        session.navigate(self.query_url(keyword).as_str()).await?;

        let containers = session
            .wait_for_elements(&self.result_selector, self.result_wait)
            .await?;

        let Some(first) = containers.first() else {
            warn!("No results found for: {}", keyword);
            return Ok(None);
        };

        let Some(link) = session.find_child(first, &self.link_selector).await? else {
            warn!("First result for {} has no link", keyword);
            return Ok(None);
        };

        let href = session
            .get_attribute(&link, "href")
            .await?
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());

        if href.is_none() {
            warn!("First result link for {} has no href", keyword);
        }

        Ok(href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::{SUFFIX, Script, ScriptedSession};

    fn executor() -> SearchExecutor {
        SearchExecutor::from_config(&SearchConfig::default()).unwrap()
    }

    fn kw(s: &str) -> Keyword {
        Keyword::new(s).unwrap()
    }

    #[test]
    fn query_url_appends_suffix() {
        let url = executor().query_url(&kw("青森市役所"));
        let q: Vec<_> = url.query_pairs().collect();
        assert_eq!(url.host_str(), Some("www.google.com"));
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, format!("青森市役所 {SUFFIX}"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        let config = SearchConfig {
            base_url: "not a url".into(),
            ..SearchConfig::default()
        };
        assert!(SearchExecutor::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn returns_first_container_link() {
        let session = ScriptedSession::new(&[("A", Script::Link("https://a.example.jp/"))]);
        let outcome = executor().search(&kw("A"), &session).await.unwrap();
        assert_eq!(outcome, SearchOutcome::Found("https://a.example.jp/".into()));
    }

    #[tokio::test]
    async fn timeout_is_not_found() {
        let session = ScriptedSession::new(&[("B", Script::NoResults)]);
        let outcome = executor().search(&kw("B"), &session).await.unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);
    }

    #[tokio::test]
    async fn never_falls_back_to_second_container() {
        let session = ScriptedSession::new(&[("C", Script::NoLinkInFirst)]);
        let outcome = executor().search(&kw("C"), &session).await.unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);
    }

    #[tokio::test]
    async fn missing_href_is_not_found() {
        let session = ScriptedSession::new(&[("D", Script::NoHref)]);
        let outcome = executor().search(&kw("D"), &session).await.unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);
    }

    #[tokio::test]
    async fn navigation_fault_is_isolated() {
        let session = ScriptedSession::new(&[("E", Script::NavigationFault)]);
        let outcome = executor().search(&kw("E"), &session).await.unwrap();
        assert!(matches!(outcome, SearchOutcome::Faulted(_)));
    }

    #[tokio::test]
    async fn lost_session_is_an_error() {
        let session = ScriptedSession::new(&[("F", Script::SessionLost)]);
        let err = executor().search(&kw("F"), &session).await.unwrap_err();
        assert!(err.is_session_lost());
    }
}
