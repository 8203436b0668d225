//! Scripted collaborators for exercising the executor and the runner without Chrome.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clients::browser::{BrowserError, BrowserSession, SessionLauncher};
use crate::domain::{NewSearchRecord, PageQuery};
use crate::services::results_service::{ResultPage, ResultStore, StoreError};

pub const SUFFIX: &str = "公式サイト";

/// What the fake browser does when a keyword is searched.
#[derive(Debug, Clone)]
pub enum Script {
    Link(&'static str),
    /// No result container appears before the timeout.
    NoResults,
    /// The first container has no link; the second one does.
    NoLinkInFirst,
    /// The first container's link has no `href`.
    NoHref,
    NavigationFault,
    SessionLost,
}

#[derive(Debug, Clone)]
pub enum FakeElement {
    Container { first: bool, script: Script },
    Link(Option<String>),
}

#[derive(Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub quits: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn searched(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

pub struct ScriptedSession {
    scripts: HashMap<String, Script>,
    current: Mutex<Option<Script>>,
    counters: Arc<Counters>,
}

impl ScriptedSession {
    pub fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(k, s)| ((*k).to_string(), s.clone()))
                .collect(),
            current: Mutex::new(None),
            counters: Arc::new(Counters::default()),
        }
    }

    fn keyword_from(url: &str) -> String {
        let parsed = url::Url::parse(url).unwrap();
        let query = parsed
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        query
            .strip_suffix(SUFFIX)
            .unwrap_or(&query)
            .trim()
            .to_string()
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let keyword = Self::keyword_from(url);
        self.counters.navigations.lock().unwrap().push(keyword.clone());

        let script = self
            .scripts
            .get(&keyword)
            .cloned()
            .unwrap_or(Script::NoResults);
        *self.current.lock().unwrap() = Some(script.clone());

        match script {
            Script::NavigationFault => Err(BrowserError::Navigation(format!(
                "net::ERR_CONNECTION_RESET for {keyword}"
            ))),
            Script::SessionLost => Err(BrowserError::SessionLost("target closed".into())),
            _ => Ok(()),
        }
    }

    async fn wait_for_elements(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<FakeElement>, BrowserError> {
        let script = self.current.lock().unwrap().clone();
        match script {
            Some(Script::NoResults) | None => Err(BrowserError::Timeout(timeout, selector.into())),
            Some(script) => Ok(vec![
                FakeElement::Container {
                    first: true,
                    script: script.clone(),
                },
                FakeElement::Container {
                    first: false,
                    script,
                },
            ]),
        }
    }

    async fn find_child(
        &self,
        element: &FakeElement,
        _selector: &str,
    ) -> Result<Option<FakeElement>, BrowserError> {
        let FakeElement::Container { first, script } = element else {
            return Ok(None);
        };
        let child = match (first, script) {
            (false, _) => Some(FakeElement::Link(Some("https://second.example.jp/".into()))),
            (true, Script::Link(url)) => Some(FakeElement::Link(Some((*url).to_string()))),
            (true, Script::NoHref) => Some(FakeElement::Link(None)),
            (true, _) => None,
        };
        Ok(child)
    }

    async fn get_attribute(
        &self,
        element: &FakeElement,
        _name: &str,
    ) -> Result<Option<String>, BrowserError> {
        match element {
            FakeElement::Link(href) => Ok(href.clone()),
            FakeElement::Container { .. } => Ok(None),
        }
    }

    async fn quit(&mut self) -> Result<(), BrowserError> {
        self.counters.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedLauncher {
    scripts: Vec<(&'static str, Script)>,
    fail_open: bool,
    pub counters: Arc<Counters>,
}

impl ScriptedLauncher {
    pub fn new(scripts: Vec<(&'static str, Script)>) -> Self {
        Self {
            scripts,
            fail_open: false,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(vec![])
        }
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn open(&self) -> Result<ScriptedSession, BrowserError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(BrowserError::Launch("chrome not found".into()));
        }
        let mut session = ScriptedSession::new(&self.scripts);
        session.counters = Arc::clone(&self.counters);
        Ok(session)
    }
}

/// Records every batch it is handed. Optionally fails the nth call (1-based).
#[derive(Default)]
pub struct RecordingStore {
    pub batches: Mutex<Vec<Vec<NewSearchRecord>>>,
    pub fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<NewSearchRecord>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<NewSearchRecord> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl ResultStore for RecordingStore {
    async fn insert_batch(&self, records: &[NewSearchRecord]) -> Result<usize, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(StoreError::Database("database is locked".into()));
        }
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(records.len())
    }

    async fn query(&self, query: &PageQuery) -> Result<ResultPage, StoreError> {
        Ok(ResultPage::empty(query))
    }
}
