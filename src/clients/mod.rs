pub mod browser;
pub mod chrome;
pub mod keyword_csv;

pub use browser::{BrowserError, BrowserSession, SessionLauncher};
pub use chrome::{ChromeLauncher, ChromeSession};
pub use keyword_csv::{KeywordCsv, SourceError};
