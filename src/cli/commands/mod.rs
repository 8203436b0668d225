mod init;
mod keywords;
mod results;
mod run;
mod serve;

pub use init::cmd_init;
pub use keywords::cmd_keywords;
pub use results::cmd_results;
pub use run::cmd_run;
pub use serve::cmd_serve;
