//! CLI command implementations.
//!
//! | Module      | Commands handled |
//! |-------------|------------------|
//! | `publish`   | `Publish`        |
//! | `summarize` | `Summarize`      |
//! | `config`    | `Config`         |

pub mod config;
pub mod publish;
pub mod summarize;

pub use config::cmd_config;
pub use publish::cmd_publish;
pub use summarize::cmd_summarize;
