//! CLI command implementations.
//!
//! | Module      | Commands handled           |
//! |-------------|----------------------------|
//! | `generate`  | `Generate`                 |
//! | `status`    | `Status`                   |
//! | `repo`      | `Repo`                     |
//! | `config`    | `Config show`, `Config init` |

pub mod config;
pub mod generate;
pub mod repo;
pub mod status;

pub use config::{cmd_config_init, cmd_config_show};
pub use generate::cmd_generate;
pub use repo::cmd_repo;
pub use status::cmd_status;
