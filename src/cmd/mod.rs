//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `serve`   | `Serve`          |
//! | `db`      | `InitDb`         |
//! | `config`  | `Config`         |
//! | `orders`  | `Orders`         |

pub mod config;
pub mod db;
pub mod orders;
pub mod serve;

pub use config::cmd_config;
pub use db::cmd_init_db;
pub use orders::cmd_orders;
pub use serve::cmd_serve;
