//! Environment-driven configuration helpers
//!
//! Every getter distinguishes "not set" (`Ok(None)`) from "set but unusable"
//! (`Err`), so callers can keep their file or built-in defaults for missing
//! variables and still reject typos.
//!
//! # Example
//!
//! ```rust,ignore
//! use tooling::config::{get_env_bool, get_env_list, get_env_parse};
//!
//! let force_mock = get_env_bool("INTENT_BRIDGE_MOCK")?.unwrap_or(false);
//! let timeout: Option<u64> = get_env_parse("INTENT_BRIDGE_TIMEOUT_SECS")?;
//! let catalogs = get_env_list("INTENT_BRIDGE_CATALOGS")?;
//! ```

mod env;

pub use env::{get_env, get_env_bool, get_env_list, get_env_parse, read_present};
