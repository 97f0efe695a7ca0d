//! # Tools
//!
//! External capabilities available to agents. The only one in this
//! pipeline is web search, used by the researcher.

pub mod search;

pub use search::{format_hits, SearchError, SearchHit, SearchTool, SerperSearchTool};
