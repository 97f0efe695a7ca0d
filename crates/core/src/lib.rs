//! # Postsmith Core
//!
//! The engine of the Postsmith system - credential resolution, the fixed
//! three-agent pipeline, and sequential orchestration.
//!
//! ## Architecture
//!
//! - `credentials` - API key resolution with secret-store fallback
//! - `crew/` - Agent and task configuration, validation, and the runner
//! - `llm` - Anthropic Messages API client
//! - `tools/` - Web search used by the researcher agent
//! - `output` - Post-processing of the final stage text
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postsmith_core::crew::{news_post_crew, Orchestrator};
//! use postsmith_core::{Credentials, PipelineOutput, RunParams, SecretStore};
//!
//! let store = SecretStore::from_env();
//! let credentials = Credentials::resolve(&store, None, None)?;
//! let crew = news_post_crew(&RunParams::default());
//! let raw = Orchestrator::new(&credentials).run(&crew).await?;
//! let output = PipelineOutput::parse(raw);
//! ```

pub mod credentials;
pub mod crew;
pub mod error;
pub mod llm;
pub mod models;
pub mod output;
pub mod tools;

pub use credentials::{Credentials, SecretStore};
pub use error::PipelineError;
pub use models::{Language, ModelConfig, RunParams};
pub use output::PipelineOutput;
