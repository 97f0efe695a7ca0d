//! # Pipeline Output
//!
//! Structured view of the final stage text. The art director is
//! instructed to emit the post, a separator line of dashes, then the
//! image prompt. Models occasionally drop the separator, so the split
//! degrades to a post-only result instead of failing the run.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Separator the art director is instructed to emit between the post and
/// the image prompt.
pub const SEPARATOR: &str = "---";

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A line consisting only of three or more dashes.
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*$").expect("separator regex is valid"))
}

/// The final text of a run, split into named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The social post, verbatim
    pub post: String,
    /// English image-generation prompt, when the model emitted the
    /// separator as instructed
    pub image_prompt: Option<String>,
    /// The unmodified final stage text
    pub raw: String,
}

impl PipelineOutput {
    /// Split the raw text on the first dashes-only line.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match separator_re().find(&raw) {
            Some(m) => {
                let post = raw[..m.start()].trim().to_string();
                let image_prompt = raw[m.end()..].trim().to_string();
                Self {
                    post,
                    image_prompt: (!image_prompt.is_empty()).then_some(image_prompt),
                    raw,
                }
            }
            None => Self {
                post: raw.trim().to_string(),
                image_prompt: None,
                raw,
            },
        }
    }

    pub fn has_image_prompt(&self) -> bool {
        self.image_prompt.is_some()
    }
}
