//! # Orchestrator
//!
//! Sequential execution of a validated crew. Stages run strictly in
//! declared order; each blocks on its external call, and any failure
//! aborts the rest of the run. No retries, no partial results.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::error::PipelineError;
use crate::llm::AnthropicClient;
use crate::models::ModelConfig;
use crate::tools::{format_hits, SearchTool, SerperSearchTool};

use super::events::{RunEvent, RunEventKind};
use super::{Capability, Crew, CrewError, Task};

pub struct Orchestrator {
    llm: AnthropicClient,
    search: Box<dyn SearchTool>,
    event_tx: Option<mpsc::Sender<RunEvent>>,
}

impl Orchestrator {
    /// Build the external clients from explicitly passed credentials.
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_model(credentials, ModelConfig::default())
    }

    pub fn with_model(credentials: &Credentials, config: ModelConfig) -> Self {
        Self {
            llm: AnthropicClient::new(&credentials.anthropic, config),
            search: Box::new(SerperSearchTool::new(&credentials.serper)),
            event_tx: None,
        }
    }

    /// Override the search backend.
    pub fn with_search(mut self, search: Box<dyn SearchTool>) -> Self {
        self.search = search;
        self
    }

    /// Stream run events to a channel.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<RunEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run every stage in declared order and return the final stage's
    /// text. A stage never starts before the stages it depends on have
    /// completed; the crew's declaration order guarantees that.
    pub async fn run(&self, crew: &Crew) -> Result<String, PipelineError> {
        self.emit(RunEvent::new(RunEventKind::PipelineStarted)).await;

        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut last = String::new();

        for task in crew.tasks() {
            self.emit(RunEvent::new(RunEventKind::StageStarted).with_task(&task.id))
                .await;
            info!(task = %task.id, agent = %task.agent, "running pipeline stage");

            match self.run_stage(crew, task, &outputs).await {
                Ok(text) => {
                    self.emit(RunEvent::new(RunEventKind::StageCompleted).with_task(&task.id))
                        .await;
                    outputs.push((task.id.clone(), text.clone()));
                    last = text;
                }
                Err(err) => {
                    warn!(task = %task.id, error = %err, "pipeline stage failed");
                    self.emit(
                        RunEvent::new(RunEventKind::StageFailed)
                            .with_task(&task.id)
                            .with_detail(err.to_string()),
                    )
                    .await;
                    self.emit(RunEvent::new(RunEventKind::PipelineFailed)).await;
                    return Err(err);
                }
            }
        }

        self.emit(RunEvent::new(RunEventKind::PipelineCompleted)).await;
        Ok(last)
    }

    async fn run_stage(
        &self,
        crew: &Crew,
        task: &Task,
        outputs: &[(String, String)],
    ) -> Result<String, PipelineError> {
        let agent = crew.agent(&task.agent).ok_or_else(|| CrewError::UnknownAgent {
            task: task.id.clone(),
            agent: task.agent.clone(),
        })?;

        let search_block = if agent.has_capability(Capability::WebSearch) {
            match &task.search_query {
                Some(query) => {
                    debug!(%query, "fetching search results for stage");
                    let hits = self.search.search(query).await?;
                    Some(format_hits(&hits))
                }
                None => None,
            }
        } else {
            None
        };

        let prompt = stage_prompt(task, outputs, search_block.as_deref());
        let text = self.llm.complete(&agent.system_prompt(), &prompt).await?;
        Ok(text)
    }
}

/// Assemble the user prompt for one stage: search results first, then the
/// concatenated outputs of the declared context stages, then the task
/// description and expected output.
fn stage_prompt(task: &Task, outputs: &[(String, String)], search_block: Option<&str>) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(block) = search_block {
        sections.push(format!("Search results:\n{block}"));
    }

    for context_id in &task.context {
        if let Some((_, text)) = outputs.iter().find(|(id, _)| id == context_id) {
            sections.push(format!("Output of the '{context_id}' stage:\n{text}"));
        }
    }

    sections.push(task.description.clone());
    sections.push(format!("Expected output: {}", task.expected_output));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_context(context: &[&str]) -> Task {
        Task {
            id: "write".to_string(),
            description: "Write a LinkedIn post based on the research.".to_string(),
            expected_output: "A full LinkedIn post.".to_string(),
            agent: "writer".to_string(),
            context: context.iter().map(|c| c.to_string()).collect(),
            search_query: None,
        }
    }

    #[test]
    fn test_stage_prompt_injects_context_outputs() {
        let outputs = vec![(
            "research".to_string(),
            "One news item about agents.".to_string(),
        )];
        let prompt = stage_prompt(&task_with_context(&["research"]), &outputs, None);

        assert!(prompt.contains("Output of the 'research' stage:"));
        assert!(prompt.contains("One news item about agents."));
        assert!(prompt.contains("Write a LinkedIn post"));
        assert!(prompt.contains("Expected output: A full LinkedIn post."));
    }

    #[test]
    fn test_stage_prompt_context_precedes_description() {
        let outputs = vec![("research".to_string(), "CONTEXT-TEXT".to_string())];
        let prompt = stage_prompt(&task_with_context(&["research"]), &outputs, None);
        let context_at = prompt.find("CONTEXT-TEXT").unwrap();
        let description_at = prompt.find("Write a LinkedIn post").unwrap();
        assert!(context_at < description_at);
    }

    #[test]
    fn test_stage_prompt_search_block_comes_first() {
        let outputs = vec![("research".to_string(), "context".to_string())];
        let prompt = stage_prompt(
            &task_with_context(&["research"]),
            &outputs,
            Some("1. A headline"),
        );
        assert!(prompt.starts_with("Search results:\n1. A headline"));
    }

    #[test]
    fn test_stage_prompt_without_context_or_search() {
        let prompt = stage_prompt(&task_with_context(&[]), &[], None);
        assert!(prompt.starts_with("Write a LinkedIn post"));
        assert!(!prompt.contains("Search results"));
        assert!(!prompt.contains("stage:"));
    }

    #[test]
    fn test_stage_prompt_preserves_context_declaration_order() {
        let mut task = task_with_context(&["research", "write"]);
        task.id = "image_prompt".to_string();
        let outputs = vec![
            ("research".to_string(), "FIRST".to_string()),
            ("write".to_string(), "SECOND".to_string()),
        ];
        let prompt = stage_prompt(&task, &outputs, None);
        assert!(prompt.find("FIRST").unwrap() < prompt.find("SECOND").unwrap());
    }
}
