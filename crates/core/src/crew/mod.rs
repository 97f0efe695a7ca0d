//! # Crew
//!
//! Agent and task configuration for the post-generation pipeline, plus
//! the sequential runner that executes it. Construction is pure
//! configuration; nothing here touches the network until
//! [`Orchestrator::run`] is called.

pub mod definitions;
pub mod events;
pub mod runner;

pub use definitions::news_post_crew;
pub use events::{RunEvent, RunEventKind};
pub use runner::Orchestrator;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Tool capabilities an agent may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    WebSearch,
}

/// A configured persona. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    /// Role label, e.g. "Senior UX/AI Researcher"
    pub role: String,
    /// Goal string, may embed run parameters
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Agent {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// The persona sent as the system prompt for this agent's tasks.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}. {backstory}\nYour goal: {goal}",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal,
        )
    }
}

/// One unit of pipeline work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub expected_output: String,
    /// Id of the executing agent
    pub agent: String,
    /// Ids of earlier tasks whose outputs become this task's input context
    #[serde(default)]
    pub context: Vec<String>,
    /// Query handed to the search tool when the agent can search
    #[serde(default)]
    pub search_query: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrewError {
    #[error("duplicate agent id '{0}'")]
    DuplicateAgent(String),

    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),

    #[error("task '{task}' references unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("task '{task}' depends on '{context}', which is not declared before it")]
    ContextNotReady { task: String, context: String },
}

/// The full pipeline: agents plus tasks in execution order.
///
/// Context references may only point at tasks declared earlier, so a
/// valid crew is already a topological order of its dependency graph.
#[derive(Debug, Clone)]
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl Crew {
    /// Build and validate a crew.
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Result<Self, CrewError> {
        let mut agent_ids = HashSet::new();
        for agent in &agents {
            if !agent_ids.insert(agent.id.as_str()) {
                return Err(CrewError::DuplicateAgent(agent.id.clone()));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for task in &tasks {
            if !agent_ids.contains(task.agent.as_str()) {
                return Err(CrewError::UnknownAgent {
                    task: task.id.clone(),
                    agent: task.agent.clone(),
                });
            }
            for context in &task.context {
                if !seen.contains(context.as_str()) {
                    return Err(CrewError::ContextNotReady {
                        task: task.id.clone(),
                        context: context.clone(),
                    });
                }
            }
            if !seen.insert(task.id.as_str()) {
                return Err(CrewError::DuplicateTask(task.id.clone()));
            }
        }

        Ok(Self { agents, tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Task ids in the order the runner will execute them.
    pub fn execution_order(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }
}
