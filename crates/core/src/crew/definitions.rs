//! The fixed three-agent crew that turns a topic into a post plus an
//! image prompt: researcher -> writer -> art director, chained by
//! explicit context dependencies.

use crate::models::RunParams;

use super::{Agent, Capability, Crew, Task};

pub const RESEARCHER: &str = "researcher";
pub const WRITER: &str = "writer";
pub const ART_DIRECTOR: &str = "art_director";

pub const RESEARCH_TASK: &str = "research";
pub const WRITE_TASK: &str = "write";
pub const IMAGE_PROMPT_TASK: &str = "image_prompt";

/// Build the crew for one run. Pure configuration - no network I/O.
pub fn news_post_crew(params: &RunParams) -> Crew {
    let researcher = Agent {
        id: RESEARCHER.to_string(),
        role: "Senior UX/AI Researcher".to_string(),
        goal: format!("Find the latest news about {}", params.topic),
        backstory: "You are a trend hunter. You find the most impactful tech news.".to_string(),
        capabilities: vec![Capability::WebSearch],
    };

    let writer = Agent {
        id: WRITER.to_string(),
        role: "Content Creator".to_string(),
        goal: format!("Write engaging LinkedIn posts in {}", params.language),
        backstory: format!(
            "You are a top tech influencer. You write in natural {}.",
            params.language
        ),
        capabilities: Vec::new(),
    };

    let art_director = Agent {
        id: ART_DIRECTOR.to_string(),
        role: "Creative Art Director".to_string(),
        goal: "Create detailed image prompts for Generative AI".to_string(),
        backstory: "You are an expert in Prompt Engineering. You know how to describe abstract \
                    tech concepts for tools like Midjourney, DALL-E, and Gemini."
            .to_string(),
        capabilities: Vec::new(),
    };

    let research = Task {
        id: RESEARCH_TASK.to_string(),
        description: format!(
            "Find 1 interesting news item from the last 7 days regarding '{}'.",
            params.topic
        ),
        expected_output: "A summary of the news item with source link.".to_string(),
        agent: RESEARCHER.to_string(),
        context: Vec::new(),
        search_query: Some(params.topic.clone()),
    };

    let write = Task {
        id: WRITE_TASK.to_string(),
        description: format!(
            "Write a LinkedIn post in {} based on the research. Keep it under 200 words.",
            params.language
        ),
        expected_output: format!("A full LinkedIn post in {}.", params.language),
        agent: WRITER.to_string(),
        context: vec![RESEARCH_TASK.to_string()],
        search_query: None,
    };

    let image_prompt = Task {
        id: IMAGE_PROMPT_TASK.to_string(),
        description: "1. Read the LinkedIn post created by the writer.\n\
                      2. Create a creative, high-quality image prompt (in English) that \
                      visualizes this topic.\n\
                      3. The style should be: \"Modern, flat vector art, isometric style, tech \
                      colors (blue, purple, white)\".\n\
                      4. FINAL OUTPUT FORMAT: output the LinkedIn post FIRST, exactly as \
                      written, then a separator line of dashes (---), then the image prompt."
            .to_string(),
        expected_output: "The LinkedIn post followed by the image prompt.".to_string(),
        agent: ART_DIRECTOR.to_string(),
        context: vec![WRITE_TASK.to_string()],
        search_query: None,
    };

    Crew::new(
        vec![researcher, writer, art_director],
        vec![research, write, image_prompt],
    )
    .expect("news post crew wiring is valid")
}
