//! System and task prompts for RAG completions

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const DEFAULT_TASK_PROMPT: &str = r#"
## Task:
Answer the query given immediately below given the context which follows later. Use line item references to like [1], [2], ... refer to specifically numbered items in the provided context. Pay close attention to the title of each given source to ensure it is consistent with the query.

### Query:
{query}

### Context:
{context}

### Query:
{query}

REMINDER - Use line item references to like [1], [2], ... refer to specifically numbered items in the provided context.
## Response:
"#;

/// Source of the prompts sent to the language model
pub trait PromptProvider: Send + Sync {
    fn system_prompt(&self) -> &str;

    /// Raw task template containing `{query}` and `{context}` placeholders
    fn task_prompt(&self) -> &str;

    /// Substitute every placeholder occurrence in the task template
    fn render_task_prompt(&self, query: &str, context: &str) -> String {
        // Context goes in first so a literal "{query}" inside it is left alone
        let template = self.task_prompt();
        let mut rendered = String::with_capacity(template.len() + query.len() + context.len());
        for (idx, part) in template.split("{context}").enumerate() {
            if idx > 0 {
                rendered.push_str(context);
            }
            rendered.push_str(&part.replace("{query}", query));
        }
        rendered
    }
}

/// Prompt provider holding fixed system and task prompts
#[derive(Debug, Clone)]
pub struct BasicPromptProvider {
    system_prompt: String,
    task_prompt: String,
}

impl BasicPromptProvider {
    pub fn new(system_prompt: impl Into<String>, task_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            task_prompt: task_prompt.into(),
        }
    }
}

impl Default for BasicPromptProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, DEFAULT_TASK_PROMPT)
    }
}

impl PromptProvider for BasicPromptProvider {
    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn task_prompt(&self) -> &str {
        &self.task_prompt
    }
}
