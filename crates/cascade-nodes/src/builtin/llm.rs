use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use cascade_core::config::ModelConfig;
use cascade_core::context::{keys, Context};
use cascade_core::error::Result;
use cascade_core::traits::{CompletionClient, Node};
use cascade_core::types::CompletionRequest;

/// Delegates text generation to the external language-model service.
///
/// Honors the Router's skip flag (pass-through, no external call).
/// Otherwise the system prompt is assembled from the configured prompt
/// plus whatever the context holds under the file-content, history, and
/// search keys, the service is invoked, and the usage reported by the API
/// is folded into the run's cost/token counters.
pub struct LlmNode {
    id: String,
    model: String,
    system_prompt: String,
    temperature: f32,
    config: ModelConfig,
    client: Arc<dyn CompletionClient>,
}

impl LlmNode {
    pub fn new(
        id: &str,
        model: String,
        system_prompt: String,
        temperature: f32,
        config: ModelConfig,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            id: id.to_string(),
            model,
            system_prompt,
            temperature,
            config,
            client,
        }
    }

    fn assemble_system_prompt(&self, ctx: &Context) -> String {
        let mut sections = vec![self.system_prompt.clone()];

        if let Some(content) = ctx.text(keys::FILE_CONTENT) {
            sections.push(format!("# Reference document\n\n{}", content.trim()));
        }
        if let Some(history) = ctx.text(keys::CONVERSATION_HISTORY) {
            sections.push(format!("# Conversation so far\n\n{}", history));
        }
        if let Some(snippets) = ctx.list(keys::SEARCH_RESULTS) {
            sections.push(format!("# Search results\n\n{}", snippets.join("\n\n")));
        }

        sections.join("\n\n---\n\n")
    }
}

impl Node for LlmNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "llm"
    }

    fn execute<'a>(&'a self, input: String, ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if ctx.flag(keys::SKIP_LLM) {
                debug!(node = %self.id, "Skip flag set, passing input through");
                return Ok(input);
            }

            let request = CompletionRequest {
                model: self.model.clone(),
                system_prompt: self.assemble_system_prompt(ctx),
                user_prompt: input,
                temperature: self.temperature,
                max_tokens: self.config.max_tokens,
            };

            info!(node = %self.id, model = %self.model, temperature = self.temperature, "Calling LLM");
            let completion = self.client.complete(request).await?;

            let cost = self.config.cost_of(&completion.usage);
            ctx.add_cost(cost);
            ctx.add_tokens(completion.usage.total());
            ctx.set(keys::ASSISTANT_REPLY, completion.text.clone());
            debug!(
                node = %self.id,
                input_tokens = completion.usage.input_tokens,
                output_tokens = completion.usage.output_tokens,
                cost,
                "LLM call complete"
            );

            Ok(completion.text)
        })
    }
}
