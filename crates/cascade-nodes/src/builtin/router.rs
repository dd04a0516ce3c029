use futures::future::BoxFuture;
use tracing::debug;

use cascade_core::context::{keys, Context};
use cascade_core::error::Result;
use cascade_core::traits::Node;

/// Inputs answerable without spending LLM credits.
const GREETINGS: &[&str] = &["hello", "hi", "hey", "greetings", "who are you"];

const CANNED_RESPONSE: &str = "Hello! I'm the Cascade assistant. How can I help you today?";

/// Short-circuits trivially answerable input before it reaches the paid
/// LLM service.
///
/// A pure classification over a small static table: on a match the skip
/// flag is set and the canned response replaces the running value for all
/// downstream nodes; otherwise the input passes through untouched and no
/// flag is left behind.
pub struct RouterNode {
    id: String,
}

impl RouterNode {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whole-word phrase match: "hi there" is a greeting, "this is history"
/// is not.
fn matches_greeting(clean: &str) -> bool {
    let input_words = words(clean);
    GREETINGS.iter().any(|greeting| {
        let greeting_words = words(greeting);
        input_words
            .windows(greeting_words.len())
            .any(|window| window == greeting_words.as_slice())
    })
}

impl Node for RouterNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        "router"
    }

    fn execute<'a>(&'a self, input: String, ctx: &'a mut Context) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let clean = input.trim().to_lowercase();
            if matches_greeting(&clean) {
                debug!(node = %self.id, "Greeting detected, skipping LLM");
                ctx.set(keys::SKIP_LLM, true);
                return Ok(CANNED_RESPONSE.to_string());
            }
            debug!(node = %self.id, "No greeting detected, routing to LLM");
            Ok(input)
        })
    }
}
