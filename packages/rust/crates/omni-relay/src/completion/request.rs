use serde::Serialize;

use crate::config::DEFAULT_PERSONA;

/// One completion call: persona, user text and optional search context.
///
/// Immutable once built; the persona is never empty (a blank persona falls back to the built-in
/// one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    persona: String,
    user_text: String,
    extra_context: Option<String>,
}

impl CompletionRequest {
    pub fn new(persona: impl Into<String>, user_text: impl Into<String>) -> Self {
        let persona = persona.into();
        let persona = if persona.trim().is_empty() {
            DEFAULT_PERSONA.to_string()
        } else {
            persona
        };
        Self {
            persona,
            user_text: user_text.into(),
            extra_context: None,
        }
    }

    /// Attach a context block (search results). Blank context is dropped.
    #[must_use]
    pub fn with_extra_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.extra_context = (!context.trim().is_empty()).then_some(context);
        self
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn extra_context(&self) -> Option<&str> {
        self.extra_context.as_deref()
    }

    /// User turn as sent upstream: text, then the context block after a blank line.
    pub fn user_content(&self) -> String {
        match &self.extra_context {
            Some(context) => format!("{}\n\n{}", self.user_text, context),
            None => self.user_text.clone(),
        }
    }

    pub(crate) fn to_payload<'a>(&'a self, model: &'a str) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: self.persona.clone(),
                },
                InputMessage {
                    role: "user",
                    content: self.user_content(),
                },
            ],
        }
    }
}

/// Request body for the Responses API.
#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage>,
}

#[derive(Debug, Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}
