//! The model/tool conversation loop.

use tracing::{debug, error, info, warn};

use crate::model::{
    Backend, FinishReason, Message, ModelRequest, ModelResponse, Role, ToolCall, ToolResult,
    Usage,
};
use crate::tools::ToolHost;
use crate::{Error, Result};

/// Drives one query at a time to a final answer.
///
/// The transcript belongs to the conversation and is replaced on every
/// [`process_query`](Self::process_query) call.
pub struct Conversation<B, H> {
    backend: B,
    tools: H,
    messages: Vec<Message>,
    usage: Usage,
    finish_reason: Option<FinishReason>,
}

impl<B: Backend, H: ToolHost> Conversation<B, H> {
    pub fn new(backend: B, tools: H) -> Self {
        Self {
            backend,
            tools,
            messages: Vec::new(),
            usage: Usage::default(),
            finish_reason: None,
        }
    }

    /// The transcript of the latest query, complete or not.
    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }

    /// Token usage accumulated over the latest query.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Why the model stopped on its latest turn of the latest query.
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.finish_reason.as_ref()
    }

    /// Text of the final answer, if the latest query reached one.
    pub fn answer(&self) -> Option<String> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant && m.tool_calls().is_empty())
            .map(Message::text)
    }

    pub fn tools(&self) -> &H {
        &self.tools
    }

    /// Run `query` until the model answers without requesting tools.
    ///
    /// Tool calls within one model turn run sequentially in the order the
    /// model emitted them, and their results go back in a single user
    /// message. The first model or tool failure ends the query; the partial
    /// transcript stays readable through [`transcript`](Self::transcript).
    pub async fn process_query(&mut self, query: &str) -> Result<&[Message]> {
        info!(query, "processing query");
        self.messages = vec![Message::user(query)];
        self.usage = Usage::default();
        self.finish_reason = None;

        loop {
            let response = self.call_model().await?;
            self.usage += response.usage;
            if response.finish_reason == FinishReason::Length {
                warn!(
                    output_tokens = response.usage.output_tokens,
                    "model stopped at the max token limit, reply is truncated"
                );
            }
            self.finish_reason = Some(response.finish_reason);

            let message = response.message;
            let calls: Vec<ToolCall> = message.tool_calls().into_iter().cloned().collect();

            if calls.is_empty() {
                self.messages.push(message.normalized());
                break;
            }

            if !message.text().is_empty() {
                // Kept in the transcript for the model's context only.
                debug!(text = %message.text(), "model sent text alongside tool calls");
            }
            self.messages.push(message);

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.invoke(call).await?);
            }
            self.messages.push(Message::tool_results(results));
        }

        info!(
            messages = self.messages.len(),
            input_tokens = self.usage.input_tokens,
            output_tokens = self.usage.output_tokens,
            "query complete"
        );
        Ok(self.messages.as_slice())
    }

    async fn call_model(&self) -> Result<ModelResponse> {
        debug!(messages = self.messages.len(), "calling model");
        let request = ModelRequest {
            messages: &self.messages,
            tools: self.tools.specs(),
        };
        self.backend
            .call(request)
            .await
            .inspect_err(|e| error!(error = %e, "error calling model"))
            .map_err(Error::from)
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolResult> {
        info!(tool = %call.name, id = %call.id, args = %call.input, "calling tool");
        let output = self
            .tools
            .execute(call)
            .await
            .inspect_err(|e| error!(tool = %call.name, error = %e, "error calling tool"))
            .map_err(|source| Error::ToolInvocation {
                name: call.name.clone(),
                source,
            })?;

        if output.is_error {
            warn!(tool = %call.name, "tool reported an error result");
        }
        debug!(tool = %call.name, content = %output.content, "tool result");

        Ok(ToolResult {
            tool_call_id: call.id.clone(),
            content: output.content,
            is_error: output.is_error,
        })
    }
}
