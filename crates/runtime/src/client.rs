//! One-shot entry point.

use std::path::Path;

use crate::model::{Backend, Message};
use crate::tools::McpGateway;
use crate::{Conversation, Result};

/// Launch the server at `script`, run `query` to completion, and shut the
/// server down again.
///
/// The server is released whether or not the query succeeds. When both the
/// query and the release fail, the query's error is returned.
pub async fn query_once<B: Backend>(
    backend: B,
    script: impl AsRef<Path>,
    query: &str,
) -> Result<Vec<Message>> {
    let mut gateway = McpGateway::new();
    gateway.connect(script).await?;

    let outcome = Conversation::new(backend, &gateway)
        .process_query(query)
        .await
        .map(<[Message]>::to_vec);

    let released = gateway.cleanup().await;
    let transcript = outcome?;
    released?;
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::model::{ModelError, ModelRequest, ModelResponse};

    struct Unreachable;

    impl Backend for Unreachable {
        async fn call(
            &self,
            _request: ModelRequest<'_>,
        ) -> std::result::Result<ModelResponse, ModelError> {
            panic!("model must not be called");
        }
    }

    #[tokio::test]
    async fn unsupported_script_is_rejected_before_anything_runs() {
        let err = query_once(Unreachable, "tools/server.exe", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedServerType(_)));
    }
}
