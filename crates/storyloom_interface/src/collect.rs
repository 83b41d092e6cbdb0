//! Draining a chunk stream into the full response text.

use crate::{CompletionStream, FinishReason, Streaming};
use futures_util::StreamExt;
use storyloom_core::{CompletionRequest, CompletionResponse};
use storyloom_error::{CompletionError, CompletionErrorKind, StoryloomResult};

/// Consume a completion stream, forwarding each non-empty fragment to
/// `on_fragment` as it arrives, and return the concatenated text.
///
/// Stops at the first final chunk. A stream that ends without producing any
/// text is reported as [`CompletionErrorKind::EmptyResponse`], which keeps
/// "the model said nothing" distinct from a transport failure.
///
/// # Errors
///
/// Propagates the first error yielded by the stream, or `EmptyResponse`.
pub async fn collect_stream<F>(
    mut stream: CompletionStream,
    mut on_fragment: F,
) -> StoryloomResult<(CompletionResponse, Option<FinishReason>)>
where
    F: FnMut(&str),
{
    let mut text = String::new();
    let mut finish_reason = None;
    let mut chunk_count = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        chunk_count += 1;
        if !chunk.text().is_empty() {
            on_fragment(chunk.text().as_str());
            text.push_str(chunk.text());
        }
        if *chunk.is_final() {
            finish_reason = *chunk.finish_reason();
            break;
        }
    }

    tracing::debug!(chunk_count, length = text.len(), "Completion stream drained");

    if text.is_empty() {
        return Err(CompletionError::new(CompletionErrorKind::EmptyResponse).into());
    }

    Ok((CompletionResponse::new(text), finish_reason))
}

/// Open a stream on `driver` for `request` and drain it with [`collect_stream`].
///
/// # Errors
///
/// Fails if the stream cannot be opened, breaks off, or yields no text.
#[tracing::instrument(skip_all, fields(provider = driver.provider_name(), messages = request.messages().len()))]
pub async fn collect_completion<D, F>(
    driver: &D,
    request: &CompletionRequest,
    on_fragment: F,
) -> StoryloomResult<(CompletionResponse, Option<FinishReason>)>
where
    D: Streaming + ?Sized,
    F: FnMut(&str),
{
    let stream = driver.generate_stream(request).await?;
    collect_stream(stream, on_fragment).await
}
