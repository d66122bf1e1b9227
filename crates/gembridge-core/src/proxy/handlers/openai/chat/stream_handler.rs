// Streaming chat completion (SSE relay)
//
// Lifecycle of one streamed request:
//
//   Idle ──open──► StreamOpen ──► Done | Aborted | ErroredAfterFirstChunk
//     └──fail────► ErroredBeforeFirstChunk (plain JSON error, no SSE)
//
// The first increment is awaited inside the retry loop, so retries only ever
// happen before the response is committed. Once the 200 goes out, every exit
// path ends the body with `data: [DONE]`.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use gembridge_types::protocol::gemini::{GenerateContentRequest, GenerateContentResponse};
use gembridge_types::{GatewayError, ProviderError};

use crate::error::ApiError;
use crate::proxy::common::stream_log::StreamRecorder;
use crate::proxy::credential_pool::Credential;
use crate::proxy::mappers::openai::streaming::{
    empty_stop_chunk, increment_chunk, sse_frame, DONE_FRAME,
};
use crate::proxy::mappers::openai::ResponseContext;
use crate::proxy::retry::{with_retry, AttemptError};
use crate::proxy::server::AppState;
use crate::proxy::upstream::IncrementStream;

pub(crate) type IncrementResult = Result<GenerateContentResponse, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    StreamOpen,
    Done,
    Aborted,
    ErroredBeforeFirstChunk,
    ErroredAfterFirstChunk,
}

/// First provider increment together with its extracted text.
#[derive(Debug)]
pub(crate) struct FirstIncrement {
    pub increment: GenerateContentResponse,
    pub text: String,
}

/// A provider stream that has produced its first increment (or ended empty).
struct OpenedStream {
    first: Option<FirstIncrement>,
    rest: Option<IncrementStream>,
}

pub(crate) async fn handle_stream(
    state: &AppState,
    ctx: ResponseContext,
    payload: GenerateContentRequest,
) -> Result<Response, ApiError> {
    let cancel = CancellationToken::new();
    let mut recorder = StreamRecorder::new(&state.stream_log, &ctx.id);
    if recorder.is_enabled() {
        debug!("[{}] Capturing raw increments", ctx.id);
    }
    debug!("[{}] {:?}: opening provider stream", ctx.id, StreamState::Idle);

    let opened = match open_stream(state, &ctx, &payload, &cancel).await {
        Ok(opened) => opened,
        Err(e) => {
            error!("[{}] {:?}: {}", ctx.id, StreamState::ErroredBeforeFirstChunk, e);
            recorder.persist().await;
            return Err(ApiError(e));
        },
    };
    debug!("[{}] {:?}", ctx.id, StreamState::StreamOpen);

    if let Some(first) = &opened.first {
        recorder.record(&first.increment);
    }

    let (increment_tx, increment_rx) = mpsc::channel::<IncrementResult>(1);
    let (frame_tx, frame_rx) = mpsc::channel::<Bytes>(1);

    match opened.rest {
        Some(rest) => {
            tokio::spawn(pump_increments(rest, increment_tx, cancel.clone()));
        },
        None => drop(increment_tx),
    }

    let first = opened.first;
    tokio::spawn(async move {
        let outcome =
            relay_increments(&ctx, first, increment_rx, frame_tx, &cancel, &mut recorder).await;
        cancel.cancel();
        info!("[{}] Stream finished: {:?}", ctx.id, outcome);
        recorder.persist().await;
    });

    Ok(sse_response(frame_rx))
}

/// Open the provider stream and wait for its first increment. Each attempt
/// rotates to another credential when the pool has more than one.
async fn open_stream(
    state: &AppState,
    ctx: &ResponseContext,
    payload: &GenerateContentRequest,
    cancel: &CancellationToken,
) -> Result<OpenedStream, GatewayError> {
    let model = ctx.model.as_str();
    let request_id = ctx.id.as_str();
    let mut previous: Option<Arc<Credential>> = None;

    with_retry(&state.retry, |attempt| {
        let credential = state.pool.rotate(previous.as_ref());
        previous = Some(Arc::clone(&credential));
        let cancel = cancel.clone();
        async move {
            debug!("[{}] Stream attempt {} via {}", request_id, attempt, credential.label());
            let mut stream =
                credential.client().generate_content_stream(model, payload, cancel).await?;

            let increment = match stream.next().await {
                Some(item) => item?,
                None => return Ok(OpenedStream { first: None, rest: None }),
            };
            let text = increment.text()?;
            Ok::<_, AttemptError<GatewayError>>(OpenedStream {
                first: Some(FirstIncrement { increment, text }),
                rest: Some(stream),
            })
        }
    })
    .await
}

/// Move provider increments into the relay channel until the stream ends,
/// fails, or the request is cancelled.
async fn pump_increments(
    mut stream: IncrementStream,
    increments: mpsc::Sender<IncrementResult>,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            item = stream.next() => item,
        };
        let Some(item) = item else { break };
        let failed = item.is_err();
        if increments.send(item).await.is_err() || failed {
            break;
        }
    }
    debug!("Provider stream reader stopped");
}

/// Turn increments into SSE frames. Returns the terminal state; the caller
/// owns cancellation and persistence.
pub(crate) async fn relay_increments(
    ctx: &ResponseContext,
    first: Option<FirstIncrement>,
    mut increments: mpsc::Receiver<IncrementResult>,
    frames: mpsc::Sender<Bytes>,
    cancel: &CancellationToken,
    recorder: &mut StreamRecorder,
) -> StreamState {
    let Some(first) = first else {
        debug!("[{}] Provider produced no increments", ctx.id);
        if frames.send(sse_frame(&empty_stop_chunk(ctx))).await.is_err() {
            cancel.cancel();
            return StreamState::Aborted;
        }
        send_done(ctx, &frames).await;
        return StreamState::Done;
    };

    if frames.send(sse_frame(&increment_chunk(ctx, &first.increment, &first.text))).await.is_err()
    {
        debug!("[{}] Client disconnected before first chunk", ctx.id);
        cancel.cancel();
        return StreamState::Aborted;
    }

    let outcome = loop {
        let next = tokio::select! {
            biased;
            () = frames.closed() => None,
            item = increments.recv() => Some(item),
        };

        let increment = match next {
            None => {
                debug!("[{}] Client disconnected", ctx.id);
                cancel.cancel();
                return StreamState::Aborted;
            },
            Some(None) => break StreamState::Done,
            Some(Some(Ok(increment))) => increment,
            Some(Some(Err(e))) if e.is_abort() => {
                info!("[{}] Provider stream aborted: {}", ctx.id, e);
                break StreamState::Aborted;
            },
            Some(Some(Err(e))) => {
                error!("[{}] Provider stream failed mid-response: {}", ctx.id, e);
                break StreamState::ErroredAfterFirstChunk;
            },
        };

        recorder.record(&increment);
        let text = match increment.text() {
            Ok(text) => text,
            Err(e) => {
                error!("[{}] Increment rejected mid-response: {}", ctx.id, e);
                break StreamState::ErroredAfterFirstChunk;
            },
        };

        if frames.send(sse_frame(&increment_chunk(ctx, &increment, &text))).await.is_err() {
            debug!("[{}] Client disconnected", ctx.id);
            cancel.cancel();
            return StreamState::Aborted;
        }
    };

    send_done(ctx, &frames).await;
    outcome
}

async fn send_done(ctx: &ResponseContext, frames: &mpsc::Sender<Bytes>) {
    if frames.send(Bytes::from_static(DONE_FRAME.as_bytes())).await.is_err() {
        debug!("[{}] Client gone before [DONE]", ctx.id);
    }
}

fn sse_response(frames: mpsc::Receiver<Bytes>) -> Response {
    let body = Body::from_stream(ReceiverStream::new(frames).map(Ok::<Bytes, Infallible>));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}
