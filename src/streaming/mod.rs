//! Byte-capped streaming
//!
//! Wraps a lazy stream of body chunks and stops pulling from it once a byte
//! budget is spent. The adapter knows nothing about HTTP: it only sees
//! `Result<Bytes, E>` items, which keeps it usable (and testable) on its own.

use bytes::Bytes;
use futures::{Stream, StreamExt};

/// What happened to a capped stream by the time it finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Bytes handed to the consumer
    pub bytes_forwarded: u64,
    /// The cap was hit and the remainder of the inner stream was dropped
    pub truncated: bool,
}

/// Forward chunks from `inner` until the cumulative size would exceed `cap`.
///
/// The chunk that crosses the cap is discarded and the inner stream is dropped
/// without being polled again, so at most `cap` bytes are ever forwarded. An
/// error from the inner stream is forwarded and ends the stream.
///
/// `on_finish` runs once when the stream ends on its own (exhaustion, cap or
/// error). It does not run if the consumer drops the stream early.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use futures::{executor::block_on, stream, StreamExt};
/// use courier::streaming::cap_stream;
///
/// let chunks = stream::iter(vec![
///     Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
///     Ok(Bytes::from_static(b"world")),
/// ]);
/// let capped: Vec<_> = block_on(cap_stream(chunks, 8, |_| {}).collect());
/// assert_eq!(capped.len(), 1);
/// ```
pub fn cap_stream<S, E, F>(inner: S, cap: u64, on_finish: F) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
    F: FnOnce(StreamSummary),
{
    async_stream::stream! {
        let mut inner = Box::pin(inner);
        let mut sent: u64 = 0;
        let mut truncated = false;

        while let Some(item) = inner.next().await {
            match item {
                Ok(chunk) => {
                    let next = sent + chunk.len() as u64;
                    if next > cap {
                        truncated = true;
                        break;
                    }
                    sent = next;
                    yield Ok(chunk);
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }

        // Release the upstream before reporting
        drop(inner);
        on_finish(StreamSummary {
            bytes_forwarded: sent,
            truncated,
        });
    }
}
