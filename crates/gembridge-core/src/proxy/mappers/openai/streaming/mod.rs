// OpenAI streaming output
pub mod stream_formatters;

pub use stream_formatters::{
    empty_stop_chunk, increment_chunk, sse_frame, stream_chunk, DONE_FRAME, EMPTY_STOP_REASON,
};
