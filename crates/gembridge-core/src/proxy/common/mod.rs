pub mod client_builder;
pub mod media_detect;
pub mod random_id;
pub mod stream_log;
