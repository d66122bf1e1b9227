use rand::Rng;

pub fn generate_random_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `chatcmpl-<24 alphanumerics>`, shared by every chunk of one request.
pub fn chat_completion_id() -> String {
    format!("chatcmpl-{}", generate_random_id(24))
}
