use openai_api::normalize_chat_completions_url;

#[test]
fn url_normalization_keeps_existing_chat_completions_endpoint() {
    assert_eq!(
        normalize_chat_completions_url("https://api.openai.com/v1/chat/completions"),
        "https://api.openai.com/v1/chat/completions"
    );
}

#[test]
fn url_normalization_appends_chat_completions_to_base() {
    assert_eq!(
        normalize_chat_completions_url("http://localhost:11434/v1/"),
        "http://localhost:11434/v1/chat/completions"
    );
}

#[test]
fn url_normalization_defaults_empty_input() {
    assert_eq!(
        normalize_chat_completions_url("   "),
        "https://api.openai.com/v1/chat/completions"
    );
}
