use openai_api::{ChatCompletionRequest, ChatMessage};
use serde_json::json;

#[test]
fn request_serializes_to_chat_completions_shape() {
    let request = ChatCompletionRequest::new(
        "gpt-4o-mini",
        vec![
            ChatMessage::new("system", "You are Socrates."),
            ChatMessage::new("user", "Ana: What is justice?"),
            ChatMessage::new("assistant", "Socrates: "),
        ],
    )
    .with_temperature(1.0);

    let value = serde_json::to_value(&request).expect("request should serialize");
    assert_eq!(
        value,
        json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "You are Socrates." },
                { "role": "user", "content": "Ana: What is justice?" },
                { "role": "assistant", "content": "Socrates: " }
            ],
            "temperature": 1.0,
            "stream": true
        })
    );
}

#[test]
fn request_omits_unset_optional_fields() {
    let request = ChatCompletionRequest::new("gpt-4o-mini", vec![ChatMessage::new("user", "hi")]);
    let value = serde_json::to_value(&request).expect("request should serialize");

    assert!(value.get("temperature").is_none());
}

#[test]
fn request_stream_flag_defaults_to_true_when_deserialized() {
    let request: ChatCompletionRequest = serde_json::from_value(json!({
        "model": "gpt-4o-mini",
        "messages": [{ "role": "user", "content": "hi" }]
    }))
    .expect("request should deserialize");

    assert!(request.stream);
}
