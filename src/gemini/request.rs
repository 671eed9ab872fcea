use serde_json::{json, Value};

/// Speech request for a prebuilt voice, audio output only.
pub fn tts_request(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": text }]
        }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

/// Chat payloads are forwarded as-is when they are already a request object.
/// A bare prompt string, or a list of strings and parts, becomes one user turn.
pub fn chat_request(payload: Value) -> Value {
    match payload {
        Value::String(text) => user_turn(vec![json!({ "text": text })]),
        Value::Array(items) => user_turn(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => json!({ "text": text }),
                    part => part,
                })
                .collect(),
        ),
        other => other,
    }
}

fn user_turn(parts: Vec<Value>) -> Value {
    json!({ "contents": [{ "role": "user", "parts": parts }] })
}
