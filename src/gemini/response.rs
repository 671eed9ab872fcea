use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data")]
    pub inline_data: Option<Blob>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Base64 audio plus its media type, taken from the first candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAudio {
    pub data: String,
    pub mime_type: String,
}

impl GenerateContentResponse {
    /// Lenient parse; an unexpected shape reads as a response without candidates.
    pub fn from_value(body: &Value) -> Self {
        match Self::deserialize(body) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Unexpected Gemini response shape: {}", e);
                Self::default()
            }
        }
    }

    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate, `None` when it has no text parts.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Inline audio from the first part of the first candidate.
    /// Empty `data` or `mimeType` counts as absent; the data itself is relayed untouched.
    pub fn inline_audio(&self) -> Option<InlineAudio> {
        let blob = self.first_parts().first()?.inline_data.as_ref()?;
        let data = blob.data.as_deref().filter(|d| !d.is_empty())?;
        let mime_type = blob.mime_type.as_deref().filter(|m| !m.is_empty())?;

        tracing::debug!("Received {} chars of {} audio", data.len(), mime_type);

        Some(InlineAudio {
            data: data.to_string(),
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_from_first_candidate() {
        let body = json!({"candidates": [
            {"content": {"role": "model", "parts": [{"text": "hel"}, {"text": "lo"}]}},
            {"content": {"parts": [{"text": "ignored"}]}}
        ]});
        assert_eq!(GenerateContentResponse::from_value(&body).text().as_deref(), Some("hello"));
    }

    #[test]
    fn no_candidates_means_no_text() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(GenerateContentResponse::from_value(&body).text(), None);
    }

    #[test]
    fn malformed_shape_is_treated_as_empty() {
        let body = json!({"candidates": "nope"});
        assert_eq!(GenerateContentResponse::from_value(&body).text(), None);
    }

    #[test]
    fn extracts_inline_audio() {
        let body = json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAEC"}}
        ]}}]});
        let audio = GenerateContentResponse::from_value(&body).inline_audio().unwrap();
        assert_eq!(audio.data, "AAEC");
        assert_eq!(audio.mime_type, "audio/L16;codec=pcm;rate=24000");
    }

    #[test]
    fn audio_must_be_in_first_part() {
        let body = json!({"candidates": [{"content": {"parts": [
            {"text": "here you go"},
            {"inlineData": {"mimeType": "audio/wav", "data": "AAEC"}}
        ]}}]});
        assert!(GenerateContentResponse::from_value(&body).inline_audio().is_none());
    }

    #[test]
    fn audio_without_mime_type_is_absent() {
        let body = json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"data": "AAEC"}}
        ]}}]});
        assert!(GenerateContentResponse::from_value(&body).inline_audio().is_none());
    }

    #[test]
    fn unpadded_audio_data_is_relayed_as_is() {
        let body = json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/L16", "data": "AAE"}}
        ]}}]});
        let audio = GenerateContentResponse::from_value(&body).inline_audio().unwrap();
        assert_eq!(audio.data, "AAE");
        assert_eq!(audio.mime_type, "audio/L16");
    }

    #[test]
    fn empty_audio_data_is_absent() {
        let body = json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "audio/wav", "data": ""}}
        ]}}]});
        assert!(GenerateContentResponse::from_value(&body).inline_audio().is_none());
    }
}
