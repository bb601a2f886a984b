//! The language-model prompt that produces [`crate::model::AiContent`].
//!
//! Only the request is assembled here; sending it is left to the caller.

use serde::Serialize;

use crate::model::domains_title;

pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f64 = 0.3;

/// Prompt text for a domain selection.
pub fn build_prompt(domains: &[String]) -> String {
    let domain_str = domains_title(domains);
    format!(
        r#"You are a Senior Data Scientist at Analytics Avenue.
Generate a JSON prescription for: {domain_str}

CRITICAL RULES:
1. Use <b>text</b> for bold formatting on domain names, technologies
2. Return ONLY these keys:
   - "intro_line": Introduction with <b> tags
   - "domain_bullets": List of domain descriptions with <b> tags (one bullet per domain)
   - "projects_bullet": Projects description with <b> tags
   - "final_sentence": Closing with <b> tags

NOW GENERATE for: {domain_str}
Return ONLY valid JSON."#
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// An OpenAI-compatible chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: &'static str,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    pub fn for_domains(domains: &[String]) -> Self {
        Self {
            model: MODEL,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(domains),
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_selection_twice() {
        let prompt = build_prompt(&["Finance".to_string(), "Retail".to_string()]);
        assert_eq!(prompt.matches("Finance & Retail").count(), 2);
        assert!(prompt.contains("\"domain_bullets\""));
        assert!(prompt.ends_with("Return ONLY valid JSON."));
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(ChatRequest::for_domains(&["Finance".to_string()])).unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
    }
}
