use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_MODEL;

// Body accepted on /api/chat. Fields are loose JSON so that falsy values
// (null, false, 0, "") can be told apart from absent ones.
#[derive(Deserialize, Debug, Default)]
pub struct InboundRequest {
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub prompt: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
}

// Body sent to the upstream chat-completions endpoint
#[derive(Serialize, Debug, PartialEq)]
pub struct OutboundRequest {
    pub model: Value,
    pub messages: Messages,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Messages {
    // Caller supplied messages, forwarded untouched
    Verbatim(Value),
    Synthesized(Vec<ChatMessage>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: Value },
}

impl ChatMessage {
    pub fn user_text(text: impl Into<Value>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

// JSON truthiness: absent, null, false, 0 and "" do not count as provided
fn provided(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(v) => Some(v),
    }
}

impl InboundRequest {
    // Derive the upstream body. None means neither messages nor prompt is usable.
    pub fn into_outbound(self) -> Option<OutboundRequest> {
        let model = provided(&self.model)
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_MODEL));

        let messages = if provided(&self.messages).is_some() {
            Messages::Verbatim(self.messages?)
        } else if let Some(prompt) = provided(&self.prompt) {
            Messages::Synthesized(vec![ChatMessage::user_text(prompt.clone())])
        } else {
            return None;
        };

        Some(OutboundRequest { model, messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> InboundRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn prompt_becomes_single_user_message() {
        let outbound = parse(json!({"prompt": "hello"})).into_outbound().unwrap();

        assert_eq!(
            serde_json::to_value(&outbound).unwrap(),
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": "hello"}]}
                ]
            })
        );
    }

    #[test]
    fn messages_pass_through_with_caller_model() {
        let messages = json!([{"role": "user", "content": "hi"}]);
        let outbound = parse(json!({"messages": messages.clone(), "model": "foo"}))
            .into_outbound()
            .unwrap();

        assert_eq!(outbound.model, "foo");
        assert_eq!(outbound.messages, Messages::Verbatim(messages));
    }

    #[test]
    fn messages_win_over_prompt() {
        let outbound = parse(json!({"messages": [], "prompt": "ignored"}))
            .into_outbound()
            .unwrap();
        assert_eq!(outbound.messages, Messages::Verbatim(json!([])));
    }

    #[test]
    fn falsy_messages_fall_back_to_prompt() {
        let outbound = parse(json!({"messages": null, "prompt": "hey"}))
            .into_outbound()
            .unwrap();
        assert_eq!(
            outbound.messages,
            Messages::Synthesized(vec![ChatMessage::user_text("hey")])
        );
    }

    #[test]
    fn nothing_usable_is_rejected() {
        assert!(parse(json!({})).into_outbound().is_none());
        assert!(parse(json!({"prompt": ""})).into_outbound().is_none());
        assert!(parse(json!({"messages": false, "model": "foo"})).into_outbound().is_none());
    }

    #[test]
    fn non_string_prompt_and_model_are_not_coerced() {
        let outbound = parse(json!({"prompt": 5, "model": {"id": "foo"}}))
            .into_outbound()
            .unwrap();

        assert_eq!(outbound.model, json!({"id": "foo"}));
        assert_eq!(
            serde_json::to_value(&outbound.messages).unwrap(),
            json!([{"role": "user", "content": [{"type": "text", "text": 5}]}])
        );
    }

    #[test]
    fn empty_model_uses_default() {
        let outbound = parse(json!({"prompt": "x", "model": ""}))
            .into_outbound()
            .unwrap();
        assert_eq!(outbound.model, DEFAULT_MODEL);
    }
}
