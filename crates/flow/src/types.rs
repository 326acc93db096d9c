use serde::Serialize;
use serde_json::{json, Value};

/// Reason reported when neither the request nor the config names a flow.
pub const NO_FLOW_ID: &str = "no flow_id provided";

/// Parameters for one flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    /// Overrides the configured default flow.
    pub flow_id: Option<String>,
    pub input_value: String,
    pub output_type: String,
    pub input_type: String,
    pub tweaks: Option<Value>,
    pub session_id: Option<String>,
    pub stream: bool,
}

impl FlowRequest {
    /// A chat-in/chat-out request against the default flow.
    pub fn new(input_value: impl Into<String>) -> Self {
        Self {
            flow_id: None,
            input_value: input_value.into(),
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
            tweaks: None,
            session_id: None,
            stream: false,
        }
    }

    pub fn with_flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    pub fn with_tweaks(mut self, tweaks: Value) -> Self {
        self.tweaks = Some(tweaks);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub(crate) fn body(&self) -> RunBody<'_> {
        RunBody {
            input_value: &self.input_value,
            output_type: &self.output_type,
            input_type: &self.input_type,
            tweaks: self.tweaks.as_ref(),
            session_id: self.session_id.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RunBody<'a> {
    input_value: &'a str,
    output_type: &'a str,
    input_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweaks: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Result of [`LangflowClient::run_flow`](crate::LangflowClient::run_flow).
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// No flow was configured, so nothing was sent.
    Skipped { reason: String },
    /// The decoded response of the run.
    Completed(Value),
}

impl FlowOutcome {
    pub fn skipped() -> Self {
        FlowOutcome::Skipped {
            reason: NO_FLOW_ID.to_string(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FlowOutcome::Skipped { .. })
    }

    /// JSON form; a skip becomes `{"status": "skipped", "reason": ...}`.
    pub fn into_value(self) -> Value {
        match self {
            FlowOutcome::Skipped { reason } => json!({ "status": "skipped", "reason": reason }),
            FlowOutcome::Completed(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_omits_absent_optionals() {
        let request = FlowRequest::new("hi");
        assert_eq!(
            serde_json::to_value(request.body()).unwrap(),
            json!({ "input_value": "hi", "output_type": "chat", "input_type": "chat" })
        );
    }

    #[test]
    fn body_carries_tweaks_and_session() {
        let request = FlowRequest::new("hi")
            .with_output_type("text")
            .with_input_type("text")
            .with_tweaks(json!({ "Prompt-1": { "template": "{x}" } }))
            .with_session_id("s-1");
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body["output_type"], json!("text"));
        assert_eq!(body["tweaks"]["Prompt-1"]["template"], json!("{x}"));
        assert_eq!(body["session_id"], json!("s-1"));
    }

    #[test]
    fn skipped_sentinel_shape() {
        let outcome = FlowOutcome::skipped();
        assert!(outcome.is_skipped());
        assert_eq!(
            outcome.into_value(),
            json!({ "status": "skipped", "reason": "no flow_id provided" })
        );
    }
}
