//! The platform's response envelope.
//!
//! The schema is fixed by the messaging platform and must serialize
//! bit-exactly:
//!
//! ```json
//! { "version": "2.0", "template": { "outputs": [ { "simpleText": { "text": "..." } } ] } }
//! ```

use serde::{Deserialize, Serialize};

/// The versioned response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub template: Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    #[serde(rename = "simpleText")]
    pub simple_text: SimpleText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleText {
    pub text: String,
}

/// Wrap an answer string in the envelope. Pure and deterministic: the same
/// answer always yields a byte-identical envelope.
pub fn render(answer: &str) -> Envelope {
    Envelope {
        version: "2.0".into(),
        template: Template {
            outputs: vec![Output {
                simple_text: SimpleText {
                    text: answer.to_string(),
                },
            }],
        },
    }
}
