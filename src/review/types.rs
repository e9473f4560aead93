use serde::{Deserialize, Deserializer, Serialize};

/// One line-level opinion from the model, as it came back.
/// `line_number` is not checked against the diff.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSuggestion {
    /// Kept as text; models send both `"12"` and `12`.
    #[serde(deserialize_with = "line_number_as_text")]
    pub line_number: String,
    pub review_comment: String,
}

/// An inline comment ready for GitHub's create-review call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostableComment {
    pub body: String,
    /// Never empty; deleted files produce no comments.
    pub path: String,
    pub line: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLineNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn line_number_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawLineNumber::deserialize(deserializer)? {
        RawLineNumber::Text(text) => text,
        RawLineNumber::Integer(n) => n.to_string(),
        RawLineNumber::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_accepts_text_and_numeric_line() {
        let from_text: ReviewSuggestion =
            serde_json::from_str(r#"{"lineNumber": "12", "reviewComment": "fix this"}"#).unwrap();
        let from_number: ReviewSuggestion =
            serde_json::from_str(r#"{"lineNumber": 12, "reviewComment": "fix this"}"#).unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(from_text.line_number, "12");
    }

    #[test]
    fn test_suggestion_ignores_extra_fields() {
        let suggestion: ReviewSuggestion = serde_json::from_str(
            r#"{"lineNumber": "3", "reviewComment": "nit", "severity": "low", "confidence": 0.4}"#,
        )
        .unwrap();
        assert_eq!(suggestion.review_comment, "nit");
    }

    #[test]
    fn test_suggestion_requires_comment() {
        assert!(serde_json::from_str::<ReviewSuggestion>(r#"{"lineNumber": "3"}"#).is_err());
    }
}
