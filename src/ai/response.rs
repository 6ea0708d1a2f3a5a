use serde::de::DeserializeOwned;

use super::ServiceError;

/// Remove a surrounding Markdown code fence (```json ... ```), if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a model's JSON payload into `T`
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, ServiceError> {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return Err(ServiceError::InvalidResponse("empty payload".to_string()));
    }
    serde_json::from_str(payload).map_err(|e| {
        let preview: String = payload.chars().take(80).collect();
        ServiceError::InvalidResponse(format!("{} (payload starts: {:?})", e, preview))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_untouched() {
        assert_eq!(strip_code_fence("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(strip_code_fence(text), "[{\"a\": 1}]");

        let bare = "```\n{\"a\": 1}\n```\n";
        assert_eq!(strip_code_fence(bare), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_fenced_payload() {
        let values: Vec<u32> = parse_json_payload("```json\n[1,2,3]\n```").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result: Result<Vec<u32>, _> = parse_json_payload("Sure! Here are some words...");
        assert!(matches!(result, Err(ServiceError::InvalidResponse(_))));

        let empty: Result<Vec<u32>, _> = parse_json_payload("```json\n```");
        assert!(matches!(empty, Err(ServiceError::InvalidResponse(_))));
    }
}
