use crate::commands::Out;
use crate::Error;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, error};

/// A text item with the message, followed by a JSON item with the structured data if there is
/// any.
pub(super) fn to_content<T>(out: Out<T>) -> Vec<Content>
where
    T: Debug + Clone + Serialize,
{
    let mut content = vec![Content::text(out.message())];
    if let Some(object) = out.structure() {
        push_json(&mut content, object);
    }
    content
}

/// Failures become tool errors rather than protocol errors so the agent can read them. Validation
/// failures also carry the per-field messages as JSON.
fn error_content(e: &Error) -> Vec<Content> {
    let mut content = vec![Content::text(e.to_string())];
    if let Some(errors) = e.validation_errors() {
        push_json(&mut content, errors);
    }
    content
}

fn push_json<T: Serialize>(content: &mut Vec<Content>, object: &T) {
    match Content::json(object) {
        Ok(json) => content.push(json),
        Err(e) => error!("Unable to serialize JSON output: {e}"),
    }
}

pub(super) fn tool_result<T>(result: crate::Result<Out<T>>) -> Result<CallToolResult, ErrorData>
where
    T: Debug + Clone + Serialize,
{
    Ok(match result {
        Ok(out) => CallToolResult::success(to_content(out)),
        Err(e) => {
            debug!("Tool call failed: {e:?}");
            CallToolResult::error(error_content(&e))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorType, IntoResult};
    use crate::model::ValidationErrors;

    #[test]
    fn test_success_has_message_and_json() {
        let result = tool_result(Ok(Out::new("Found 2", vec![1, 2]))).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 2);
    }

    #[test]
    fn test_message_only() {
        let result = tool_result::<()>(Ok("Deleted pot 1".into())).unwrap();
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_validation_error_carries_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "must not be blank");
        let err = Err::<Out<()>, _>(errors)
            .pub_result(ErrorType::Validation);
        let result = tool_result(err).unwrap();
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 2);
    }

    #[test]
    fn test_other_errors_are_text_only() {
        let result = tool_result::<()>(Err(Error::not_found("Pot 3 was not found"))).unwrap();
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }
}
