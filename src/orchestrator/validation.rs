//! Input validation for submitted proposals

use crate::record::NewProposal;
use thiserror::Error;

/// Maximum proposal length, in characters (inclusive)
pub const MAX_CONTENT_CHARS: usize = 5000;
/// Maximum title length, in characters; longer titles are truncated
pub const MAX_TITLE_CHARS: usize = 255;

/// Caller input that violates a constraint. Never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("User ID is required")]
    MissingUserId,
    #[error("Proposal content is required")]
    EmptyContent,
    #[error("Proposal content must be at most {max} characters (got {length})")]
    ContentTooLong { length: usize, max: usize },
}

/// Check caller input and shape it into a storable proposal.
///
/// Content is checked before the user id. Content is stored as submitted;
/// only the emptiness check trims. The user id is opaque: only an empty id
/// is missing, and whitespace is kept as given. A blank title is treated as absent and
/// a long title is cut to `MAX_TITLE_CHARS` characters.
pub fn validate(
    content: &str,
    title: Option<&str>,
    user_id: &str,
) -> Result<NewProposal, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    let length = content.chars().count();
    if length > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong {
            length,
            max: MAX_CONTENT_CHARS,
        });
    }
    if user_id.is_empty() {
        return Err(ValidationError::MissingUserId);
    }

    let mut proposal = NewProposal::new(user_id, content);
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        proposal = proposal.with_title(truncate_chars(title, MAX_TITLE_CHARS));
    }
    Ok(proposal)
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_content_at_limit() {
        let content = "a".repeat(MAX_CONTENT_CHARS);
        let proposal = validate(&content, None, "u1").unwrap();
        assert_eq!(proposal.content.len(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn rejects_content_over_limit() {
        let content = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert_eq!(
            validate(&content, None, "u1"),
            Err(ValidationError::ContentTooLong {
                length: 5001,
                max: 5000
            })
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let content = "é".repeat(MAX_CONTENT_CHARS);
        assert!(content.len() > MAX_CONTENT_CHARS);
        assert!(validate(&content, None, "u1").is_ok());
    }

    #[test]
    fn rejects_blank_content() {
        assert_eq!(validate("", None, "u1"), Err(ValidationError::EmptyContent));
        assert_eq!(
            validate(" \n\t", Some("Title"), "u1"),
            Err(ValidationError::EmptyContent)
        );
    }

    #[test]
    fn rejects_missing_user() {
        assert_eq!(
            validate("content", None, ""),
            Err(ValidationError::MissingUserId)
        );
    }

    #[test]
    fn user_id_is_opaque() {
        let proposal = validate("content", None, "   ").unwrap();
        assert_eq!(proposal.user_id, "   ");
        let proposal = validate("content", None, " u1 ").unwrap();
        assert_eq!(proposal.user_id, " u1 ");
    }

    #[test]
    fn content_error_reported_before_user_error() {
        assert_eq!(validate("", Some(""), ""), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn keeps_content_untrimmed() {
        let proposal = validate("  padded  ", None, "u1").unwrap();
        assert_eq!(proposal.content, "  padded  ");
    }

    #[test]
    fn blank_title_is_absent() {
        assert_eq!(validate("c", Some(""), "u1").unwrap().title, None);
        assert_eq!(validate("c", Some("   "), "u1").unwrap().title, None);
        assert_eq!(validate("c", None, "u1").unwrap().title, None);
    }

    #[test]
    fn long_title_is_truncated_on_char_boundary() {
        let title = "ü".repeat(MAX_TITLE_CHARS + 10);
        let proposal = validate("c", Some(&title), "u1").unwrap();
        let stored = proposal.title.unwrap();
        assert_eq!(stored.chars().count(), MAX_TITLE_CHARS);

        let exact = "t".repeat(MAX_TITLE_CHARS);
        let proposal = validate("c", Some(&exact), "u1").unwrap();
        assert_eq!(proposal.title.as_deref(), Some(exact.as_str()));
    }
}
