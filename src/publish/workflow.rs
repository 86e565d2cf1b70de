//! GitHub Actions workflow commands (`::warning ...::message`).
//!
//! Values are escaped the way the Actions toolkit does, so every command
//! stays on a single line however many lines the message spans.

use crate::report::Annotation;

/// Escape a command's message data.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property value.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// `::warning title=..,file=..,line=..::message` for one annotation.
pub fn warning_command(annotation: &Annotation) -> String {
    format!(
        "::warning title={},file={},line={}::{}",
        escape_property(&annotation.title),
        escape_property(annotation.path.as_deref().unwrap_or_default()),
        annotation.start_line,
        escape_data(&annotation.message)
    )
}

/// `::error::message`, used to mark the whole run as failed.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::AnnotationLevel;

    fn annotation(path: Option<&str>, title: &str, message: &str) -> Annotation {
        Annotation {
            path: path.map(str::to_string),
            start_line: 7,
            end_line: 7,
            start_column: 0,
            end_column: 0,
            level: AnnotationLevel::Failure,
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_warning_command_plain() {
        let line = warning_command(&annotation(Some("a.go"), "pkg::TestA", "boom"));
        assert_eq!(line, "::warning title=pkg%3A%3ATestA,file=a.go,line=7::boom");
    }

    #[test]
    fn test_warning_command_multiline_message_stays_on_one_line() {
        let line = warning_command(&annotation(Some("a.go"), "t", "first\nsecond\r\n100%"));
        assert!(!line.contains('\n'));
        assert!(line.ends_with("::first%0Asecond%0D%0A100%25"));
    }

    #[test]
    fn test_warning_command_missing_path_is_blank() {
        let line = warning_command(&annotation(None, "t", "m"));
        assert!(line.contains(",file=,line=7::"));
    }

    #[test]
    fn test_escape_property_commas() {
        assert_eq!(escape_property("a,b"), "a%2Cb");
    }

    #[test]
    fn test_error_command() {
        assert_eq!(error_command("bad\nthing"), "::error::bad%0Athing");
    }
}
