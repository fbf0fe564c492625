// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for failed pages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Batch operations attach one of these to each failed item so the user can
// see which page went wrong and what to do about it.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary condition — trying again may work.
    Transient,
    /// User must do something (pick another file, adjust the crop).
    ActionRequired,
    /// Cannot be fixed by retrying — damaged file, unsupported data.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same operation again may succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl HumanError {
    /// Prefix the message with the name of the page it belongs to.
    pub fn for_item(mut self, item_name: &str) -> Self {
        self.message = format!("{item_name}: {}", self.message);
        self
    }
}

/// Convert a `ScanError` into a `HumanError` suitable for display.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::EngineUnavailable { .. } => HumanError {
            message: "Automatic edge detection isn't available right now.".into(),
            suggestion: "The page was given a default crop. Drag the corners to adjust it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::DecodeFailure(_) => HumanError {
            message: "This file isn't a readable image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "Try the operation again. If it keeps failing, reload the page from the original file.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::GeometryDegenerate(_) => HumanError {
            message: "The crop area is too small to straighten.".into(),
            suggestion: "Drag the corners apart so they surround the page, then save again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::OutputTooLarge { width, height, .. } => HumanError {
            message: "The straightened page would be too large.".into(),
            suggestion: format!(
                "Try a smaller crop area or a lower-resolution photo. (Requested {width}x{height} pixels.)"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::UnknownItem(detail) => HumanError {
            message: "That page is no longer in the document.".into(),
            suggestion: format!("It may have been removed. Refresh the page list and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::NothingToUndo => HumanError {
            message: "There's nothing to undo.".into(),
            suggestion: "Only the most recent batch operation can be undone.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::Config(detail) => HumanError {
            message: "The scan settings are invalid.".into(),
            suggestion: format!("Reset the settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_is_permanent() {
        let human = humanize_error(&ScanError::DecodeFailure("bad header".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn engine_unavailable_is_transient() {
        let human = humanize_error(&ScanError::EngineUnavailable { attempts: 300 });
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn degenerate_geometry_needs_user_action() {
        let human = humanize_error(&ScanError::GeometryDegenerate("zero width".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn item_name_prefixes_message() {
        let human = humanize_error(&ScanError::DecodeFailure("eof".into())).for_item("page-3.jpg");
        assert!(human.message.starts_with("page-3.jpg: "));
    }
}
