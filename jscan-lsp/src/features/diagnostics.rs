//! Mapping of engine findings to protocol diagnostics.

use jscan_analysis::{ErrorLevel, ScanError};
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, Range, Url,
};

use crate::line_index::LineIndex;
use crate::session::SessionCapabilities;

pub const DIAGNOSTIC_SOURCE: &str = "jscan";

pub fn severity(level: ErrorLevel) -> DiagnosticSeverity {
    match level {
        ErrorLevel::Error => DiagnosticSeverity::ERROR,
        ErrorLevel::Warning => DiagnosticSeverity::WARNING,
        ErrorLevel::Information => DiagnosticSeverity::INFORMATION,
        ErrorLevel::Hint => DiagnosticSeverity::HINT,
    }
}

/// Position a finding against the text it was produced from.
pub fn to_diagnostic(
    error: &ScanError,
    uri: &Url,
    index: &LineIndex<'_>,
    capabilities: &SessionCapabilities,
) -> Diagnostic {
    let start = index.position(error.range.start);
    let end = index.position(error.range.end.max(error.range.start));
    let range = Range::new(start, end);

    let related_information = match &error.extra_msg {
        Some(extra_msg) if capabilities.related_information => {
            Some(vec![DiagnosticRelatedInformation {
                location: Location::new(uri.clone(), range),
                message: extra_msg.clone(),
            }])
        }
        _ => None,
    };

    Diagnostic {
        range,
        severity: Some(severity(error.level)),
        code: None,
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: format!("{}: {}", error.level.name(), error.plugin_tips),
        related_information,
        tags: None,
        data: None,
    }
}

/// Map every finding, keeping at most `max_problems` of them.
pub fn collect_diagnostics(
    errors: &[ScanError],
    uri: &Url,
    text: &str,
    capabilities: &SessionCapabilities,
    max_problems: usize,
) -> Vec<Diagnostic> {
    let index = LineIndex::new(text);
    errors
        .iter()
        .take(max_problems)
        .map(|error| to_diagnostic(error, uri, &index, capabilities))
        .collect()
}
