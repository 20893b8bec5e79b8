use std::fmt;
use std::ops::Range;

/// Severity attached to a finding. Numeric values match the protocol severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorLevel {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl ErrorLevel {
    /// Map a configured numeric level (the `level` plugin option) onto a severity.
    pub fn from_number(level: u64) -> Option<Self> {
        match level {
            1 => Some(ErrorLevel::Error),
            2 => Some(ErrorLevel::Warning),
            3 => Some(ErrorLevel::Information),
            4 => Some(ErrorLevel::Hint),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorLevel::Error => "Error",
            ErrorLevel::Warning => "Warning",
            ErrorLevel::Information => "Information",
            ErrorLevel::Hint => "Hint",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw finding produced by a plugin.
///
/// `range` holds byte offsets into the exact text the engine was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub range: Range<usize>,
    pub level: ErrorLevel,
    pub plugin_tips: String,
    pub extra_msg: Option<String>,
}

impl ScanError {
    pub fn new(range: Range<usize>, level: ErrorLevel, plugin_tips: impl Into<String>) -> Self {
        Self {
            range,
            level,
            plugin_tips: plugin_tips.into(),
            extra_msg: None,
        }
    }

    pub fn with_extra_msg(mut self, extra_msg: impl Into<String>) -> Self {
        self.extra_msg = Some(extra_msg.into());
        self
    }
}

/// Mutable sink shared by every plugin of one validation run.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<ScanError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: ScanError) {
        self.errors.push(error);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn errors(&self) -> &[ScanError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
