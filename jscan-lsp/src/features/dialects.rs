//! Document language to parser dialect resolution.

use jscan_analysis::{Dialect, DialectSet};

/// Language identifiers the server distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    JavaScript,
    TypeScript,
    JavaScriptReact,
    TypeScriptReact,
    Other,
}

impl LanguageId {
    pub fn from_id(id: &str) -> Self {
        match id {
            "javascript" => LanguageId::JavaScript,
            "typescript" => LanguageId::TypeScript,
            "javascriptreact" => LanguageId::JavaScriptReact,
            "typescriptreact" => LanguageId::TypeScriptReact,
            _ => LanguageId::Other,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, LanguageId::Other)
    }
}

pub fn resolve_dialects(language: LanguageId) -> DialectSet {
    match language {
        LanguageId::JavaScript | LanguageId::Other => DialectSet::empty(),
        LanguageId::TypeScript => DialectSet::empty().with(Dialect::TypeScript),
        LanguageId::JavaScriptReact => DialectSet::empty().with(Dialect::Jsx),
        LanguageId::TypeScriptReact => DialectSet::empty()
            .with(Dialect::TypeScript)
            .with(Dialect::Jsx),
    }
}
