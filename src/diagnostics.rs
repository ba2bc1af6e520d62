//! # Diagnostics
//!
//! Message collection for the determination engines.
//!
//! The engines never abort on anomalous input: every anomaly is reported
//! here and handled by a documented fallback, so a caller always gets some
//! output plus a log of what was approximated. The collector is passed
//! `&mut` into each engine entry point; there is no global reporting state.

use std::fmt;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Warning,
    Error,
    /// Reserved for environment failures outside the core; the engines
    /// themselves never emit this.
    FatalError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Verbose => "verbose",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::FatalError => "fatal error",
        };
        write!(f, "{}", s)
    }
}

/// A single reported message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The engine that reported the message ("glyphs", "elements", ...).
    pub origin: &'static str,
    pub message: String,
    pub line: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{}: {} (line {}): {}",
                self.severity, self.origin, line, self.message
            ),
            None => write!(f, "{}: {}: {}", self.severity, self.origin, self.message),
        }
    }
}

/// Collector the engines report into.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        severity: Severity,
        origin: &'static str,
        message: impl Into<String>,
    ) {
        self.items.push(Diagnostic {
            severity,
            origin,
            message: message.into(),
            line: None,
        });
    }

    pub fn verbose(&mut self, origin: &'static str, message: impl Into<String>) {
        self.report(Severity::Verbose, origin, message);
    }

    pub fn warning(&mut self, origin: &'static str, message: impl Into<String>) {
        self.report(Severity::Warning, origin, message);
    }

    pub fn error(&mut self, origin: &'static str, message: impl Into<String>) {
        self.report(Severity::Error, origin, message);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Highest severity reported so far, if anything was reported.
    pub fn max_severity(&self) -> Option<Severity> {
        self.items.iter().map(|d| d.severity).max()
    }

    /// True when anything at `Warning` or above was reported.
    pub fn has_warnings(&self) -> bool {
        self.max_severity() >= Some(Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diags = Diagnostics::new();
        diags.verbose("glyphs", "first");
        diags.warning("elements", "second");
        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_max_severity() {
        let mut diags = Diagnostics::new();
        assert_eq!(diags.max_severity(), None);
        assert!(!diags.has_warnings());
        diags.verbose("glyphs", "fine");
        assert!(!diags.has_warnings());
        diags.error("glyphs", "bad");
        diags.warning("glyphs", "iffy");
        assert_eq!(diags.max_severity(), Some(Severity::Error));
    }

    #[test]
    fn test_display() {
        let d = Diagnostic {
            severity: Severity::Warning,
            origin: "characters",
            message: "unmatched style end".to_string(),
            line: Some(12),
        };
        assert_eq!(
            d.to_string(),
            "warning: characters (line 12): unmatched style end"
        );
    }
}
