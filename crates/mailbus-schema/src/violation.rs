use serde::Serialize;

/// One schema mismatch: the failing field path and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path of the failing field, `$`-rooted (e.g. `$.payload.age`).
    pub path: String,
    /// Human-readable description of the mismatch.
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of one validation pass: valid iff no violations were found.
///
/// Violations keep the order in which they were detected so diagnostics render
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Render all violations on one line, `; `-separated.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_valid() {
        assert!(ValidationReport::new().is_valid());
    }

    #[test]
    fn report_keeps_violation_order() {
        let mut report = ValidationReport::new();
        report.push(Violation::new("$.payload.name", "not a string"));
        report.push(Violation::new("$.payload.age", "below minimum"));

        assert!(!report.is_valid());
        assert_eq!(report.violations()[0].path, "$.payload.name");
        assert_eq!(report.violations()[1].path, "$.payload.age");
        assert!(report.summary().contains("name"));
        assert!(report.summary().contains("age"));
    }
}
