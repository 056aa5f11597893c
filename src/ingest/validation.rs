use std::fmt;

/// Problems found while ingesting a catalog. Errors drop a whole thing,
/// warnings drop a single cell or attribute.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    // "<thing>/<kind>", or just the thing name
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: String, location: Option<String>) {
        self.push(IssueSeverity::Error, message, location);
    }

    pub fn add_warning(&mut self, message: String, location: Option<String>) {
        self.push(IssueSeverity::Warning, message, location);
    }

    pub fn add_broken(&mut self, thing: &str, kind: &str, cell: &str) {
        self.add_warning(
            format!("Broken measurement '{}'", cell),
            Some(format!("{}/{}", thing, kind)),
        );
    }

    fn push(&mut self, severity: IssueSeverity, message: String, location: Option<String>) {
        let issue = ValidationIssue {
            severity,
            message,
            location,
        };
        match severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    /// Errors first, then warnings.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(&self.warnings)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "error"),
            IssueSeverity::Warning => write!(f, "warning"),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: [{}] {}", self.severity, loc, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// One issue per line, followed by a count.
impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.issues() {
            writeln!(f, "{}", issue)?;
        }
        write!(
            f,
            "{} errors, {} warnings",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issues_are_sorted_by_severity() {
        let mut validation = ValidationResult::new();
        validation.add_broken("lake", "depth", "1-2 m");
        validation.add_error("Expected a table".to_string(), Some("loose".to_string()));

        let severities: Vec<_> = validation.issues().map(|i| i.severity).collect();
        assert_eq!(severities, vec![IssueSeverity::Error, IssueSeverity::Warning]);
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_report() {
        let mut validation = ValidationResult::new();
        validation.add_warning("Unsupported boolean value".to_string(), None);
        validation.add_broken("lake", "depth", "1-2 m");

        assert_eq!(
            validation.to_string(),
            "warning: Unsupported boolean value\n\
             warning: [lake/depth] Broken measurement '1-2 m'\n\
             0 errors, 2 warnings"
        );
    }
}
