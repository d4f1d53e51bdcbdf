use std::fmt;

/// Bucket classification of a canonical status token.
///
/// Every token maps to exactly one category; anything not in the fixed
/// table is `Other` and accumulates no time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Setup,
    Production,
    Delay,
    Finish,
    Other,
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCategory::Setup => write!(f, "SETUP"),
            StatusCategory::Production => write!(f, "PRODUCTION"),
            StatusCategory::Delay => write!(f, "DELAY"),
            StatusCategory::Finish => write!(f, "FINISH"),
            StatusCategory::Other => write!(f, "OTHER"),
        }
    }
}

impl StatusCategory {
    /// Classify an upper-case status token.
    pub fn of(status: &str) -> Self {
        match status {
            "PENDING" => StatusCategory::Setup,
            "STARTED" | "PARTIAL" => StatusCategory::Production,
            "ERROR" | "INTERRUPTED" => StatusCategory::Delay,
            "FINISHED" | "ABORTED" => StatusCategory::Finish,
            _ => StatusCategory::Other,
        }
    }
}

/// Whether a status token can open a new job. This is the start-trigger
/// set, distinct from the bucket categories: PENDING opens a job but
/// buckets into setup time.
pub fn is_start_trigger(status: &str) -> bool {
    matches!(status, "PENDING" | "STARTED" | "PARTIAL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        assert_eq!(StatusCategory::of("PENDING"), StatusCategory::Setup);
        assert_eq!(StatusCategory::of("STARTED"), StatusCategory::Production);
        assert_eq!(StatusCategory::of("PARTIAL"), StatusCategory::Production);
        assert_eq!(StatusCategory::of("ERROR"), StatusCategory::Delay);
        assert_eq!(StatusCategory::of("INTERRUPTED"), StatusCategory::Delay);
        assert_eq!(StatusCategory::of("FINISHED"), StatusCategory::Finish);
        assert_eq!(StatusCategory::of("ABORTED"), StatusCategory::Finish);
    }

    #[test]
    fn unknown_tokens_are_other() {
        assert_eq!(StatusCategory::of(""), StatusCategory::Other);
        assert_eq!(StatusCategory::of("PAUSED"), StatusCategory::Other);
        assert_eq!(StatusCategory::of("pending"), StatusCategory::Other); // not canonical
    }

    #[test]
    fn start_trigger_set() {
        assert!(is_start_trigger("PENDING"));
        assert!(is_start_trigger("STARTED"));
        assert!(is_start_trigger("PARTIAL"));
        assert!(!is_start_trigger("ERROR"));
        assert!(!is_start_trigger("FINISHED"));
        assert!(!is_start_trigger(""));
    }

    #[test]
    fn category_display() {
        assert_eq!(StatusCategory::Setup.to_string(), "SETUP");
        assert_eq!(StatusCategory::Finish.to_string(), "FINISH");
    }
}
