use serde::{Deserialize, Serialize};
use tracing::debug;

/// Binary conclusion pulled from a critic's response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
    /// Final line held neither token; the raw text is left for a human
    Unknown,
}

impl Verdict {
    pub fn is_yes(&self) -> bool {
        matches!(self, Verdict::Yes)
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Verdict::No)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Yes => "Yes",
            Verdict::No => "No",
            Verdict::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the verdict from the final non-blank line of a response.
///
/// Plain case-insensitive substring test: a line containing "no" is `No`
/// (even if it also contains "yes"), otherwise a line containing "yes" is
/// `Yes`, otherwise `Unknown`.
pub fn extract_verdict(response: &str) -> Verdict {
    let Some(last_line) = response.lines().rev().find(|line| !line.trim().is_empty()) else {
        debug!("Empty critic response");
        return Verdict::Unknown;
    };

    let line = last_line.trim().to_lowercase();
    let verdict = if line.contains("no") {
        Verdict::No
    } else if line.contains("yes") {
        Verdict::Yes
    } else {
        Verdict::Unknown
    };

    debug!(line = %line, verdict = %verdict, "Extracted verdict");
    verdict
}
