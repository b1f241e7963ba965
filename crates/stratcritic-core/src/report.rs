use serde::Serialize;
use std::time::Duration;
use stratcritic_critic::{ModelId, Verdict};

/// A critic's successful review
#[derive(Debug, Clone, Serialize)]
pub struct CriticResult {
    pub model: ModelId,
    pub upstream_id: String,
    /// Model the gateway says actually answered, when it reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routed_model: Option<String>,
    /// Response text exactly as the gateway returned it
    pub raw_response_text: String,
    pub verdict: Verdict,
    pub duration_secs: f64,
}

/// One slot in the report: a review or the error that replaced it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CriticEntry {
    Reviewed(CriticResult),
    Failed {
        model: ModelId,
        upstream_id: String,
        error: String,
    },
}

impl CriticEntry {
    pub fn model(&self) -> ModelId {
        match self {
            CriticEntry::Reviewed(result) => result.model,
            CriticEntry::Failed { model, .. } => *model,
        }
    }

    pub fn upstream_id(&self) -> &str {
        match self {
            CriticEntry::Reviewed(result) => &result.upstream_id,
            CriticEntry::Failed { upstream_id, .. } => upstream_id,
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            CriticEntry::Reviewed(result) => Some(result.verdict),
            CriticEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CriticEntry::Failed { .. })
    }
}

/// How the critics agreed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consensus {
    AllApproved,
    AllRejected,
    Mixed,
}

/// Everything a run produced, in model selection order
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub entries: Vec<CriticEntry>,
    pub total_duration_secs: f64,
}

impl EvaluationReport {
    pub fn new(entries: Vec<CriticEntry>, duration: Duration) -> Self {
        Self {
            entries,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn approvals(&self) -> usize {
        self.count_verdicts(Verdict::is_yes)
    }

    pub fn rejections(&self) -> usize {
        self.count_verdicts(Verdict::is_no)
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failed()).count()
    }

    pub fn entry(&self, model: ModelId) -> Option<&CriticEntry> {
        self.entries.iter().find(|e| e.model() == model)
    }

    pub fn consensus(&self) -> Consensus {
        let total = self.entries.len();
        if total > 0 && self.approvals() == total {
            Consensus::AllApproved
        } else if total > 0 && self.rejections() == total {
            Consensus::AllRejected
        } else {
            Consensus::Mixed
        }
    }

    fn count_verdicts(&self, matches: impl Fn(&Verdict) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|e| e.verdict().is_some_and(|v| matches(&v)))
            .count()
    }
}
