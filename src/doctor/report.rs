use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoctorState {
    Ready,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
    pub required: bool,
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub generated_at: String,
    pub state: DoctorState,
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Doctor state: {}\n", state_label(self.state)));
        out.push_str(&format!("Generated at: {}\n\n", self.generated_at));
        out.push_str(&format!(
            "{:<18} {:<8} {:<8} {}\n",
            "CHECK", "STATUS", "REQUIRED", "DETAIL"
        ));

        for check in &self.checks {
            out.push_str(&format!(
                "{:<18} {:<8} {:<8} {}\n",
                check.name,
                status_label(check.status),
                if check.required { "yes" } else { "no" },
                check.detail
            ));
            if let Some(remediation) = &check.remediation {
                out.push_str(&format!("  remediation: {remediation}\n"));
            }
        }

        let passed = self.count(CheckStatus::Pass);
        let warned = self.count(CheckStatus::Warn);
        let failed = self.count(CheckStatus::Fail);
        out.push_str(&format!(
            "\n{passed} passed, {warned} warnings, {failed} failed\n"
        ));

        out
    }

    pub fn render_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == status)
            .count()
    }
}

fn state_label(state: DoctorState) -> &'static str {
    match state {
        DoctorState::Ready => "ready",
        DoctorState::Degraded => "degraded",
        DoctorState::Unavailable => "unavailable",
    }
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Warn => "WARN",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Skip => "SKIP",
    }
}
