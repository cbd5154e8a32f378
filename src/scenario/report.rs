//! Replay reports

use crate::host::Execution;
use crate::models::TabId;
use crate::utils::short_url;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub executions: Vec<Execution>,
    pub tabs: Vec<TabState>,
    pub enabled: bool,
    /// Tab-update listeners still registered with the host
    pub listeners: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabState {
    pub id: TabId,
    pub url: Option<String>,
    pub styled: bool,
    pub markers: usize,
}

impl ReplayReport {
    pub fn injection_count(&self) -> usize {
        self.executions
            .iter()
            .filter(|e| e.script.is_injection())
            .count()
    }

    pub fn removal_count(&self) -> usize {
        self.executions.len() - self.injection_count()
    }

    pub fn rejected_count(&self) -> usize {
        self.executions.iter().filter(|e| e.rejected).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        let mut report = String::new();

        report.push_str("# Replay Report\n\n");

        report.push_str("## Summary\n\n");
        report.push_str(&format!(
            "- **Final State**: {}\n",
            if self.enabled { "enabled" } else { "disabled" }
        ));
        report.push_str(&format!("- **Listeners Registered**: {}\n", self.listeners));
        report.push_str(&format!("- **Injections**: {}\n", self.injection_count()));
        report.push_str(&format!("- **Removals**: {}\n", self.removal_count()));
        report.push_str(&format!("- **Rejected by Host**: {}\n\n", self.rejected_count()));

        if !self.executions.is_empty() {
            report.push_str("## Dispatches\n\n");
            report.push_str("| # | Target | Action | Run At |\n");
            report.push_str("|---|--------|--------|--------|\n");
            for (i, execution) in self.executions.iter().enumerate() {
                let target = match execution.target {
                    Some(id) => format!("tab {}", id),
                    None => "current tab".to_string(),
                };
                let action = if execution.script.is_injection() {
                    "inject"
                } else {
                    "remove"
                };
                report.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    i + 1,
                    target,
                    action,
                    execution.script.run_at
                ));
            }
            report.push('\n');
        }

        if !self.tabs.is_empty() {
            report.push_str("## Tabs\n\n");
            for tab in &self.tabs {
                let url = tab.url.as_deref().map(|u| short_url(u, 60));
                report.push_str(&format!(
                    "- Tab {} ({}): {}\n",
                    tab.id,
                    url.as_deref().unwrap_or("no url"),
                    if tab.styled { "styled" } else { "unstyled" }
                ));
            }
            report.push('\n');
        }

        report
    }
}
