//! Weekly pull request status report across the team repositories.
//!
//! Lists, for every team's frontend and backend repository, the pull requests
//! against `main` that moved since the most recent Friday: those still open
//! and those merged.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    OrgName, PullRequest, PullRequestReader, PullRequestState, RepositoryFlavor, TeamNumber,
};

/// Branch every listed pull request targets.
pub const REPORT_BASE_BRANCH: &str = "main";

/// Pull requests fetched per repository and state.
pub const REPORT_PAGE_SIZE: u8 = 50;

/// Hour before which a Friday still reports from the previous Friday.
const FRIDAY_CUTOFF_HOUR: u32 = 9;

/// Listing states per repository, in request order.
const REPORT_STATES: [PullRequestState; 2] = [PullRequestState::Open, PullRequestState::Closed];

/// Flavours in report order: frontend first.
const REPORT_FLAVORS: [RepositoryFlavor; 2] = [RepositoryFlavor::Frontend, RepositoryFlavor::Backend];

/// Returns the date the report window starts on.
///
/// The most recent Friday on or before `now`; on a Friday before 09:00 the
/// Friday a week earlier.
pub fn report_cutoff(now: NaiveDateTime) -> NaiveDate {
    let since_friday = (now.weekday().num_days_from_monday() + 7
        - Weekday::Fri.num_days_from_monday())
        % 7;
    let days_back = if since_friday == 0 && now.hour() < FRIDAY_CUTOFF_HOUR {
        7
    } else {
        since_friday
    };
    now.date() - Duration::days(i64::from(days_back))
}

/// One pull request line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub flavor: RepositoryFlavor,
    pub pull_request: PullRequest,
}

/// Result of [`build_weekly_report`]; renders as plain text via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    pub org: OrgName,
    pub cutoff: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub open: Vec<ReportEntry>,
    pub merged: Vec<ReportEntry>,
    /// Repositories that could not be listed. A repository where only one
    /// state failed is suffixed with that state, e.g. `acme/Team1_FE (open)`.
    pub unavailable: Vec<String>,
}

impl WeeklyReport {
    pub fn total(&self) -> usize {
        self.open.len() + self.merged.len()
    }
}

/// Collects open and merged pull requests for every team in `teams`.
///
/// A listing that fails is logged and noted in [`WeeklyReport::unavailable`];
/// the other state of the same repository is still reported.
pub async fn build_weekly_report<R: PullRequestReader + ?Sized>(
    reader: &R,
    org: &OrgName,
    teams: &[TeamNumber],
    cutoff: NaiveDate,
    generated_at: NaiveDateTime,
) -> WeeklyReport {
    let mut report = WeeklyReport {
        org: org.clone(),
        cutoff,
        generated_at,
        open: Vec::new(),
        merged: Vec::new(),
        unavailable: Vec::new(),
    };

    for flavor in REPORT_FLAVORS {
        for &team in teams {
            let repo = team.repository(flavor);
            let mut failed = Vec::new();
            for state in REPORT_STATES {
                let pulls = match reader
                    .list_pull_requests(org, &repo, REPORT_BASE_BRANCH, state, REPORT_PAGE_SIZE)
                    .await
                {
                    Ok(pulls) => pulls,
                    Err(err) => {
                        warn!(repository = %repo.full_name(org), state = state.as_str(), error = %err, "Could not list pull requests");
                        failed.push(state);
                        continue;
                    }
                };

                let recent = pulls
                    .into_iter()
                    .filter(|pr| pr.updated_at.as_datetime().date_naive() >= cutoff);
                for pull_request in recent {
                    let entry = ReportEntry {
                        flavor,
                        pull_request,
                    };
                    match state {
                        PullRequestState::Open => report.open.push(entry),
                        PullRequestState::Closed if entry.pull_request.merged_at.is_some() => {
                            report.merged.push(entry)
                        }
                        PullRequestState::Closed => {}
                    }
                }
            }
            match failed.as_slice() {
                [] => {}
                [state] => report
                    .unavailable
                    .push(format!("{} ({})", repo.full_name(org), state.as_str())),
                _ => report.unavailable.push(repo.full_name(org)),
            }
        }
    }

    info!(
        org = %org,
        open = report.open.len(),
        merged = report.merged.len(),
        unavailable = report.unavailable.len(),
        "Built weekly pull request report"
    );
    report
}

const RULE: &str = "============================================================";
const THIN_RULE: &str = "--------------------------------------------------";

fn write_section(
    f: &mut fmt::Formatter<'_>,
    entries: &[ReportEntry],
    merged: bool,
) -> fmt::Result {
    for (index, flavor) in REPORT_FLAVORS.into_iter().enumerate() {
        if index > 0 {
            writeln!(f)?;
        }
        let heading = match flavor {
            RepositoryFlavor::Frontend => "Frontend",
            RepositoryFlavor::Backend => "Backend",
        };
        writeln!(f, "### {heading} ({})", flavor.label())?;
        for entry in entries.iter().filter(|e| e.flavor == flavor) {
            let pr = &entry.pull_request;
            write!(
                f,
                "  {} - #{}: {} ({REPORT_BASE_BRANCH} ← {})",
                pr.repository, pr.number, pr.title, pr.head_ref
            )?;
            match pr.merged_at.filter(|_| merged) {
                Some(at) => writeln!(f, " ✅ MERGED ({})", at.as_datetime().format("%Y-%m-%d"))?,
                None => writeln!(f, " [OPEN]")?,
            }
        }
    }
    Ok(())
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Pull request status for {} ({REPORT_BASE_BRANCH})", self.org)?;
        writeln!(
            f,
            "Window: {} ~ {}",
            self.cutoff.format("%Y-%m-%d"),
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;

        writeln!(f, "OPEN pull requests")?;
        writeln!(f, "{THIN_RULE}")?;
        write_section(f, &self.open, false)?;

        writeln!(f)?;
        writeln!(
            f,
            "MERGED pull requests (since {})",
            self.cutoff.format("%Y-%m-%d")
        )?;
        writeln!(f, "{THIN_RULE}")?;
        write_section(f, &self.merged, true)?;

        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Summary")?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "Open: {}", self.open.len())?;
        writeln!(f, "Merged: {}", self.merged.len())?;
        writeln!(f, "Total: {}", self.total())?;
        if !self.unavailable.is_empty() {
            writeln!(f, "Unavailable: {}", self.unavailable.join(", "))?;
        }
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{GithubError, RepositoryName, Timestamp};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn cutoff_is_most_recent_friday() {
        // 2025-01-03 is a Friday.
        assert_eq!(report_cutoff(at("2025-01-06", "12:00:00")), day("2025-01-03"));
        assert_eq!(report_cutoff(at("2025-01-09", "23:59:59")), day("2025-01-03"));
        assert_eq!(report_cutoff(at("2025-01-04", "00:00:00")), day("2025-01-03"));
    }

    #[test]
    fn friday_morning_reports_from_previous_friday() {
        assert_eq!(report_cutoff(at("2025-01-10", "08:59:59")), day("2025-01-03"));
        assert_eq!(report_cutoff(at("2025-01-10", "09:00:00")), day("2025-01-10"));
    }

    struct FakePulls {
        pulls: HashMap<(String, PullRequestState), Vec<PullRequest>>,
    }

    #[async_trait]
    impl PullRequestReader for FakePulls {
        async fn list_pull_requests(
            &self,
            _org: &OrgName,
            repo: &RepositoryName,
            _base: &str,
            state: PullRequestState,
            _limit: u8,
        ) -> Result<Vec<PullRequest>, GithubError> {
            self.pulls
                .get(&(repo.as_str().to_string(), state))
                .cloned()
                .ok_or_else(|| GithubError::NotFound {
                    resource: repo.as_str().to_string(),
                })
        }
    }

    fn pr(repo: &str, number: u64, updated: (i32, u32, u32), merged: Option<(i32, u32, u32)>) -> PullRequest {
        let ts = |(y, m, d): (i32, u32, u32)| {
            Timestamp::from_utc(Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap())
        };
        PullRequest {
            repository: RepositoryName::new(repo).unwrap(),
            number,
            title: format!("change {number}"),
            head_ref: format!("feature/{number}"),
            updated_at: ts(updated),
            merged_at: merged.map(ts),
        }
    }

    #[tokio::test]
    async fn collects_recent_open_and_merged_and_notes_missing_repos() {
        let mut pulls = HashMap::new();
        pulls.insert(
            ("Team1_FE".to_string(), PullRequestState::Open),
            vec![pr("Team1_FE", 4, (2025, 1, 6), None), pr("Team1_FE", 1, (2024, 12, 20), None)],
        );
        pulls.insert(
            ("Team1_FE".to_string(), PullRequestState::Closed),
            vec![
                pr("Team1_FE", 3, (2025, 1, 3), Some((2025, 1, 3))),
                pr("Team1_FE", 2, (2025, 1, 4), None),
            ],
        );
        pulls.insert(("Team1_BE".to_string(), PullRequestState::Open), vec![]);
        pulls.insert(
            ("Team1_BE".to_string(), PullRequestState::Closed),
            vec![pr("Team1_BE", 9, (2025, 1, 7), Some((2025, 1, 7)))],
        );
        let reader = FakePulls { pulls };
        let org = OrgName::new("acme").unwrap();
        let teams = [TeamNumber::new(1).unwrap(), TeamNumber::new(2).unwrap()];

        let report =
            build_weekly_report(&reader, &org, &teams, day("2025-01-03"), at("2025-01-08", "10:00:00"))
                .await;

        let numbers = |entries: &[ReportEntry]| {
            entries.iter().map(|e| e.pull_request.number).collect::<Vec<_>>()
        };
        assert_eq!(numbers(&report.open), [4]);
        assert_eq!(numbers(&report.merged), [3, 9]);
        assert_eq!(report.unavailable, ["acme/Team2_FE", "acme/Team2_BE"]);
        assert_eq!(report.total(), 3);

        let text = report.to_string();
        assert!(text.contains("  Team1_FE - #4: change 4 (main ← feature/4) [OPEN]"));
        assert!(text.contains("  Team1_BE - #9: change 9 (main ← feature/9) ✅ MERGED (2025-01-07)"));
        assert!(text.contains("Window: 2025-01-03 ~ 2025-01-08 10:00:00"));
        assert!(text.contains("Total: 3"));
    }

    #[tokio::test]
    async fn failed_open_listing_keeps_merged_lines_and_names_the_state() {
        let mut pulls = HashMap::new();
        pulls.insert(
            ("Team1_FE".to_string(), PullRequestState::Closed),
            vec![pr("Team1_FE", 3, (2025, 1, 6), Some((2025, 1, 6)))],
        );
        pulls.insert(("Team1_BE".to_string(), PullRequestState::Open), vec![]);
        pulls.insert(("Team1_BE".to_string(), PullRequestState::Closed), vec![]);
        let reader = FakePulls { pulls };
        let org = OrgName::new("acme").unwrap();

        let report = build_weekly_report(
            &reader,
            &org,
            &[TeamNumber::new(1).unwrap()],
            day("2025-01-03"),
            at("2025-01-08", "10:00:00"),
        )
        .await;

        assert_eq!(report.merged.len(), 1);
        assert!(report.open.is_empty());
        assert_eq!(report.unavailable, ["acme/Team1_FE (open)"]);
    }
}
