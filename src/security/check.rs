//! Checking a running host against the isolation policy over HTTP.
//!
//! # Data Flow
//! ```text
//! base URL + paths → GET each path → HeaderPolicy::violations → PathReport
//! ```

use serde::Serialize;

use crate::security::HeaderPolicy;

/// Outcome of requesting one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub path: String,
    pub status: u16,
    pub isolated: bool,
    /// Header names that were missing, wrong or repeated.
    pub violations: Vec<String>,
}

/// Request every path under `base` and report which responses break the policy.
///
/// Non-2xx answers are still reported; only transport failures are errors.
pub async fn check_paths(
    client: &reqwest::Client,
    base: &str,
    paths: &[String],
) -> Result<Vec<PathReport>, reqwest::Error> {
    let policy = HeaderPolicy::cross_origin_isolation();
    let base = base.trim_end_matches('/');

    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let path = normalize_path(path);
        let res = client.get(format!("{base}{path}")).send().await?;
        let violations: Vec<String> = policy
            .violations(res.headers())
            .iter()
            .map(ToString::to_string)
            .collect();

        tracing::debug!(path = %path, status = res.status().as_u16(), ?violations, "Checked path");
        reports.push(PathReport {
            path,
            status: res.status().as_u16(),
            isolated: violations.is_empty(),
            violations,
        });
    }
    Ok(reports)
}

/// Whether every report passed.
pub fn all_isolated(reports: &[PathReport]) -> bool {
    reports.iter().all(|r| r.isolated)
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
