//! Assemble the output [`Report`] from sorted articles and category counts.

use crate::config::CategoryDefinition;
use crate::models::{Article, CategorySummary, Report};
use crate::utils::format_last_update;
use chrono::{DateTime, Local};

/// Build the report root.
///
/// `counts[i]` is the number of articles bucketed under `categories[i]`; a
/// missing entry counts as zero. Articles are taken as-is, already sorted.
pub fn build_report(
    categories: &[CategoryDefinition],
    counts: &[usize],
    articles: Vec<Article>,
    now: DateTime<Local>,
) -> Report {
    let categories = categories
        .iter()
        .enumerate()
        .map(|(i, c)| CategorySummary {
            key: c.key.clone(),
            name: c.name.clone(),
            icon: c.icon.clone(),
            count: counts.get(i).copied().unwrap_or(0),
        })
        .collect();

    Report {
        last_update: format_last_update(now),
        categories,
        articles,
    }
}
