//! Dashboard aggregation: flat (user, form type, count) rows reduced to
//! per-user summaries.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::logs::SummaryRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub total: i64,
    pub by_type: BTreeMap<String, i64>,
}

/// Reduce summary rows to one entry per user, sorted by display name (or
/// username) case-insensitively. Names are back-filled from the first row
/// supplying a non-empty value; output is deterministic regardless of
/// input row order.
pub fn build_summaries(rows: &[SummaryRow]) -> Vec<UserSummary> {
    let mut by_user: HashMap<String, UserSummary> = HashMap::new();

    for row in rows {
        if row.user_id.is_empty() {
            continue;
        }

        let entry = by_user
            .entry(row.user_id.clone())
            .or_insert_with(|| UserSummary {
                user_id: row.user_id.clone(),
                username: String::new(),
                display_name: String::new(),
                total: 0,
                by_type: BTreeMap::new(),
            });

        if entry.username.is_empty() {
            if let Some(username) = row.username.as_deref().filter(|u| !u.is_empty()) {
                entry.username = username.to_string();
            }
        }
        if entry.display_name.is_empty() {
            if let Some(display) = row.display_name.as_deref().filter(|d| !d.is_empty()) {
                entry.display_name = display.to_string();
            }
        }

        *entry.by_type.entry(row.form_type.clone()).or_insert(0) += row.count;
        entry.total += row.count;
    }

    let mut users: Vec<UserSummary> = by_user.into_values().collect();
    users.sort_by(|a, b| sort_name(a).cmp(&sort_name(b)));
    users
}

fn sort_name(user: &UserSummary) -> String {
    let name = if !user.display_name.is_empty() {
        &user.display_name
    } else {
        &user.username
    };
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: &str, username: &str, display: &str, form_type: &str, count: i64) -> SummaryRow {
        SummaryRow {
            user_id: user_id.to_string(),
            username: Some(username.to_string()).filter(|s| !s.is_empty()),
            display_name: Some(display.to_string()).filter(|s| !s.is_empty()),
            form_type: form_type.to_string(),
            count,
        }
    }

    #[test]
    fn accumulates_totals_and_per_type_counts() {
        let summaries = build_summaries(&[
            row("1", "alex", "Alex", "Patrol", 3),
            row("1", "alex", "Alex", "Arrest", 2),
            row("2", "bo", "Bo", "Patrol", 1),
        ]);

        assert_eq!(summaries.len(), 2);
        let alex = summaries.iter().find(|u| u.user_id == "1").unwrap();
        assert_eq!(alex.total, 5);
        assert_eq!(alex.by_type.get("Patrol"), Some(&3));
        assert_eq!(alex.by_type.get("Arrest"), Some(&2));
    }

    #[test]
    fn output_is_order_independent() {
        let rows = vec![
            row("1", "alex", "Alex", "Patrol", 3),
            row("2", "bo", "Bo", "Patrol", 1),
            row("1", "alex", "Alex", "Arrest", 2),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        assert_eq!(build_summaries(&rows), build_summaries(&reversed));
    }

    #[test]
    fn sorts_case_insensitively_by_display_name_then_username() {
        let summaries = build_summaries(&[
            row("1", "zed", "", "Patrol", 1),
            row("2", "amy", "charlie", "Patrol", 1),
            row("3", "mid", "Beta", "Patrol", 1),
        ]);

        let names: Vec<&str> = summaries
            .iter()
            .map(|u| {
                if u.display_name.is_empty() {
                    u.username.as_str()
                } else {
                    u.display_name.as_str()
                }
            })
            .collect();
        assert_eq!(names, vec!["Beta", "charlie", "zed"]);
    }

    #[test]
    fn backfills_names_from_first_non_empty_row() {
        let summaries = build_summaries(&[
            row("1", "", "", "Patrol", 1),
            row("1", "alex", "Alex", "Arrest", 1),
            row("1", "other", "Other", "Citation", 1),
        ]);

        assert_eq!(summaries[0].username, "alex");
        assert_eq!(summaries[0].display_name, "Alex");
        assert_eq!(summaries[0].total, 3);
    }

    #[test]
    fn skips_rows_without_a_user_id() {
        let summaries = build_summaries(&[row("", "ghost", "Ghost", "Patrol", 4)]);
        assert!(summaries.is_empty());
    }
}
