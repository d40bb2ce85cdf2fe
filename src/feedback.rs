// Launcher feedback.
// Filters repositories by query and renders them as script filter items.

use serde::Serialize;

use crate::github::RepositoryRecord;

/// Icon shipped alongside the launcher workflow.
pub const REPOSITORY_ICON: &str = "github_32.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub path: String,
}

/// One row shown by the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub arg: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

impl Item {
    /// Item for a matching repository.
    pub fn repository(repo: &RepositoryRecord) -> Self {
        let full_name = repo.full_name().unwrap_or_default().to_string();
        Self {
            uid: full_name.clone(),
            title: full_name,
            subtitle: repo.description().unwrap_or_default().to_string(),
            arg: repo.html_url().unwrap_or_default().to_string(),
            valid: true,
            icon: Some(Icon {
                path: REPOSITORY_ICON.to_string(),
            }),
        }
    }

    /// Non-actionable item describing a failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            uid: "error".to_string(),
            title: "Error: could not load repositories".to_string(),
            subtitle: message.into(),
            arg: String::new(),
            valid: false,
            icon: None,
        }
    }
}

/// Script filter payload written to stdout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Feedback {
    pub items: Vec<Item>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Whether `repo` matches `query`: a case-sensitive substring of its name or full name.
pub fn matches(repo: &RepositoryRecord, query: &str) -> bool {
    repo.name().is_some_and(|name| name.contains(query))
        || repo.full_name().is_some_and(|name| name.contains(query))
}

/// Build feedback for every repository matching `query`, in input order.
pub fn search<'a, I>(repos: I, query: &str) -> Feedback
where
    I: IntoIterator<Item = &'a RepositoryRecord>,
{
    let query = query.trim();
    let mut feedback = Feedback::new();
    for repo in repos.into_iter().filter(|repo| matches(repo, query)) {
        feedback.add_item(Item::repository(repo));
    }
    feedback
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo(name: &str, owner: &str, description: Option<&str>) -> RepositoryRecord {
        serde_json::from_value(json!({
            "name": name,
            "full_name": format!("{}/{}", owner, name),
            "description": description,
            "html_url": format!("https://ghe.example.com/{}/{}", owner, name),
        }))
        .unwrap()
    }

    #[test]
    fn test_search_by_name_and_full_name() {
        let repos = vec![
            repo("atlas", "tools", Some("TUI")),
            repo("payments", "core", None),
            repo("ledger", "payments-team", None),
        ];

        let titles: Vec<_> = search(&repos, "pay")
            .items
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["core/payments", "payments-team/ledger"]);
    }

    #[test]
    fn test_search_is_case_sensitive_and_trims() {
        let repos = vec![repo("Atlas", "tools", None)];
        assert!(search(&repos, "atlas").items.is_empty());
        assert_eq!(search(&repos, "  Atlas\n").items.len(), 1);
    }

    #[test]
    fn test_empty_query_matches_all() {
        let repos = vec![repo("a", "o", None), repo("b", "o", None)];
        assert_eq!(search(&repos, "").items.len(), 2);
    }

    #[test]
    fn test_missing_fields_do_not_match() {
        let record: RepositoryRecord = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(!matches(&record, "x"));
    }

    #[test]
    fn test_item_json() {
        let feedback = search(&[repo("atlas", "tools", Some("TUI"))], "atlas");
        let value: serde_json::Value =
            serde_json::from_str(&feedback.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "items": [{
                    "uid": "tools/atlas",
                    "title": "tools/atlas",
                    "subtitle": "TUI",
                    "arg": "https://ghe.example.com/tools/atlas",
                    "valid": true,
                    "icon": {"path": "github_32.png"}
                }]
            })
        );
    }

    #[test]
    fn test_error_item() {
        let item = Item::error("connection refused");
        assert!(!item.valid);
        assert_eq!(item.subtitle, "connection refused");
        assert!(item.icon.is_none());
    }
}
