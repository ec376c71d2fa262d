use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A grouping entity ("module") items can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Reference lists that stored ids resolve against. Lookups that miss
/// return `None`; callers omit the reference rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub processes: Vec<Process>,
    pub categories: Vec<Category>,
}

impl Directory {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Resolve ids in order, silently skipping unknown ones.
    pub fn resolve_users<'a>(&'a self, ids: &[&str]) -> Vec<&'a User> {
        ids.iter().filter_map(|id| self.user(id)).collect()
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn process_title(&self, id: &str) -> Option<&str> {
        self.processes
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.title.as_str())
    }

    /// Category display name; unknown ids show as themselves.
    pub fn category_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map_or(id, |c| c.name.as_str())
    }
}

pub fn default_categories() -> Vec<Category> {
    [
        ("counters", "Установка счетчиков"),
        ("seo", "Настройка под SEO"),
        ("features", "Фичи"),
        ("backend", "Бэкенд"),
        ("infrastructure", "Серверная инфраструктура"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}
