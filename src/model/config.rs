use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::directory::{Category, Directory, Process, Project, User, default_categories};
use super::vocab::{PriorityOption, StatusOption, Vocabulary, default_priorities, default_statuses};

/// Configuration from workspace.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default = "default_statuses")]
    pub statuses: Vec<StatusOption>,
    #[serde(default = "default_priorities")]
    pub priorities: Vec<PriorityOption>,
    /// Status names that count as finished for the "hide completed" filter
    #[serde(default = "default_completed_statuses")]
    pub completed_statuses: Vec<String>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub processes: Vec<Process>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
    /// User id acting in this workspace (role gating, new-item defaults)
    #[serde(default)]
    pub current_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// "table", "kanban" or "gantt"; a stored preference overrides it
    #[serde(default)]
    pub default_view: Option<String>,
    /// Pointer travel (in pixels or cells) that turns a press into a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,
    /// Days of padding on each side of the gantt axis
    #[serde(default = "default_gantt_padding_days")]
    pub gantt_padding_days: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            colors: HashMap::new(),
            default_view: None,
            drag_threshold: default_drag_threshold(),
            gantt_padding_days: default_gantt_padding_days(),
        }
    }
}

fn default_completed_statuses() -> Vec<String> {
    vec!["Выполнено".into(), "Done".into(), "Завершено".into()]
}

fn default_drag_threshold() -> f64 {
    5.0
}

fn default_gantt_padding_days() -> u64 {
    7
}

impl WorkspaceConfig {
    /// A fresh config with stock vocabularies and no directory entries.
    pub fn new(name: &str) -> Self {
        WorkspaceConfig {
            workspace: WorkspaceInfo {
                name: name.to_string(),
                current_user: None,
            },
            statuses: default_statuses(),
            priorities: default_priorities(),
            completed_statuses: default_completed_statuses(),
            users: Vec::new(),
            projects: Vec::new(),
            processes: Vec::new(),
            categories: default_categories(),
            ui: UiConfig::default(),
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary {
            statuses: self.statuses.clone(),
            priorities: self.priorities.clone(),
        }
    }

    pub fn directory(&self) -> Directory {
        Directory {
            users: self.users.clone(),
            projects: self.projects.clone(),
            processes: self.processes.clone(),
            categories: self.categories.clone(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.workspace.current_user.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }
}
