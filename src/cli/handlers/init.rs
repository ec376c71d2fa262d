use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, BOARD_DIR};

const WORKSPACE_TOML_TEMPLATE: &str = r##"# Status names that the "hide completed" filter treats as finished.
completed_statuses = ["Выполнено", "Done", "Завершено"]

[workspace]
name = {name}
# User id acting from this machine: new items are assigned to it and
# admin-only actions (archive) check its role.
# current_user = "u1"

# --- Vocabularies ---
# Ordered; the first entry is the default for new items. Colors are free
# text tags (gray, blue, emerald, rose, amber, ...).
#
# [[statuses]]
# id = "s1"
# name = "Не начато"
# color = "gray"
#
# [[priorities]]
# id = "p1"
# name = "Низкий"
# color = "emerald"

# --- Directory ---
#
# [[users]]
# id = "u1"
# name = "Anna"
# role = "admin"        # "admin" or "employee"
#
# [[projects]]
# id = "web"
# name = "Website"
#
# [[processes]]
# id = "bp1"
# title = "Onboarding"
#
# [[categories]]
# id = "seo"
# name = "Настройка под SEO"

[ui]
# default_view = "table"        # "table", "kanban" or "gantt"
# drag_threshold = 5.0
# gantt_padding_days = 7
#
# [ui.colors]
# gray = "#6B7280"
# blue = "#3B82F6"
# emerald = "#10B981"
"##;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_workspace_toml(name: &str) -> String {
    let quoted = toml::Value::String(name.to_string()).to_string();
    WORKSPACE_TOML_TEMPLATE.replace("{name}", &quoted)
}

pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };

    // Nested workspaces are allowed, but say so
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    workspace_io::init_workspace(&root, &render_workspace_toml(&name), args.force)?;
    println!("Initialized workspace: {}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::WorkspaceConfig;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("my-cool-board"), "My Cool Board");
        assert_eq!(infer_name("ops_team"), "Ops Team");
        assert_eq!(infer_name("board"), "Board");
    }

    #[test]
    fn test_template_parses_with_defaults() {
        let text = render_workspace_toml("Team \"A\"");
        let config: WorkspaceConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.workspace.name, "Team \"A\"");
        assert_eq!(config.statuses.len(), 4);
        assert!(config.users.is_empty());
        assert_eq!(config.ui.gantt_padding_days, 7);
        assert_eq!(config.completed_statuses.len(), 3);
    }
}
