use serde::{Deserialize, Serialize};

/// One entry of a status or priority vocabulary.
///
/// `color` is a free-form tag (a colour name or a class list such as
/// `bg-emerald-500 text-white`); it is resolved to a [`Tone`] for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

pub type StatusOption = VocabOption;
pub type PriorityOption = VocabOption;

impl VocabOption {
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        VocabOption {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    pub fn tone(&self) -> Tone {
        Tone::from_color_tag(&self.color)
    }
}

/// Fixed display palette that vocabulary colour tags collapse onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Gray,
    Blue,
    Emerald,
    Rose,
    Amber,
    Orange,
    Violet,
    Pink,
    Indigo,
}

impl Tone {
    /// First matching colour family wins; anything unrecognised is gray.
    pub fn from_color_tag(tag: &str) -> Tone {
        let tag = tag.to_ascii_lowercase();
        if tag.contains("blue") {
            Tone::Blue
        } else if tag.contains("green") || tag.contains("emerald") {
            Tone::Emerald
        } else if tag.contains("red") || tag.contains("rose") {
            Tone::Rose
        } else if tag.contains("yellow") || tag.contains("amber") {
            Tone::Amber
        } else if tag.contains("orange") {
            Tone::Orange
        } else if tag.contains("purple") || tag.contains("violet") {
            Tone::Violet
        } else if tag.contains("pink") {
            Tone::Pink
        } else if tag.contains("indigo") {
            Tone::Indigo
        } else {
            Tone::Gray
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Gray => "gray",
            Tone::Blue => "blue",
            Tone::Emerald => "emerald",
            Tone::Rose => "rose",
            Tone::Amber => "amber",
            Tone::Orange => "orange",
            Tone::Violet => "violet",
            Tone::Pink => "pink",
            Tone::Indigo => "indigo",
        }
    }
}

/// The status and priority vocabularies rendered against by every view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub statuses: Vec<StatusOption>,
    pub priorities: Vec<PriorityOption>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            statuses: default_statuses(),
            priorities: default_priorities(),
        }
    }
}

impl Vocabulary {
    pub fn status(&self, name: &str) -> Option<&StatusOption> {
        self.statuses.iter().find(|s| s.name == name)
    }

    pub fn priority(&self, name: &str) -> Option<&PriorityOption> {
        self.priorities.iter().find(|p| p.name == name)
    }

    /// Tone for a status value; unknown values degrade to gray.
    pub fn status_tone(&self, name: &str) -> Tone {
        self.status(name).map_or(Tone::Gray, VocabOption::tone)
    }

    pub fn priority_tone(&self, name: &str) -> Tone {
        self.priority(name).map_or(Tone::Gray, VocabOption::tone)
    }

    pub fn first_status(&self) -> Option<&str> {
        self.statuses.first().map(|s| s.name.as_str())
    }

    pub fn first_priority(&self) -> Option<&str> {
        self.priorities.first().map(|p| p.name.as_str())
    }
}

pub fn default_statuses() -> Vec<StatusOption> {
    vec![
        VocabOption::new("s1", "Не начато", "gray"),
        VocabOption::new("s2", "В работе", "blue"),
        VocabOption::new("s3", "На проверке", "amber"),
        VocabOption::new("s4", "Выполнено", "emerald"),
    ]
}

pub fn default_priorities() -> Vec<PriorityOption> {
    vec![
        VocabOption::new("p1", "Низкий", "emerald"),
        VocabOption::new("p2", "Средний", "amber"),
        VocabOption::new("p3", "Высокий", "rose"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_from_class_lists() {
        assert_eq!(
            Tone::from_color_tag("bg-emerald-500 dark:bg-emerald-600 text-white"),
            Tone::Emerald
        );
        assert_eq!(Tone::from_color_tag("bg-blue-100 text-blue-700"), Tone::Blue);
        assert_eq!(Tone::from_color_tag("Red"), Tone::Rose);
        assert_eq!(Tone::from_color_tag(""), Tone::Gray);
        assert_eq!(Tone::from_color_tag("chartreuse"), Tone::Gray);
    }

    #[test]
    fn unknown_status_degrades_to_gray() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.status_tone("В работе"), Tone::Blue);
        assert_eq!(vocab.status_tone("Deleted status"), Tone::Gray);
    }

    #[test]
    fn first_entries() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.first_status(), Some("Не начато"));
        assert_eq!(vocab.first_priority(), Some("Низкий"));
        let empty = Vocabulary {
            statuses: vec![],
            priorities: vec![],
        };
        assert_eq!(empty.first_status(), None);
    }
}
