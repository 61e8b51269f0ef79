use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::addr::ResourceAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Not in state, or gone since it was recorded.
    Create,
    /// In-place update.
    Update,
    /// A force-new attribute changed: delete, then create.
    Replace,
    /// In state but no longer in the manifest.
    Delete,
    Ok,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Ok => "ok",
        };
        f.write_str(s)
    }
}

/// Before/after for one attribute. `None` means unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub attribute: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub force_new: bool,
    #[serde(default)]
    pub sensitive: bool,
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<Value>| match v {
            _ if self.sensitive => "(sensitive value)".to_string(),
            Some(v) => v.to_string(),
            None => "null".to_string(),
        };
        write!(f, "{}: {} -> {}", self.attribute, show(&self.old), show(&self.new))?;
        if self.force_new {
            f.write_str(" (forces replacement)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub addr: ResourceAddr,
    pub action: Action,
    pub changes: Vec<AttributeChange>,
    /// Free-text note, e.g. "removed outside of this tool".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Entries in manifest order, followed by orphans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.action != Action::Ok)
    }

    pub fn count(&self, action: Action) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn entry(&self, addr: &ResourceAddr) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| &e.addr == addr)
    }

    pub fn with_action(&self, action: Action) -> impl DoubleEndedIterator<Item = &PlanEntry> {
        self.entries.iter().filter(move |e| e.action == action)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.entries.iter().filter(|e| e.action != Action::Ok) {
            write!(f, "{} {}", entry.action, entry.addr)?;
            if let Some(reason) = &entry.reason {
                write!(f, " ({reason})")?;
            }
            writeln!(f)?;
            for change in &entry.changes {
                writeln!(f, "    {change}")?;
            }
        }
        write!(
            f,
            "Plan: {} to create, {} to update, {} to replace, {} to delete.",
            self.count(Action::Create),
            self.count(Action::Update),
            self.count(Action::Replace),
            self.count(Action::Delete),
        )
    }
}
