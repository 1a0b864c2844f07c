//! The fixed reference list of committee members who can receive offline
//! payments. Loaded once from configuration and shared, instead of being
//! re-declared at every call site.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub id: String,
    pub name: String,
    pub designation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeRoster {
    members: Vec<CommitteeMember>,
}

impl CommitteeRoster {
    /// Read the roster from a JSON file when one is configured, otherwise
    /// fall back to the built-in list.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read committee file {}", path.display()))?;
                let members: Vec<CommitteeMember> = serde_json::from_str(&raw)
                    .with_context(|| format!("invalid committee file {}", path.display()))?;
                Ok(Self { members })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn members(&self) -> &[CommitteeMember] {
        &self.members
    }

    /// Lookup by roster id.
    pub fn get(&self, id: &str) -> Option<&CommitteeMember> {
        self.members.iter().find(|m| m.id == id)
    }
}

impl Default for CommitteeRoster {
    fn default() -> Self {
        let members = [
            "Sanjay Lakhotia",
            "Vikram Poddar",
            "Rajesh Kankaria",
            "Prashant Mehra",
            "Timir Roy",
            "Chandan Shroff",
            "Somenath Chatterjee",
            "Devesh Srivastava",
            "Samit Malhotra",
            "Agnesh Kumar Verma",
        ]
        .into_iter()
        .enumerate()
        .map(|(i, name)| CommitteeMember {
            id: (i + 1).to_string(),
            name: name.to_string(),
            designation: "Committee Member".to_string(),
            phone: None,
        })
        .collect();
        Self { members }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_resolves_by_id() {
        let roster = CommitteeRoster::default();
        assert_eq!(roster.members().len(), 10);
        assert_eq!(roster.get("3").unwrap().name, "Rajesh Kankaria");
        assert!(roster.get("11").is_none());
    }
}
