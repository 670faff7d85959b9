use crate::model::ViewType;
use serde::{Deserialize, Serialize};

/// A group that was exported once and is refreshed by the scheduled update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteRecord {
    pub group: String,
    pub view: ViewType,
    // unix seconds of the last export
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourites {
    #[serde(default)]
    pub records: Vec<FavouriteRecord>,
}

impl Favourites {
    pub fn upsert(&mut self, group: &str, view: ViewType, timestamp: u64) {
        if let Some(record) = self.records.iter_mut().find(|r| r.group == group) {
            record.view = view;
            record.timestamp = timestamp;
        } else {
            self.records.push(FavouriteRecord { group: group.to_string(), view, timestamp });
        }
    }

    /// Returns true if something was removed.
    pub fn remove(&mut self, groups: &[String]) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !groups.contains(&r.group));
        before != self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Favourites, ViewType};

    #[test]
    fn test_upsert_replaces_existing() {
        let mut favourites = Favourites::default();
        favourites.upsert("Italy", ViewType::Countries, 1);
        favourites.upsert("Italy", ViewType::All, 2);
        favourites.upsert("Germany", ViewType::All, 3);
        assert_eq!(favourites.records.len(), 2);
        assert_eq!(favourites.records[0].view, ViewType::All);
        assert_eq!(favourites.records[0].timestamp, 2);
    }

    #[test]
    fn test_remove() {
        let mut favourites = Favourites::default();
        favourites.upsert("Italy", ViewType::Countries, 1);
        assert!(!favourites.remove(&["Germany".to_string()]));
        assert!(favourites.remove(&["Italy".to_string()]));
        assert!(favourites.is_empty());
    }
}
