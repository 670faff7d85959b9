use crate::model::ViewType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One record of the remote channel list, already reduced to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub country: String,
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub url: String,
}

impl Channel {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }
}

/// Channels grouped by country or category, groups and channels keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedPlaylist {
    groups: IndexMap<String, Vec<Channel>>,
}

impl GroupedPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group_key: &str, channel: Channel) {
        if let Some(channels) = self.groups.get_mut(group_key) {
            channels.push(channel);
        } else {
            self.groups.insert(group_key.to_string(), vec![channel]);
        }
    }

    pub fn get(&self, group_key: &str) -> Option<&Vec<Channel>> {
        self.groups.get(group_key)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn channel_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Group keys visible in the given view.
    pub fn view_keys(&self, view: ViewType) -> Vec<&String> {
        self.groups.keys().filter(|key| view.matches(key)).collect()
    }
}

impl FromIterator<(String, Vec<Channel>)> for GroupedPlaylist {
    fn from_iter<T: IntoIterator<Item=(String, Vec<Channel>)>>(iter: T) -> Self {
        Self { groups: iter.into_iter().collect() }
    }
}
