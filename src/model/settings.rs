use crate::model::ViewType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub selection: Vec<String>,
}

/// State the user changes while working with the tool, persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub current_view: ViewType,
    #[serde(default)]
    pub views: HashMap<ViewType, ViewSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl UserSettings {
    pub fn selection(&self, view: ViewType) -> &[String] {
        self.views.get(&view).map(|v| v.selection.as_slice()).unwrap_or_default()
    }

    /// Stores the selection without duplicates, keeping the given order.
    pub fn set_selection(&mut self, view: ViewType, selection: &[String]) {
        let mut unique: Vec<String> = Vec::with_capacity(selection.len());
        for key in selection {
            if !unique.contains(key) {
                unique.push(key.clone());
            }
        }
        self.views.entry(view).or_default().selection = unique;
    }
}
