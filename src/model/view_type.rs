use crate::utils::CATEGORY_SEPARATORS;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Decides which group keys of the playlist are offered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    #[serde(alias = "country")]
    All,
    Countries,
    Categories,
}

impl ViewType {
    pub fn is_category(group_key: &str) -> bool {
        CATEGORY_SEPARATORS.iter().any(|sep| group_key.contains(sep))
    }

    pub fn matches(self, group_key: &str) -> bool {
        match self {
            ViewType::All => true,
            ViewType::Countries => !Self::is_category(group_key),
            ViewType::Categories => Self::is_category(group_key),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewType::All => "All",
            ViewType::Countries => "Countries",
            ViewType::Categories => "Categories",
        }
    }
}

impl Display for ViewType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewType::All => "all",
            ViewType::Countries => "countries",
            ViewType::Categories => "categories",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "country" => Ok(ViewType::All),
            "countries" => Ok(ViewType::Countries),
            "categories" => Ok(ViewType::Categories),
            other => Err(format!("Unknown view type: {other}, expected one of all, countries, categories")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use crate::model::ViewType;

    #[test]
    fn test_view_matches() {
        assert!(ViewType::Countries.matches("Italy"));
        assert!(!ViewType::Countries.matches("Italy ➾ Sport"));
        assert!(ViewType::Categories.matches("Germany -> News"));
        assert!(ViewType::Categories.matches("France ⟾ Kids"));
        assert!(!ViewType::Categories.matches("France"));
        assert!(ViewType::All.matches("France ⟾ Kids"));
    }

    #[test]
    fn test_view_from_str() {
        assert_eq!(ViewType::from_str("Country").unwrap(), ViewType::All);
        assert_eq!(ViewType::from_str("categories").unwrap(), ViewType::Categories);
        assert!(ViewType::from_str("genres").is_err());
    }

    #[test]
    fn test_view_serde() {
        let view: ViewType = serde_json::from_str("\"country\"").unwrap();
        assert_eq!(view, ViewType::All);
        assert_eq!(serde_json::to_string(&ViewType::Countries).unwrap(), "\"countries\"");
    }
}
