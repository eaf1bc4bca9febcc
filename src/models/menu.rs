use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(alias = "Main Course")]
    MainCourse,
    Beverages,
    Snacks,
    Desserts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    /// Whole rupees.
    pub price: u32,
    pub available: bool,
    pub stock: u32,
    /// Minutes.
    pub prep_time: u32,
    pub description: String,
    pub image: String,
}

impl MenuItem {
    /// Case-insensitive match against name and description.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}
