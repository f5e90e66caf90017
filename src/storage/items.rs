//! Recurring item repositories for JSON storage
//!
//! Expenses, incomes and budget items share the same repository shape,
//! so the implementations are generated by a macro.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{BudgetItem, BudgetItemId, Expense, ExpenseId, Income, IncomeId};

use super::file_io::{read_json, write_json_atomic};

/// On-disk wrapper shared by all item files
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(bound = "T: serde::Serialize + serde::de::DeserializeOwned")]
struct ItemFile<T> {
    items: Vec<T>,
}

impl<T> Default for ItemFile<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

macro_rules! define_item_repository {
    ($repo:ident, $item:ty, $id:ty, $doc:expr) => {
        #[doc = $doc]
        pub struct $repo {
            path: PathBuf,
            data: RwLock<HashMap<$id, $item>>,
        }

        impl $repo {
            pub fn new(path: PathBuf) -> Self {
                Self {
                    path,
                    data: RwLock::new(HashMap::new()),
                }
            }

            /// Load items from disk
            pub fn load(&self) -> Result<(), TallyError> {
                let file_data: ItemFile<$item> = read_json(&self.path)?;

                let mut data = self.data.write().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire write lock: {}", e))
                })?;

                data.clear();
                for item in file_data.items {
                    data.insert(item.id, item);
                }

                Ok(())
            }

            /// Save items to disk
            pub fn save(&self) -> Result<(), TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;

                let file_data = ItemFile {
                    items: data.values().cloned().collect::<Vec<$item>>(),
                };

                write_json_atomic(&self.path, &file_data)
            }

            /// Get an item by ID
            pub fn get(&self, id: $id) -> Result<Option<$item>, TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;

                Ok(data.get(&id).cloned())
            }

            /// Get all items, sorted by name
            pub fn get_all(&self) -> Result<Vec<$item>, TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;

                let mut items: Vec<_> = data.values().cloned().collect();
                items.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(items)
            }

            /// Get an item by name (case-insensitive)
            pub fn get_by_name(&self, name: &str) -> Result<Option<$item>, TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;

                let name_lower = name.to_lowercase();
                Ok(data
                    .values()
                    .find(|i| i.name.to_lowercase() == name_lower)
                    .cloned())
            }

            /// Insert or update an item
            pub fn upsert(&self, item: $item) -> Result<(), TallyError> {
                let mut data = self.data.write().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire write lock: {}", e))
                })?;

                data.insert(item.id, item);
                Ok(())
            }

            /// Delete an item, returning whether it existed
            pub fn delete(&self, id: $id) -> Result<bool, TallyError> {
                let mut data = self.data.write().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire write lock: {}", e))
                })?;

                Ok(data.remove(&id).is_some())
            }

            /// Count items
            pub fn count(&self) -> Result<usize, TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;

                Ok(data.len())
            }

            /// Clone the in-memory state for atomic-unit rollback
            pub(crate) fn snapshot(&self) -> Result<HashMap<$id, $item>, TallyError> {
                let data = self.data.read().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire read lock: {}", e))
                })?;
                Ok(data.clone())
            }

            /// Replace the in-memory state with a previously taken snapshot
            pub(crate) fn restore(
                &self,
                snapshot: HashMap<$id, $item>,
            ) -> Result<(), TallyError> {
                let mut data = self.data.write().map_err(|e| {
                    TallyError::Storage(format!("Failed to acquire write lock: {}", e))
                })?;
                *data = snapshot;
                Ok(())
            }
        }
    };
}

define_item_repository!(
    ExpenseRepository,
    Expense,
    ExpenseId,
    "Repository for recurring expense persistence"
);
define_item_repository!(
    IncomeRepository,
    Income,
    IncomeId,
    "Repository for recurring income persistence"
);
define_item_repository!(
    BudgetItemRepository,
    BudgetItem,
    BudgetItemId,
    "Repository for budget obligation persistence"
);
