use std::collections::HashMap;

use crate::relay::decode::DeviceKey;
use crate::relay::record::Category;

/// Outcome of comparing a code with the last one seen for the same device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    First,
    Changed { previous: String },
    Unchanged,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        !matches!(self, Transition::Unchanged)
    }
}

/// Last code seen per device, one map per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastValueTable {
    freshness: HashMap<DeviceKey, String>,
    preservation: HashMap<DeviceKey, String>,
}

impl LastValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `code` with the stored entry and store it when it differs.
    pub fn observe(&mut self, category: Category, device: &DeviceKey, code: &str) -> Transition {
        let table = self.table_mut(category);

        match table.get(device) {
            Some(last) if last == code => Transition::Unchanged,
            Some(_) => {
                let previous = table.insert(device.clone(), code.to_string()).unwrap_or_default();
                Transition::Changed { previous }
            }
            None => {
                table.insert(device.clone(), code.to_string());
                Transition::First
            }
        }
    }

    pub fn last(&self, category: Category, device: &DeviceKey) -> Option<&str> {
        self.table(category).get(device).map(String::as_str)
    }

    pub fn tracked_devices(&self, category: Category) -> usize {
        self.table(category).len()
    }

    pub fn clear(&mut self) {
        self.freshness.clear();
        self.preservation.clear();
    }

    fn table(&self, category: Category) -> &HashMap<DeviceKey, String> {
        match category {
            Category::Freshness => &self.freshness,
            Category::Preservation => &self.preservation,
        }
    }

    fn table_mut(&mut self, category: Category) -> &mut HashMap<DeviceKey, String> {
        match category {
            Category::Freshness => &mut self.freshness,
            Category::Preservation => &mut self.preservation,
        }
    }
}
