use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    Text(String),
    Number(i64),
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ItemValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

pub type TableItem = BTreeMap<String, ItemValue>;

pub trait RecordTable {
    fn put_item(&self, table_name: &str, item: &TableItem) -> Result<(), String>;
}
