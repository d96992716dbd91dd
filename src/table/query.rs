//! Pagination, search, ordering and filter state, and the query derived
//! from it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Single-field sort specification.
///
/// The textual form is the field name, prefixed with `-` when descending:
/// `price` sorts ascending, `-price` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }

    /// Next sort state after the header of `field` is clicked.
    ///
    /// A different field starts ascending; the current field flips between
    /// ascending and descending. There is no way back to unsorted.
    pub fn toggled(current: Option<&Self>, field: &str) -> Self {
        match current {
            Some(order) if order.field == field => match order.direction {
                SortDirection::Ascending => Self::descending(field),
                SortDirection::Descending => Self::ascending(field),
            },
            _ => Self::ascending(field),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => f.write_str(&self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = s
            .strip_prefix('-')
            .map_or_else(|| Self::ascending(s), Self::descending);
        if order.field.is_empty() {
            return Err(format!("Invalid order: {s:?}"));
        }
        Ok(order)
    }
}

impl Serialize for OrderBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Parameters handed to [`DataSource::list`](crate::table::DataSource::list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub page_size: usize,
    /// 1-based.
    pub page_number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<BTreeMap<String, String>>,
}

impl Query {
    /// Zero-based index of the first row on the requested page.
    pub const fn offset(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Owns everything that determines which rows are fetched.
///
/// Setters report whether they changed anything; the table only refetches
/// on an actual change.
#[derive(Debug, Clone)]
pub struct QueryState {
    page_number: usize,
    page_size: usize,
    search: Option<String>,
    order_by: Option<OrderBy>,
    dropdown: Option<(String, String)>,
}

impl QueryState {
    /// Fresh state: page 1, no search, no ordering. A zero page size is
    /// bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
            search: None,
            order_by: None,
            dropdown: None,
        }
    }

    /// Attach a dropdown filter on `field` with its initial selection.
    #[must_use]
    pub fn with_dropdown(mut self, field: impl Into<String>, selected: impl Into<String>) -> Self {
        self.dropdown = Some((field.into(), selected.into()));
        self
    }

    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// Page numbers below 1 are clamped to 1.
    pub fn set_page_number(&mut self, page_number: usize) -> bool {
        let page_number = page_number.max(1);
        if self.page_number == page_number {
            return false;
        }
        self.page_number = page_number;
        true
    }

    /// An empty search term clears the search.
    pub fn set_search(&mut self, search: impl Into<String>) -> bool {
        let search = Some(search.into()).filter(|s| !s.is_empty());
        if self.search == search {
            return false;
        }
        self.search = search;
        true
    }

    pub fn set_order_by(&mut self, order_by: OrderBy) -> bool {
        if self.order_by.as_ref() == Some(&order_by) {
            return false;
        }
        self.order_by = Some(order_by);
        true
    }

    /// Ignored when no dropdown is configured.
    pub fn set_selected(&mut self, value: impl Into<String>) -> bool {
        let Some((_, selected)) = &mut self.dropdown else {
            return false;
        };
        let value = value.into();
        if *selected == value {
            return false;
        }
        *selected = value;
        true
    }

    pub fn to_query(&self) -> Query {
        Query {
            page_size: self.page_size,
            page_number: self.page_number,
            search: self.search.clone(),
            order_by: self.order_by.clone(),
            filter: self
                .dropdown
                .as_ref()
                .map(|(field, value)| BTreeMap::from([(field.clone(), value.clone())])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl QueryState {
        fn search(&self) -> Option<&str> {
            self.search.as_deref()
        }

        fn selected(&self) -> Option<&str> {
            self.dropdown.as_ref().map(|(_, value)| value.as_str())
        }
    }

    #[test]
    fn test_order_by_text_form() {
        assert_eq!(OrderBy::ascending("price").to_string(), "price");
        assert_eq!(OrderBy::descending("price").to_string(), "-price");
        assert_eq!("-id".parse::<OrderBy>().unwrap(), OrderBy::descending("id"));
        assert_eq!("id".parse::<OrderBy>().unwrap(), OrderBy::ascending("id"));
        assert!("-".parse::<OrderBy>().is_err());
        assert!("".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_toggle_flips_between_two_states_only() {
        let mut order = OrderBy::toggled(None, "price");
        assert_eq!(order.to_string(), "price");

        for expected in ["-price", "price", "-price", "price"] {
            order = OrderBy::toggled(Some(&order), "price");
            assert_eq!(order.to_string(), expected);
        }
    }

    #[test]
    fn test_toggle_other_field_starts_ascending() {
        let current = OrderBy::descending("price");
        assert_eq!(
            OrderBy::toggled(Some(&current), "id"),
            OrderBy::ascending("id")
        );
    }

    #[test]
    fn test_fresh_state() {
        let state = QueryState::new(5);
        let query = state.to_query();
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 5);
        assert_eq!(query.search, None);
        assert_eq!(query.order_by, None);
        assert_eq!(query.filter, None);
        assert_eq!(QueryState::new(0).page_size(), 1);
    }

    #[test]
    fn test_setters_report_changes() {
        let mut state = QueryState::new(5);
        assert!(!state.set_page_number(1));
        assert!(state.set_page_number(2));
        assert!(!state.set_page_number(2));
        assert!(state.set_page_number(0));
        assert_eq!(state.page_number(), 1);

        assert!(state.set_search("apple"));
        assert!(!state.set_search("apple"));
        assert!(state.set_search(""));
        assert_eq!(state.search(), None);

        assert!(state.set_order_by(OrderBy::ascending("id")));
        assert!(!state.set_order_by(OrderBy::ascending("id")));

        // No dropdown configured.
        assert!(!state.set_selected("true"));
    }

    #[test]
    fn test_dropdown_becomes_filter_map() {
        let mut state = QueryState::new(5).with_dropdown("stock", "");
        assert_eq!(
            state.to_query().filter,
            Some(BTreeMap::from([("stock".to_string(), String::new())]))
        );
        assert!(state.set_selected("true"));
        assert_eq!(state.selected(), Some("true"));
        assert_eq!(state.to_query().filter.unwrap()["stock"], "true");
    }

    #[test]
    fn test_query_offset_and_json() {
        let mut state = QueryState::new(5);
        state.set_page_number(3);
        state.set_order_by(OrderBy::descending("price"));
        let query = state.to_query();
        assert_eq!(query.offset(), 10);

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "page_size": 5, "page_number": 3, "order_by": "-price" })
        );
        let back: Query = serde_json::from_value(json).unwrap();
        assert_eq!(back, query);
    }
}
