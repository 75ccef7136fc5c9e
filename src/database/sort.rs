//! Sort specifications for ORDER BY generation
//!
//! A [`Sort`] is an ordered list of property/direction pairs; the order of the
//! list is the order of the generated clause.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, OrderDirection::Asc)
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for OrderDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(OrderDirection::Asc),
            "desc" | "descending" => Ok(OrderDirection::Desc),
            other => Err(Error::invalid_sort(format!(
                "unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// A single property/direction pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl SortOrder {
    pub fn new(property: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, OrderDirection::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, OrderDirection::Desc)
    }
}

/// Ordered sort specification
///
/// # Example
/// ```
/// use sqldialect::database::{OrderDirection, Sort};
///
/// let sort = Sort::asc("name").and(Sort::desc("age"));
/// assert_eq!(sort.len(), 2);
///
/// let parsed: Sort = "name,-age".parse().unwrap();
/// assert_eq!(parsed, sort);
/// assert_eq!(parsed.orders()[1].direction, OrderDirection::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<SortOrder>,
}

impl Sort {
    /// An empty specification; renders as no ORDER BY at all
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = SortOrder>,
    {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::by([SortOrder::asc(property)])
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::by([SortOrder::desc(property)])
    }

    /// Append another specification after this one
    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    pub fn push(&mut self, order: SortOrder) {
        self.orders.push(order);
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortOrder> {
        self.orders.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }
}

impl From<Vec<SortOrder>> for Sort {
    fn from(orders: Vec<SortOrder>) -> Self {
        Self { orders }
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a SortOrder;
    type IntoIter = std::slice::Iter<'a, SortOrder>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

/// Parses request-style sort parameters.
///
/// Entries are comma separated. Each entry is either `property`,
/// `-property` (descending) or `property direction`.
impl FromStr for Sort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut sort = Sort::unsorted();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split_whitespace();
            let (property, mut direction) = match parts.next() {
                Some(p) if p.starts_with('-') => (&p[1..], OrderDirection::Desc),
                Some(p) => (p, OrderDirection::Asc),
                None => continue,
            };

            if let Some(keyword) = parts.next() {
                direction = keyword.parse()?;
            }

            if property.is_empty() || parts.next().is_some() {
                return Err(Error::invalid_sort(format!(
                    "malformed sort entry '{}'",
                    entry
                )));
            }

            sort.push(SortOrder::new(property, direction));
        }

        Ok(sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let sort = Sort::desc("created_at")
            .and(Sort::asc("id"))
            .and(Sort::asc("name"));
        let props: Vec<&str> = sort.iter().map(|o| o.property.as_str()).collect();
        assert_eq!(props, vec!["created_at", "id", "name"]);
    }

    #[test]
    fn test_parse_keyword_style() {
        let sort: Sort = "name asc, age DESC".parse().unwrap();
        assert_eq!(
            sort.orders(),
            &[SortOrder::asc("name"), SortOrder::desc("age")]
        );
    }

    #[test]
    fn test_parse_empty_is_unsorted() {
        let sort: Sort = " , ".parse().unwrap();
        assert!(sort.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("name sideways".parse::<Sort>().is_err());
        assert!("name asc extra".parse::<Sort>().is_err());
        assert!("-".parse::<Sort>().is_err());
    }

    #[test]
    fn test_direction_sql() {
        assert_eq!(OrderDirection::Asc.as_sql(), "ASC");
        assert_eq!(OrderDirection::Desc.to_string(), "DESC");
        assert_eq!(
            "descending".parse::<OrderDirection>().unwrap(),
            OrderDirection::Desc
        );
    }
}
