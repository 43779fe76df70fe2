//! Directus list query parameters.
//!
//! Directus takes everything as flat query pairs:
//! `fields=id,kode`, `filter[status][_eq]=published`, `sort=-date_created`,
//! `limit=1`, `offset=20`.

use std::fmt;

/// Filter operators understood by Directus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Null,
    NotNull,
    Contains,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "_eq",
            FilterOp::Neq => "_neq",
            FilterOp::Lt => "_lt",
            FilterOp::Lte => "_lte",
            FilterOp::Gt => "_gt",
            FilterOp::Gte => "_gte",
            FilterOp::In => "_in",
            FilterOp::Null => "_null",
            FilterOp::NotNull => "_nnull",
            FilterOp::Contains => "_contains",
        }
    }

    /// Parse either the wire form (`_eq`) or the bare name (`eq`).
    pub fn parse(s: &str) -> Option<Self> {
        let op = match s.trim_start_matches('_') {
            "eq" => FilterOp::Eq,
            "neq" => FilterOp::Neq,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "in" => FilterOp::In,
            "null" => FilterOp::Null,
            "nnull" => FilterOp::NotNull,
            "contains" => FilterOp::Contains,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for list query parameters. Pairs keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    fields: Vec<String>,
    filters: Vec<(String, FilterOp, String)>,
    sort: Vec<String>,
    limit: Option<i64>,
    offset: Option<usize>,
    meta: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push((field.to_string(), op, value.to_string()));
        self
    }

    pub fn eq(self, field: &str, value: impl ToString) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    /// Ascending sort on `field`.
    pub fn sort(mut self, field: &str) -> Self {
        self.sort.push(field.to_string());
        self
    }

    /// Descending sort on `field` (`-field` on the wire).
    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push(format!("-{field}"));
        self
    }

    /// `-1` asks Directus for every row.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Request metadata such as `total_count` or `filter_count`.
    pub fn meta(mut self, meta: &str) -> Self {
        self.meta = Some(meta.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Flatten into query pairs, ready for `RequestBuilder::query`.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), self.fields.join(",")));
        }
        for (field, op, value) in &self.filters {
            pairs.push((format!("filter[{field}][{op}]"), value.clone()));
        }
        if !self.sort.is_empty() {
            pairs.push(("sort".to_string(), self.sort.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(ref meta) = self.meta {
            pairs.push(("meta".to_string(), meta.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_raw_material_query() {
        let q = Query::new()
            .fields(&["id", "kode", "nama"])
            .eq("status", "published")
            .sort("kode");
        assert_eq!(
            q.pairs(),
            vec![
                pair("fields", "id,kode,nama"),
                pair("filter[status][_eq]", "published"),
                pair("sort", "kode"),
            ]
        );
    }

    #[test]
    fn test_latest_one() {
        let q = Query::new().sort_desc("date_created").limit(1).offset(0);
        assert_eq!(
            q.pairs(),
            vec![
                pair("sort", "-date_created"),
                pair("limit", "1"),
                pair("offset", "0"),
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(Query::new().is_empty());
        assert!(!Query::new().meta("total_count").is_empty());
    }

    #[test]
    fn test_parse_op() {
        assert_eq!(FilterOp::parse("_eq"), Some(FilterOp::Eq));
        assert_eq!(FilterOp::parse("nnull"), Some(FilterOp::NotNull));
        assert_eq!(FilterOp::parse("like"), None);
        assert_eq!(FilterOp::Gte.to_string(), "_gte");
    }
}
