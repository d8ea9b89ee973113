use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Gte(String, String),
    Lte(String, String),
    /// Case-insensitive pattern; `*` is the wildcard.
    Ilike(String, String),
}

impl Filter {
    fn to_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(col, v) => (col.clone(), format!("eq.{}", v)),
            Filter::Gte(col, v) => (col.clone(), format!("gte.{}", v)),
            Filter::Lte(col, v) => (col.clone(), format!("lte.{}", v)),
            Filter::Ilike(col, v) => (col.clone(), format!("ilike.{}", v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// A row selection against one table, rendered as PostgREST query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.to_string()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Lte(column.to_string(), value.to_string()));
        self
    }

    pub fn ilike(mut self, column: &str, pattern: impl ToString) -> Self {
        self.filters.push(Filter::Ilike(column.to_string(), pattern.to_string()));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Query-string pairs in a stable order: select, filters, order, limit.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        pairs.push(("select".to_string(), select));
        pairs.extend(self.filters.iter().map(Filter::to_pair));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, dir)| format!("{}.{}", col, dir))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}
