//! Shared listing mechanism: a small predicate compiler over
//! `sqlx::QueryBuilder` plus fixed-size pagination. Every resource listing
//! in the back-office goes through this module.

use sqlx::{Postgres, QueryBuilder};

/// Compiled filter for a listing query. Clauses are conjoined with `AND`
/// onto a base query that already carries a `WHERE`.
#[derive(Debug, Default)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

#[derive(Debug)]
enum Clause {
    Text {
        pattern: String,
        columns: &'static [&'static str],
        related: &'static [&'static str],
    },
    IdIn {
        column: &'static str,
        ids: Vec<i64>,
    },
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search clause: a single disjunction of case-insensitive
    /// substring matches over `columns`, plus one independent `EXISTS`
    /// semi-join per entry in `related`. Each related fragment must be SQL
    /// up to (and including) its trailing `ILIKE `; the pattern bind and
    /// closing paren are appended here. A blank term adds nothing.
    pub fn text(
        mut self,
        term: Option<&str>,
        columns: &'static [&'static str],
        related: &'static [&'static str],
    ) -> Self {
        if let Some(term) = term {
            let term = term.trim();
            if !term.is_empty() {
                self.clauses.push(Clause::Text {
                    pattern: format!("%{term}%"),
                    columns,
                    related,
                });
            }
        }
        self
    }

    /// Structured id-list filter. An empty list is the "all" sentinel and
    /// adds no constraint rather than excluding every row.
    pub fn id_in(mut self, column: &'static str, ids: &[i64]) -> Self {
        if !ids.is_empty() {
            self.clauses.push(Clause::IdIn {
                column,
                ids: ids.to_vec(),
            });
        }
        self
    }

    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for clause in &self.clauses {
            match clause {
                Clause::Text {
                    pattern,
                    columns,
                    related,
                } => {
                    qb.push(" AND (");
                    let mut first = true;
                    for col in *columns {
                        if !first {
                            qb.push(" OR ");
                        }
                        first = false;
                        qb.push(*col);
                        qb.push(" ILIKE ");
                        qb.push_bind(pattern.clone());
                    }
                    for sub in *related {
                        if !first {
                            qb.push(" OR ");
                        }
                        first = false;
                        qb.push(*sub);
                        qb.push_bind(pattern.clone());
                        qb.push(")");
                    }
                    qb.push(")");
                }
                Clause::IdIn { column, ids } => {
                    qb.push(" AND ");
                    qb.push(*column);
                    qb.push(" = ANY(");
                    qb.push_bind(ids.clone());
                    qb.push(")");
                }
            }
        }
    }
}

/// Fixed page size shared by every listing, constructed from config once at
/// startup and passed in explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    pub page_size: i64,
}

impl Pager {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// LIMIT/OFFSET for a 1-based page number. Pages below 1 clamp to 1;
    /// the offset saturates rather than overflowing on absurd page numbers.
    pub fn limit_offset(&self, page: i64) -> (i64, i64) {
        let page = page.max(1);
        (self.page_size, (page - 1).saturating_mul(self.page_size))
    }
}

/// One page of results plus the metadata the table footer needs.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    /// 1-based index of the first item shown, 0 when the page is empty.
    pub fn first_item(&self) -> i64 {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    pub fn last_item(&self) -> i64 {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + self.items.len() as i64
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Parses a comma-joined id list query parameter. `None`, blank input and
/// the literal `"all"` sentinel all mean "no constraint".
pub fn parse_id_list(raw: Option<&str>) -> Vec<i64> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Vec::new(),
        Some(s) => s
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect(),
    }
}
