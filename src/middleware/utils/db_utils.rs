use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use surrealdb::method::Query;
use surrealdb::sql::{Thing, Value};

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, AppResult, CtxResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

pub enum IdentIdName {
    Id(Thing),
    ColumnIdent { column: String, val: Value },
    ColumnIdentAnd(Vec<IdentIdName>),
}

impl IdentIdName {
    pub fn column<V: Into<Value>>(column: &str, val: V) -> Self {
        IdentIdName::ColumnIdent {
            column: column.to_string(),
            val: val.into(),
        }
    }

    fn collect_bindings(&self, bindings: &mut HashMap<String, Value>) {
        match self {
            IdentIdName::Id(id) => {
                bindings.insert("id".to_string(), Value::from(id.clone()));
            }
            IdentIdName::ColumnIdent { column, val } => {
                bindings.insert(column.clone(), val.clone());
            }
            IdentIdName::ColumnIdentAnd(filters) => {
                filters.iter().for_each(|f| f.collect_bindings(bindings));
            }
        }
    }
}

impl Display for IdentIdName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IdentIdName::Id(_) => f.write_str("id=$id"),
            IdentIdName::ColumnIdent { column, .. } => write!(f, "{column}=${column}"),
            IdentIdName::ColumnIdentAnd(filters) => f.write_str(
                filters
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(" AND ")
                    .as_str(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> AppResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page < 1 {
            return Err(AppError::Generic {
                description: "page must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::Generic {
                description: format!("per_page must be between 1 and {MAX_PER_PAGE}"),
            });
        }
        Ok(Self { page, per_page })
    }

    pub fn start(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum QryOrder {
    DESC,
    ASC,
}

impl Display for QryOrder {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            QryOrder::DESC => write!(f, "DESC"),
            QryOrder::ASC => write!(f, "ASC"),
        }
    }
}

/// Query text plus its named bindings.
#[derive(Debug)]
pub struct QryBindingsVal(String, HashMap<String, Value>);

impl QryBindingsVal {
    pub fn new(qry: String, bindings: HashMap<String, Value>) -> Self {
        QryBindingsVal(qry, bindings)
    }

    pub fn get_query_string(&self) -> &str {
        &self.0
    }

    pub fn into_query(self, db: &Db) -> Query<'_, surrealdb::engine::any::Any> {
        self.1
            .into_iter()
            .fold(db.query(self.0), |qry, n_val| qry.bind(n_val))
    }
}

/// WHERE clause builder for list endpoints.
#[derive(Debug, Default)]
pub struct ListFilter {
    conditions: Vec<String>,
    bindings: HashMap<String, Value>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<V: Into<Value>>(mut self, column: &str, val: V) -> Self {
        self.conditions.push(format!("{column}=${column}"));
        self.bindings.insert(column.to_string(), val.into());
        self
    }

    pub fn eq_opt<V: Into<Value>>(self, column: &str, val: Option<V>) -> Self {
        match val {
            Some(val) => self.eq(column, val),
            None => self,
        }
    }

    /// Case-insensitive substring match over any of `columns`.
    pub fn search(mut self, columns: &[&str], term: Option<String>) -> Self {
        let Some(term) = term.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()) else {
            return self;
        };
        let any_col = columns
            .iter()
            .map(|c| format!("string::contains(string::lowercase({c} ?? ''), $_search)"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({any_col})"));
        self.bindings.insert("_search".to_string(), Value::from(term));
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResult {
    total: u64,
}

pub fn get_entity_page_query(
    table_name: &str,
    filter: ListFilter,
    order_by: &str,
    pagination: &Pagination,
) -> QryBindingsVal {
    let where_q = filter.where_clause();
    let mut bindings = filter.bindings;
    bindings.insert("_table".to_string(), Value::from(table_name));
    bindings.insert("_limit_val".to_string(), Value::from(pagination.per_page as i64));
    bindings.insert("_start_val".to_string(), Value::from(pagination.start()));
    let qry = format!(
        "SELECT * FROM type::table($_table){where_q} ORDER BY {order_by} {} LIMIT $_limit_val START $_start_val;
         SELECT count() AS total FROM type::table($_table){where_q} GROUP ALL;",
        QryOrder::DESC
    );
    QryBindingsVal::new(qry, bindings)
}

/// One page of `table_name` rows plus the total count matching `filter`.
pub async fn get_entity_page<T: for<'a> Deserialize<'a>>(
    db: &Db,
    table_name: &str,
    filter: ListFilter,
    order_by: &str,
    pagination: &Pagination,
) -> AppResult<(Vec<T>, u64)> {
    let mut res = get_entity_page_query(table_name, filter, order_by, pagination)
        .into_query(db)
        .await?;
    let items = res.take::<Vec<T>>(0)?;
    let total = res
        .take::<Option<CountResult>>(1)?
        .map(|c| c.total)
        .unwrap_or(0);
    Ok((items, total))
}

pub async fn get_entity_list<T: for<'a> Deserialize<'a>>(
    db: &Db,
    table_name: &str,
    filter: ListFilter,
    order_by: &str,
    limit: Option<u32>,
) -> AppResult<Vec<T>> {
    let where_q = filter.where_clause();
    let mut bindings = filter.bindings;
    bindings.insert("_table".to_string(), Value::from(table_name));
    let limit_q = match limit {
        Some(limit) => {
            bindings.insert("_limit_val".to_string(), Value::from(limit as i64));
            " LIMIT $_limit_val"
        }
        None => "",
    };
    let qry = format!("SELECT * FROM type::table($_table){where_q} ORDER BY {order_by}{limit_q};");
    let mut res = QryBindingsVal::new(qry, bindings).into_query(db).await?;
    Ok(res.take::<Vec<T>>(0)?)
}

pub async fn get_entity<T: for<'a> Deserialize<'a>>(
    db: &Db,
    table_name: &str,
    ident: &IdentIdName,
) -> AppResult<Option<T>> {
    let mut bindings = HashMap::new();
    ident.collect_bindings(&mut bindings);
    let qry = match ident {
        IdentIdName::Id(_) => "SELECT * FROM $id;".to_string(),
        _ => {
            bindings.insert("_table".to_string(), Value::from(table_name));
            format!("SELECT * FROM type::table($_table) WHERE {ident} LIMIT 1;")
        }
    };
    let mut res = QryBindingsVal::new(qry, bindings).into_query(db).await?;
    Ok(res.take::<Option<T>>(0)?)
}

pub async fn record_exists(db: &Db, record_id: &Thing) -> AppResult<()> {
    let qry = "RETURN record::exists($rec_id);";
    let mut res = db.query(qry).bind(("rec_id", record_id.clone())).await?;
    let res: Option<bool> = res.take(0)?;
    match res.unwrap_or(false) {
        true => Ok(()),
        false => Err(AppError::EntityFailIdNotFound {
            ident: record_id.to_raw(),
        }),
    }
}

pub fn with_not_found_err<T>(opt: Option<T>, ctx: &Ctx, ident: &str) -> CtxResult<T> {
    match opt {
        None => Err(ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: ident.to_string(),
        })),
        Some(res) => Ok(res),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination::default());
        assert_eq!(Pagination::new(Some(3), Some(20)).unwrap().start(), 40);
        assert!(Pagination::new(Some(0), None).is_err());
        assert!(Pagination::new(None, Some(0)).is_err());
        assert!(Pagination::new(None, Some(101)).is_err());
        assert!(Pagination::new(None, Some(100)).is_ok());
    }

    #[test]
    fn list_filter_builds_where_clause() {
        let filter = ListFilter::new()
            .eq("status", "completed")
            .eq_opt::<String>("user", None)
            .search(&["title", "description"], Some(" AI ".to_string()));
        let qry = get_entity_page_query("activity", filter, "r_created", &Pagination::default());
        let qry = qry.get_query_string();
        assert!(qry.contains("WHERE status=$status AND (string::contains(string::lowercase(title ?? ''), $_search) OR string::contains(string::lowercase(description ?? ''), $_search))"));
        assert!(qry.contains("ORDER BY r_created DESC"));
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = ListFilter::new().search(&["name"], Some("  ".to_string()));
        assert_eq!(filter.where_clause(), "");
    }
}
