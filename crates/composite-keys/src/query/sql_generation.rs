//! Query Builder SQL generation

use super::builder::QueryBuilder;
use super::predicate::Predicate;
use super::types::*;
use crate::value::KeyValue;

/// Where rendered SQL values go: bound parameters or inline literals
enum ValueSink<'a> {
    Params(&'a mut Vec<KeyValue>),
    Inline,
}

impl ValueSink<'_> {
    fn push(&mut self, value: &KeyValue) -> String {
        match self {
            ValueSink::Params(params) => {
                params.push(value.clone());
                format!("${}", params.len())
            }
            ValueSink::Inline => format_value(value),
        }
    }
}

impl<M> QueryBuilder<M> {
    /// Generate SQL with parameter placeholders and return the parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<KeyValue>) {
        let mut params = Vec::new();
        let sql = self.build_sql(&mut ValueSink::Params(&mut params));
        (sql, params)
    }

    /// Generate SQL with values inlined as literals
    pub fn to_sql(&self) -> String {
        self.build_sql(&mut ValueSink::Inline)
    }

    fn build_sql(&self, sink: &mut ValueSink<'_>) -> String {
        match self.query_type {
            QueryType::Select => self.build_select_sql(sink),
            QueryType::Insert => self.build_insert_sql(sink),
            QueryType::Update => self.build_update_sql(sink),
            QueryType::Delete => self.build_delete_sql(sink),
        }
    }

    /// Build SELECT SQL
    fn build_select_sql(&self, sink: &mut ValueSink<'_>) -> String {
        let mut sql = String::from("SELECT ");

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        if !self.from_tables.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from_tables.join(", "));
        }

        self.build_where_clause(&mut sql, sink);

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }

    /// Build INSERT SQL
    fn build_insert_sql(&self, sink: &mut ValueSink<'_>) -> String {
        let mut sql = String::new();

        if let Some(table) = &self.insert_table {
            sql.push_str(&format!("INSERT INTO {}", table));

            if !self.set_clauses.is_empty() {
                let columns: Vec<&str> = self
                    .set_clauses
                    .iter()
                    .map(|clause| clause.column.as_str())
                    .collect();
                let values: Vec<String> = self
                    .set_clauses
                    .iter()
                    .map(|clause| render_set_value(&clause.value, sink))
                    .collect();
                sql.push_str(&format!(" ({}) VALUES ({})", columns.join(", "), values.join(", ")));
            }
        }

        sql
    }

    /// Build UPDATE SQL
    fn build_update_sql(&self, sink: &mut ValueSink<'_>) -> String {
        let mut sql = String::new();

        if let Some(table) = &self.update_table {
            sql.push_str(&format!("UPDATE {}", table));

            if !self.set_clauses.is_empty() {
                let assignments: Vec<String> = self
                    .set_clauses
                    .iter()
                    .map(|clause| {
                        let value = render_set_value(&clause.value, sink);
                        format!("{} = {}", clause.column, value)
                    })
                    .collect();
                sql.push_str(" SET ");
                sql.push_str(&assignments.join(", "));
            }

            self.build_where_clause(&mut sql, sink);
        }

        sql
    }

    /// Build DELETE SQL
    fn build_delete_sql(&self, sink: &mut ValueSink<'_>) -> String {
        let mut sql = String::new();

        if let Some(table) = &self.delete_table {
            sql.push_str(&format!("DELETE FROM {}", table));
            self.build_where_clause(&mut sql, sink);
        }

        sql
    }

    /// Helper method to build WHERE clauses
    fn build_where_clause(&self, sql: &mut String, sink: &mut ValueSink<'_>) {
        if self.where_conditions.is_empty() {
            return;
        }

        let conditions: Vec<String> = self
            .where_conditions
            .iter()
            .map(|predicate| render_predicate(predicate, sink))
            .collect();

        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
}

fn render_set_value(value: &KeyValue, sink: &mut ValueSink<'_>) -> String {
    if value.is_null() {
        "NULL".to_string()
    } else {
        sink.push(value)
    }
}

/// Render one predicate. Groups with more than one member are always
/// parenthesized so they cannot leak precedence into the surrounding chain.
fn render_predicate(predicate: &Predicate, sink: &mut ValueSink<'_>) -> String {
    match predicate {
        Predicate::True => "1 = 1".to_string(),
        Predicate::False => "1 = 0".to_string(),
        Predicate::Condition(condition) => render_condition(condition, sink),
        Predicate::And(children) => render_group(children, "AND", "1 = 1", sink),
        Predicate::Or(children) => render_group(children, "OR", "1 = 0", sink),
    }
}

fn render_group(
    children: &[Predicate],
    connector: &str,
    empty: &str,
    sink: &mut ValueSink<'_>,
) -> String {
    match children {
        [] => empty.to_string(),
        [only] => render_predicate(only, sink),
        _ => {
            let parts: Vec<String> = children
                .iter()
                .map(|child| render_predicate(child, sink))
                .collect();
            format!("({})", parts.join(&format!(" {} ", connector)))
        }
    }
}

fn render_condition(condition: &WhereCondition, sink: &mut ValueSink<'_>) -> String {
    match condition.operator {
        QueryOperator::IsNull | QueryOperator::IsNotNull => {
            format!("{} {}", condition.column, condition.operator)
        }
        QueryOperator::In | QueryOperator::NotIn => {
            if condition.values.is_empty() {
                // IN () is not valid SQL
                return match condition.operator {
                    QueryOperator::In => "1 = 0".to_string(),
                    _ => "1 = 1".to_string(),
                };
            }
            let values: Vec<String> = condition.values.iter().map(|v| sink.push(v)).collect();
            format!("{} {} ({})", condition.column, condition.operator, values.join(", "))
        }
        QueryOperator::Equal | QueryOperator::NotEqual => match &condition.value {
            Some(value) if !value.is_null() => {
                format!("{} {} {}", condition.column, condition.operator, sink.push(value))
            }
            // comparing with NULL is never true
            _ => "1 = 0".to_string(),
        },
    }
}

/// Format a value as an inline SQL literal
pub(crate) fn format_value(value: &KeyValue) -> String {
    match value {
        KeyValue::Null => "NULL".to_string(),
        KeyValue::Bool(b) => b.to_string(),
        KeyValue::Integer(i) => i.to_string(),
        KeyValue::Float(f) => f.to_string(),
        KeyValue::Text(s) => format!("'{}'", s.replace('\'', "''")), // Escape single quotes
        KeyValue::Bytes(b) => format!("X'{}'", hex::encode_upper(b)),
        KeyValue::Timestamp(ts) => format!("'{}'", ts.to_rfc3339()),
    }
}
