/*
The sqlite_schema table lives on page 1 and records one row per table and
index in the database: (type, name, tbl_name, rootpage, sql). This module
reads that table once at open time and classifies its rows into the
tables and indexes the rest of the engine plans queries against.
*/

use anyhow::{bail, Context, Result};

use crate::btree::collect_table_leaf_cells;
use crate::pager::Pager;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub root_page: u32,
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub name: String,
    pub table_name: String,
    pub root_page: u32,
    pub sql: String,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tables: Vec<TableInfo>,
    pub indexes: Vec<IndexInfo>,
}

impl Schema {
    pub fn load(pager: &Pager) -> Result<Self> {
        let cells = collect_table_leaf_cells(pager, 1).context("scanning sqlite_schema")?;

        let mut schema = Schema::default();
        for cell in cells {
            let values = &cell.record.values;
            if values.len() != 5 {
                bail!("sqlite_schema row has {} columns, expected 5", values.len());
            }

            let obj_type = text(&values[0], "type")?;
            let name = text(&values[1], "name")?;
            let table_name = text(&values[2], "tbl_name")?;
            let root_page = integer(&values[3], "rootpage")?;
            let sql = text(&values[4], "sql")?;

            match obj_type.as_str() {
                "table" => schema.tables.push(TableInfo {
                    name,
                    root_page: root_page as u32,
                    sql,
                }),
                "index" => schema.indexes.push(IndexInfo {
                    name,
                    table_name,
                    root_page: root_page as u32,
                    sql,
                }),
                // views, triggers, and other schema object kinds are out of
                // scope for this engine and are silently ignored.
                _ => {}
            }
        }

        Ok(schema)
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn indexes_for_table<'a>(&'a self, table_name: &str) -> Vec<&'a IndexInfo> {
        self.indexes
            .iter()
            .filter(|i| i.table_name.eq_ignore_ascii_case(table_name))
            .collect()
    }
}

fn text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => bail!("sqlite_schema.{field} is not text: {other:?}"),
    }
}

fn integer(value: &Value, field: &str) -> Result<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => bail!("sqlite_schema.{field} is not an integer: {other:?}"),
    }
}
