/*
Top-level handle tying the pager and schema together for one session: a
database is opened read-only, queried any number of times, and explicitly
closed (spec §3 Lifecycles, §5). Parsed CREATE TABLE/CREATE INDEX syntax
trees are not cached here — the executor re-derives them from schema-row
text on every query, per spec.
*/

use anyhow::Result;

use crate::executor::{self, QueryOutput};
use crate::pager::Pager;
use crate::schema::Schema;

pub struct Database {
    pager: Pager,
    schema: Schema,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let pager = Pager::open(path)?;
        let schema = Schema::load(&pager)?;
        Ok(Database { pager, schema })
    }

    pub fn page_size(&self) -> u16 {
        self.pager.page_size
    }

    // the cell count of page 1, per spec's documented ".dbinfo" behavior;
    // this over-counts indexes and any internal schema objects.
    pub fn tables_count(&self) -> u16 {
        self.pager.tables_count
    }

    pub fn table_names(&self) -> Vec<String> {
        self.schema.tables.iter().map(|t| t.name.clone()).collect()
    }

    pub fn execute(&self, sql: &str) -> Result<QueryOutput> {
        executor::execute(&self.pager, &self.schema, sql)
    }

    pub fn close(self) {
        drop(self);
    }
}
