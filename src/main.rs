use anyhow::{bail, Result};
use env_logger::Env;
use sqlite_query_engine::{Database, QueryOutput};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    let database = Database::open(&args[1])?;
    let command = &args[2];

    match command.as_str() {
        ".dbinfo" => {
            println!("database page size: {}", database.page_size());
            println!("number of tables: {}", database.tables_count());
        }
        ".tables" => {
            println!("{}", database.table_names().join(" "));
        }
        sql => match database.execute(sql) {
            Ok(QueryOutput::Count(count)) => println!("{count}"),
            Ok(QueryOutput::Rows(rows)) => {
                for row in rows {
                    println!("{row}");
                }
            }
            // SQL-path failures are reported but do not change exit status
            // (spec §6/§7); `.dbinfo`/`.tables` above propagate via `?`.
            Err(err) => eprintln!("{err}"),
        },
    }

    Ok(())
}
