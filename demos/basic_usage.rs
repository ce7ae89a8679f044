// Example: Basic query usage
// Run with: cargo run --example basic_usage

use rustyql::{QueryError, QueryExecutor, QueryParser, Store};

fn main() -> anyhow::Result<()> {
    println!("=== RustyQL Basic Usage Example ===\n");

    // 1. Build a store; here it comes from JSON, any caller-built Store works too
    let store = Store::from_json_str(
        r#"{
            "records": [
                {"id": 1, "name": "Name1", "description": "Some description", "value": 10},
                {"id": 2, "name": "Name2", "description": "Some description", "value": 20},
                {"id": 3, "name": "Name3", "description": "Some description", "value": 30},
                {"id": 4, "name": "Name4", "description": "Some description", "value": 40}
            ]
        }"#,
    )?;
    let db = QueryExecutor::new(&store);

    // 2. Everything
    println!("1. Selecting all records...");
    println!("{}\n", db.query("SELECT * FROM records")?.format());

    // 3. OR filter
    println!("2. value > 30 OR name = 'Name2'...");
    let sql = "SELECT * FROM records WHERE value > 30 OR name = 'Name2'";
    println!("{}\n", db.query(sql)?.format());

    // 4. Projection and IN
    println!("3. Projecting name and id for id IN (3, 1)...");
    let statement = QueryParser::parse("select name, id from records where id in (3, 1)")?;
    println!("   parsed as: {}", statement);
    println!("{}\n", db.execute(&statement)?.format());

    // 5. Errors abort the query
    println!("4. Querying a table that doesn't exist...");
    match db.query("SELECT * FROM users") {
        Err(e @ QueryError::UnknownTable(_)) => println!("   error: {}\n", e),
        other => println!("   unexpected: {:?}\n", other),
    }

    println!("=== Example Complete ===");
    Ok(())
}
