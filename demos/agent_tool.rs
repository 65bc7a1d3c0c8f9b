//! Example: Driving the agent adapters by hand.
//!
//! Agent frameworks call the adapters with plain strings and JSON. This example
//! plays the part of the framework so you can see exactly what the model would
//! receive back.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example agent_tool
//! ```

use mailcat::adapters::commands::MailCatCommands;
use mailcat::adapters::tool::MailCatTool;
use mailcat::MailCatConfig;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

#[tokio::main]
async fn main() -> mailcat::Result<()> {
    let config = MailCatConfig::from_env().build()?;

    // Function-calling style: one tool, JSON arguments
    let mut tool = MailCatTool::new(config.clone())?.with_poll_interval(Duration::from_secs(5));

    println!("Tool: {}", tool.name());
    println!("Schema: {:#}", tool.parameters_schema());

    println!("\n{}", tool.run_json(json!({"action": "create"})).await);
    println!("\n{}", tool.run_json(json!({"action": "inbox"})).await);
    println!(
        "\n{}",
        tool.run_json(json!({"action": "wait", "timeout": 15})).await
    );

    // Plugin style: named commands with string arguments
    let mut plugin = MailCatCommands::new(config)?.with_poll_interval(Duration::from_secs(5));

    for command in plugin.commands() {
        println!("{} - {}", command.name, command.description);
    }

    println!("\n{}", plugin.execute("mailcat_create", &HashMap::new()).await);

    let args = HashMap::from([("timeout".to_string(), "15".to_string())]);
    println!("\n{}", plugin.execute("mailcat_wait", &args).await);

    Ok(())
}
