//! `taoloop chat`: Interactive question loop.
//!
//! Each line is an independent question; nothing carries over between them.

use std::io::Write;
use std::path::Path;
use taoloop_agent::AgentProfile;
use taoloop_tools::BookCatalog;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(
    config_path: Option<&Path>,
    profile: AgentProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let provider = super::build_provider(&config)?;
    let model = provider.model().to_string();
    let agent = profile.tool_loop(provider, &config);
    let system_prompt = profile.system_prompt();

    println!();
    println!("  taoloop: interactive mode");
    println!();
    println!("  Profile:   {profile}");
    println!("  Model:     {model}");
    println!("  Tools:     {}", agent.tools().names().join(", "));
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'books' to list the catalog, 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "books" => {
                println!();
                println!("  Available books: {}", BookCatalog::builtin().titles().join(", "));
                println!();
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let answer = agent.run(line, &system_prompt).await;
        eprint!("\r     \r");

        println!();
        for reply in answer.lines() {
            println!("  Assistant > {reply}");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
