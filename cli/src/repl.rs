//! Interactive REPL: read a question, run the research graph, print the answer, repeat.
//!
//! Exits on EOF (Ctrl+D) or `quit`/`exit`/`/quit`. A failed run is printed to stderr
//! and the loop continues.

use std::io::Write;

use prism::ResearchRunner;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{run_once, OutputOptions};

pub async fn run_repl_loop(
    runner: &ResearchRunner,
    output: &OutputOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("Ask a question (\"exit\" to leave).");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let question = match reader.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        if let Err(e) = run_once(runner, question.trim(), output).await {
            eprintln!("error: {}", e);
        }
    }

    println!("Bye.");
    Ok(())
}

fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit")
}
