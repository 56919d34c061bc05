//! prism CLI binary: answer a question from web search and discussion sources.
//!
//! `prism "question"` runs once; with no question it starts a REPL.
//! Subcommands: `serve` (HTTP endpoint), `graph` (print the research DAG).

mod logging;
mod output;
mod repl;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use prism::{
    generate_dot, generate_text, CompilationError, DatasetClient, DiscussionClient, JobPoller,
    MockLlm, PollConfig, ResearchDeps, ResearchRunner, RunError, SerpClient, Settings, StageEvent,
};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(about = "prism: one question, three sources, one answer")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Question to research; omit to start an interactive session
    #[arg(trailing_var_arg = true)]
    question: Vec<String>,

    /// Print the final research state as JSON instead of the answer
    #[arg(long)]
    json: bool,

    /// With --json, pretty-print (multi-line)
    #[arg(long)]
    pretty: bool,

    /// Print stage progress to stderr and log at info
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Serve POST /research over HTTP (default 127.0.0.1:8080)
    Serve(ServeArgs),
    /// Print the research graph: stages and dependencies (no credentials needed)
    Graph(GraphArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct ServeArgs {
    /// Listen address
    #[arg(long, value_name = "ADDR")]
    addr: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct GraphArgs {
    /// Graphviz DOT instead of text
    #[arg(long)]
    dot: bool,
}

/// How a finished run is printed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OutputOptions {
    pub(crate) json: bool,
    pub(crate) pretty: bool,
    pub(crate) verbose: bool,
}

impl Args {
    fn question(&self) -> Option<String> {
        let q = self.question.join(" ");
        let q = q.trim();
        (!q.is_empty()).then(|| q.to_string())
    }

    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            pretty: self.pretty,
            verbose: self.verbose,
        }
    }
}

/// Runs one question and prints the answer (or the state as JSON).
pub(crate) async fn run_once(
    runner: &ResearchRunner,
    question: &str,
    opts: &OutputOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = if opts.verbose {
        run_with_progress(runner, question).await?
    } else {
        runner.run(question).await?
    };

    if opts.json {
        println!("{}", output::state_json(&state, opts.pretty)?);
    } else {
        println!("{}", output::answer_text(&state));
    }
    std::io::Write::flush(&mut std::io::stdout())?;
    Ok(())
}

async fn run_with_progress(
    runner: &ResearchRunner,
    question: &str,
) -> Result<prism::ResearchState, RunError> {
    let (tx, mut rx) = mpsc::channel::<StageEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("{}", output::format_event(&event));
        }
    });
    let result = runner.run_with_events(question, tx).await;
    let _ = printer.await;
    result
}

fn build_runner() -> Result<ResearchRunner, Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    Ok(ResearchRunner::from_settings(&settings)?)
}

/// Renders the research DAG. The clients are unconfigured; the graph is never invoked.
fn graph_text(dot: bool) -> Result<String, CompilationError> {
    let poller = JobPoller::new(Arc::new(DatasetClient::new("")), PollConfig::default());
    let deps = ResearchDeps::new(
        Arc::new(SerpClient::new("")),
        Arc::new(DiscussionClient::new(poller, "", "")),
        Arc::new(MockLlm::new("")),
    );
    let runner = ResearchRunner::new(deps)?;
    Ok(if dot {
        generate_dot(runner.graph())
    } else {
        generate_text(runner.graph())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config::load_and_apply("prism", None) {
        eprintln!("prism: config not loaded: {}", e);
    }
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose)?;

    if let Some(Command::Graph(ga)) = &args.cmd {
        println!("{}", graph_text(ga.dot)?);
        return Ok(());
    }

    let runner = match build_runner() {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("prism: {}", e);
            std::process::exit(1);
        }
    };

    match &args.cmd {
        Some(Command::Serve(sa)) => {
            if let Err(e) = serve::run_serve(sa.addr.as_deref(), runner).await {
                eprintln!("serve error: {}", e);
                std::process::exit(1);
            }
            return Ok(());
        }
        Some(Command::Graph(_)) | None => {}
    }

    let opts = args.output();
    match args.question() {
        Some(question) => {
            if let Err(e) = run_once(&runner, &question, &opts).await {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        None => repl::run_repl_loop(&runner, &opts).await?,
    }
    Ok(())
}
