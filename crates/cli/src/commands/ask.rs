//! `taoloop ask`: Answer one question.

use std::path::Path;
use taoloop_agent::{AgentProfile, LoopReport};
use taoloop_core::message::Role;

pub async fn run(
    config_path: Option<&Path>,
    question: &str,
    profile: AgentProfile,
    max_iterations: Option<u32>,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    if let Some(max) = max_iterations {
        config.agent.max_iterations = max;
    }

    let provider = super::build_provider(&config)?;
    let agent = profile.tool_loop(provider, &config);

    eprint!("  Thinking...");
    let report = agent.run_detailed(question, &profile.system_prompt()).await;
    eprint!("\r              \r");

    if trace {
        print_trace(&report);
    }

    if report.outcome.is_degraded() {
        tracing::warn!(
            state = ?report.outcome.state(),
            iterations = report.iterations,
            "No answer from the model"
        );
    }

    println!("{}", report.outcome);
    Ok(())
}

/// Write the Thought/Action/Observation trace to stderr.
fn print_trace(report: &LoopReport) {
    eprintln!();
    for message in report.transcript.iter().skip(1) {
        let label = match message.role {
            Role::System => "System",
            Role::User => "Question",
            Role::Assistant => "Model",
            Role::Tool => "Observation",
        };
        for (i, line) in message.content.lines().enumerate() {
            if i == 0 {
                eprintln!("  {label:>11} > {line}");
            } else {
                eprintln!("  {:>11}   {line}", "");
            }
        }
    }
    eprintln!();
    eprintln!(
        "  {} round(s), {} tool call(s)",
        report.iterations, report.tool_calls
    );
    eprintln!();
}
