//! Poem crew demo.
//!
//! Builds a three-agent crew (poet, translator, writer), prints its graph and
//! runs it. The writer stores the translated poem with a file-writing tool.
//!
//! # Environment Variables
//!
//! - `DEEPSEEK_API_KEY`: API key (a `.env` file is loaded if present)
//! - `DEEPSEEK_BASE_URL`: Optional API base URL
//! - `RUST_LOG`: Tracing filter (default: "info,agentic_patterns=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin crew-demo
//! # crew from a YAML definition instead of the built-in one:
//! cargo run --bin crew-demo -- crew.yaml
//! # print the graph and execution order without calling the model:
//! cargo run --bin crew-demo -- --plan-only
//! ```

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use agentic_patterns::crews::CrewConfig;
use agentic_patterns::llms::{DeepSeekCompletion, ScriptedLLM};
use agentic_patterns::tools::{BaseTool, ParamKind, Tool, ToolParameter};
use agentic_patterns::{Agent, BaseLLM, Crew};

const WRITER_AGENT: &str = "Writer Agent";

fn write_str_to_txt() -> Arc<dyn BaseTool> {
    Tool::new(
        "write_str_to_txt",
        "Writes a string to a txt file, overwriting the file if it already exists.",
        |args| {
            let data = args.get("string_data").and_then(Value::as_str).unwrap_or_default();
            let filename = args.get("txt_filename").and_then(Value::as_str).unwrap_or_default();
            std::fs::write(filename, data)?;
            tracing::info!("Data successfully written to {}", filename);
            Ok(Value::from(format!("Data successfully written to {}", filename)))
        },
    )
    .with_parameter(
        ToolParameter::new("string_data", ParamKind::String)
            .with_description("The string containing the data to be written to the file."),
    )
    .with_parameter(
        ToolParameter::new("txt_filename", ParamKind::String)
            .with_description("The name of the text file to which the data should be written."),
    )
    .into_shared()
}

fn poem_crew(llm: Arc<dyn BaseLLM>) -> anyhow::Result<Crew> {
    let mut crew = Crew::new();
    let poet = crew.add_agent(Agent::new(
        "Poet Agent",
        "You are a well-known poet, who enjoys creating high quality poetry.",
        "Write a poem about the meaning of life",
        "Just output the poem, without any title or introductory sentences",
        llm.clone(),
    ))?;
    let translator = crew.add_agent(Agent::new(
        "Poem Translator Agent",
        "You are an expert translator especially skilled in Spanish",
        "Translate a poem into Spanish",
        "Just output the translated poem and nothing else",
        llm.clone(),
    ))?;
    let writer = crew.add_agent(
        Agent::new(
            WRITER_AGENT,
            "You are an expert transcriber, that loves writing poems into txt files",
            "You'll receive a Spanish poem in your context. You need to write the poem into './poem.txt' file",
            "A txt file containing the poem received from the context",
            llm,
        )
        .with_tool(write_str_to_txt()),
    )?;
    crew.chain(&[poet, translator, writer])?;
    Ok(crew)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentic_patterns=debug".into()),
        )
        .init();

    let mut plan_only = false;
    let mut definition = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--plan-only" => plan_only = true,
            path => definition = Some(path.to_string()),
        }
    }

    // Planning never calls the model, so it does not need credentials.
    let llm: Arc<dyn BaseLLM> = if plan_only {
        ScriptedLLM::new(Vec::<String>::new()).shared()
    } else {
        Arc::new(DeepSeekCompletion::from_env().context("DeepSeek client configuration")?)
    };
    tracing::info!("Using model {} ({})", llm.model(), llm.provider());

    let mut crew = match definition {
        Some(path) => {
            tracing::info!("Loading crew definition from {}", path);
            let config = CrewConfig::from_yaml_file(&path)?;
            let (crew, _) = config.build(llm, |name| {
                if name == WRITER_AGENT {
                    vec![write_str_to_txt()]
                } else {
                    Vec::new()
                }
            })?;
            crew
        }
        None => poem_crew(llm)?,
    };

    println!("{}", crew.plot());
    let order = crew.execution_order()?;
    tracing::info!("Execution order: {}", order.join(" -> "));
    if plan_only {
        return Ok(());
    }

    let output = crew.run()?;
    print!("{}", output);
    Ok(())
}
