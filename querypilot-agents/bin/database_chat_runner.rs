use clap::Parser;
use querypilot_agents::{config, ChatOptions, DatabaseChatAgent};
use querypilot_tools::ConnectionConfig;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Question to answer; starts an interactive session when omitted
    #[arg(short, long)]
    prompt: Option<String>,

    /// Path to config file containing API keys and database settings
    #[arg(short, long)]
    config: PathBuf,

    /// Persona used instead of the configured one
    #[arg(long)]
    system_prompt: Option<String>,

    /// Re-read the database schema before answering
    #[arg(long)]
    refresh_schema: bool,

    /// Print the rendered schema and exit
    #[arg(long)]
    print_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();
    let config = config::load_config(&args.config)?;

    // [database] wins over DATABASE_URL
    let (provider, connection) = match &config.database {
        Some(database) => database.connection()?,
        None => {
            let url = std::env::var("DATABASE_URL").map_err(|_| {
                anyhow::anyhow!(
                    "Database must be configured via a [database] section or the DATABASE_URL environment variable"
                )
            })?;
            (config::provider_from_url(&url)?, ConnectionConfig::ConnectionString(url))
        }
    };

    let client = config::create_llm_client(&config)?;
    let agent = DatabaseChatAgent::new(client, config::agent_settings(&config));
    agent.connect(provider, connection).await?;

    if args.print_schema {
        println!("{}", agent.get_schema(args.refresh_schema).await?);
        return Ok(());
    }
    if args.refresh_schema {
        agent.get_schema(true).await?;
    }

    let options = ChatOptions {
        system_prompt: args.system_prompt.clone(),
    };

    if let Some(prompt) = &args.prompt {
        let answer = agent.chat(prompt, options).await?;
        println!("{}", answer);
        agent.disconnect().await;
        return Ok(());
    }

    println!("Connected to {}. Ask a question, or type 'exit' to quit.", provider.display_name());
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.chat(question, options.clone()).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => eprintln!("Error: {}\n", e),
        }
    }

    agent.disconnect().await;
    Ok(())
}
