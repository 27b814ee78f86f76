//! cowlists - 標準入力の JSON 行でスキルを動かす
//!
//! 入力 1 行が 1 リクエストです:
//!
//! ```text
//! {"intent": "AddTaskToListIntent", "slots": {"taskName": "milk", "listName": "groceries"}}
//! ```
//!
//! `contexts` には前の応答の保留コンテキスト（スロット名からコンテキスト JSON）を
//! 戻せます。省略すればセッションはプロセス内に残ります。

mod render;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cowlists_core::app::{Intent, OrchestratorBuilder, SessionState};
use cowlists_core::config::SkillConfig;
use cowlists_core::impls::{InMemoryTaskService, RtmClient};
use cowlists_core::ports::RemoteTaskService;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (environment variables override it)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use an in-memory service with demo lists instead of the REST API
    #[arg(long)]
    offline: bool,

    /// Print each reply as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
struct Request {
    intent: String,
    #[serde(default)]
    slots: HashMap<String, String>,
    #[serde(default)]
    contexts: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct Response {
    speech: Vec<String>,
    contexts: BTreeMap<String, String>,
}

fn offline_service() -> InMemoryTaskService {
    InMemoryTaskService::new()
        .with_list("1", "Inbox")
        .with_list("2", "Groceries")
        .with_list("3", "Shopping list")
        .with_list("4", "Work")
        .with_task("2", "milk")
        .with_task("2", "eggs")
        .with_task("4", "quarterly report")
        .authenticated()
}

fn load_config(cli: &Cli) -> anyhow::Result<SkillConfig> {
    let config = match &cli.config {
        Some(path) => SkillConfig::from_file(path)?,
        None => SkillConfig::default(),
    };
    let mut config = config.from_env()?;
    if cli.offline && config.credentials().is_none() {
        config.api_key = Some("offline".to_string());
        config.secret = Some("offline".to_string());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cowlists=info,cowlists_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        endpoint = %config.endpoint,
        credentials = config.credentials().is_some(),
        offline = cli.offline,
        "configuration loaded"
    );

    let service: Arc<dyn RemoteTaskService> = if cli.offline {
        Arc::new(offline_service())
    } else {
        Arc::new(RtmClient::new(&config).context("failed to build HTTP client")?)
    };
    let mut orchestrator = OrchestratorBuilder::new(config).service(service).build()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "ignoring malformed request");
                continue;
            }
        };

        if let Some(contexts) = &request.contexts {
            match SessionState::from_slots(contexts) {
                Ok(session) => orchestrator.restore_session(session),
                Err(err) => warn!(error = %err, "ignoring carried contexts"),
            }
        }

        let intent = match Intent::from_request(&request.intent, &request.slots) {
            Ok(intent) => intent,
            Err(err) => {
                warn!(error = %err, "request not understood");
                continue;
            }
        };

        if !orchestrator.is_eligible(&intent) {
            info!(intent = %request.intent, "intent not eligible in current context");
            continue;
        }

        let reply = orchestrator.handle(intent).await;
        let speech = render::render_reply(&reply);

        if cli.json {
            let response = Response {
                speech,
                contexts: orchestrator.session().to_slots()?,
            };
            println!("{}", serde_json::to_string(&response)?);
        } else {
            for line in speech {
                println!("{line}");
            }
        }
    }

    Ok(())
}
