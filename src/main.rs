use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use symptom_intake::config::{self, EngineConfig};
use symptom_intake::diagnosis::{
    DiagnosisService, FailingDiagnosis, HttpDiagnosisClient, SqliteDocumentStore,
};
use symptom_intake::extraction::detect_spoken_symptoms;
use symptom_intake::models::{Message, MessageAuthor};
use symptom_intake::{init_tracing, ChatSession, DialogueError};

const HELP: &str = "Commands: /voice <transcript>, /reset, /quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = EngineConfig::from_env();

    let diagnosis: Arc<dyn DiagnosisService> = match &config.diagnosis_url {
        Some(url) => Arc::new(HttpDiagnosisClient::new(
            url,
            config.diagnosis_api_key.clone(),
            config.analysis_timeout(),
        )?),
        None => {
            tracing::warn!("INTAKE_DIAGNOSIS_URL not set, analyses will fall back");
            Arc::new(FailingDiagnosis::new())
        }
    };
    let documents = Arc::new(SqliteDocumentStore::open(&config.db_path)?);
    let user_id = std::env::var("USER").unwrap_or_else(|_| "local".to_string());

    let mut session = ChatSession::new(&user_id, diagnosis, documents, config);
    println!("{HELP}");
    let mut shown = print_new(session.transcript(), 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let text = match line {
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                shown = print_new(session.transcript(), 0);
                continue;
            }
            _ => match line.strip_prefix("/voice") {
                Some(transcript) => {
                    let found = detect_spoken_symptoms(transcript);
                    if found.is_empty() {
                        println!("[voice] no symptom keywords recognized");
                    } else {
                        println!("[voice] detected: {}", found.join(", "));
                    }
                    transcript.trim()
                }
                None => line,
            },
        };

        match session.send_user_message(text).await {
            Ok(()) => {}
            Err(DialogueError::SessionBusy) => {
                println!("(still analyzing, please wait)");
                continue;
            }
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
        shown = print_new(session.transcript(), shown);

        if session.is_analysis_pending() {
            session.wait_for_analysis().await;
            shown = print_new(session.transcript(), shown);
        }
    }

    session.close();
    Ok(())
}

/// Print assistant messages from `from` onward. Returns the new high-water mark.
fn print_new(transcript: &[Message], from: usize) -> usize {
    for message in transcript.iter().skip(from) {
        if message.author == MessageAuthor::Assistant {
            println!("\nassistant> {}\n", message.text);
        }
    }
    transcript.len()
}
