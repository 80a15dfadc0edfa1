use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use podium::kernel::event::Command;
use podium::kernel::job::JobId;
use podium::kernel::registry::{Focus, RegistryView};
use podium::{AudioArtifact, Backend, ClientConfig, HttpBackend, JobStatusPoller, Session, UploadCoordinator};

const HELP: &str = "Commands: upload <path> | open <id> | close <id> | delete <id> | home | list | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = ClientConfig::from_env()?;
    tracing::info!("Podium starting. Backend: {}", config.base_url);

    // 2. Session + Channels
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config.clone()));
    let (tx, rx) = mpsc::channel(100);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let poll_cancel = CancellationToken::new();

    let mut session = Session::new(rx, tx.clone(), poll_cancel.clone());
    let views = session.registry.subscribe();
    let poller = JobStatusPoller::new(backend.clone(), &config).spawn(tx.clone(), poll_cancel);
    let uploader = UploadCoordinator::new(backend.clone(), tx);

    let session_task = tokio::spawn(async move {
        session.run(backend, cmd_rx).await;
        session
    });
    tokio::spawn(announce_focus(views.clone()));

    // 3. Console (stands in for the view layer)
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (verb, arg) = line
            .split_once(' ')
            .map(|(verb, arg)| (verb, arg.trim()))
            .unwrap_or((line, ""));

        match verb {
            "" => continue,
            "upload" => {
                let uploader = uploader.clone();
                let path = arg.to_string();
                tokio::spawn(async move {
                    let submitted = match AudioArtifact::from_path(&path).await {
                        Ok(artifact) => uploader.submit(artifact).await,
                        Err(e) => Err(e),
                    };
                    match submitted {
                        Ok(job_id) => println!("Uploaded {} as {}. It will open when analysis completes.", path, job_id),
                        Err(e) => println!("Upload failed: {}. Please try again.", e),
                    }
                });
            }
            "open" => cmd_tx.send(Command::Open(JobId::new(arg))).await?,
            "close" => cmd_tx.send(Command::Close(JobId::new(arg))).await?,
            "delete" => cmd_tx.send(Command::Delete(JobId::new(arg))).await?,
            "home" => cmd_tx.send(Command::Home).await?,
            "list" => print_jobs(&views.borrow()),
            "quit" | "exit" => break,
            _ => println!("{}", HELP),
        }
    }

    // 4. Teardown: no snapshot is applied once the poller is stopped.
    let last = poller.stop().await?;
    drop(cmd_tx);
    session_task.await.context("session task failed to join")?;
    tracing::info!("Podium stopped after {} polls", last.0);
    Ok(())
}

async fn announce_focus(mut views: watch::Receiver<RegistryView>) {
    let mut last_focus = Focus::Home;
    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();
        if view.focus == last_focus {
            continue;
        }
        match &view.focus {
            Focus::Home => println!("-> Dashboard"),
            Focus::Job(id) => {
                let name = view
                    .open_jobs
                    .iter()
                    .find(|job| &job.id == id)
                    .map(|job| job.display_name.as_str())
                    .unwrap_or("?");
                println!("-> {} ({})", name, id);
            }
        }
        last_focus = view.focus;
    }
}

fn print_jobs(view: &RegistryView) {
    let dash = &view.dashboard;
    println!(
        "{} presentations, {} completed, {:.2} hours practiced",
        dash.total,
        dash.completed,
        dash.practiced_hours()
    );
    for job in &view.all_jobs {
        let duration = job
            .duration_seconds
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "-".to_string());
        let date = job
            .submitted_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  {:<32} {:>10} {:>7}  {}", job.id, job.display_name, date, duration, job.status);
    }
}
