//! Connects to the collaboration rooms of the given documents and reports
//! each one's status.
//!
//! ```text
//! collabgate-probe <document-id>...
//! ```
//!
//! Configured through the usual `COLLAB_*` variables. Exits non-zero if any
//! room did not connect.

use std::process::ExitCode;

use collabgate::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let mut documents: Vec<String> = std::env::args().skip(1).collect();
    documents.sort();
    documents.dedup();
    if documents.is_empty() {
        eprintln!("usage: collabgate-probe <document-id>...");
        return ExitCode::from(2);
    }

    let config = match CollabConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    collabgate::init_tracing(&config.log);

    match probe(config, &documents).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "probe failed");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every room connected.
async fn probe(config: CollabConfig, documents: &[String]) -> Result<bool, CollabError> {
    let mut client = CollabClient::from_config(config)?;

    let mut handles = Vec::with_capacity(documents.len());
    for document in documents {
        handles.push(client.open_document(document)?);
    }

    // Rooms are probed concurrently; each ends connected or gives up.
    let outcomes = wait_all(&handles).await;

    let mut all_connected = true;
    for (handle, outcome) in handles.iter().zip(outcomes) {
        if let Err(e) = &outcome {
            tracing::warn!(room = %handle.room(), error = %e, "room did not connect");
            all_connected = false;
        }
        println!("{}\t{}", handle.room(), handle.status());
    }

    client.shutdown().await;
    Ok(all_connected)
}

async fn wait_all(handles: &[SessionHandle]) -> Vec<Result<(), SessionError>> {
    let mut tasks = tokio::task::JoinSet::new();
    for (i, handle) in handles.iter().enumerate() {
        let handle = handle.clone();
        tasks.spawn(async move { (i, handle.connected().await) });
    }

    let mut outcomes: Vec<Option<Result<(), SessionError>>> =
        (0..handles.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((i, outcome)) => outcomes[i] = Some(outcome),
            Err(e) => tracing::error!(error = %e, "probe task failed"),
        }
    }

    outcomes
        .into_iter()
        .zip(handles)
        .map(|(outcome, handle)| {
            outcome.unwrap_or_else(|| Err(SessionError::Unavailable(handle.room().clone())))
        })
        .collect()
}
