//! Run a Bell-state experiment on the QX simulator
//!
//! Usage:
//! ```bash
//! export QX_API_TOKEN="your-api-token"
//! cargo run --example run_experiment -- [backend]
//! ```

use anyhow::Context;
use qx_client::prelude::*;
use std::sync::Arc;

const BELL: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
measure q -> c;
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let backend = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_BACKEND.to_string());

    let options = DialOptions::from_env().context("reading QX_* environment")?;
    let session = Session::dial(options).await.context("logging in")?;
    let client = Client::new(Arc::new(session), ExecOptions::new().with_shots(1024));

    println!("QX API version: {}", client.version().await?);
    let credits = client.credits().await?;
    println!("Credits remaining: {}", credits.remaining);

    let backends = client.available_backends(&ExecOptions::new()).await?;
    println!("Online backends:");
    for b in backends.iter() {
        let kind = if b.simulator { "simulator" } else { "device" };
        println!("  • {} ({}, {} qubits)", b.name, kind, b.n_qubits);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    match client
        .run_experiment(&cancel, BELL, &ExecOptions::new().with_backend(&backend))
        .await
    {
        Ok(()) => println!("✓ Experiment submitted to {backend}"),
        Err(e) if e.is_caller_correctable() => println!("✗ {e}"),
        Err(e) => return Err(e.into()),
    }

    let codes = client.last_codes().await?;
    if let Some(code) = codes.codes.first() {
        println!(
            "Latest code {} has {} executions",
            code.id,
            code.executions.len()
        );
    }

    Ok(())
}
