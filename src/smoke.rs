// ABOUTME: Direct-run smoke test against the configured database
// ABOUTME: Prints the in450a row count and the first few in450b names, then closes

use std::io::Write;

use crate::cli::{SmokeArgs, Startup};
use crate::config::ConnectionProfile;
use crate::db::{Connector, DataAccess, PgConnector};
use crate::models::{Row, RowLimit, Table};

fn format_names(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|v| v.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the smoke test with any connector. The session is closed whether or
/// not the queries succeed.
pub async fn run<C: Connector, W: Write>(
    connector: &C,
    profile: ConnectionProfile,
    names: RowLimit,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut session = connector.session(profile);

    let result: anyhow::Result<()> = async {
        let count = session.count(Table::In450a).await?;
        writeln!(out, "in450a count: {}", count)?;

        let rows = session.in450b_names(names).await?;
        writeln!(
            out,
            "First {} names from in450b: {}",
            names,
            format_names(&rows)
        )?;
        Ok(())
    }
    .await;

    if let Err(e) = session.close().await {
        log::warn!("Error while closing the connection: {}", e);
    }
    result
}

/// Entry point for `in450-viewer smoke`
pub fn execute(args: &SmokeArgs, startup: &Startup) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let names = RowLimit::clamped(u64::from(args.names));
    let mut stdout = std::io::stdout();
    runtime.block_on(run(&PgConnector, startup.profile.clone(), names, &mut stdout))
}
