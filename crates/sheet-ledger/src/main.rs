mod bootstrap;
mod report;

use std::io::IsTerminal;

use anyhow::Result;
use ledger_core::settings::Settings;
use ledger_data::source;
use ledger_runtime::session::Session;

use crate::report::ReportFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Sheet Ledger v{} starting", env!("CARGO_PKG_VERSION"));

    let month = settings.selected_month();
    let format = ReportFormat::parse(&settings.format);
    tracing::info!(
        "Month: {}, Bucket: {}, Format: {}",
        month,
        settings.bucket,
        settings.format
    );

    let source = source::from_config(&settings.source_config())?;
    let mut session = Session::start(source);

    if format == ReportFormat::Table && std::io::stderr().is_terminal() {
        let loading = report::render(&session.state(), settings.bucket, month, format)?;
        eprint!("{loading}");
    }

    tokio::select! {
        _ = session.ready() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; exiting before the ledger finished loading");
            return Ok(());
        }
    }

    let output = report::render(&session.state(), settings.bucket, month, format)?;
    print!("{output}");

    Ok(())
}
