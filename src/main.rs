use chrono::{Datelike, Utc};
use dotenvy::dotenv;
use payroll_core::{
    config::{
        database::{create_connection, create_tables},
        payroll::load_default_config,
    },
    core::{ledger::seed_cash_registers, period::Period, summary::payroll_summary},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load payroll configuration
    let config = load_default_config()
        .inspect_err(|e| error!("Failed to load payroll configuration: {}", e))?;
    info!(company = %config.company.name, "Payroll configuration loaded.");

    // 4. Initialize database
    let db = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed cash registers on first run
    let seeded = seed_cash_registers(&db, &config).await?;
    if seeded > 0 {
        info!(seeded, "Cash registers created from configuration.");
    }

    // 6. Report on the current period
    let today = Utc::now().date_naive();
    let period = Period::new(today.month(), today.year())?;
    let summary = payroll_summary(&db, period).await?;
    info!(
        period = %period.label(),
        active = summary.active_employees,
        processed = summary.processed_slips,
        pending = summary.pending,
        total_base_salary = summary.total_base_salary,
        employer_inss = summary.employer_social_security,
        total_paid = summary.total_paid,
        "Current payroll period"
    );

    Ok(())
}
