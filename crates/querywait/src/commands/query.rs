//! `querywait query`: run the query once and print the records

use querywait_core::{Config, QueryExecutor};
use tracing::{debug, info};

use super::prepare_execution;
use crate::cli::ExecArgs;
use crate::error::{QueryWaitError, Result};
use crate::output::print_output;

pub async fn handle_query(config: &Config, args: &ExecArgs) -> Result<()> {
    let execution = prepare_execution(config, args)?;
    debug!("Executing query once");

    let records = execution
        .executor
        .execute(&execution.query, &execution.options)
        .await
        .map_err(|e| QueryWaitError::QueryFailed {
            message: e.to_string(),
        })?;
    info!("Query returned {} record(s)", records.len());

    print_output(records, args.output)?;
    Ok(())
}
