//! Command implementations

pub mod profile;
pub mod query;
pub mod wait;

use std::collections::BTreeMap;
use std::time::Duration;

use querywait_core::Config;
use tracing::debug;

use crate::cli::ExecArgs;
use crate::error::{QueryWaitError, Result};
use crate::executor::{HttpQueryExecutor, HttpQueryOptions};
use crate::template;

/// Default per-request timeout when neither flag nor profile sets one
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to run a query: executor, options and rendered text
pub struct Execution {
    pub executor: HttpQueryExecutor,
    pub options: HttpQueryOptions,
    pub query: String,
}

/// Resolve endpoint, headers and query text from flags and config
///
/// `--endpoint` overrides the profile endpoint; when it is given without
/// `--profile`, no profile is consulted. `--header` values override
/// profile headers of the same name.
pub fn prepare_execution(config: &Config, args: &ExecArgs) -> Result<Execution> {
    let profile = match (&args.endpoint, &args.profile) {
        (Some(_), None) => None,
        (_, explicit) => config.resolve_profile(explicit.as_deref())?,
    };

    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| profile.map(|(_, p)| p.endpoint.clone()))
        .ok_or(QueryWaitError::NoEndpoint)?;

    let mut headers: BTreeMap<String, String> = profile
        .map(|(_, p)| p.headers.clone())
        .unwrap_or_default();
    headers.extend(args.headers.iter().cloned());

    let request_timeout = args
        .request_timeout
        .or_else(|| profile.map(|(_, p)| p.request_timeout()))
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

    if let Some((name, _)) = profile {
        debug!("Using profile '{}'", name);
    }
    debug!("Endpoint: {} (request timeout {:?})", endpoint, request_timeout);

    let query = template::render(&args.query, &args.vars)?;
    let executor = HttpQueryExecutor::new(&endpoint, &headers, request_timeout)?;

    Ok(Execution {
        executor,
        options: HttpQueryOptions { limit: args.limit },
        query,
    })
}
