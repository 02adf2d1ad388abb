use std::thread;
use std::time::{Duration, Instant};

use netlify_client::models::Deploy;
use netlify_client::ClientError;
use tracing::debug;

use crate::errors::{CliResult, SkiffCliError};

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Samples deploy state at a fixed interval until a terminal state or the
/// deadline, whichever comes first. A provider-reported failure is still a
/// normal return; the caller inspects `state`. Generic over the fetch so the
/// loop can be driven without a server.
pub fn wait_for_terminal<F>(
    deploy_id: &str,
    mut fetch: F,
    timeout: Duration,
    interval: Duration,
) -> CliResult<Deploy>
where
    F: FnMut() -> Result<Deploy, ClientError>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let deploy = fetch().map_err(|source| SkiffCliError::Status {
            deploy_id: deploy_id.to_string(),
            source,
        })?;

        if deploy.state.is_terminal() {
            return Ok(deploy);
        }
        debug!(deploy_id, state = %deploy.state, "deploy not finished yet");

        if Instant::now() + interval >= deadline {
            return Err(SkiffCliError::DeployTimeout {
                deploy_id: deploy_id.to_string(),
                last_state: deploy.state,
                timeout,
            });
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use netlify_client::models::{Deploy, DeployLinks, DeployState};

    use super::*;

    fn deploy(state: DeployState) -> Deploy {
        Deploy {
            id: "d1".to_string(),
            state,
            required: vec![],
            site_id: None,
            name: None,
            ssl_url: None,
            links: DeployLinks::default(),
        }
    }

    #[test]
    fn returns_immediately_on_terminal_state() {
        let mut calls = 0;
        let result = wait_for_terminal(
            "d1",
            || {
                calls += 1;
                Ok(deploy(DeployState::Ready))
            },
            Duration::from_secs(5),
            Duration::from_millis(10),
        );

        assert_eq!(result.unwrap().state, DeployState::Ready);
        assert_eq!(calls, 1);
    }

    #[test]
    fn failure_states_are_returned_not_raised() {
        let result = wait_for_terminal(
            "d1",
            || Ok(deploy(DeployState::Failed)),
            Duration::from_secs(5),
            Duration::from_millis(10),
        );
        assert_eq!(result.unwrap().state, DeployState::Failed);
    }

    #[test]
    fn keeps_polling_until_terminal() {
        let mut calls = 0;
        let result = wait_for_terminal(
            "d1",
            || {
                calls += 1;
                if calls < 3 {
                    Ok(deploy(DeployState::Uploading))
                } else {
                    Ok(deploy(DeployState::Ready))
                }
            },
            Duration::from_secs(5),
            Duration::from_millis(5),
        );

        assert_eq!(result.unwrap().state, DeployState::Ready);
        assert_eq!(calls, 3);
    }

    #[test]
    fn times_out_within_one_interval_of_the_window() {
        let timeout = Duration::from_millis(60);
        let interval = Duration::from_millis(10);

        let started = Instant::now();
        let result = wait_for_terminal(
            "d1",
            || Ok(deploy(DeployState::Building)),
            timeout,
            interval,
        );
        let elapsed = started.elapsed();

        match result {
            Err(SkiffCliError::DeployTimeout {
                deploy_id,
                last_state,
                ..
            }) => {
                assert_eq!(deploy_id, "d1");
                assert_eq!(last_state, DeployState::Building);
            }
            other => panic!("expected DeployTimeout, got {other:?}"),
        }
        assert!(elapsed <= timeout + interval + Duration::from_millis(50));
    }

    #[test]
    fn fetch_errors_become_status_errors() {
        let result = wait_for_terminal(
            "d1",
            || {
                Err(ClientError::HttpError {
                    status: netlify_client::StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                })
            },
            Duration::from_secs(5),
            Duration::from_millis(10),
        );

        assert!(matches!(
            result,
            Err(SkiffCliError::Status { deploy_id, .. }) if deploy_id == "d1"
        ));
    }
}
