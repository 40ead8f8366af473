//! Schedule server client.
//!
//! One GET per call against `<server>/spotlivescreen/XmlServlet`. Nothing is
//! retried here; callers decide when to try again.

use crate::error::{Result, ScheduleError};
use crate::model::Schedule;
use crate::parser::parse_schedule;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, ScheduleEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const ENDPOINT_PATH: &str = "/spotlivescreen/XmlServlet";

/// Protocol version announced to the server.
pub const PROTOCOL_VERSION: &str = "600";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ScheduleFetcher {
    http_client: Arc<dyn HttpClient>,
    server_url: String,
    monitor_id: String,
    screen_user: String,
    event_bus: Option<EventBus>,
}

impl ScheduleFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &PlayerConfig) -> Self {
        Self {
            http_client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            monitor_id: config.monitor_id.clone(),
            screen_user: config.screen_user.clone(),
            event_bus: None,
        }
    }

    /// Publish fetch outcomes on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn monitor_id(&self) -> &str {
        &self.monitor_id
    }

    /// Full request URL. Query keys are emitted in byte order, which is what
    /// the server's existing clients send.
    pub fn request_url(&self, heartbeat: bool) -> String {
        let mut params: Vec<(&str, &str)> = vec![
            ("version", PROTOCOL_VERSION),
            ("idSchermo", self.monitor_id.as_str()),
        ];
        if heartbeat {
            params.push(("update", "1"));
        }
        if !self.screen_user.is_empty() {
            params.push(("userschermo", self.screen_user.as_str()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode_query_value(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}{}?{}", self.server_url, ENDPOINT_PATH, query)
    }

    /// Fetch and parse the current schedule.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::Transport`] when the server is unreachable or slow
    /// - [`ScheduleError::Remote`] on a non-2xx status
    /// - [`ScheduleError::Parse`] when the body is not a schedule document
    #[instrument(skip(self), fields(monitor_id = %self.monitor_id))]
    pub async fn fetch_schedule(&self) -> Result<Schedule> {
        let result = self.fetch_and_parse().await;

        match &result {
            Ok(schedule) => {
                info!(
                    screen = %schedule.screen.name,
                    links = schedule.links.len(),
                    "Schedule fetched"
                );
                self.emit(ScheduleEvent::Fetched {
                    monitor_id: self.monitor_id.clone(),
                    screen_name: schedule.screen.name.clone(),
                    links: u32::try_from(schedule.links.len()).unwrap_or(u32::MAX),
                });
            }
            Err(e) => {
                warn!(error = %e, "Schedule fetch failed");
                self.emit(ScheduleEvent::FetchFailed {
                    monitor_id: self.monitor_id.clone(),
                    message: e.to_string(),
                });
            }
        }

        result
    }

    async fn fetch_and_parse(&self) -> Result<Schedule> {
        let request = HttpRequest::get(self.request_url(false)).timeout(FETCH_TIMEOUT);
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(ScheduleError::Remote {
                status: response.status,
            });
        }

        let body = response
            .text()
            .map_err(|e| ScheduleError::Parse(e.to_string()))?;
        debug!(bytes = body.len(), "Parsing schedule document");
        parse_schedule(&body)
    }

    /// Tell the server this monitor is alive. The body is ignored.
    #[instrument(skip(self), fields(monitor_id = %self.monitor_id))]
    pub async fn send_heartbeat(&self) -> Result<()> {
        let request = HttpRequest::get(self.request_url(true)).timeout(HEARTBEAT_TIMEOUT);
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "Heartbeat rejected");
            return Err(ScheduleError::Remote {
                status: response.status,
            });
        }

        debug!("Heartbeat acknowledged");
        self.emit(ScheduleEvent::HeartbeatSent {
            monitor_id: self.monitor_id.clone(),
        });
        Ok(())
    }

    fn emit(&self, event: ScheduleEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Schedule(event));
        }
    }
}

/// Form-style percent encoding: unreserved bytes kept, space as `+`.
fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}
