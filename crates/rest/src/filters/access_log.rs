//! Access logging in the common log format.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::filter::Filter;
use crate::request::Request;
use crate::response::Response;

/// Writes one log line per exchange during the finish phase, after the
/// response bytes are on the wire. The line follows the combined log format,
/// with `-` for everything unknown. Exchanges that failed before a request
/// could be built are logged too.
#[derive(Debug, Default)]
pub struct AccessLog;

impl AccessLog {
    pub fn new() -> AccessLog {
        AccessLog
    }

    fn format_line(request: Option<&Request>, response: &Response) -> String {
        let host = request.map_or("-", Request::remote_host);
        let line = request.map_or_else(|| "-".to_owned(), ToString::to_string);
        let length = response
            .content_length()
            .map_or_else(|| "-".to_owned(), |length| length.to_string());
        let referer = header_or_dash(request, "Referer");
        let user_agent = header_or_dash(request, "User-Agent");
        let time = Utc::now().format("%d/%b/%Y:%H:%M:%S %z");
        format!(
            "{host} - - [{time}] \"{line}\" {status} {length} \"{referer}\" \"{user_agent}\"",
            status = response.status().as_u16(),
        )
    }
}

fn header_or_dash(request: Option<&Request>, name: &str) -> String {
    request
        .and_then(|request| request.header(name))
        .map_or_else(|| "-".to_owned(), |header| header.combined())
}

#[async_trait]
impl Filter for AccessLog {
    async fn finish(&self, request: Option<&Request>, response: &Response) {
        info!(target: "access_log", "{}", AccessLog::format_line(request, response));
    }
}
