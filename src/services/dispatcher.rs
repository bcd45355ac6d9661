//! Parallel quote dispatch
//!
//! One POST per selected insurer, all in flight at once. Each task turns its
//! own failure into a `success: false` response, so one insurer going down
//! never affects the others. Results are delivered over a channel as soon as
//! each request resolves.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::insurers::InsurerId;
use crate::types::{CotizadorError, QuoteRequestBody, QuoteResponse, RawInsurerResult, Result};

/// Message for an insurer with no configured endpoint
pub const NO_ENDPOINT_MESSAGE: &str = "No endpoint definido";

/// Message for a transport failure with no usable error text
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error consultando datos";

/// Progress of a dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteEvent {
    /// One insurer resolved (success or error)
    Completed(RawInsurerResult),
    /// Every insurer has reported
    Finished,
}

#[derive(Clone)]
pub struct QuoteDispatcher {
    client: reqwest::Client,
    endpoints: Vec<(InsurerId, Option<String>)>,
}

impl QuoteDispatcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_endpoints(config.endpoint_table(), config.request_timeout())
    }

    /// Dispatcher over an explicit endpoint table
    pub fn with_endpoints(
        endpoints: Vec<(InsurerId, Option<String>)>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CotizadorError::Http(format!("HTTP client error: {}", e)))?;
        Ok(Self { client, endpoints })
    }

    /// Quoting URL for an insurer
    pub fn endpoint_url(&self, insurer: InsurerId) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|(id, _)| *id == insurer)
            .and_then(|(_, url)| url.as_deref())
    }

    /// Fan out to `insurers`, sending one `Completed` per insurer and then
    /// `Finished`. A dropped receiver is ignored.
    pub async fn dispatch(
        &self,
        request: &QuoteRequestBody,
        insurers: &[InsurerId],
        sender: &mpsc::Sender<QuoteEvent>,
    ) {
        let mut tasks = JoinSet::new();
        let mut in_flight = Vec::new();

        for &insurer in insurers {
            let name = insurer.name();
            let Some(url) = self.endpoint_url(insurer).map(str::to_string) else {
                tracing::warn!(insurer = name, "no endpoint configured");
                let _ = sender.send(QuoteEvent::Completed(RawInsurerResult::failure(
                    name,
                    NO_ENDPOINT_MESSAGE,
                    None,
                )));
                continue;
            };

            let client = self.client.clone();
            let body = request.clone();
            in_flight.push(name);
            tasks.spawn(async move {
                tracing::debug!(insurer = name, %url, "requesting quote");
                let data = fetch_quote(&client, name, &url, &body).await;
                if data.is_failure() {
                    tracing::warn!(insurer = name, message = ?data.message, "quote failed");
                } else {
                    tracing::info!(insurer = name, "quote received");
                }
                RawInsurerResult::resolved(name, data)
            });
        }

        collect_tasks(tasks, in_flight, sender).await;
        let _ = sender.send(QuoteEvent::Finished);
    }

    /// Run the dispatch on a background thread with its own runtime
    pub fn spawn(
        self,
        request: QuoteRequestBody,
        insurers: Vec<InsurerId>,
    ) -> mpsc::Receiver<QuoteEvent> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || match build_runtime() {
            Ok(runtime) => runtime.block_on(self.dispatch(&request, &insurers, &tx)),
            Err(e) => {
                tracing::error!(error = %e, "failed to start runtime");
                for insurer in insurers {
                    let _ = tx.send(QuoteEvent::Completed(RawInsurerResult::failure(
                        insurer.name(),
                        e.to_string(),
                        None,
                    )));
                }
                let _ = tx.send(QuoteEvent::Finished);
            }
        });

        rx
    }

    /// Blocking dispatch returning every result in `insurers` order
    pub fn quote_all(
        &self,
        request: &QuoteRequestBody,
        insurers: &[InsurerId],
    ) -> Result<Vec<RawInsurerResult>> {
        let runtime = build_runtime()?;
        let (tx, rx) = mpsc::channel();
        runtime.block_on(self.dispatch(request, insurers, &tx));
        drop(tx);

        let mut completed: Vec<RawInsurerResult> = rx
            .into_iter()
            .filter_map(|event| match event {
                QuoteEvent::Completed(result) => Some(result),
                QuoteEvent::Finished => None,
            })
            .collect();

        let position = |name: &str| {
            insurers
                .iter()
                .position(|id| id.name() == name)
                .unwrap_or(usize::MAX)
        };
        completed.sort_by_key(|r| position(&r.insurer));
        Ok(completed)
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CotizadorError::Io)
}

/// Forward task results as they finish. An insurer whose task died without
/// reporting still gets a failure, so no row stays loading.
async fn collect_tasks(
    mut tasks: JoinSet<RawInsurerResult>,
    mut in_flight: Vec<&'static str>,
    sender: &mpsc::Sender<QuoteEvent>,
) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                in_flight.retain(|name| *name != result.insurer);
                let _ = sender.send(QuoteEvent::Completed(result));
            }
            Err(e) => tracing::error!(error = %e, "quote task panicked"),
        }
    }

    for name in in_flight {
        let _ = sender.send(QuoteEvent::Completed(RawInsurerResult::failure(
            name,
            TRANSPORT_ERROR_MESSAGE,
            None,
        )));
    }
}

async fn fetch_quote(
    client: &reqwest::Client,
    name: &str,
    url: &str,
    body: &QuoteRequestBody,
) -> QuoteResponse {
    let response = match client.post(url).json(body).send().await {
        Ok(response) => response,
        Err(e) => return transport_failure(e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = body_message(&text).unwrap_or_else(|| {
            format!(
                "Error en {}: {} {}",
                name,
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
        });
        return QuoteResponse {
            success: Some(false),
            message: Some(message),
            status: Some(status.as_u16()),
            ..QuoteResponse::default()
        };
    }

    match response.json::<QuoteResponse>().await {
        Ok(data) => data,
        Err(e) => transport_failure(e.to_string()),
    }
}

/// `message` of a JSON error body, when non-empty
fn body_message(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("message")?
        .as_str()
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

fn transport_failure(message: String) -> QuoteResponse {
    let message = if message.trim().is_empty() {
        TRANSPORT_ERROR_MESSAGE.to_string()
    } else {
        message
    };
    QuoteResponse {
        success: Some(false),
        message: Some(message),
        ..QuoteResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;
    use crate::types::VehicleData;

    fn request() -> QuoteRequestBody {
        QuoteRequestBody::new(
            &VehicleData::default(),
            Gender::Femenino,
            "01-02-2001".into(),
            "07310",
        )
    }

    #[test]
    fn test_body_message() {
        assert_eq!(
            body_message(r#"{"message":"Código postal inválido"}"#),
            Some("Código postal inválido".to_string())
        );
        assert_eq!(body_message(r#"{"message":""}"#), None);
        assert_eq!(body_message("<html>"), None);
    }

    #[test]
    fn test_transport_failure_default_message() {
        let data = transport_failure(String::new());
        assert!(data.is_failure());
        assert_eq!(data.message.as_deref(), Some(TRANSPORT_ERROR_MESSAGE));
    }

    #[test]
    fn test_endpoint_url_lookup() {
        let dispatcher = QuoteDispatcher::with_endpoints(
            vec![
                (InsurerId::Hdi, Some("http://x/1".into())),
                (InsurerId::Gnp, None),
            ],
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(dispatcher.endpoint_url(InsurerId::Hdi), Some("http://x/1"));
        assert_eq!(dispatcher.endpoint_url(InsurerId::Gnp), None);
        assert_eq!(dispatcher.endpoint_url(InsurerId::Axa), None);
    }

    #[test]
    fn test_missing_endpoint_resolves_immediately() {
        let dispatcher =
            QuoteDispatcher::with_endpoints(vec![(InsurerId::Axa, None)], Duration::from_secs(1))
                .unwrap();
        let results = dispatcher.quote_all(&request(), &[InsurerId::Axa]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].data.as_ref().unwrap().message.as_deref(),
            Some(NO_ENDPOINT_MESSAGE)
        );
    }

    #[test]
    fn test_panicked_task_still_reports_failure() {
        let runtime = build_runtime().unwrap();
        let (tx, rx) = mpsc::channel();

        runtime.block_on(async {
            let mut tasks = JoinSet::new();
            tasks.spawn(async {
                RawInsurerResult::resolved("HDI", QuoteResponse::default())
            });
            tasks.spawn(async { panic!("boom") });
            collect_tasks(tasks, vec!["HDI", "GNP"], &tx).await;
        });
        drop(tx);

        let results: Vec<RawInsurerResult> = rx
            .into_iter()
            .map(|event| match event {
                QuoteEvent::Completed(result) => result,
                QuoteEvent::Finished => panic!("collect_tasks never finishes"),
            })
            .collect();

        assert_eq!(results.len(), 2);
        let gnp = results.iter().find(|r| r.insurer == "GNP").unwrap();
        let data = gnp.data.as_ref().unwrap();
        assert!(data.is_failure());
        assert_eq!(data.message.as_deref(), Some(TRANSPORT_ERROR_MESSAGE));
        assert!(results.iter().any(|r| r.insurer == "HDI" && !r.loading));
    }

    #[test]
    fn test_unreachable_endpoint_is_isolated_failure() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let dispatcher = QuoteDispatcher::with_endpoints(
            vec![
                (InsurerId::Hdi, Some("http://127.0.0.1:9/api/cotizacion/1".into())),
                (InsurerId::Chubb, None),
            ],
            Duration::from_secs(2),
        )
        .unwrap();

        let rx = dispatcher.spawn(request(), vec![InsurerId::Hdi, InsurerId::Chubb]);
        let events: Vec<QuoteEvent> = rx.iter().collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events.last(), Some(&QuoteEvent::Finished));
        for event in &events[..2] {
            match event {
                QuoteEvent::Completed(result) => {
                    let data = result.data.as_ref().unwrap();
                    assert!(data.is_failure());
                    assert!(!data.message.as_deref().unwrap_or_default().is_empty());
                }
                QuoteEvent::Finished => panic!("finished before all insurers reported"),
            }
        }
    }
}
