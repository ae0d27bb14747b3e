use crate::bridge::model::{MatchRequest, ReportModel};
use crate::workflow::runner::Runner;
use log::{info, warn};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub fn bridge_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

type SharedReport = Arc<RwLock<ReportModel>>;

/// Hosts the matching HTTP endpoint and keeps the most recent report.
pub struct MatchBridge {
    state: SharedReport,
    runner: Arc<Runner>,
}

impl MatchBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ReportModel::default())),
            runner,
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let report_route = warp::path("report")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedReport| {
                let snapshot = state.read().map(|guard| guard.clone()).unwrap_or_default();
                warp::reply::json(&snapshot)
            });

        let match_route = warp::path("match")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(handle_match);

        report_route.or(match_route)
    }

    /// Serves until Ctrl+C.
    pub async fn serve(&self, addr: SocketAddr) {
        let (bound, server) =
            warp::serve(self.routes()).bind_with_graceful_shutdown(addr, async {
                if tokio::signal::ctrl_c().await.is_err() {
                    warn!("could not listen for Ctrl+C; stop the process to exit");
                    std::future::pending::<()>().await;
                }
            });
        info!("match bridge listening on http://{}", bound);
        server.await;
        info!("match bridge stopped");
    }

    pub fn publish(&self, model: &ReportModel) {
        if let Ok(mut guard) = self.state.write() {
            *guard = model.clone();
        }
        println!(
            "[bridge] rows: {}, matched: {}/{}",
            model.rows.len(),
            model.summary.matched,
            model.summary.truth_total
        );
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ReportModel {
        self.state.read().unwrap().clone()
    }
}

async fn handle_match(
    request: MatchRequest,
    state: SharedReport,
    runner: Arc<Runner>,
) -> Result<impl Reply, Infallible> {
    let config = runner
        .config()
        .with_overrides(request.window_ms, request.tolerance_m);
    let runner = Runner::new(config);
    let outcome =
        tokio::task::spawn_blocking(move || runner.execute(&request.truth, &request.sensor, None))
            .await
            .unwrap_or_else(|err| Err(anyhow::anyhow!("match task failed: {err}")));

    match outcome {
        Ok(result) => {
            let model = ReportModel {
                rows: result.rows,
                summary: result.outcome.summary,
            };
            if let Ok(mut guard) = state.write() {
                *guard = model.clone();
            }
            info!(
                "POST /match -> {} rows from {} truth rows",
                model.rows.len(),
                model.summary.truth_total
            );
            Ok(warp::reply::with_status(
                warp::reply::json(&model),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            warn!("match request rejected: {:#}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({
                    "status": "error",
                    "message": format!("{:#}", err),
                })),
                StatusCode::BAD_REQUEST,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_flight, FlightConfig};
    use crate::workflow::config::WorkflowConfig;
    use matchcore::matching::MatchSummary;
    use matchcore::prelude::SearchStrategy;

    fn bridge() -> MatchBridge {
        let cfg = WorkflowConfig::from_args(100, 50.0, SearchStrategy::Linear, false);
        MatchBridge::new(Arc::new(Runner::new(cfg)))
    }

    fn body() -> serde_json::Value {
        json!({
            "truth": [{
                "datetime(utc)": "2024-01-01T00:00:00.000Z",
                "latitude": 10.0,
                "longitude": 20.0,
                "altitude_above_seaLevel(meters)": 100
            }],
            "sensor": [
                {"Received": "2024-01-01T00:00:00.050Z", "GeoPosition": "POINT(20.0001 10.0001)", "Altitude": 0},
                {"Received": "2024-01-01T00:00:00.090Z", "GeoPosition": "POINT(20.0002 10.0002)", "Altitude": 150}
            ]
        })
    }

    #[tokio::test]
    async fn post_match_returns_rows_and_updates_report() {
        let bridge = bridge();
        let routes = bridge.routes();

        let response = warp::test::request()
            .method("POST")
            .path("/match")
            .json(&body())
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let model: ReportModel = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(model.rows.len(), 1);
        assert_eq!(model.rows[0].distance_m, "15.61");
        assert_eq!(model.rows[0].measurement.as_str(), "2D");
        assert_eq!(model.rows[0].within_tolerance, 1);

        let response = warp::test::request()
            .method("GET")
            .path("/report")
            .reply(&routes)
            .await;
        let report: ReportModel = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(report.summary.matched, 1);
        assert_eq!(bridge.snapshot().rows.len(), 1);
    }

    #[tokio::test]
    async fn request_overrides_apply() {
        let bridge = bridge();
        let routes = bridge.routes();
        let mut request = body();
        request["window_ms"] = json!(40);

        let response = warp::test::request()
            .method("POST")
            .path("/match")
            .json(&request)
            .reply(&routes)
            .await;
        let model: ReportModel = serde_json::from_slice(response.body()).unwrap();
        assert!(model.rows.is_empty());
        assert_eq!(model.summary.no_match, 1);
    }

    #[tokio::test]
    async fn invalid_tolerance_is_bad_request() {
        let bridge = bridge();
        let routes = bridge.routes();
        let mut request = body();
        request["tolerance_m"] = json!(-3.0);

        let response = warp::test::request()
            .method("POST")
            .path("/match")
            .json(&request)
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bridge.snapshot().summary, MatchSummary::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn report_is_served_while_a_match_runs() {
        let bridge = bridge();
        let routes = bridge.routes();
        let flight = build_flight(&FlightConfig {
            samples: 2_000,
            ..Default::default()
        })
        .unwrap();
        let request = MatchRequest {
            truth: flight.truth,
            sensor: flight.sensor,
            ..Default::default()
        };

        let post = warp::test::request()
            .method("POST")
            .path("/match")
            .json(&request)
            .reply(&routes);
        let get = warp::test::request()
            .method("GET")
            .path("/report")
            .reply(&routes);
        let (posted, reported) = tokio::join!(post, get);

        assert_eq!(posted.status(), StatusCode::OK);
        assert_eq!(reported.status(), StatusCode::OK);
        let model: ReportModel = serde_json::from_slice(posted.body()).unwrap();
        assert_eq!(model.summary.truth_total, 2_000);
        assert_eq!(bridge.snapshot().summary.truth_total, 2_000);
    }

    #[test]
    fn publish_replaces_state() {
        let bridge = bridge();
        let model = ReportModel {
            summary: MatchSummary {
                truth_total: 4,
                matched: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        bridge.publish(&model);
        assert_eq!(bridge.snapshot().summary.matched, 2);
    }
}
