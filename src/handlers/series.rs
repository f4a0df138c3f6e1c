//! Series endpoint handler.
//!
//! Serves the snapshot published by the tick task as JSON. With
//! `?metric=<name>` only that series is returned.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fritzmon::{Metric, Series};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub metric: Option<String>,
}

/// Handler for the /series endpoint.
#[instrument(skip(state))]
pub async fn series_handler(
    State(state): State<SharedState>,
    Query(query): Query<SeriesQuery>,
) -> Response {
    debug!("Processing /series request");

    let snapshot = state.series.borrow().clone();

    match query.metric.as_deref() {
        None => Json(snapshot).into_response(),
        Some(name) => match Metric::from_name(name) {
            Some(metric) => Json(Series {
                metric,
                points: snapshot.points(metric).to_vec(),
            })
            .into_response(),
            None => (
                StatusCode::BAD_REQUEST,
                format!(
                    "unknown metric '{}', expected one of: sent, recv, sentMax, recvMax",
                    name
                ),
            )
                .into_response(),
        },
    }
}
