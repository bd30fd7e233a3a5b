use axum::{extract::State, Json};

use crate::{
    error::AppJsonResult,
    observability::TracingObserver,
    state::{AppContext, Pipeline},
    summary::DashboardStats,
};

/// Re-classifies the lookback window on every call; nothing is cached.
pub async fn dashboard_stats(State(ctx): State<AppContext>) -> AppJsonResult<DashboardStats> {
    let settings = &ctx.config().settings;
    let items = Pipeline::new(&ctx, &TracingObserver)
        .fetch_and_classify(settings.stats_lookback)
        .await?;

    Ok(Json(DashboardStats::from_items(items, settings.recent_issues)))
}
