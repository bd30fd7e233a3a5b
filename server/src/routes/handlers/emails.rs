use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};

use crate::{
    error::{AppError, AppJsonResult, AppResult},
    model::response::{EmailIssue, MaxResultsQuery, ProcessEmailsRequest},
    observability::TracingObserver,
    prompt::Classifier,
    state::{AppContext, Pipeline, ProcessOutcome, RunOptions},
};

use super::positive_limit;

pub async fn list_emails(
    State(ctx): State<AppContext>,
    Query(query): Query<MaxResultsQuery>,
) -> AppJsonResult<Vec<EmailIssue>> {
    let limit = positive_limit(query.max_results, ctx.config().settings.max_results)?;
    let issues = Pipeline::new(&ctx, &TracingObserver).fetch(limit).await?;

    Ok(Json(issues.into_iter().map(EmailIssue::from).collect()))
}

pub async fn classify_email(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AppJsonResult<EmailIssue> {
    let lookback = ctx.config().settings.classify_lookback;
    let issue = Pipeline::new(&ctx, &TracingObserver)
        .fetch(lookback)
        .await?
        .into_iter()
        .find(|issue| issue.id == id)
        .ok_or_else(|| AppError::NotFound("Email not found".to_string()))?;

    let analysis = Classifier::new(ctx.model()).classify(&issue).await;

    Ok(Json(EmailIssue {
        issue,
        analysis: Some(analysis),
    }))
}

pub async fn process_emails(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> AppJsonResult<ProcessOutcome> {
    let request = process_request(&headers, &body)?;
    let options = RunOptions {
        limit: positive_limit(request.max_results, ctx.config().settings.max_results)?,
        send_notifications: request.send_notifications.unwrap_or(true),
    };

    let outcome = Pipeline::new(&ctx, &TracingObserver).run(options).await?;
    Ok(Json(outcome))
}

/// An empty body runs with defaults. Anything else must be a well-formed
/// JSON request, so an explicit `send_notifications: false` is never lost.
fn process_request(headers: &HeaderMap, body: &[u8]) -> AppResult<ProcessEmailsRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ProcessEmailsRequest::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return Err(AppError::BadRequest(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }

    let Json(request) = Json::<ProcessEmailsRequest>::from_bytes(body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn test_blank_body_means_defaults() {
        let request = process_request(&HeaderMap::new(), b"  \n").unwrap();
        assert_eq!(request.max_results, None);
        assert_eq!(request.send_notifications, None);
    }

    #[test]
    fn test_well_formed_body_is_parsed() {
        let request =
            process_request(&json_headers(), br#"{"send_notifications": false}"#).unwrap();
        assert_eq!(request.send_notifications, Some(false));
    }

    #[test]
    fn test_malformed_bodies_are_rejected() {
        let wrong_type = br#"{"max_results": "five", "send_notifications": false}"#;
        assert!(matches!(
            process_request(&json_headers(), wrong_type),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            process_request(&json_headers(), b"{not json"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            process_request(&HeaderMap::new(), br#"{"send_notifications": false}"#),
            Err(AppError::BadRequest(_))
        ));
    }
}
