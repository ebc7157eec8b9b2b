mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{admin, id_of, TestServer};

/// Schedules a match with referee 7 and supervisor 9 and plays it to FINISHED
async fn finished_match(server: &TestServer) -> Result<i64> {
    let season_id = server.season(2).await?;
    let (_, body) = server
        .post(
            &format!("/seasons/{}/matches", season_id),
            &admin(),
            json!({"homeTeamId": 1, "awayTeamId": 2, "kickoffAt": "2026-05-01T18:00:00Z"}),
        )
        .await?;
    let id = id_of(&body)?;

    server
        .post(
            &format!("/matches/{}/assign-officials", id),
            &admin(),
            json!({"mainRefereeId": 7, "supervisorId": 9}),
        )
        .await?;
    for to in ["READY", "IN_PROGRESS", "FINISHED"] {
        let (status, body) = server
            .post(&format!("/matches/{}/change-status", id), &admin(), json!({"status": to}))
            .await?;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }
    Ok(id)
}

fn report(referee_rating: i64) -> Value {
    json!({
        "refereeRating": referee_rating,
        "assistantRefereeRating": 7,
        "organizationRating": 8,
        "incidents": "None"
    })
}

fn supervisor() -> String {
    common::token(9, &["supervisor"], &[])
}

#[tokio::test]
async fn supervisor_files_one_report_per_match() -> Result<()> {
    let server = TestServer::spawn().await?;
    let match_id = finished_match(&server).await?;
    let path = format!("/matches/{}/supervisor-reports", match_id);

    let (status, body) = server.post(&path, &supervisor(), report(8)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["reviewStatus"], "pending");

    let (status, body) = server.post(&path, &supervisor(), report(8)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Supervisor report already submitted for this match");

    let (status, body) = server.get(&path, &supervisor()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn ratings_must_be_in_range() -> Result<()> {
    let server = TestServer::spawn().await?;
    let match_id = finished_match(&server).await?;

    let (status, body) = server
        .post(&format!("/matches/{}/supervisor-reports", match_id), &supervisor(), report(0))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn review_stores_approve_and_accepts_approved() -> Result<()> {
    let server = TestServer::spawn().await?;
    let match_id = finished_match(&server).await?;
    let (_, body) = server
        .post(&format!("/matches/{}/supervisor-reports", match_id), &supervisor(), report(8))
        .await?;
    let report_id = id_of(&body)?;

    let (status, body) = server
        .post(
            &format!("/supervisor-reports/{}/review", report_id),
            &admin(),
            json!({"reviewStatus": "approved", "reviewNote": "Thanks"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["reviewStatus"], "approve");
    assert_eq!(body["data"]["reviewedBy"], 1);

    for spelling in ["approve", "approved"] {
        let (status, body) = server
            .get(&format!("/supervisor-reports?reviewStatus={}", spelling), &admin())
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    }

    let (status, _) = server.get("/supervisor-reports?reviewStatus=bogus", &admin()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn change_request_and_resubmission() -> Result<()> {
    let server = TestServer::spawn().await?;
    let match_id = finished_match(&server).await?;
    let (_, body) = server
        .post(&format!("/matches/{}/supervisor-reports", match_id), &supervisor(), report(2))
        .await?;
    let report_id = id_of(&body)?;

    let (status, _) = server
        .post(
            &format!("/supervisor-reports/{}/review", report_id),
            &admin(),
            json!({"status": "request_changes", "note": "Justify the rating"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .call(
            Method::PUT,
            &format!("/supervisor-reports/{}", report_id),
            &supervisor(),
            Some(report(5)),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["reviewStatus"], "pending");
    assert_eq!(body["data"]["refereeRating"], 5);
    Ok(())
}

#[tokio::test]
async fn listing_all_reports_is_admin_only() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, _) = server.get("/supervisor-reports", &supervisor()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
