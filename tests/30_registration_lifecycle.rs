mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{admin, id_of, TestServer};

/// Invites `team_id` and sends the season's invitations; returns the registration id
async fn invited(server: &TestServer, season_id: i64, team_id: i64) -> Result<i64> {
    let (status, body) = server
        .post(
            &format!("/seasons/{}/registrations", season_id),
            &admin(),
            json!({"teamId": team_id}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "DRAFT_INVITE");
    let id = id_of(&body)?;

    let (status, _) = server
        .post(
            &format!("/seasons/{}/registrations/send-invitations", season_id),
            &admin(),
            json!({}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(id)
}

async fn submitted(server: &TestServer, season_id: i64, team_id: i64) -> Result<i64> {
    let id = invited(server, season_id, team_id).await?;
    let team_admin = common::token(100 + team_id, &["team_admin"], &[team_id]);

    let (status, _) = server
        .post(&format!("/registrations/{}/accept", id), &team_admin, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post(
            &format!("/registrations/{}/submit", id),
            &team_admin,
            json!({"submissionData": {"stadium": "X", "kits": "Y"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "SUBMITTED");
    Ok(id)
}

async fn statistics(server: &TestServer, season_id: i64) -> Result<Value> {
    let (status, body) = server
        .get(&format!("/seasons/{}/registrations/statistics", season_id), &admin())
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["data"].clone())
}

#[tokio::test]
async fn accept_twice_is_idempotent() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    let id = invited(&server, season_id, 5).await?;
    let team_admin = common::token(105, &["team_admin"], &[5]);

    let (status, first) = server
        .post(&format!("/registrations/{}/accept", id), &team_admin, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["alreadyAccepted"], false);

    let (status, second) = server
        .post(&format!("/registrations/{}/accept", id), &team_admin, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["alreadyAccepted"], true);
    assert_eq!(second["data"]["reviewedAt"], first["data"]["reviewedAt"]);
    assert_eq!(second["data"]["status"], "ACCEPTED");
    Ok(())
}

#[tokio::test]
async fn submit_then_approve_reports_counts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(1).await?;
    let id = submitted(&server, season_id, 5).await?;

    let (status, body) = server
        .post(&format!("/registrations/{}/approve", id), &admin(), json!({"note": "Welcome"}))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "APPROVED");
    assert_eq!(body["data"]["approvedCount"], 1);
    assert_eq!(body["data"]["requiredCount"], 1);
    assert_eq!(body["data"]["schedulingReady"], true);
    assert_eq!(body["data"]["reviewerNote"], "Welcome");
    Ok(())
}

#[tokio::test]
async fn last_needed_approval_flips_scheduling_ready() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    let a = submitted(&server, season_id, 5).await?;
    let b = submitted(&server, season_id, 6).await?;

    let (_, first) = server
        .post(&format!("/registrations/{}/change-status", a), &admin(), json!({"status": "APPROVED"}))
        .await?;
    assert_eq!(first["data"]["schedulingReady"], false);
    assert_eq!(statistics(&server, season_id).await?["schedulingReady"], false);

    let (_, second) = server
        .post(&format!("/registrations/{}/change-status", b), &admin(), json!({"status": "APPROVED"}))
        .await?;
    assert_eq!(second["data"]["schedulingReady"], true);

    let stats = statistics(&server, season_id).await?;
    assert_eq!(stats["statusCounts"]["APPROVED"], 2);
    assert_eq!(stats["statusCounts"]["DRAFT_INVITE"], 0);
    assert_eq!(stats["schedulingReady"], true);
    Ok(())
}

#[tokio::test]
async fn submission_without_kits_is_refused() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    let id = invited(&server, season_id, 5).await?;
    let team_admin = common::token(105, &["team_admin"], &[5]);

    server
        .post(&format!("/registrations/{}/accept", id), &team_admin, json!({}))
        .await?;
    let (status, body) = server
        .post(
            &format!("/registrations/{}/submit", id),
            &team_admin,
            json!({"submissionData": {"stadium": "X"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot move to SUBMITTED: submission is missing 'kits'");

    let (_, body) = server.get(&format!("/registrations/{}", id), &admin()).await?;
    assert_eq!(body["data"]["status"], "ACCEPTED");
    Ok(())
}

#[tokio::test]
async fn team_admins_cannot_review_or_touch_other_teams() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    let id = submitted(&server, season_id, 5).await?;

    let own = common::token(105, &["team_admin"], &[5]);
    let (status, _) = server
        .post(&format!("/registrations/{}/approve", id), &own, json!({}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let other_id = invited(&server, season_id, 6).await?;
    let (status, _) = server
        .post(&format!("/registrations/{}/decline", other_id), &own, json!({}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn duplicate_invitation_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    invited(&server, season_id, 5).await?;

    let (status, body) = server
        .post(&format!("/seasons/{}/registrations", season_id), &admin(), json!({"teamId": 5}))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn request_change_round_trip() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(2).await?;
    let id = submitted(&server, season_id, 5).await?;

    let (status, body) = server
        .post(
            &format!("/registrations/{}/request-change", id),
            &admin(),
            json!({"note": "Kit colours clash"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "REQUEST_CHANGE");

    let team_admin = common::token(105, &["team_admin"], &[5]);
    let (status, body) = server
        .post(
            &format!("/registrations/{}/submit", id),
            &team_admin,
            json!({"submissionData": {"stadium": "X", "kits": "Blue"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submissionData"]["kits"], "Blue");
    Ok(())
}

#[tokio::test]
async fn outsiders_get_forbidden_even_on_closed_registrations() -> Result<()> {
    let server = TestServer::spawn().await?;
    let season_id = server.season(1).await?;
    let id = submitted(&server, season_id, 5).await?;
    server
        .post(&format!("/registrations/{}/approve", id), &admin(), json!({}))
        .await?;

    let outsider = common::token(106, &["team_admin"], &[6]);
    let (status, body) = server
        .post(&format!("/registrations/{}/decline", id), &outsider, json!({}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = server
        .post(&format!("/registrations/{}/change-status", id), &admin(), json!({"status": "DECLINED"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot move to DECLINED: registration is APPROVED");
    Ok(())
}
