// SPDX-License-Identifier: MIT

mod common;

use challenge_sync::codec;
use challenge_sync::error::SyncError;
use challenge_sync::models::{Challenge, ChallengeMedia, MediaType};
use challenge_sync::repos::{self, NewTeam};
use common::*;

#[tokio::test]
async fn test_get_many_empty_id_list() {
    let (_store, _storage, state) = test_state();

    let outcome = state.teams.get_many(&[]).await;
    assert!(outcome.entities.is_empty());
    assert_eq!(outcome.errors, vec![SyncError::NO_IDENTIFIERS.to_string()]);
}

#[tokio::test]
async fn test_get_many_partial_resolution() {
    let (store, _storage, state) = test_state();
    seed_team(&store, &sample_team("t1", &["u1"])).await;

    let ids = vec!["t1".to_string(), "t-missing".to_string()];
    let outcome = state.teams.get_many(&ids).await;

    assert_eq!(outcome.entities.len(), 1);
    assert_eq!(outcome.entities[0].id, "t1");
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("t-missing – "));
    assert!(!outcome.is_complete());
}

#[tokio::test]
async fn test_get_many_all_resolve() {
    let (store, _storage, state) = test_state();
    seed_team(&store, &sample_team("t1", &["u1"])).await;
    seed_team(&store, &sample_team("t2", &["u2"])).await;

    let ids = vec!["t1".to_string(), "t2".to_string()];
    let outcome = state.teams.get_many(&ids).await;

    assert_eq!(outcome.entities.len(), 2);
    assert!(outcome.errors.is_empty());
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_create_user_rejects_bad_email() {
    let (_store, _storage, state) = test_state();

    let result = state.users.create_user("Ada", "Lovelace", "not-an-email").await;
    assert!(matches!(result, Err(SyncError::BadRequest(_))));
}

#[tokio::test]
async fn test_create_user_round_trips() {
    let (_store, _storage, state) = test_state();

    let created = state
        .users
        .create_user("Ada", "Lovelace", "ada@example.com")
        .await
        .unwrap();
    let fetched = state.users.get_one(&created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_membership_back_reference() {
    let (store, _storage, state) = test_state();
    seed_user(&store, &sample_user("u1")).await;

    state.users.add_team_membership("u1", "t1").await.unwrap();
    // A second add of the same team is a no-op.
    state.users.add_team_membership("u1", "t1").await.unwrap();

    let user = state.users.get_one("u1").await.unwrap();
    assert_eq!(user.associated_teams, vec!["t1"]);
}

#[tokio::test]
async fn test_create_team_attaches_members() {
    let (store, _storage, state) = test_state();
    seed_user(&store, &sample_user("u1")).await;
    seed_user(&store, &sample_user("u2")).await;

    let team = state
        .teams
        .create_team(&NewTeam {
            name: "The Underdogs".into(),
            participant_ids: vec!["u1".into(), "u2".into()],
        })
        .await
        .unwrap();

    assert_eq!(team.total_points(), 0);
    for user_id in ["u1", "u2"] {
        let user = state.users.get_one(user_id).await.unwrap();
        assert_eq!(user.associated_teams, vec![team.id.clone()]);
    }
}

#[tokio::test]
async fn test_create_team_partial_membership_failure_keeps_team() {
    let (store, _storage, state) = test_state();
    seed_user(&store, &sample_user("u1")).await;
    seed_user(&store, &sample_user("u2")).await;
    store.fail_path("allUsers/u2").await;

    let err = state
        .teams
        .create_team(&NewTeam {
            name: "Half attached".into(),
            participant_ids: vec!["u1".into(), "u2".into()],
        })
        .await
        .unwrap_err();

    // No rollback: the team record exists and the error names it.
    let team_id = err.partial_created_id().expect("created id").to_string();
    store.clear_faults().await;
    let team = state.teams.get_one(&team_id).await.unwrap();
    assert_eq!(team.name, "Half attached");
}

#[tokio::test]
async fn test_create_teams_returns_join_code() {
    let (store, _storage, state) = test_state();
    seed_user(&store, &sample_user("u1")).await;

    let specs = vec![
        NewTeam {
            name: "Alpha".into(),
            participant_ids: vec!["u1".into()],
        },
        NewTeam {
            name: "Beta".into(),
            participant_ids: vec!["u1".into()],
        },
    ];
    let (teams, join_code) = state.teams.create_teams(&specs).await.unwrap();

    assert_eq!(teams.len(), 2);
    assert!(!join_code.is_empty());
    assert!(join_code.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_add_points_guards() {
    let (store, _storage, state) = test_state();
    seed_team(&store, &sample_team("t1", &["u1"])).await;

    state.teams.add_points("t1", "u1", 10).await.unwrap();
    let team = state.teams.get_one("t1").await.unwrap();
    assert_eq!(team.total_points(), 10);

    let err = state.teams.add_points("t1", "stranger", 5).await.unwrap_err();
    assert!(matches!(err, SyncError::BadRequest(_)));

    let err = state.teams.add_points("t1", "u1", -20).await.unwrap_err();
    assert!(matches!(err, SyncError::BadRequest(_)));
}

#[tokio::test]
async fn test_record_completion_and_resolution() {
    let (store, _storage, state) = test_state();
    seed_user(&store, &sample_user("u1")).await;
    seed_team(&store, &sample_team("t1", &["u1"])).await;
    seed_challenge(
        &store,
        &Challenge {
            id: "c1".into(),
            title: "Lip sync battle".into(),
            prompt: "Film it".into(),
            date_posted: codec::parse_timestamp("01-03-2025 12:00:00").unwrap(),
            point_value: 25,
            media: None,
        },
    )
    .await;

    let completed_at = codec::parse_timestamp("10-03-2025 18:00:00").unwrap();
    state
        .teams
        .record_completion("t1", "c1", "u1", completed_at, 25)
        .await
        .unwrap();

    let mut team = state.teams.get_one("t1").await.unwrap();
    assert_eq!(team.total_points(), 25);
    assert_eq!(team.participation_dates["u1"], vec![completed_at]);

    // First resolution populates the cache.
    assert!(state.teams.resolve_completed_challenges(&mut team).await.unwrap());
    let resolved = team.completed_challenges.as_ref().unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].challenge.id, "c1");
    assert_eq!(resolved[0].completions[0].user.id, "u1");
    assert_eq!(resolved[0].completions[0].completed_at, completed_at);

    // A second attempt is a reported no-op, not an error.
    assert!(!state.teams.resolve_completed_challenges(&mut team).await.unwrap());
}

#[tokio::test]
async fn test_remove_media_keeps_field_when_object_delete_fails() {
    let (store, storage, state) = test_state();
    let media = ChallengeMedia {
        link: "https://cdn.example.com/clip.mp4".into(),
        storage_path: Some("challengeMedia/c1.mp4".into()),
        kind: MediaType::AutoPlayVideo,
    };
    seed_challenge(
        &store,
        &Challenge {
            id: "c1".into(),
            title: "Video drop".into(),
            prompt: "Watch it".into(),
            date_posted: codec::parse_timestamp("01-03-2025 12:00:00").unwrap(),
            point_value: 10,
            media: Some(media.clone()),
        },
    )
    .await;
    storage.put_object("challengeMedia/c1.mp4").await;
    storage.fail_path("challengeMedia/c1.mp4").await;

    let writes_before = store.writes().await.len();
    let err = state.challenges.remove_media("c1").await.unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));

    // The media field was never written.
    assert_eq!(store.writes().await.len(), writes_before);
    let challenge = state.challenges.get_one("c1").await.unwrap();
    assert_eq!(challenge.media, Some(media));
    assert!(storage.contains("challengeMedia/c1.mp4").await);
}

#[tokio::test]
async fn test_remove_media_link_only_clears_field() {
    let (store, _storage, state) = test_state();
    seed_challenge(
        &store,
        &Challenge {
            id: "c1".into(),
            title: "Video drop".into(),
            prompt: "Watch it".into(),
            date_posted: codec::parse_timestamp("01-03-2025 12:00:00").unwrap(),
            point_value: 10,
            media: Some(ChallengeMedia {
                link: "https://www.youtube.com/embed/abc123".into(),
                storage_path: None,
                kind: MediaType::LinkedVideo,
            }),
        },
    )
    .await;

    state.challenges.remove_media("c1").await.unwrap();
    let challenge = state.challenges.get_one("c1").await.unwrap();
    assert_eq!(challenge.media, None);
}

#[tokio::test]
async fn test_challenge_field_updates() {
    let (store, _storage, state) = test_state();
    seed_challenge(
        &store,
        &Challenge {
            id: "c1".into(),
            title: "Old title".into(),
            prompt: "Old prompt".into(),
            date_posted: codec::parse_timestamp("01-03-2025 12:00:00").unwrap(),
            point_value: 10,
            media: None,
        },
    )
    .await;

    state.challenges.update_title("c1", "New title").await.unwrap();
    state.challenges.update_prompt("c1", "New prompt").await.unwrap();
    state.challenges.update_point_value("c1", 40).await.unwrap();

    let challenge = state.challenges.get_one("c1").await.unwrap();
    assert_eq!(challenge.title, "New title");
    assert_eq!(challenge.prompt, "New prompt");
    assert_eq!(challenge.point_value, 40);
    // Untouched fields survive the merges.
    assert_eq!(
        challenge.date_posted,
        codec::parse_timestamp("01-03-2025 12:00:00").unwrap()
    );
}

#[tokio::test]
async fn test_global_announcement() {
    let (store, _storage, _state) = test_state();

    assert_eq!(repos::get_global_announcement(store.as_ref()).await.unwrap(), None);
    repos::set_global_announcement(store.as_ref(), "Finals this weekend!")
        .await
        .unwrap();
    assert_eq!(
        repos::get_global_announcement(store.as_ref()).await.unwrap(),
        Some("Finals this weekend!".to_string())
    );
}
