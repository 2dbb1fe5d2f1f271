use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tower::ServiceExt as _;

use video_api::api::{create_router, App};
use video_api::database::Database;

async fn server() -> TestServer {
    let database = Database::memory().await.unwrap();
    TestServer::new(create_router(App::new(database))).unwrap()
}

fn intro() -> Value {
    json!({ "name": "Intro", "views": 100, "likes": 10 })
}

#[tokio::test]
async fn create_update_delete_lifecycle() {
    let server = server().await;

    let created = server.put("/video/1").json(&intro()).await;
    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "id": 1, "name": "Intro", "views": 100, "likes": 10 }));

    let updated = server.patch("/video/1").json(&json!({ "likes": 20 })).await;
    updated.assert_status(StatusCode::OK);
    updated.assert_json(&json!({ "id": 1, "name": "Intro", "views": 100, "likes": 20 }));

    let deleted = server.delete("/video/1").await;
    deleted.assert_status(StatusCode::NO_CONTENT);
    assert!(deleted.text().is_empty());

    let fetched = server.get("/video/1").await;
    fetched.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_returns_exactly_what_was_created() {
    let server = server().await;

    server
        .put("/video/42")
        .json(&json!({ "name": "Deep dive", "views": 0, "likes": 7 }))
        .await
        .assert_status(StatusCode::CREATED);

    let fetched = server.get("/video/42").await;
    fetched.assert_status(StatusCode::OK);
    fetched.assert_json(&json!({ "id": 42, "name": "Deep dive", "views": 0, "likes": 7 }));
}

#[tokio::test]
async fn second_create_conflicts_and_keeps_the_first_record() {
    let server = server().await;

    server.put("/video/1").json(&intro()).await;

    let duplicate = server
        .put("/video/1")
        .json(&json!({ "name": "Other", "views": 1, "likes": 1 }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let body: Value = duplicate.json();
    assert_eq!(body["error"], "VideoAlreadyExists");
    assert_eq!(body["message"], "a video with id 1 already exists");

    server
        .get("/video/1")
        .await
        .assert_json(&json!({ "id": 1, "name": "Intro", "views": 100, "likes": 10 }));
}

#[tokio::test]
async fn renaming_leaves_counters_alone() {
    let server = server().await;
    server.put("/video/3").json(&intro()).await;

    server
        .patch("/video/3")
        .json(&json!({ "name": "Outro" }))
        .await
        .assert_status(StatusCode::OK);

    server
        .get("/video/3")
        .await
        .assert_json(&json!({ "id": 3, "name": "Outro", "views": 100, "likes": 10 }));
}

#[tokio::test]
async fn null_and_omitted_fields_are_not_updated() {
    let server = server().await;
    server.put("/video/3").json(&intro()).await;

    let updated = server
        .patch("/video/3")
        .json(&json!({ "name": null, "views": 250 }))
        .await;

    updated.assert_status(StatusCode::OK);
    updated.assert_json(&json!({ "id": 3, "name": "Intro", "views": 250, "likes": 10 }));
}

#[tokio::test]
async fn empty_patch_returns_the_record_unchanged() {
    let server = server().await;
    server.put("/video/5").json(&intro()).await;

    let updated = server.patch("/video/5").await;

    updated.assert_status(StatusCode::OK);
    updated.assert_json(&json!({ "id": 5, "name": "Intro", "views": 100, "likes": 10 }));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let server = server().await;

    let fetched = server.get("/video/9").await;
    fetched.assert_status(StatusCode::NOT_FOUND);
    fetched.assert_json(&json!({
        "message": "no video found with id 9",
        "error": "VideoNotFound",
        "data": { "id": 9 }
    }));

    server
        .patch("/video/9")
        .json(&json!({ "likes": 1 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete("/video/9")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_wins_over_a_bad_patch_body() {
    let server = server().await;

    let rejected = server
        .patch("/video/9")
        .json(&json!({ "likes": "lots" }))
        .await;

    rejected.assert_status(StatusCode::NOT_FOUND);
    let body: Value = rejected.json();
    assert_eq!(body["error"], "VideoNotFound");
}

#[tokio::test]
async fn non_integer_views_creates_nothing() {
    let server = server().await;

    let rejected = server
        .put("/video/1")
        .json(&json!({ "name": "Intro", "views": "a lot", "likes": 10 }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = rejected.json();
    assert_eq!(body["error"], "InvalidArgument");
    assert_eq!(body["data"]["field"], "views");

    server
        .get("/video/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_field_is_named_in_the_error() {
    let server = server().await;

    let rejected = server
        .put("/video/1")
        .json(&json!({ "views": 1, "likes": 1 }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = rejected.json();
    assert_eq!(body["error"], "MissingArgument");
    assert_eq!(body["data"]["field"], "name");
}

#[tokio::test]
async fn validation_runs_before_the_conflict_check() {
    let server = server().await;
    server.put("/video/1").json(&intro()).await;

    server
        .put("/video/1")
        .json(&json!({ "name": "Intro" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_update_is_rejected_without_partial_changes() {
    let server = server().await;
    server.put("/video/1").json(&intro()).await;

    server
        .patch("/video/1")
        .json(&json!({ "name": "Outro", "likes": 1.5 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/video/1")
        .await
        .assert_json(&json!({ "id": 1, "name": "Intro", "views": 100, "likes": 10 }));
}

#[tokio::test]
async fn form_encoded_bodies_are_accepted() {
    let server = server().await;

    let created = server
        .put("/video/8")
        .form(&[("name", "Intro"), ("views", "100"), ("likes", "10")])
        .await;

    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "id": 8, "name": "Intro", "views": 100, "likes": 10 }));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = server().await;

    let rejected = server
        .put("/video/1")
        .text("{\"name\": ")
        .content_type("application/json")
        .await;

    rejected.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = rejected.json();
    assert_eq!(body["error"], "MalformedBody");
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let server = server().await;

    let rejected = server.get("/video/intro").await;

    rejected.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = rejected.json();
    assert_eq!(body["error"], "InvalidVideoId");
}

#[tokio::test]
async fn query_string_supplies_fields_the_body_leaves_out() {
    let server = server().await;

    let created = server
        .put("/video/4")
        .add_query_param("views", 100)
        .add_query_param("likes", 10)
        .add_query_param("name", "Ignored")
        .json(&json!({ "name": "Intro" }))
        .await;

    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "id": 4, "name": "Intro", "views": 100, "likes": 10 }));

    let updated = server.patch("/video/4").add_query_param("likes", 11).await;

    updated.assert_status(StatusCode::OK);
    updated.assert_json(&json!({ "id": 4, "name": "Intro", "views": 100, "likes": 11 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_id_yield_a_single_winner() {
    let database = Database::memory().await.unwrap();
    let router = create_router(App::new(database));

    let mut requests = JoinSet::new();
    for n in 0..10 {
        let router = router.clone();
        requests.spawn(async move {
            let body = json!({ "name": format!("Take {n}"), "views": n, "likes": 0 });
            let request = Request::put("/video/1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();

            router.oneshot(request).await.unwrap().status()
        });
    }

    let mut statuses = Vec::new();
    while let Some(status) = requests.join_next().await {
        statuses.push(status.unwrap());
    }

    let created = statuses
        .iter()
        .filter(|status| **status == StatusCode::CREATED)
        .count();
    let conflicts = statuses
        .iter()
        .filter(|status| **status == StatusCode::CONFLICT)
        .count();

    assert_eq!(created, 1, "statuses: {statuses:?}");
    assert_eq!(conflicts, 9, "statuses: {statuses:?}");
}

#[tokio::test]
async fn openapi_document_describes_the_video_resource() {
    let server = server().await;

    let document = server.get("/openapi.json").await;
    document.assert_status(StatusCode::OK);

    let document: Value = document.json();
    let resource = &document["paths"]["/video/{id}"];
    for verb in ["get", "put", "patch", "delete"] {
        assert!(resource[verb].is_object(), "missing `{verb}` operation");
    }

    let schemas = &document["components"]["schemas"];
    for schema in ["Video", "NewVideo", "VideoPatch", "ErrorResponse"] {
        assert!(schemas[schema].is_object(), "missing `{schema}` schema");
    }
    assert_eq!(
        resource["put"]["responses"]["409"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorResponse"
    );
}
