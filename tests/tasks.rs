#[macro_use]
mod common;

use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::StatusCode, rt, test, web, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskforge_auth::models::{Category, Priority, TaskDetails, TimeLog};
use taskforge_auth::routes;

use common::{register_and_login_user, test_state};

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let state = test_state();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .configure(routes::config)
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .post(format!("{}/tasks", base))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()
            .get(reqwest::header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let resp = client
        .get(format!("{}/tasks", base))
        .bearer_auth("garbage")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid credentials" }));

    handle.stop(false).await;
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let app = test_app!(test_state()).await;
    let alice = register_and_login_user(&app, "Alice", "alice@example.com", "hunter2")
        .await
        .expect("Failed to register/login test user for CRUD flow");

    // 1. Create Task
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(alice.bearer())
        .set_json(json!({
            "title": "CRUD Task 1 Original",
            "description": "Initial description",
            "due_date": "2024-06-01T09:00:00",
            "priority": "high"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: TaskDetails = test::read_body_json(resp).await;
    assert_eq!(created.task.title, "CRUD Task 1 Original");
    assert_eq!(created.task.description.as_deref(), Some("Initial description"));
    assert_eq!(created.task.priority, Priority::High);
    assert_eq!(created.task.user_id, alice.id);
    assert!(created.task.due_date.is_some());
    assert!(created.categories.is_empty());
    assert!(created.time_logs.is_empty());
    let task_id = created.task.id;

    // 2. Get Task by ID
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(alice.bearer())
        .to_request();
    let fetched: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // 3. Partial update keeps the fields that were not sent
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(alice.bearer())
        .set_json(json!({ "title": "CRUD Task 1 Updated" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TaskDetails = test::read_body_json(resp).await;
    assert_eq!(updated.task.title, "CRUD Task 1 Updated");
    assert_eq!(updated.task.description.as_deref(), Some("Initial description"));
    assert_eq!(updated.task.priority, Priority::High);

    // 4. Default priority
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(alice.bearer())
        .set_json(json!({ "title": "Second" }))
        .to_request();
    let second: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second.task.priority, Priority::Medium);

    // 5. List
    let req = test::TestRequest::get()
        .uri("/tasks")
        .append_header(alice.bearer())
        .to_request();
    let tasks: Vec<TaskDetails> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 2);

    // 6. Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(alice.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(alice.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_task_validation() {
    let app = test_app!(test_state()).await;
    let alice = register_and_login_user(&app, "Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();

    for payload in [
        json!({ "title": "" }),
        json!({ "title": "a".repeat(201) }),
        json!({ "title": "ok", "description": "b".repeat(1001) }),
    ] {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .append_header(alice.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[actix_rt::test]
async fn test_tasks_are_private_to_their_owner() {
    let app = test_app!(test_state()).await;
    let alice = register_and_login_user(&app, "Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();
    let bob = register_and_login_user(&app, "Bob", "bob@example.com", "bobpass")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(alice.bearer())
        .set_json(json!({ "title": "Alice's secret" }))
        .to_request();
    let task: TaskDetails = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/tasks/{}", task.task.id);

    let requests = [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "title": "Stolen" })),
        test::TestRequest::delete().uri(&uri),
        test::TestRequest::post()
            .uri(&format!("{}/time_logs", uri))
            .set_json(json!({ "start_time": "2024-01-01T10:00:00Z" })),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.append_header(bob.bearer()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let req = test::TestRequest::get()
        .uri("/tasks")
        .append_header(bob.bearer())
        .to_request();
    let tasks: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(tasks.is_empty());

    // Still intact for the owner.
    let req = test::TestRequest::get()
        .uri(&uri)
        .append_header(alice.bearer())
        .to_request();
    let fetched: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.task.title, "Alice's secret");
}

#[actix_rt::test]
async fn test_time_logs() {
    let app = test_app!(test_state()).await;
    let alice = register_and_login_user(&app, "Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(alice.bearer())
        .set_json(json!({ "title": "Tracked" }))
        .to_request();
    let task: TaskDetails = test::call_and_read_body_json(&app, req).await;
    let logs_uri = format!("/tasks/{}/time_logs", task.task.id);

    let req = test::TestRequest::post()
        .uri(&logs_uri)
        .append_header(alice.bearer())
        .set_json(json!({
            "start_time": "2024-01-01T10:00:00",
            "end_time": "2024-01-01T11:30:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let log: TimeLog = test::read_body_json(resp).await;
    assert_eq!(log.task_id, task.task.id);
    assert_eq!(log.time_spent, 5400.0);

    // End before start
    let req = test::TestRequest::post()
        .uri(&logs_uri)
        .append_header(alice.bearer())
        .set_json(json!({
            "start_time": "2024-01-01T10:00:00Z",
            "end_time": "2024-01-01T09:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("{}/{}", logs_uri, log.id))
        .append_header(alice.bearer())
        .set_json(json!({
            "start_time": "2024-01-01T10:00:00Z",
            "end_time": "2024-01-01T10:15:00Z"
        }))
        .to_request();
    let updated: TimeLog = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.id, log.id);
    assert_eq!(updated.time_spent, 900.0);

    // Time logs are returned with the task.
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task.task.id))
        .append_header(alice.bearer())
        .to_request();
    let details: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details.time_logs, vec![updated.clone()]);

    let req = test::TestRequest::delete()
        .uri(&format!("{}/{}", logs_uri, log.id))
        .append_header(alice.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("{}/{}", logs_uri, log.id))
        .append_header(alice.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_categories_and_task_links() {
    let app = test_app!(test_state()).await;
    let alice = register_and_login_user(&app, "Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();

    let mut categories = Vec::new();
    for name in ["Work", "Home"] {
        let req = test::TestRequest::post()
            .uri("/categories")
            .set_json(json!({ "name": name }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let category: Category = test::read_body_json(resp).await;
        categories.push(category);
    }
    let (work, home) = (categories[0].clone(), categories[1].clone());

    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(alice.bearer())
        .set_json(json!({ "title": "Categorised", "category_ids": [work.id, 9999] }))
        .to_request();
    let task: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.categories, vec![work.clone()]);

    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task.task.id))
        .append_header(alice.bearer())
        .set_json(json!({ "category_ids": [home.id] }))
        .to_request();
    let relinked: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert_eq!(relinked.categories, vec![home.clone()]);

    let req = test::TestRequest::put()
        .uri(&format!("/categories/{}", home.id))
        .set_json(json!({ "name": "Household" }))
        .to_request();
    let renamed: Category = test::call_and_read_body_json(&app, req).await;
    assert_eq!(renamed.name, "Household");

    let req = test::TestRequest::delete()
        .uri(&format!("/categories/{}", home.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task.task.id))
        .append_header(alice.bearer())
        .to_request();
    let details: TaskDetails = test::call_and_read_body_json(&app, req).await;
    assert!(details.categories.is_empty());

    let req = test::TestRequest::get().uri("/categories").to_request();
    let remaining: Vec<Category> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(remaining, vec![work]);

    let req = test::TestRequest::post()
        .uri("/categories")
        .set_json(json!({ "name": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
