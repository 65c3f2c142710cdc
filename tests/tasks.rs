mod common;

use actix_web::{http::StatusCode, test};
use common::{in_days, location, TaskSeed};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskflow::{
    models::{Priority, Task},
    query::{Page, TaskFilter},
    store::Store,
};

fn names(page: &Page<Task>) -> Vec<&str> {
    page.items.iter().map(|task| task.name.as_str()).collect()
}

#[actix_rt::test]
async fn test_name_search_is_case_insensitive() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    common::task(&store, &bug, TaskSeed::named("Fix Login page")).await;
    common::task(&store, &bug, TaskSeed::named("Logout button")).await;
    common::task(&store, &bug, TaskSeed::named("Write docs")).await;
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/?name=LOG").to_request();
    let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
    let mut found = names(&page);
    found.sort();
    assert_eq!(found, vec!["Fix Login page", "Logout button"]);

    let req = test::TestRequest::get().uri("/tasks/?name=").to_request();
    let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.count, 3);
}

#[actix_rt::test]
async fn test_name_search_matches_wildcards_literally() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    common::task(&store, &bug, TaskSeed::named("100% coverage")).await;
    common::task(&store, &bug, TaskSeed::named("Refactor")).await;
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/?name=%25").to_request();
    let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&page), vec!["100% coverage"]);
}

#[actix_rt::test]
async fn test_status_filter() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            is_completed: true,
            ..TaskSeed::named("Done")
        },
    )
    .await;
    common::task(&store, &bug, TaskSeed::named("Open")).await;
    let app = common::app(state).await;

    let cases = [
        ("completed", vec!["Done"]),
        ("pending", vec!["Open"]),
        ("", vec!["Done", "Open"]),
        ("archived", vec!["Done", "Open"]),
    ];
    for (status, expected) in cases {
        let req = test::TestRequest::get()
            .uri(&format!("/tasks/?status={}", status))
            .to_request();
        let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
        let mut found = names(&page);
        found.sort();
        assert_eq!(found, expected, "status={:?}", status);
    }
}

#[actix_rt::test]
async fn test_listing_is_ordered_by_deadline_then_priority() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    let same_day = in_days(2);
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: in_days(5),
            ..TaskSeed::named("later")
        },
    )
    .await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: same_day,
            priority: Priority::Urgent,
            ..TaskSeed::named("urgent")
        },
    )
    .await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: same_day,
            priority: Priority::High,
            ..TaskSeed::named("high")
        },
    )
    .await;
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/").to_request();
    let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
    // Priority compares by its name: "High" < "Urgent".
    assert_eq!(names(&page), vec!["high", "urgent", "later"]);
}

#[actix_rt::test]
async fn test_pagination_splits_seven_tasks() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    for day in 1..=7 {
        let name = format!("task {}", day);
        common::task(
            &store,
            &bug,
            TaskSeed {
                deadline: in_days(day),
                ..TaskSeed::named(&name)
            },
        )
        .await;
    }
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/").to_request();
    let first: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.number, 1);
    assert_eq!(first.num_pages, 2);
    assert!(first.has_next);
    assert!(!first.has_previous);
    assert!(first.is_paginated);

    let req = test::TestRequest::get().uri("/tasks/?page=2").to_request();
    let second: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&second), vec!["task 6", "task 7"]);
    assert!(!second.has_next);

    let req = test::TestRequest::get().uri("/tasks/?page=last").to_request();
    let last: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(last.number, 2);

    for page in ["0", "abc", "3"] {
        let req = test::TestRequest::get()
            .uri(&format!("/tasks/?page={}", page))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "page={}", page);
    }
}

#[actix_rt::test]
async fn test_empty_listing_has_page_one() {
    let (state, _store) = common::state(false);
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/?page=1").to_request();
    let page: Page<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.count, 0);
    assert_eq!(page.num_pages, 1);
    assert!(!page.is_paginated);
}

#[test_log::test(actix_rt::test)]
async fn test_create_task_with_assignees() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    let alice = common::worker(&store, "alice", None).await;
    let bob = common::worker(&store, "bob", None).await;
    let app = common::app(state).await;

    let req = test::TestRequest::post()
        .uri("/tasks/create/")
        .set_json(json!({
            "name": "Ship release",
            "description": "Tag and publish",
            "deadline": "2030-01-15T09:30",
            "priority": "High",
            "task_type": bug.id,
            "assignees": [bob.id, alice.id.to_string()]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/tasks/");

    let stored = store.list_tasks(&TaskFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    let task = &stored[0];
    assert_eq!(task.assignees, vec![alice.id, bob.id]);
    assert_eq!(task.priority, Priority::High);
    assert!(!task.is_completed);

    let req = test::TestRequest::get()
        .uri(&task.absolute_url())
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["name"], "Ship release");
    assert_eq!(detail["task_type"]["name"], "Bug");
    let usernames: Vec<&str> = detail["workers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["username"].as_str().unwrap())
        .collect();
    assert_eq!(usernames, vec!["alice", "bob"]);
    assert!(detail["workers"][0].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_create_task_reports_every_invalid_field() {
    let (state, store) = common::state(false);
    let app = common::app(state).await;

    let req = test::TestRequest::post()
        .uri("/tasks/create/")
        .set_json(json!({
            "name": "",
            "deadline": "next tuesday",
            "priority": "Critical",
            "task_type": 999,
            "assignees": []
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let mut fields: Vec<&str> = body["errors"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    fields.sort();
    assert_eq!(
        fields,
        vec!["assignees", "deadline", "description", "name", "priority", "task_type"]
    );
    assert!(store
        .list_tasks(&TaskFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[actix_rt::test]
async fn test_update_and_delete_task() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    let alice = common::worker(&store, "alice", None).await;
    let task = common::task(
        &store,
        &bug,
        TaskSeed {
            assignees: vec![alice.id],
            ..TaskSeed::named("Draft")
        },
    )
    .await;
    let app = common::app(state).await;

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/update/", task.id))
        .set_json(json!({
            "name": "Final",
            "description": "Reviewed",
            "deadline": "2030-02-01T12:00:00Z",
            "task_type": bug.id,
            "assignees": [alice.id],
            "is_completed": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let updated = store.get_task(task.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Final");
    assert!(updated.is_completed);
    assert_eq!(updated.priority, Priority::Medium);

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}/delete/", task.id))
        .to_request();
    let confirm: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(confirm.id, task.id);

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/delete/", task.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/tasks/");
    assert!(store.get_task(task.id).await.unwrap().is_none());

    for uri in [
        format!("/tasks/{}/", task.id),
        format!("/tasks/{}/update/", task.id),
        "/tasks/not-a-number/".to_string(),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_rt::test]
async fn test_deleting_task_type_deletes_its_tasks() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    let feature = common::task_type(&store, "Feature").await;
    common::task(&store, &bug, TaskSeed::named("crash")).await;
    common::task(&store, &bug, TaskSeed::named("leak")).await;
    common::task(&store, &feature, TaskSeed::named("export")).await;
    let app = common::app(state).await;

    let req = test::TestRequest::post()
        .uri(&format!("/task-types/{}/delete/", bug.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/task-types/");

    let remaining = store.list_tasks(&TaskFilter::default()).await.unwrap();
    let remaining: Vec<&str> = remaining.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(remaining, vec!["export"]);

    let req = test::TestRequest::get().uri("/task-types/").to_request();
    let types: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(types, json!([{ "id": feature.id, "name": "Feature" }]));
}

#[actix_rt::test]
async fn test_task_form_choices() {
    let (state, store) = common::state(false);
    common::task_type(&store, "Feature").await;
    common::task_type(&store, "Bug").await;
    common::worker(&store, "zed", None).await;
    common::worker(&store, "amy", None).await;
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/tasks/create/").to_request();
    let choices: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(choices["priorities"], json!(["Urgent", "High", "Medium", "Low"]));
    assert_eq!(choices["task_types"][0]["name"], "Bug");
    assert_eq!(choices["workers"][0]["username"], "amy");
}
