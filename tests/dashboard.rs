mod common;

use actix_web::test;
use common::{in_days, TaskSeed};
use pretty_assertions::assert_eq;
use taskflow::{
    models::Priority,
    query::{DashboardStats, PriorityHistogram},
};

#[test_log::test(actix_rt::test)]
async fn test_dashboard_totals_and_upcoming() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    common::worker(&store, "alice", None).await;
    common::worker(&store, "bob", None).await;

    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: in_days(3),
            ..TaskSeed::named("due in three days")
        },
    )
    .await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: in_days(10),
            ..TaskSeed::named("due in ten days")
        },
    )
    .await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: in_days(1),
            is_completed: true,
            ..TaskSeed::named("already done")
        },
    )
    .await;
    common::task(
        &store,
        &bug,
        TaskSeed {
            deadline: in_days(-2),
            ..TaskSeed::named("overdue")
        },
    )
    .await;
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let stats: DashboardStats = test::call_and_read_body_json(&app, req).await;

    assert_eq!(stats.num_workers, 2);
    assert_eq!(stats.num_tasks, 4);
    assert_eq!(stats.num_completed_tasks, 1);
    let upcoming: Vec<&str> = stats
        .upcoming_deadlines
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(upcoming, vec!["due in three days"]);
}

#[actix_rt::test]
async fn test_upcoming_deadlines_are_capped_and_sorted() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    for day in (0..=7).rev() {
        let name = format!("day {}", day);
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

    let req = test::TestRequest::get().uri("/").to_request();
    let stats: DashboardStats = test::call_and_read_body_json(&app, req).await;
    let upcoming: Vec<&str> = stats
        .upcoming_deadlines
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(upcoming, vec!["day 0", "day 1", "day 2", "day 3", "day 4"]);
}

#[actix_rt::test]
async fn test_priority_histogram_skips_urgent() {
    let (state, store) = common::state(false);
    let bug = common::task_type(&store, "Bug").await;
    for (name, priority) in [
        ("a", Priority::High),
        ("b", Priority::High),
        ("c", Priority::Medium),
        ("d", Priority::Urgent),
    ] {
        common::task(
            &store,
            &bug,
            TaskSeed {
                priority,
                ..TaskSeed::named(name)
            },
        )
        .await;
    }
    let app = common::app(state).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let stats: DashboardStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.num_tasks, 4);
    assert_eq!(
        stats.priority,
        PriorityHistogram {
            high: 2,
            medium: 1,
            low: 0
        }
    );
}
