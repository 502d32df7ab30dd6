use planner_core::aggregate::category_distribution;
use planner_core::{Database, Error, NewTask, Planner, Session, Status, TaskPatch, User};

async fn planner_for(user: &str) -> Planner {
    let db = Database::in_memory().await.expect("in-memory database");
    Planner::new(db, Session::signed_in(User::new(user)))
}

#[tokio::test]
async fn fetch_returns_newest_first() {
    let planner = planner_for("u1").await;
    planner
        .create_task(NewTask::new("older", "Art"))
        .await
        .expect("create");
    planner
        .create_task(NewTask::new("newer", "Art"))
        .await
        .expect("create");

    let titles: Vec<_> = planner
        .fetch_tasks()
        .await
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["newer", "older"]);
}

#[tokio::test]
async fn history_keeps_storage_order_for_analytics() {
    let planner = planner_for("u1").await;
    for (title, category) in [("a", "Science"), ("b", "Art"), ("c", "Art")] {
        planner
            .create_task(NewTask::new(title, category))
            .await
            .expect("create");
    }

    let history = planner.fetch_history().await;
    let titles: Vec<_> = history.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    let categories = category_distribution(&history);
    assert_eq!(categories[0].label, "Science");
    assert_eq!(categories[1].label, "Art");
}

#[tokio::test]
async fn fetch_failure_falls_back_to_empty_list() {
    let planner = planner_for("u1").await;
    planner
        .create_task(NewTask::new("stored", "Art"))
        .await
        .expect("create");

    planner.database().close().await;

    assert!(planner.fetch_tasks().await.is_empty());
    let dashboard = planner.dashboard().await;
    assert_eq!(dashboard.stats.total, 0);
    assert!(dashboard.recent.is_empty());
}

#[tokio::test]
async fn signed_out_session_reads_nothing_and_cannot_write() {
    let mut planner = planner_for("u1").await;
    planner
        .create_task(NewTask::new("stored", "Art"))
        .await
        .expect("create");

    planner.session_mut().sign_out();

    assert!(planner.fetch_tasks().await.is_empty());
    let err = planner
        .create_task(NewTask::new("rejected", "Art"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotSignedIn));
}

#[tokio::test]
async fn failed_write_leaves_state_intact() {
    let planner = planner_for("u1").await;
    let task = planner
        .create_task(NewTask::new("Essay", "Language"))
        .await
        .expect("create");

    let blank_title = TaskPatch {
        title: Some(String::new()),
        status: Some(Status::Completed),
        ..TaskPatch::default()
    };
    assert!(planner.update_task(&task.id, blank_title).await.is_err());
    assert!(planner.delete_task("missing").await.is_err());

    let tasks = planner.fetch_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, Status::Pending);
}

#[tokio::test]
async fn dashboard_combines_stats_and_recent_tasks() {
    let planner = planner_for("u1").await.with_recent_limit(2);
    for title in ["a", "b", "c"] {
        planner
            .create_task(NewTask::new(title, "Science"))
            .await
            .expect("create");
    }
    let tasks = planner.fetch_tasks().await;
    planner
        .set_status(&tasks[0].id, Status::Completed)
        .await
        .expect("status change");

    let dashboard = planner.dashboard().await;
    assert_eq!(dashboard.stats.total, 3);
    assert_eq!(dashboard.stats.completed, 1);
    assert_eq!(dashboard.stats.pending, 2);
    assert_eq!(dashboard.recent.len(), 2);
    assert_eq!(dashboard.recent[0].title, "c");
}

#[tokio::test]
async fn users_never_see_each_other() {
    let db = Database::in_memory().await.expect("in-memory database");
    let mut planner = Planner::new(db, Session::signed_in(User::new("u1")));
    planner
        .create_task(NewTask::new("u1 task", "Art"))
        .await
        .expect("create");

    planner.session_mut().sign_in(User::new("u2"));
    assert!(planner.fetch_tasks().await.is_empty());
}
