use chrono::{Duration, Utc};
use planner_core::{Database, Error, ListQuery, NewTask, Priority, Status, TaskPatch};

#[tokio::test]
async fn insert_assigns_id_and_timestamps() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::in_memory().await?;
    let due = Utc::now() + Duration::days(3);

    let task = db
        .insert_task(
            "u1",
            NewTask::new("Read Ch.1", "Mathematics")
                .with_description("Linear algebra")
                .with_priority(Priority::High)
                .with_due_date(due),
        )
        .await?;

    assert!(!task.id.is_empty());
    assert_eq!(task.user_id, "u1");
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.created_at, task.updated_at);

    let stored = db.get_task("u1", &task.id).await?;
    assert_eq!(stored.title, "Read Ch.1");
    assert_eq!(stored.description.as_deref(), Some("Linear algebra"));
    assert_eq!(stored.priority, Priority::High);
    assert_eq!(stored.due_date.map(|d| d.timestamp()), Some(due.timestamp()));
    Ok(())
}

#[tokio::test]
async fn insert_rejects_blank_title() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::in_memory().await?;
    let err = db
        .insert_task("u1", NewTask::new("   ", "Science"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(db.list_tasks("u1", ListQuery::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_ordered_and_capped() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::in_memory().await?;
    for title in ["first", "second", "third"] {
        db.insert_task("u1", NewTask::new(title, "Art")).await?;
    }
    db.insert_task("u2", NewTask::new("someone else", "Art"))
        .await?;

    let oldest_first = db.list_tasks("u1", ListQuery::default()).await?;
    let titles: Vec<_> = oldest_first.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    let newest = db
        .list_tasks("u1", ListQuery::newest_first().limit(2))
        .await?;
    let titles: Vec<_> = newest.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second"]);

    assert_eq!(db.list_tasks("u2", ListQuery::default()).await?.len(), 1);
    assert!(db.list_tasks("nobody", ListQuery::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_merges_fields_and_refreshes_updated_at() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::in_memory().await?;
    let task = db
        .insert_task(
            "u1",
            NewTask::new("Essay", "Language").with_due_date(Utc::now()),
        )
        .await?;

    db.update_task("u1", &task.id, TaskPatch::status(Status::InProgress))
        .await?;
    let stored = db.get_task("u1", &task.id).await?;
    assert_eq!(stored.status, Status::InProgress);
    assert_eq!(stored.title, "Essay");
    assert!(stored.due_date.is_some());
    assert!(stored.updated_at >= task.updated_at);

    let edit = NewTask::new("Essay draft", "Literature").with_status(Status::Completed);
    db.update_task("u1", &task.id, TaskPatch::from(edit)).await?;
    let stored = db.get_task("u1", &task.id).await?;
    assert_eq!(stored.title, "Essay draft");
    assert_eq!(stored.category, "Literature");
    assert_eq!(stored.status, Status::Completed);
    assert!(stored.due_date.is_none());
    Ok(())
}

#[tokio::test]
async fn writes_are_scoped_to_the_owner() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::in_memory().await?;
    let task = db.insert_task("u1", NewTask::new("Mine", "Art")).await?;

    let err = db
        .update_task("u2", &task.id, TaskPatch::status(Status::Completed))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = db.delete_task("u2", &task.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    db.delete_task("u1", &task.id).await?;
    assert!(db.list_tasks("u1", ListQuery::default()).await?.is_empty());

    let err = db.delete_task("u1", &task.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn file_database_persists_between_connections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite:{}", dir.path().join("planner.db").display());

    let db = Database::connect(&url).await?;
    db.insert_task("u1", NewTask::new("Kept", "History")).await?;
    db.close().await;

    let db = Database::connect(&url).await?;
    let tasks = db.list_tasks("u1", ListQuery::default()).await?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Kept");
    Ok(())
}
