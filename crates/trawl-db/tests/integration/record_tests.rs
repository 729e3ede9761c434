use trawl_core::models::{NOT_AVAILABLE, Record};
use trawl_core::traits::RecordSink;

use crate::integration::common::setup_test_db;

fn batch() -> Vec<Record> {
    vec![
        Record::new("transformer", "Attention Is All You Need", "https://arxiv.org/abs/1706.03762")
            .with_authors("Ashish Vaswani, Noam Shazeer")
            .with_abstract("The dominant sequence transduction models..."),
        Record::new("transformer", "BERT", "https://paperswithcode.com/paper/bert")
            .with_authors("Jacob Devlin"),
        Record::new("cats", "cat.png", "https://img.example.com/cat.png")
            .with_size("1024x768")
            .with_format("png"),
    ]
}

#[tokio::test]
async fn insert_and_find_by_url() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    let inserted = repo.insert_batch(&batch()).await.unwrap();
    assert_eq!(inserted, 3);

    let stored = repo
        .find_by_url("https://arxiv.org/abs/1706.03762")
        .await
        .unwrap()
        .expect("Should find the record");

    assert!(stored.id > 0);
    assert_eq!(stored.record, batch()[0]);

    let image = repo
        .find_by_url("https://img.example.com/cat.png")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(image.record.authors, None);
    assert_eq!(image.record.format.as_deref(), Some("png"));
}

#[tokio::test]
async fn rewriting_same_batch_does_not_duplicate() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    assert_eq!(repo.write_batch(&batch()).await.unwrap(), 3);
    assert_eq!(repo.count().await.unwrap(), 3);

    assert_eq!(repo.write_batch(&batch()).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn existing_url_keeps_first_version() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    repo.insert_batch(&batch()).await.unwrap();

    let changed = vec![
        Record::new("attention", "Renamed", "https://arxiv.org/abs/1706.03762"),
        Record::new("attention", "New paper", "https://arxiv.org/abs/2401.00001"),
    ];
    let inserted = repo.insert_batch(&changed).await.unwrap();
    assert_eq!(inserted, 1);

    let kept = repo
        .find_by_url("https://arxiv.org/abs/1706.03762")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.record.title, "Attention Is All You Need");
    assert_eq!(repo.count().await.unwrap(), 4);
}

#[tokio::test]
async fn empty_batch_inserts_nothing() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    assert_eq!(repo.insert_batch(&[]).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn find_missing_url_returns_none() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    let found = repo.find_by_url("https://nowhere.example").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn probe_creates_test_table_idempotently() {
    let (db, _container) = setup_test_db().await;

    db.probe().await.unwrap();
    db.probe().await.unwrap();

    let mut conn = db.connect().await.unwrap();
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = 'test_table')",
    )
    .fetch_one(&mut conn)
    .await
    .unwrap();
    assert!(exists);
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let (db, _container) = setup_test_db().await;

    db.migrate().await.unwrap();
    assert_eq!(db.record_repo().count().await.unwrap(), 0);
}

#[tokio::test]
async fn records_without_link_keep_only_first() {
    let (db, _container) = setup_test_db().await;
    let repo = db.record_repo();

    let linkless = vec![
        Record::new("transformer", "First", NOT_AVAILABLE),
        Record::new("transformer", "Second", NOT_AVAILABLE),
    ];
    assert_eq!(repo.insert_batch(&linkless).await.unwrap(), 1);
    assert_eq!(repo.count().await.unwrap(), 1);

    let kept = repo.find_by_url(NOT_AVAILABLE).await.unwrap().unwrap();
    assert_eq!(kept.record.title, "First");
}
