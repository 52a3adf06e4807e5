// ==========================================
// 端到端上传测试
// ==========================================
// 测试范围: AppState → 编排器 → calamine 解码 → SQLite 批量写入
// ==========================================


use excel_upload::app::AppState;
use excel_upload::config::config_keys;
use excel_upload::domain::UploadStep;
use excel_upload::engine::ChannelNotificationSink;
use excel_upload::importer::{FileSelection, UploadError};
use excel_upload::logging;
use excel_upload::repository::SqliteRecordSubmitter;
use serde_json::json;
use std::sync::Arc;

/// 创建已写入上传配置的 AppState
fn create_state() -> (tempfile::NamedTempFile, String, AppState) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_test_config(&conn).expect("Failed to insert config");
    drop(conn);

    let state = AppState::new(db_path.clone()).expect("Failed to create AppState");
    (temp_file, db_path, state)
}

#[tokio::test]
async fn test_full_upload_persists_records() {
    logging::init_test();

    let (_temp_file, db_path, state) = create_state();
    let (sink, mut notifications) = ChannelNotificationSink::new();
    let orchestrator = state
        .orchestrator_for_parent("001A", Arc::new(sink))
        .await
        .unwrap();
    let (_dir, path) = test_helpers::write_people_xlsx().unwrap();

    let report = orchestrator.upload_file(FileSelection::single(path)).await.unwrap();

    assert_eq!(report.record_count, 2);
    assert_eq!(notifications.try_recv().unwrap().message, "2 records uploaded");

    let stored = state.submitter.list_records_for_batch(&report.batch_id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(
        stored[0].fields,
        json!({"Name": "Alice", "Age": 30.0, "AccountId": "001A"})
    );
    assert_eq!(stored[0].source_row, 1);
    assert_eq!(
        stored[1].fields,
        json!({"Name": "Bob", "Age": 25.0, "AccountId": "001A"})
    );
    assert_eq!(stored[1].source_row, 3);

    // 重新打开数据库后记录仍在
    drop(orchestrator);
    drop(state);
    let reopened = SqliteRecordSubmitter::new(&db_path).unwrap();
    assert_eq!(reopened.count_records_for_parent("Contact", "001A").unwrap(), 2);
    assert_eq!(reopened.count_records_for_parent("Contact", "001B").unwrap(), 0);
}

#[tokio::test]
async fn test_parent_record_scopes_each_orchestrator() {
    let (_temp_file, _db_path, state) = create_state();
    let (_dir, path) = test_helpers::write_people_xlsx().unwrap();

    for parent in ["001A", "001B"] {
        let (sink, _notifications) = ChannelNotificationSink::new();
        let orchestrator = state.orchestrator_for_parent(parent, Arc::new(sink)).await.unwrap();
        orchestrator
            .upload_file(FileSelection::single(path.clone()))
            .await
            .unwrap();
    }

    assert_eq!(state.submitter.count_records_for_parent("Contact", "001A").unwrap(), 2);
    assert_eq!(state.submitter.count_records_for_parent("Contact", "001B").unwrap(), 2);
}

#[tokio::test]
async fn test_rejected_batch_inserts_nothing() {
    let (_temp_file, _db_path, state) = create_state();
    // 只配置一个字段,第二列超出字段列表
    state.config.set_config_value(config_keys::FIELD_NAMES, "Name").unwrap();

    let (sink, mut notifications) = ChannelNotificationSink::new();
    let orchestrator = state.orchestrator_for_parent("001A", Arc::new(sink)).await.unwrap();
    let mut rx = orchestrator.subscribe();
    let (_dir, path) = test_helpers::write_people_xlsx().unwrap();

    let err = orchestrator.upload_file(FileSelection::single(path)).await.unwrap_err();

    assert!(matches!(err, UploadError::Submission(_)));
    assert_eq!(
        err.to_string(),
        "Row 2 has 2 values but only 1 field names are configured"
    );
    assert_eq!(state.submitter.count_records_for_parent("Contact", "001A").unwrap(), 0);
    assert!(notifications.try_recv().is_err());

    let mut last = None;
    while let Ok(snapshot) = rx.try_recv() {
        last = Some(snapshot);
    }
    let last = last.unwrap();
    assert_eq!(last.step, UploadStep::Error);
    assert!(last.message.starts_with("Error: Row 2 has 2 values"));
    assert!(last.message.ends_with("check the configuration of the component."));
}

#[tokio::test]
async fn test_missing_configuration() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let (sink, _notifications) = ChannelNotificationSink::new();
    let orchestrator = state.orchestrator_for_parent("001A", Arc::new(sink)).await.unwrap();
    let (_dir, path) = test_helpers::write_people_xlsx().unwrap();

    let err = orchestrator.upload_file(FileSelection::single(path)).await.unwrap_err();

    assert!(matches!(err, UploadError::Config { ref key, .. } if key == config_keys::OBJECT_TYPE));
}

#[tokio::test]
async fn test_csv_decoder_from_configuration() {
    let (_temp_file, _db_path, state) = create_state();
    state.config.set_config_value(config_keys::DECODER, "csv").unwrap();

    let (sink, _notifications) = ChannelNotificationSink::new();
    let orchestrator = state.orchestrator_for_parent("001A", Arc::new(sink)).await.unwrap();
    let (_dir, path) = test_helpers::write_temp_file(
        "people.csv",
        b"Name,Age\nAlice,30\nBob,TRUE\n",
    )
    .unwrap();

    let report = orchestrator.upload_file(FileSelection::single(path)).await.unwrap();

    let stored = state.submitter.list_records_for_batch(&report.batch_id).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].fields["Age"], json!(true));
}
