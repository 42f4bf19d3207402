use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, Set};

use super::setup_test_db;
use crate::machine_learning_module::{self as mlm, INITIAL_VERSION};

fn classifier(name: &str) -> mlm::ActiveModel {
    let now = Utc::now().into();
    mlm::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        is_active: Set(true),
        description: Set(None),
        version_number: Set("1.0".into()),
        framework: Set("CNN".into()),
        training_status: Set(Some("ACTIVE".into())),
        last_trained_at: Set(None),
        model_path: Set("/models/c1".into()),
        accuracy: Set(Some(0.93)),
        created_at: Set(now),
        updated_at: Set(now),
        version: Set(INITIAL_VERSION),
    }
}

/// Insert generates ids and round-trips every column
#[tokio::test]
async fn test_insert_and_find() -> Result<()> {
    let db = setup_test_db().await?;

    let first = classifier("Classifier").insert(&db).await?;
    let second = classifier("Detector").insert(&db).await?;
    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(first.created_at, first.updated_at);

    let found = mlm::Entity::find_by_id(first.id).one(&db).await?;
    assert_eq!(found.as_ref(), Some(&first));

    let by_name = mlm::Entity::find()
        .filter(mlm::Column::Name.eq("Detector"))
        .one(&db)
        .await?;
    assert_eq!(by_name.map(|m| m.id), Some(second.id));
    Ok(())
}

/// Hard delete removes the row
#[tokio::test]
async fn test_delete_by_id() -> Result<()> {
    let db = setup_test_db().await?;

    let m = classifier("Disposable").insert(&db).await?;
    let res = mlm::Entity::delete_by_id(m.id).exec(&db).await?;
    assert_eq!(res.rows_affected, 1);
    assert!(mlm::Entity::find_by_id(m.id).one(&db).await?.is_none());

    let again = mlm::Entity::delete_by_id(m.id).exec(&db).await?;
    assert_eq!(again.rows_affected, 0);
    Ok(())
}

/// JSON uses camelCase keys
#[tokio::test]
async fn test_model_serializes_camel_case() -> Result<()> {
    let db = setup_test_db().await?;
    let m = classifier("Serialized").insert(&db).await?;

    let json = serde_json::to_value(&m)?;
    for key in [
        "id", "name", "isActive", "description", "versionNumber", "framework",
        "trainingStatus", "lastTrainedAt", "modelPath", "accuracy", "createdAt",
        "updatedAt", "version",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["versionNumber"], "1.0");
    assert_eq!(json["version"], 1);
    Ok(())
}
