#![cfg(feature = "integration-tests")]

//! Runs against the database in `DATABASE_URL`. Each test works on its own devices, so
//! the suite can share one disposable database.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use device_api::model::{DevicePatch, DeviceReplace, NewDevice};
use device_api::page::{DeviceFilter, PageRequest, Sort};
use device_api::{
    apply_migrations, AppConfig, AppError, Device, DeviceRepository, DeviceState, PgDeviceRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> PgPool {
    let config = AppConfig::from_env().expect("config");
    device_api::ensure_database_exists(&config.database_url)
        .await
        .expect("database");
    let pool = device_api::connect_pool(&config).await.expect("pool");
    apply_migrations(&pool).await.expect("migrations");
    pool
}

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

fn new_device(brand: &str) -> Device {
    Device::new(
        Uuid::new_v4(),
        NewDevice {
            name: "sensor".into(),
            brand: brand.into(),
        },
        t0(),
    )
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let pool = setup().await;
    apply_migrations(&pool).await.unwrap();
    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(&pool)
            .await
            .unwrap();
    let local: Vec<i64> = device_api::migration::MIGRATOR.iter().map(|m| m.version).collect();
    assert_eq!(versions, local);
}

#[tokio::test]
async fn insert_find_and_duplicate() {
    let repo = PgDeviceRepository::new(setup().await);
    let device = new_device("acme");
    repo.insert(device.clone()).await.unwrap();
    assert_eq!(repo.find_by_id(device.id).await.unwrap(), Some(device.clone()));
    let id = device.id;
    match repo.insert(device).await {
        Err(AppError::Conflict(message)) => assert_eq!(message, format!("device {} already exists", id)),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(repo.find_by_id(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn update_respects_in_use_lock() {
    let repo = PgDeviceRepository::new(setup().await);
    let device = new_device("acme");
    repo.insert(device.clone()).await.unwrap();

    let in_use = DevicePatch {
        state: Some(DeviceState::InUse),
        ..Default::default()
    };
    let updated = repo.update(device.id, &in_use, t0() + Duration::minutes(1)).await.unwrap();
    assert_eq!(updated.state, DeviceState::InUse);

    let rename = DevicePatch {
        name: Some("renamed".into()),
        ..Default::default()
    };
    let err = repo.update(device.id, &rename, t0() + Duration::minutes(2)).await.unwrap_err();
    assert!(matches!(err, AppError::InUseModification(_)));
    let stored = repo.find_by_id(device.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "sensor");
    assert_eq!(stored.last_modified, t0() + Duration::minutes(1));

    assert!(matches!(repo.delete(device.id).await, Err(AppError::InUseDeletion(_))));
}

#[tokio::test]
async fn replace_or_create_round_trip() {
    let repo = PgDeviceRepository::new(setup().await);
    let id = Uuid::new_v4();
    let replace = DeviceReplace {
        name: "n".into(),
        brand: "b".into(),
        state: DeviceState::Inactive,
        creation_time: Some(t0() - Duration::days(1)),
    };
    let created = repo.replace_or_create(id, &replace, t0()).await.unwrap();
    assert!(created.created);
    assert_eq!(created.device.creation_time, t0() - Duration::days(1));

    let err = repo.replace_or_create(id, &replace, t0()).await.unwrap_err();
    assert!(matches!(err, AppError::CreationTimeImmutable(_)));

    let again = DeviceReplace {
        creation_time: None,
        name: "n2".into(),
        ..replace
    };
    let replaced = repo.replace_or_create(id, &again, t0() + Duration::hours(1)).await.unwrap();
    assert!(!replaced.created);
    assert_eq!(repo.find_by_id(id).await.unwrap(), Some(replaced.device));

    repo.delete(id).await.unwrap();
    assert!(matches!(repo.delete(id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_filters_and_pages() {
    let repo = PgDeviceRepository::new(setup().await);
    let brand = format!("brand-{}", Uuid::new_v4());
    for i in 0..4 {
        let mut d = new_device(&brand);
        d.creation_time = t0() + Duration::seconds(i);
        repo.insert(d).await.unwrap();
    }
    let filter = DeviceFilter {
        brand: Some(brand),
        state: None,
    };
    let page = repo
        .list(&filter, &PageRequest::new(Some(0), Some(3), Sort::default()))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages(), 2);
    assert!(page.items.windows(2).all(|w| w[0].creation_time <= w[1].creation_time));

    let filter = DeviceFilter {
        state: Some(DeviceState::InUse),
        ..filter
    };
    let page = repo.list(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn deleted_id_cannot_be_recreated() {
    let repo = PgDeviceRepository::new(setup().await);
    let device = new_device("acme");
    repo.insert(device.clone()).await.unwrap();
    repo.delete(device.id).await.unwrap();

    let replace = DeviceReplace {
        name: "ghost".into(),
        brand: "acme".into(),
        state: DeviceState::Available,
        creation_time: Some(t0()),
    };
    let err = repo.replace_or_create(device.id, &replace, t0()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(repo.find_by_id(device.id).await.unwrap(), None);
}

#[tokio::test]
async fn name_sort_matches_byte_order() {
    let repo = PgDeviceRepository::new(setup().await);
    let brand = format!("brand-{}", Uuid::new_v4());
    for name in ["alpha", "Zeta", "beta", "Alpha"] {
        let mut d = new_device(&brand);
        d.name = name.into();
        repo.insert(d).await.unwrap();
    }
    let filter = DeviceFilter {
        brand: Some(brand),
        state: None,
    };
    let sort = Sort::parse("name").unwrap();
    let page = repo
        .list(&filter, &PageRequest::new(None, None, sort))
        .await
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta", "alpha", "beta"]);
}
