//! Historial de asignaciones sobre el repositorio en memoria

use chrono::NaiveDate;
use serde_json::json;

use fleet_management::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use fleet_management::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use fleet_management::models::{
    AssignCommand, AssignmentFilter, AssignmentRecord, DriverStatus, UserRole, VehicleFilter,
    VehicleStatus,
};
use fleet_management::repositories::{
    AssignmentRepository, DriverRepository, InMemoryRepository, VehicleRepository,
};
use fleet_management::services::assignment_service::audit_ledger;
use fleet_management::utils::errors::AppError;

const ADMIN_ID: i32 = 1;

async fn vehicle(repo: &InMemoryRepository, registration: &str) -> i32 {
    let request: CreateVehicleRequest = serde_json::from_value(json!({
        "make": "Toyota",
        "model": "Hiace",
        "year": 2020,
        "registrationNumber": registration,
        "fuelType": "diesel"
    }))
    .unwrap();
    repo.create_vehicle(&request).await.unwrap().id
}

async fn driver(repo: &InMemoryRepository, license: &str) -> i32 {
    let request = CreateDriverRequest {
        name: format!("Driver {}", license),
        email: None,
        phone: None,
        license_number: license.to_string(),
        license_expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        experience: 3,
        status: None,
    };
    repo.create_driver(&request).await.unwrap().id
}

fn command(vehicle_id: i32, driver_id: i32) -> AssignCommand {
    AssignCommand {
        vehicle_id,
        driver_id,
        assigned_by: ADMIN_ID,
        reason: None,
    }
}

async fn history(repo: &InMemoryRepository, vehicle_id: i32) -> Vec<AssignmentRecord> {
    repo.list_assignments(&AssignmentFilter::for_vehicle(vehicle_id))
        .await
        .unwrap()
}

async fn assert_consistent(repo: &InMemoryRepository) {
    let vehicles = repo.list_vehicles(&VehicleFilter::everything()).await.unwrap();
    let records = repo
        .list_assignments(&AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(audit_ledger(&vehicles, &records), Vec::new());
}

#[tokio::test]
async fn test_assign_sets_vehicle_state() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-100-20").await;
    let d = driver(&repo, "LIC-0001").await;

    let record = repo.assign(&command(v, d)).await.unwrap();
    assert!(record.is_active);
    assert_eq!(record.assigned_by, ADMIN_ID);

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Assigned);
    assert_eq!(stored.assigned_driver_id, Some(d));
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_reassign_closes_previous_record() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-101-20").await;
    let first = driver(&repo, "LIC-0002").await;
    let second = driver(&repo, "LIC-0003").await;

    let original = repo.assign(&command(v, first)).await.unwrap();
    repo.assign(&command(v, second)).await.unwrap();

    let records = history(&repo, v).await;
    let closed = records.iter().find(|r| r.id == original.id).unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.reason.as_deref(), Some("reassigned"));
    assert!(closed.unassigned_date.is_some());
    assert_eq!(records.iter().filter(|r| r.is_active).count(), 1);

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.assigned_driver_id, Some(second));
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_same_pair_reassignment_opens_new_period() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-102-20").await;
    let d = driver(&repo, "LIC-0004").await;

    repo.assign(&command(v, d)).await.unwrap();
    repo.assign(&command(v, d)).await.unwrap();

    let records = history(&repo, v).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.is_active).count(), 1);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_unassign_without_active_record_is_not_found() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-103-20").await;

    let err = repo.unassign(v, "Unassigned").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = repo.unassign(9999, "Unassigned").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_rejected_assignments() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-104-20").await;
    let other = vehicle(&repo, "GT-105-20").await;
    let suspended = driver(&repo, "LIC-0005").await;
    let busy = driver(&repo, "LIC-0006").await;

    let suspend = UpdateDriverRequest {
        status: Some(DriverStatus::Suspended),
        ..UpdateDriverRequest::default()
    };
    repo.update_driver(suspended, &suspend).await.unwrap();
    let err = repo.assign(&command(v, suspended)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    repo.assign(&command(other, busy)).await.unwrap();
    let err = repo.assign(&command(v, busy)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = repo.assign(&command(v, 9999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let retire = UpdateVehicleRequest {
        status: Some(VehicleStatus::Retired),
        ..UpdateVehicleRequest::default()
    };
    repo.update_vehicle(v, &retire, UserRole::Admin).await.unwrap();
    let fresh = driver(&repo, "LIC-0007").await;
    let err = repo.assign(&command(v, fresh)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    assert!(history(&repo, v).await.is_empty());
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_driver_suspension_releases_vehicle() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-106-20").await;
    let d = driver(&repo, "LIC-0008").await;
    repo.assign(&command(v, d)).await.unwrap();

    let suspend = UpdateDriverRequest {
        status: Some(DriverStatus::Suspended),
        ..UpdateDriverRequest::default()
    };
    repo.update_driver(d, &suspend).await.unwrap();

    let records = history(&repo, v).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_active);
    assert_eq!(records[0].reason.as_deref(), Some("driver suspended"));

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Available);
    assert_eq!(stored.assigned_driver_id, None);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_vehicle_status_change_releases_driver() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-107-20").await;
    let d = driver(&repo, "LIC-0009").await;
    repo.assign(&command(v, d)).await.unwrap();

    let maintenance = UpdateVehicleRequest {
        status: Some(VehicleStatus::Maintenance),
        ..UpdateVehicleRequest::default()
    };
    let stored = repo
        .update_vehicle(v, &maintenance, UserRole::Admin)
        .await
        .unwrap();
    assert_eq!(stored.status, VehicleStatus::Maintenance);
    assert_eq!(stored.assigned_driver_id, None);

    let records = history(&repo, v).await;
    assert_eq!(
        records[0].reason.as_deref(),
        Some("vehicle status changed to maintenance")
    );
    assert_consistent(&repo).await;

    let other = vehicle(&repo, "GT-108-20").await;
    repo.assign(&command(other, d)).await.unwrap();
}

#[tokio::test]
async fn test_mileage_update_keeps_assignment() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-109-20").await;
    let d = driver(&repo, "LIC-0010").await;
    repo.assign(&command(v, d)).await.unwrap();

    let mileage = UpdateVehicleRequest {
        mileage: Some(42_000),
        ..UpdateVehicleRequest::default()
    };
    let stored = repo.update_vehicle(v, &mileage, UserRole::User).await.unwrap();
    assert_eq!(stored.mileage, 42_000);
    assert_eq!(stored.assigned_driver_id, Some(d));
    assert_eq!(stored.status, VehicleStatus::Assigned);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_user_role_cannot_release_assigned_vehicle() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-111-20").await;
    let d = driver(&repo, "LIC-0011").await;
    repo.assign(&command(v, d)).await.unwrap();

    for status in [VehicleStatus::Available, VehicleStatus::Maintenance] {
        let request = UpdateVehicleRequest {
            status: Some(status),
            mileage: Some(1_000),
            ..UpdateVehicleRequest::default()
        };
        let err = repo
            .update_vehicle(v, &request, UserRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Assigned);
    assert_eq!(stored.assigned_driver_id, Some(d));
    assert_ne!(stored.mileage, 1_000);

    let records = history(&repo, v).await;
    assert_eq!(records.len(), 1);
    assert!(records[0].is_active);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_user_role_cannot_reopen_retired_vehicle() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-112-20").await;

    let retire = UpdateVehicleRequest {
        status: Some(VehicleStatus::Retired),
        ..UpdateVehicleRequest::default()
    };
    repo.update_vehicle(v, &retire, UserRole::Admin).await.unwrap();

    let reopen = UpdateVehicleRequest {
        status: Some(VehicleStatus::Available),
        ..UpdateVehicleRequest::default()
    };
    let err = repo
        .update_vehicle(v, &reopen, UserRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Retired);

    let stored = repo.update_vehicle(v, &reopen, UserRole::Admin).await.unwrap();
    assert_eq!(stored.status, VehicleStatus::Available);
}

#[tokio::test]
async fn test_removed_vehicle_closes_ledger() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-110-20").await;
    let d = driver(&repo, "LIC-0011").await;
    repo.assign(&command(v, d)).await.unwrap();

    let removed = repo.remove_vehicle(v).await.unwrap();
    assert!(!removed.is_active);
    assert_eq!(removed.status, VehicleStatus::Retired);
    assert!(repo.find_vehicle(v).await.unwrap().is_none());

    let records = history(&repo, v).await;
    assert_eq!(records[0].reason.as_deref(), Some("vehicle removed"));
    assert_consistent(&repo).await;

    let err = repo.assign(&command(v, d)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_assignments_leave_one_active_record() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-111-20").await;
    let mut drivers = Vec::new();
    for i in 0..8 {
        drivers.push(driver(&repo, &format!("LIC-10{:02}", i)).await);
    }

    let handles: Vec<_> = drivers
        .iter()
        .map(|&d| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.assign(&command(v, d)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = history(&repo, v).await;
    assert_eq!(records.len(), drivers.len());
    let active: Vec<_> = records.iter().filter(|r| r.is_active).collect();
    assert_eq!(active.len(), 1);

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.assigned_driver_id, Some(active[0].driver_id));
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_concurrent_assignments_of_one_driver() {
    let repo = InMemoryRepository::new();
    let d = driver(&repo, "LIC-2000").await;
    let mut vehicles = Vec::new();
    for i in 0..6 {
        vehicles.push(vehicle(&repo, &format!("GT-2{:02}-21", i)).await);
    }

    let handles: Vec<_> = vehicles
        .iter()
        .map(|&v| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.assign(&command(v, d)).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(matches!(err, AppError::InvalidState(_))),
        }
    }
    assert_eq!(succeeded, 1);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_assign_reassign_unassign_scenario() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-300-22").await;
    let ama = driver(&repo, "LIC-3001").await;
    let kofi = driver(&repo, "LIC-3002").await;

    repo.assign(&command(v, ama)).await.unwrap();
    repo.assign(&command(v, kofi)).await.unwrap();
    let closed = repo.unassign(v, "Unassigned").await.unwrap();
    assert_eq!(closed.driver_id, kofi);

    let records = history(&repo, v).await;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.is_active));

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Available);
    assert_eq!(stored.assigned_driver_id, None);

    repo.assign(&command(v, ama)).await.unwrap();
    let records = history(&repo, v).await;
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().filter(|r| r.is_active).count(), 1);
    assert_consistent(&repo).await;
}

#[tokio::test]
async fn test_assign_unassign_assign_keeps_one_record_per_period() {
    let repo = InMemoryRepository::new();
    let v = vehicle(&repo, "GT-301-22").await;
    let first = driver(&repo, "LIC-3101").await;
    let second = driver(&repo, "LIC-3102").await;

    let opened = repo.assign(&command(v, first)).await.unwrap();
    repo.unassign(v, "returned").await.unwrap();
    repo.assign(&command(v, second)).await.unwrap();

    let records = history(&repo, v).await;
    assert_eq!(records.len(), 2);
    let closed = records.iter().find(|r| r.id == opened.id).unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.reason.as_deref(), Some("returned"));

    let active: Vec<_> = records.iter().filter(|r| r.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].driver_id, second);

    let stored = repo.find_vehicle(v).await.unwrap().unwrap();
    assert_eq!(stored.assigned_driver_id, Some(second));
    assert_consistent(&repo).await;
}
