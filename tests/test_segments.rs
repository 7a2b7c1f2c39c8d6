mod helpers;

use helpers::*;
use limehub::{
    api::middleware::ApiError,
    models::{ApiResponse, CreateSegmentRequest, ResponseStatus, UpdateSegmentRequest},
    services::SegmentationService,
};
use serde_json::json;

fn vip_segment() -> CreateSegmentRequest {
    CreateSegmentRequest {
        name: "VIP".to_string(),
        description: Some("High value customers".to_string()),
        conditions: Some(json!({ "field": "lifetime_value", "op": "gt", "value": 1000 })),
    }
}

#[tokio::test]
async fn test_create_segment_success() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "t1").await;
    let service = SegmentationService::new(test_db.db().clone());

    let segment = service.create_segment(&org.id, vip_segment()).await.unwrap();
    assert_eq!(segment.name, "VIP");
    assert_eq!(segment.organization_id, org.id);
    assert!(!segment.id.is_empty());
    assert!(segment.conditions.is_some());

    // The envelope a handler would build for this outcome
    let envelope = ApiResponse::success(segment, "Segment created successfully");
    assert_eq!(envelope.status, ResponseStatus::Success);
    assert_eq!(envelope.message, "Segment created successfully");
    assert_eq!(envelope.data.as_ref().unwrap().name, "VIP");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_get_missing_segment_maps_to_not_found_envelope() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "t1").await;
    let service = SegmentationService::new(test_db.db().clone());

    let result = service.get_segment("missing-id", &org.id).await.unwrap();
    assert!(result.is_none());

    // Absent lookups translate to the same error shape as a fault
    let envelope: ApiResponse<limehub::models::Segment> = ApiResponse::error("Segment not found");
    assert_eq!(envelope.status, ResponseStatus::Error);
    assert!(envelope.data.is_none());
    assert_eq!(envelope.message, "Segment not found");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_update_segment() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let service = SegmentationService::new(test_db.db().clone());

    let created = service.create_segment(&org.id, vip_segment()).await.unwrap();

    let updated = service
        .update_segment(
            &created.id,
            &org.id,
            UpdateSegmentRequest {
                name: Some("VIP Plus".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("segment should exist");

    assert_eq!(updated.name, "VIP Plus");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.conditions, created.conditions);

    let missing = service
        .update_segment("missing-id", &org.id, UpdateSegmentRequest::default())
        .await
        .unwrap();
    assert!(missing.is_none());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_delete_segment_is_idempotent() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let service = SegmentationService::new(test_db.db().clone());

    let created = service.create_segment(&org.id, vip_segment()).await.unwrap();

    assert!(service.delete_segment(&created.id, &org.id).await.unwrap());
    assert!(!service.delete_segment(&created.id, &org.id).await.unwrap());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_list_segments_most_recently_updated_first() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let service = SegmentationService::new(test_db.db().clone());

    let first = service
        .create_segment(
            &org.id,
            CreateSegmentRequest {
                name: "Newsletter".to_string(),
                description: None,
                conditions: None,
            },
        )
        .await
        .unwrap();
    service.create_segment(&org.id, vip_segment()).await.unwrap();

    // Touching the older segment moves it to the front
    service
        .update_segment(
            &first.id,
            &org.id,
            UpdateSegmentRequest {
                description: Some("Weekly digest readers".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = service.list_segments(&org.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_segment_membership_and_views() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let service = SegmentationService::new(test_db.db().clone());

    let segment = service.create_segment(&org.id, vip_segment()).await.unwrap();

    assert!(service
        .add_entity_to_segment(&segment.id, "contact-1", &org.id)
        .await
        .unwrap());
    assert!(service
        .add_entity_to_segment(&segment.id, "contact-2", &org.id)
        .await
        .unwrap());

    // Adding the same entity again is a no-op, not a fault
    assert!(!service
        .add_entity_to_segment(&segment.id, "contact-1", &org.id)
        .await
        .unwrap());

    let entities = service
        .get_entities_in_segment(&segment.id, &org.id)
        .await
        .unwrap();
    assert_eq!(entities, vec!["contact-1".to_string(), "contact-2".to_string()]);

    let analytics = service
        .get_segment_analytics(&segment.id, &org.id)
        .await
        .unwrap();
    assert_eq!(analytics.segment_id, segment.id);
    assert_eq!(analytics.entity_count, 2);
    assert!(analytics.last_membership_change.is_some());

    let segments = service
        .get_segments_for_entity("contact-1", &org.id)
        .await
        .unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].id, segment.id);

    // Removal mirrors delete idempotence
    assert!(service
        .remove_entity_from_segment(&segment.id, "contact-2", &org.id)
        .await
        .unwrap());
    assert!(!service
        .remove_entity_from_segment(&segment.id, "contact-2", &org.id)
        .await
        .unwrap());

    let analytics = service
        .get_segment_analytics(&segment.id, &org.id)
        .await
        .unwrap();
    assert_eq!(analytics.entity_count, 1);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_membership_views_require_existing_segment() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let service = SegmentationService::new(test_db.db().clone());

    match service.get_entities_in_segment("missing-id", &org.id).await {
        Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Segment not found"),
        other => panic!("Expected NotFound, got {:?}", other),
    }

    assert!(matches!(
        service.get_segment_analytics("missing-id", &org.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        service
            .add_entity_to_segment("missing-id", "contact-1", &org.id)
            .await,
        Err(ApiError::NotFound(_))
    ));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_segment_tenant_isolation() {
    let test_db = setup_test_db().await;
    let org_a = seed_organization(test_db.db(), "Org A").await;
    let org_b = seed_organization(test_db.db(), "Org B").await;
    let service = SegmentationService::new(test_db.db().clone());

    let segment = service
        .create_segment(&org_a.id, vip_segment())
        .await
        .unwrap();
    service
        .add_entity_to_segment(&segment.id, "contact-1", &org_a.id)
        .await
        .unwrap();

    // Org B sees none of it
    assert!(service
        .get_segment(&segment.id, &org_b.id)
        .await
        .unwrap()
        .is_none());
    assert!(service.list_segments(&org_b.id).await.unwrap().is_empty());
    assert!(service
        .get_segments_for_entity("contact-1", &org_b.id)
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        service.get_entities_in_segment(&segment.id, &org_b.id).await,
        Err(ApiError::NotFound(_))
    ));

    // And cannot mutate it
    assert!(!service.delete_segment(&segment.id, &org_b.id).await.unwrap());
    assert!(service
        .get_segment(&segment.id, &org_a.id)
        .await
        .unwrap()
        .is_some());

    teardown_test_db(test_db).await;
}
