use std::sync::Arc;
use std::time::Duration;

use sillage_core::{
    ClientError, CollectionApi, CollectionSyncController, PerfumeForm, SearchPhase, SyncSettings,
};
use sillage_test_support::mocks::{DUPLICATE_DETAIL, FakeCall, FakeCollectionService, FakeOperation};

fn controller(fake: &Arc<FakeCollectionService>) -> CollectionSyncController {
    let api: Arc<dyn CollectionApi> = fake.clone();
    CollectionSyncController::new(api, SyncSettings::default())
}

#[tokio::test(start_paused = true)]
async fn only_the_last_keystroke_in_the_window_searches() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    for partial in ["r", "ro", "ros", "rosa"] {
        sync.set_query(partial);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sync.view().search_phase, SearchPhase::Debouncing);
    }
    let view = sync.settled().await;

    assert_eq!(fake.search_queries(), vec!["rosa"]);
    assert_eq!(view.search_phase, SearchPhase::Results);
    assert_eq!(view.search_results.len(), 3);
    assert_eq!(view.query, "rosa");
}

#[tokio::test(start_paused = true)]
async fn blank_query_clears_results_without_a_request() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    sync.set_query("noir");
    assert_eq!(sync.settled().await.search_results.len(), 2);

    sync.set_query("   ");
    let view = sync.view();
    assert!(view.search_results.is_empty());
    assert_eq!(view.search_phase, SearchPhase::Idle);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(fake.search_queries(), vec!["noir"]);
}

#[tokio::test(start_paused = true)]
async fn unknown_query_settles_empty() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    sync.set_query("vetiver");
    let view = sync.settled().await;
    assert_eq!(view.search_phase, SearchPhase::Empty);
    assert!(view.search_results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded_and_in_flight_request_completes() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.delay_search("rosa", Duration::from_secs(2));
    let sync = controller(&fake);

    sync.set_query("rosa");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(sync.view().search_phase, SearchPhase::Searching);

    sync.set_query("noir");
    let view = sync.settled().await;
    assert_eq!(view.search_results.len(), 2);

    tokio::time::sleep(Duration::from_secs(3)).await;
    let view = sync.view();
    assert_eq!(fake.search_queries(), vec!["rosa", "noir"]);
    assert_eq!(view.query, "noir");
    assert!(
        view.search_results
            .iter()
            .all(|perfume| perfume.name.to_lowercase().contains("noir"))
    );
}

#[tokio::test(start_paused = true)]
async fn failed_search_keeps_previous_results() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    sync.set_query("rosa");
    assert_eq!(sync.settled().await.search_results.len(), 3);

    fake.fail_next(FakeOperation::Search, ClientError::network("could not reach the server"));
    sync.set_query("noir");
    let view = sync.settled().await;

    assert_eq!(view.search_phase, SearchPhase::Idle);
    assert_eq!(view.search_results.len(), 3);
    assert_eq!(view.error.as_deref(), Some("could not reach the server"));
}

#[tokio::test]
async fn add_reloads_collection_from_server() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    assert!(sync.add_to_collection(2).await.is_ok());
    assert!(sync.add_to_collection(4).await.is_ok());

    let view = sync.view();
    assert_eq!(view.collection, fake.stored_collection());
    assert!(view.contains(2) && view.contains(4));
    assert!(!view.collection_loading);
    assert_eq!(
        fake.calls(),
        vec![
            FakeCall::Add(2),
            FakeCall::Collection,
            FakeCall::Add(4),
            FakeCall::Collection
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn add_keeps_search_results() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    sync.set_query("rosa");
    sync.settled().await;
    assert!(sync.add_to_collection(2).await.is_ok());

    let view = sync.view();
    assert_eq!(view.search_results.len(), 3);
    assert_eq!(view.search_phase, SearchPhase::Results);
}

#[tokio::test]
async fn duplicate_add_conflicts_and_leaves_view_unchanged() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1]);
    let sync = controller(&fake);
    assert!(sync.reload_collection().await.is_ok());
    let before = sync.view().collection;

    let err = sync.add_to_collection(1).await.err();

    assert!(matches!(err, Some(ClientError::Conflict { .. })));
    let view = sync.view();
    assert_eq!(view.collection, before);
    assert_eq!(view.error.as_deref(), Some(DUPLICATE_DETAIL));
    assert_eq!(fake.calls().last(), Some(&FakeCall::Add(1)));
}

#[tokio::test]
async fn confirm_without_pending_deletion_is_a_no_op() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    assert!(matches!(sync.confirm_removal().await, Ok(false)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn double_confirmation_removes_once() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1, 2]);
    let sync = controller(&fake);
    assert!(sync.reload_collection().await.is_ok());

    sync.request_removal(1);
    assert_eq!(sync.view().pending_deletion, Some(1));
    let (first, second) = tokio::join!(sync.confirm_removal(), sync.confirm_removal());

    let removed = [first, second]
        .into_iter()
        .filter(|outcome| matches!(outcome, Ok(true)))
        .count();
    assert_eq!(removed, 1);
    let removes = fake
        .calls()
        .into_iter()
        .filter(|call| matches!(call, FakeCall::Remove(_)))
        .count();
    assert_eq!(removes, 1);

    let view = sync.view();
    assert!(view.pending_deletion.is_none());
    assert_eq!(view.collection, fake.stored_collection());
    assert!(!view.contains(1) && view.contains(2));
}

#[tokio::test]
async fn cancel_clears_pending_deletion_without_a_request() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    sync.request_removal(3);
    sync.cancel_removal();

    assert!(sync.view().pending_deletion.is_none());
    assert!(matches!(sync.confirm_removal().await, Ok(false)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn failed_removal_clears_pending_and_keeps_collection() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1]);
    let sync = controller(&fake);
    assert!(sync.reload_collection().await.is_ok());

    fake.fail_next(
        FakeOperation::Remove,
        ClientError::Server {
            status: 500,
            detail: None,
        },
    );
    sync.request_removal(1);
    let outcome = sync.confirm_removal().await;

    assert!(matches!(outcome, Err(ClientError::Server { status: 500, .. })));
    let view = sync.view();
    assert!(view.pending_deletion.is_none());
    assert!(view.contains(1));
    assert_eq!(
        view.error.as_deref(),
        Some("request failed with status 500")
    );
}

#[tokio::test]
async fn create_and_add_splits_lists_and_resets_form() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    let created = sync
        .create_and_add(PerfumeForm {
            name: "Noir Étoilé".into(),
            brand: "Maison X".into(),
            perfumer: String::new(),
            notes: "Ámbar, Vainilla".into(),
            accords: "Oriental".into(),
        })
        .await;

    assert!(created.is_ok());
    let submitted = fake.calls().into_iter().find_map(|call| match call {
        FakeCall::Create(payload) => Some(payload),
        _ => None,
    });
    let submitted = submitted.unwrap_or_else(|| panic!("create was not called"));
    assert_eq!(submitted.notes, vec!["Ámbar", "Vainilla"]);
    assert_eq!(submitted.accords, vec!["Oriental"]);
    assert!(submitted.perfumer.is_none());

    let view = sync.view();
    assert!(
        view.collection
            .iter()
            .any(|entry| entry.perfume.name == "Noir Étoilé")
    );
    assert_eq!(view.form, PerfumeForm::default());
    assert!(!view.creating);
}

#[tokio::test]
async fn create_with_blank_brand_never_reaches_the_server() {
    let fake = Arc::new(FakeCollectionService::new());
    let sync = controller(&fake);

    let form = PerfumeForm {
        name: "Noir Étoilé".into(),
        brand: "  ".into(),
        ..PerfumeForm::default()
    };
    let outcome = sync.create_and_add(form.clone()).await;

    assert!(matches!(outcome, Err(ClientError::Validation { .. })));
    assert!(fake.calls().is_empty());
    let view = sync.view();
    assert_eq!(view.form, form);
    assert_eq!(view.error.as_deref(), Some("name and brand are required"));
}

#[tokio::test]
async fn failed_reload_keeps_previous_collection() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1, 3]);
    let sync = controller(&fake);
    assert!(sync.reload_collection().await.is_ok());

    fake.fail_next(FakeOperation::Collection, ClientError::network("offline"));
    assert!(sync.reload_collection().await.is_err());

    let view = sync.view();
    assert_eq!(view.collection.len(), 2);
    assert!(!view.collection_loading);
    assert_eq!(view.error.as_deref(), Some("offline"));
}

#[tokio::test(start_paused = true)]
async fn reset_abandons_pending_search() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1]);
    let sync = controller(&fake);
    assert!(sync.reload_collection().await.is_ok());

    sync.set_query("rosa");
    sync.reset();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(fake.search_queries().is_empty());
    let view = sync.view();
    assert!(view.collection.is_empty());
    assert_eq!(view.search_phase, SearchPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn reset_drops_a_reload_still_in_flight() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1]);
    fake.delay_next_collection(Duration::from_secs(1));
    let sync = controller(&fake);

    let reloading = sync.clone();
    let reload = tokio::spawn(async move { reloading.reload_collection().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(sync.view().collection_loading);

    sync.reset();
    assert!(matches!(reload.await, Ok(Ok(()))));

    let view = sync.view();
    assert!(view.collection.is_empty());
    assert!(!view.collection_loading);
}

#[tokio::test(start_paused = true)]
async fn overtaken_reload_does_not_overwrite_newer_collection() {
    let fake = Arc::new(FakeCollectionService::new());
    fake.seed_collection(&[1]);
    fake.delay_next_collection(Duration::from_secs(2));
    let sync = controller(&fake);

    let reloading = sync.clone();
    let slow = tokio::spawn(async move { reloading.reload_collection().await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    fake.seed_collection(&[3]);
    assert!(sync.reload_collection().await.is_ok());
    assert_eq!(sync.view().collection.len(), 2);

    assert!(matches!(slow.await, Ok(Ok(()))));
    let view = sync.view();
    assert_eq!(view.collection, fake.stored_collection());
    assert_eq!(view.collection.len(), 2);
    assert!(!view.collection_loading);
}
