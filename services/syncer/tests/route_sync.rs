//! Integration tests for the Store B (routing table) sweep.


use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use statesync_id::{AppGuid, ProcessGuid, RouteGuid, VersionGuid};
use statesync_reconcile::SweepError;
use statesync_syncer::routes::{RouteReconciler, RouteReconcilerConfig};

use harness::{desired_process, shutdown_pair, with_route, InMemoryDesiredSource, InMemoryRoutingStore};

fn reconciler(
    source: &Arc<InMemoryDesiredSource>,
    store: &Arc<InMemoryRoutingStore>,
) -> RouteReconciler {
    RouteReconciler::new(
        source.clone(),
        store.clone(),
        RouteReconcilerConfig::default(),
    )
}

#[tokio::test]
async fn converges_routes_mappings_and_associations() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    let route_guid = RouteGuid::new();
    let desired = with_route(
        desired_process(app),
        route_guid,
        "dora.apps.example.com",
        1,
    );
    source.set_processes(vec![desired.clone()]);

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();
    assert_eq!(stats.created, 3);
    assert_eq!(stats.failed, 0);

    assert_eq!(
        store.routes(),
        BTreeMap::from([(route_guid, "dora.apps.example.com".to_string())])
    );
    assert_eq!(
        store.mappings(),
        BTreeMap::from([((route_guid, desired.process_guid), 1)])
    );
    assert_eq!(
        store.associations(),
        BTreeMap::from([(app, BTreeSet::from([desired.process_guid]))])
    );

    // Re-sweeping identical state issues no corrective calls at all.
    let writes_before = store.write_count();
    let stats = sync.sweep(&rx).await.unwrap();
    assert!(stats.is_quiet());
    assert_eq!(store.write_count(), writes_before);
}

#[tokio::test]
async fn purges_route_with_no_desired_justification() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let unexpected = RouteGuid::new();
    store.insert_route(unexpected, "imposter.apps.example.com");

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();
    assert_eq!(stats.deleted, 1);
    assert!(!store.routes().contains_key(&unexpected));
}

#[tokio::test]
async fn unmaps_extraneous_route_mapping() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    let route_guid = RouteGuid::new();
    let desired = with_route(desired_process(app), route_guid, "dora.apps.example.com", 1);
    source.set_processes(vec![desired.clone()]);

    let mut sync = reconciler(&source, &store);
    sync.sweep(&rx).await.unwrap();

    // A pairing nothing desires, sharing the justified route.
    let stray_process = ProcessGuid::from_parts(AppGuid::new(), VersionGuid::new());
    store.insert_mapping(route_guid, stray_process, 1);

    sync.sweep(&rx).await.unwrap();
    let mappings = store.mappings();
    assert!(!mappings.contains_key(&(route_guid, stray_process)));
    assert!(mappings.contains_key(&(route_guid, desired.process_guid)));
}

#[tokio::test]
async fn replaces_stale_association_wholesale() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    let rev_a = desired_process(app);
    let rev_b = desired_process(app);
    source.set_processes(vec![rev_a.clone(), rev_b.clone()]);

    // Stale set: one dead revision plus one surviving one.
    let dead = ProcessGuid::from_parts(app, VersionGuid::new());
    store.insert_association(app, BTreeSet::from([dead, rev_a.process_guid]));

    let mut sync = reconciler(&source, &store);
    sync.sweep(&rx).await.unwrap();

    assert_eq!(
        store.associations()[&app],
        BTreeSet::from([rev_a.process_guid, rev_b.process_guid])
    );
}

#[tokio::test]
async fn deletes_association_with_no_desired_counterpart() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let gone = AppGuid::new();
    store.insert_association(
        gone,
        BTreeSet::from([ProcessGuid::from_parts(gone, VersionGuid::new())]),
    );

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();
    assert_eq!(stats.deleted, 1);
    assert!(store.associations().is_empty());
}

#[tokio::test]
async fn overwrites_drifted_host_and_weight() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    let route_guid = RouteGuid::new();
    let desired = with_route(desired_process(app), route_guid, "dora.apps.example.com", 4);
    source.set_processes(vec![desired.clone()]);

    store.insert_route(route_guid, "old.apps.example.com");
    store.insert_mapping(route_guid, desired.process_guid, 1);

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();
    assert_eq!(stats.failed, 0);

    assert_eq!(store.routes()[&route_guid], "dora.apps.example.com");
    assert_eq!(store.mappings()[&(route_guid, desired.process_guid)], 4);
}

#[tokio::test]
async fn one_failing_route_does_not_block_the_rest() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    let broken_route = RouteGuid::new();
    let healthy_route = RouteGuid::new();
    let desired = with_route(
        with_route(desired_process(app), broken_route, "broken.apps.example.com", 1),
        healthy_route,
        "healthy.apps.example.com",
        1,
    );
    source.set_processes(vec![desired.clone()]);
    store.fail_route_writes_for(broken_route);

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();

    // The broken route's upsert and its mapping both fail; everything else
    // converges.
    assert_eq!(stats.failed, 2);
    assert_eq!(store.routes()[&healthy_route], "healthy.apps.example.com");
    assert!(!store.routes().contains_key(&broken_route));
    assert!(store
        .mappings()
        .contains_key(&(healthy_route, desired.process_guid)));
    assert_eq!(store.associations()[&app], BTreeSet::from([desired.process_guid]));
}

#[tokio::test]
async fn desired_read_failure_leaves_the_table_untouched() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (_tx, rx) = shutdown_pair();

    store.insert_route(RouteGuid::new(), "survivor.apps.example.com");
    source.fail_reads(true);

    let mut sync = reconciler(&source, &store);
    let err = sync.sweep(&rx).await.unwrap_err();
    assert!(matches!(err, SweepError::DesiredStateUnavailable(_)));
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.routes().len(), 1);
}

#[tokio::test]
async fn shutdown_stops_new_corrections() {
    let source = Arc::new(InMemoryDesiredSource::new());
    let store = Arc::new(InMemoryRoutingStore::new());
    let (tx, rx) = shutdown_pair();

    let app = AppGuid::new();
    source.set_processes(vec![with_route(
        desired_process(app),
        RouteGuid::new(),
        "dora.apps.example.com",
        1,
    )]);
    tx.send(true).unwrap();

    let mut sync = reconciler(&source, &store);
    let stats = sync.sweep(&rx).await.unwrap();
    assert!(stats.interrupted);
    assert_eq!(store.write_count(), 0);
}
