mod common;

use common::*;

use api::error::AppError;
use api::services::tracking::{allocate, MAX_GENERATE_ATTEMPTS};

#[tokio::test]
async fn allocation_survives_collisions() {
    // The first two candidates read as taken; the third is free.
    let store = ScriptedStore::with_collisions(2);

    let id = allocate(&store).await.unwrap();
    assert_eq!(id.as_str().len(), 6);
    assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(store.find_count(), 3);
}

#[tokio::test]
async fn allocation_gives_up_after_the_probe_budget() {
    // Every candidate reads as taken.
    let store = ScriptedStore::with_collisions(usize::MAX);

    let err = allocate(&store).await.unwrap_err();
    assert!(matches!(err, AppError::IdSpaceExhausted));
    assert_eq!(store.find_count(), MAX_GENERATE_ATTEMPTS as usize);
}

#[tokio::test]
async fn fresh_store_allocates_on_the_first_probe() {
    let store = ScriptedStore::with_collisions(0);
    allocate(&store).await.unwrap();
    assert_eq!(store.find_count(), 1);
}
