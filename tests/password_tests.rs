use metocast_hub::password::{hash, verify, verify_password, verify_unknown_account};

#[tokio::test]
async fn test_blocking_pool_round_trip() {
    let stored = hash("metocast123").await.unwrap();
    assert!(stored.starts_with("$argon2id$"));
    assert!(verify("metocast123", &stored).await);
    assert!(!verify("metocast124", &stored).await);
    assert!(!verify("metocast123", "not-a-phc-string").await);

    // Same password, different salt.
    assert_ne!(hash("metocast123").await.unwrap(), stored);
}

#[tokio::test(flavor = "current_thread")]
async fn test_hashing_does_not_hold_the_runtime_thread() {
    // On a single-threaded runtime the ticker only advances while the hash runs elsewhere.
    let ticker = tokio::spawn(async {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    });

    let stored = hash("metocast123").await.unwrap();
    verify_unknown_account("metocast123").await;

    assert!(ticker.is_finished());
    ticker.await.unwrap();
    assert!(verify_password("metocast123", &stored));
}
