use serde_json::json;
use users_backend::datalayer::{UserStore, initialize_database};
use users_backend::errors::errors::ServiceError;
use users_backend::validation::users::{validate_user_changes, validate_user_input};

// End-to-end store flow against a live database. Requires DATABASE_URL;
// skipped otherwise.
#[tokio::test]
async fn test_user_create_update_delete_flow() {
    println!("\n=== TEST: User Create-Update-Delete Flow ===");

    // Load .env file
    let _ = dotenvy::dotenv();

    // Skip test if DATABASE_URL is not set
    if std::env::var("DATABASE_URL").is_err() {
        println!("Skipping test: DATABASE_URL not set");
        return;
    }

    println!("Initializing database...");
    let db = match initialize_database().await {
        Ok(db) => db,
        Err(e) => {
            println!("Failed to initialize database: {}", e);
            return;
        }
    };
    println!("Database initialized successfully");

    let store = UserStore::new(db.pool_arc());

    // Unique addresses per run so reruns do not trip the email constraint
    let tag = chrono::Utc::now().timestamp_micros();
    let first_email = format!("flow.first.{}@example.com", tag);
    let second_email = format!("flow.second.{}@example.com", tag);

    // === STEP 1: CREATE ===
    println!("\nSTEP 1: Creating a user...");

    let input = validate_user_input(&json!({
        "name": "  Grace Hopper  ",
        "email": format!("  {}  ", first_email.to_uppercase()),
        "age": 37
    }))
    .expect("input should validate");

    let created = store.create(&input).await.expect("create should succeed");
    println!("User created with id {}", created.id);

    assert!(created.id >= 1);
    assert_eq!(created.name, "Grace Hopper");
    assert_eq!(created.email, first_email, "email must be stored trimmed and lower-cased");
    assert_eq!(created.age, Some(37));

    // === STEP 2: DUPLICATE EMAIL ===
    println!("\nSTEP 2: Creating a second user with the same email...");

    let duplicate = store.create(&input).await;
    assert_eq!(duplicate.unwrap_err(), ServiceError::EmailConflict);
    println!("Duplicate create rejected with EmailConflict");

    // === STEP 3: READ ===
    println!("\nSTEP 3: Reading the user back...");

    let fetched = store
        .get_by_id(created.id)
        .await
        .expect("get_by_id should succeed");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.email, created.email);

    // === STEP 4: REPLACE ===
    println!("\nSTEP 4: Replacing all mutable fields...");

    let replacement = validate_user_input(&json!({
        "name": "Grace Brewster Hopper",
        "email": second_email,
        // no age: a full update clears the optional field
    }))
    .expect("replacement should validate");

    let replaced = store
        .replace(created.id, &replacement)
        .await
        .expect("replace should succeed");
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "Grace Brewster Hopper");
    assert_eq!(replaced.email, second_email);
    assert_eq!(replaced.age, None);

    // Replacing a nonexistent user fails with NotFound
    let missing = store.replace(i64::MAX, &replacement).await;
    assert_eq!(missing.unwrap_err(), ServiceError::NotFound);

    // === STEP 5: PATCH ===
    println!("\nSTEP 5: Patching a single field...");

    let changes = validate_user_changes(&json!({ "age": 40 })).expect("changes should validate");
    let patched = store
        .patch(created.id, &changes)
        .await
        .expect("patch should succeed");
    assert_eq!(patched.age, Some(40));
    assert_eq!(
        patched.name, "Grace Brewster Hopper",
        "untouched fields must survive a patch"
    );
    assert_eq!(patched.email, second_email);

    // === STEP 6: LIST ORDERING ===
    println!("\nSTEP 6: Creating a second user and listing...");

    let second_input = validate_user_input(&json!({
        "name": "Ada Lovelace",
        "email": format!("flow.third.{}@example.com", tag)
    }))
    .expect("second input should validate");
    let second = store
        .create(&second_input)
        .await
        .expect("second create should succeed");
    assert!(second.id > created.id, "ids must never be reused");

    let all = store.list_all().await.expect("list_all should succeed");
    assert!(all.iter().any(|u| u.id == created.id));
    assert!(all.iter().any(|u| u.id == second.id));
    assert!(
        all.windows(2).all(|pair| pair[0].id < pair[1].id),
        "list_all must be ordered ascending by id"
    );

    // === STEP 7: DELETE ===
    println!("\nSTEP 7: Deleting both users...");

    let deleted = store
        .delete(created.id)
        .await
        .expect("delete should succeed");
    assert_eq!(deleted.id, created.id);
    assert_eq!(deleted.email, second_email, "delete returns the last-known state");

    // Deleting again fails with NotFound
    let gone = store.delete(created.id).await;
    assert_eq!(gone.unwrap_err(), ServiceError::NotFound);

    // Reading a deleted user fails with NotFound
    let gone = store.get_by_id(created.id).await;
    assert_eq!(gone.unwrap_err(), ServiceError::NotFound);

    store
        .delete(second.id)
        .await
        .expect("cleanup delete should succeed");

    db.shutdown().await;
    println!("\n=== Flow complete ===");
}

// Reusing a freed email must succeed: the conflict is on live rows only.
#[tokio::test]
async fn test_email_is_reusable_after_delete() {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        println!("Skipping test: DATABASE_URL not set");
        return;
    }

    let db = match initialize_database().await {
        Ok(db) => db,
        Err(e) => {
            println!("Failed to initialize database: {}", e);
            return;
        }
    };
    let store = UserStore::new(db.pool_arc());

    let email = format!("reuse.{}@example.com", chrono::Utc::now().timestamp_micros());
    let input = validate_user_input(&json!({ "name": "First Owner", "email": email }))
        .expect("input should validate");

    let first = store.create(&input).await.expect("create should succeed");
    store.delete(first.id).await.expect("delete should succeed");

    let second = store
        .create(&input)
        .await
        .expect("recreate with freed email should succeed");
    assert!(second.id > first.id, "ids must never be reused");

    store.delete(second.id).await.expect("cleanup should succeed");
    db.shutdown().await;
}
