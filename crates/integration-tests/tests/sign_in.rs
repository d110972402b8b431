//! First sign-in account linking.

#![allow(clippy::unwrap_used)]

use simple_shop_core::Email;
use simple_shop_integration_tests::TestServer;
use simple_shop_server::db::UserRepository;
use simple_shop_server::models::{OAuthProvider, ProviderIdentity};

fn identity(provider: OAuthProvider, account: &str, email: &str) -> ProviderIdentity {
    ProviderIdentity {
        provider,
        provider_account_id: account.to_owned(),
        email: Some(Email::parse(email).unwrap()),
        name: Some("Race Tester".to_owned()),
        image: None,
    }
}

// =============================================================================
// Concurrent first sign-ins
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_simultaneous_first_sign_ins_share_one_user() {
    let server = TestServer::start().await;
    let users = UserRepository::new(&server.pool);
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let email = format!("race-{unique}@example.com");

    let google = identity(OAuthProvider::Google, &format!("g-{unique}"), &email);
    let facebook = identity(OAuthProvider::Facebook, &format!("f-{unique}"), &email);

    let (a, b) = tokio::join!(
        users.upsert_from_identity(&google),
        users.upsert_from_identity(&facebook),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(a.email.unwrap().as_str(), email);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_same_identity_twice_at_once_links_once() {
    let server = TestServer::start().await;
    let users = UserRepository::new(&server.pool);
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let google = identity(
        OAuthProvider::Google,
        &format!("g-{unique}"),
        &format!("twice-{unique}@example.com"),
    );

    let (a, b) = tokio::join!(
        users.upsert_from_identity(&google),
        users.upsert_from_identity(&google),
    );
    assert_eq!(a.unwrap().id, b.unwrap().id);
}
