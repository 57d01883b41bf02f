use std::sync::Arc;

use domain::SessionContext;
use parking_auth::{AuthError, AuthService, JwtManager};
use parking_storage::{InMemoryAdminConfigStore, InMemoryUserStore};

fn service() -> AuthService {
    AuthService::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryAdminConfigStore::new()),
        JwtManager::new("secret".to_string(), 900),
    )
}

#[tokio::test]
async fn first_user_becomes_admin_and_seeds_admin_password() {
    let auth = service();
    assert!(!auth.admin_password_set().await.expect("check"));

    let user = auth
        .register("alice", "pw-alice", None, 1)
        .await
        .expect("register");
    assert!(user.is_admin);
    assert!(auth.admin_password_set().await.expect("check"));

    let result = auth.register("bob", "pw-bob", Some("wrong"), 2).await;
    assert!(matches!(result, Err(AuthError::AdminPasswordInvalid)));

    let bob = auth
        .register("bob", "pw-bob", Some("pw-alice"), 3)
        .await
        .expect("register bob");
    assert!(!bob.is_admin);

    let duplicate = auth.register("bob", "pw", Some("pw-alice"), 4).await;
    assert!(matches!(duplicate, Err(AuthError::UsernameTaken)));
}

#[tokio::test]
async fn login_and_refresh_session() {
    let auth = service();
    auth.register("alice", "pw-alice", None, 1)
        .await
        .expect("register");

    let bad = auth.login("alice", "nope").await;
    assert!(matches!(bad, Err(AuthError::InvalidCredentials)));
    let unknown = auth.login("carol", "pw").await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

    let (_, session) = auth.login("alice", "pw-alice").await.expect("login");
    let ctx = auth.verify_session(&session.token).expect("verify");
    assert_eq!(ctx.username, "alice");
    assert!(ctx.is_admin);

    let refreshed = auth
        .refresh_session(&session.token)
        .await
        .expect("refresh");
    assert_ne!(refreshed.token, session.token);
    assert!(refreshed.expires_at >= session.expires_at);
}

#[tokio::test]
async fn set_admin_password_requires_current_password() {
    let auth = service();
    auth.register("alice", "pw-alice", None, 1)
        .await
        .expect("register");
    let ctx = SessionContext::new("alice", true);

    let rejected = auth.set_admin_password(&ctx, "gate", "wrong", 2).await;
    assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));

    auth.set_admin_password(&ctx, "gate", "pw-alice", 3)
        .await
        .expect("set admin password");
    let old = auth.register("bob", "pw-bob", Some("pw-alice"), 4).await;
    assert!(matches!(old, Err(AuthError::AdminPasswordInvalid)));
    auth.register("bob", "pw-bob", Some("gate"), 5)
        .await
        .expect("register with new admin password");
}
