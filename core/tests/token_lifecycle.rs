//! End-to-end token lifecycle through the public core API

use std::sync::Arc;

use gk_core::{
    ClaimSet, InMemoryTokenRepository, TokenError, TokenKind, TokenRepository, TokenService,
    TokenServiceConfig,
};
use serde_json::json;

fn service() -> (TokenService<Arc<InMemoryTokenRepository>>, Arc<InMemoryTokenRepository>) {
    let repository = Arc::new(InMemoryTokenRepository::new());
    let config = TokenServiceConfig::with_secret("lifecycle-secret");
    let service = TokenService::new(Arc::clone(&repository), config).unwrap();
    (service, repository)
}

#[tokio::test]
async fn test_login_refresh_logout_everywhere() {
    let (service, repository) = service();
    let claims = ClaimSet::new("user-42")
        .with_claim("tenant", "acme")
        .unwrap()
        .with_claim("roles", json!(["admin"]))
        .unwrap();

    let laptop = service.create_pair(&claims).await.unwrap();
    let phone = service.create_pair(&claims).await.unwrap();
    assert_eq!(repository.len().await, 4);

    let access = service
        .validate(&laptop.access_token, Some(TokenKind::Access))
        .await
        .unwrap();
    assert_eq!(access.sub, "user-42");
    assert_eq!(access.custom.get("tenant"), Some(&json!("acme")));

    // Refresh keeps the subject and leaves the refresh token usable
    let refreshed = service.refresh(&phone.refresh_token).await.unwrap();
    let refreshed = service
        .validate(&refreshed, Some(TokenKind::Access))
        .await
        .unwrap();
    assert_eq!(refreshed.sub, "user-42");
    assert!(service
        .validate(&phone.refresh_token, Some(TokenKind::Refresh))
        .await
        .is_ok());

    // Log out everywhere except the laptop's access token
    let revoked = service
        .revoke_all_for_user("user-42", Some(&access.jti))
        .await
        .unwrap();
    assert_eq!(revoked, 4);

    assert!(service.validate(&laptop.access_token, None).await.is_ok());
    for token in [&laptop.refresh_token, &phone.access_token, &phone.refresh_token] {
        assert!(matches!(
            service.validate(token, None).await,
            Err(TokenError::Revoked { .. })
        ));
    }

    let sessions = service.active_sessions("user-42").await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].token_id, access.jti);
    assert!(service.active_refresh_token("user-42").await.unwrap().is_none());

    // Revoked records stay revoked
    let record = repository
        .get_by_token_id(&service.inspect(&phone.refresh_token).unwrap().jti)
        .await
        .unwrap()
        .unwrap();
    assert!(record.revoked);
}

#[tokio::test]
async fn test_tokens_from_another_deployment_are_rejected() {
    let (service, _) = service();
    let (other, _) = {
        let repository = Arc::new(InMemoryTokenRepository::new());
        let config = TokenServiceConfig::with_secret("someone-elses-secret");
        (TokenService::new(Arc::clone(&repository), config).unwrap(), repository)
    };

    let foreign = other
        .issue(&ClaimSet::new("user-42"), TokenKind::Access, None)
        .await
        .unwrap();

    let err = service.validate(&foreign, None).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TOKEN");
    assert!(service.revoke(&foreign).await.is_err());
}
