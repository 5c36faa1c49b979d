use std::sync::Arc;

use crate::domain::entities::verification_code::{CodeKey, SetCodeOutcome, VerifyCodeOutcome};
use crate::errors::{CodeError, DomainError, SmsError};
use crate::repositories::MockCodeCache;
use crate::services::code::{CodeService, CodeServiceConfig};
use crate::services::sms::tests::mocks::MockProvider;

fn service(cache: Arc<MockCodeCache>, provider: Arc<MockProvider>) -> CodeService {
    CodeService::new(cache, provider, CodeServiceConfig::default())
}

#[tokio::test]
async fn test_send_stores_and_delivers_code() {
    let cache = Arc::new(MockCodeCache::new());
    let provider = Arc::new(MockProvider::new("primary"));
    let service = service(cache.clone(), provider.clone());

    let result = service.send("login", "+15551234567").await.unwrap();
    assert_eq!(result.biz, "login");
    assert!(result.next_resend_at < result.expires_at);

    let stored = cache.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, CodeKey::new("login", "+15551234567"));
    let code = &stored[0].1;
    assert_eq!(code.len(), 6);

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "1877556");
    assert_eq!(&sent[0].1[0], code);
    assert_eq!(sent[0].2, vec!["+15551234567".to_string()]);
}

#[tokio::test]
async fn test_send_too_frequent_is_not_delivered() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_set(SetCodeOutcome::TooFrequent);
    let provider = Arc::new(MockProvider::new("primary"));
    let service = service(cache, provider.clone());

    let err = service.send("login", "+15551234567").await.unwrap_err();
    assert!(matches!(err, DomainError::Code(CodeError::SendTooFrequent)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_send_corrupted_record_is_system_error() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_set(SetCodeOutcome::Unknown);
    let service = service(cache, Arc::new(MockProvider::new("primary")));

    let err = service.send("login", "+15551234567").await.unwrap_err();
    assert!(matches!(err, DomainError::Code(CodeError::Unknown)));
}

#[tokio::test]
async fn test_send_propagates_delivery_failure() {
    let provider = Arc::new(MockProvider::new("primary"));
    provider.set_fail(true);
    let service = service(Arc::new(MockCodeCache::new()), provider);

    let err = service.send("login", "+15551234567").await.unwrap_err();
    assert!(matches!(err, DomainError::Sms(SmsError::Provider { .. })));
}

#[tokio::test]
async fn test_send_store_failure_propagates() {
    let service = service(
        Arc::new(MockCodeCache::failing()),
        Arc::new(MockProvider::new("primary")),
    );

    let err = service.send("login", "+15551234567").await.unwrap_err();
    assert!(matches!(err, DomainError::Internal { .. }));
}

#[tokio::test]
async fn test_send_rejects_blank_input() {
    let service = service(Arc::new(MockCodeCache::new()), Arc::new(MockProvider::new("p")));

    assert!(matches!(
        service.send("", "+15551234567").await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        service.send("login", "   ").await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_send_rejects_phone_without_digits() {
    let cache = Arc::new(MockCodeCache::new());
    let provider = Arc::new(MockProvider::new("p"));
    let service = service(cache.clone(), provider.clone());

    let err = service.send("login", "abc").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation { ref message } if message == "Phone number is not deliverable"
    ));
    assert!(cache.stored().is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_verify_outcomes() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_verify(VerifyCodeOutcome::Matched);
    cache.push_verify(VerifyCodeOutcome::Mismatch);
    cache.push_verify(VerifyCodeOutcome::NotFound);
    let service = service(cache, Arc::new(MockProvider::new("primary")));

    assert!(service.verify("login", "+15551234567", "123456").await.unwrap());
    assert!(!service.verify("login", "+15551234567", "000000").await.unwrap());
    assert!(!service.verify("login", "+15551234567", "123456").await.unwrap());
}

#[tokio::test]
async fn test_verify_flattens_abuse_outcomes() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_verify(VerifyCodeOutcome::TooManyAttempts);
    cache.push_verify(VerifyCodeOutcome::Invalidated);
    let service = service(cache, Arc::new(MockProvider::new("primary")));

    assert_eq!(service.verify("login", "+15551234567", "123456").await.unwrap(), false);
    assert_eq!(service.verify("login", "+15551234567", "123456").await.unwrap(), false);
}

#[tokio::test]
async fn test_verify_detailed_reports_abuse_outcomes() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_verify(VerifyCodeOutcome::TooManyAttempts);
    cache.push_verify(VerifyCodeOutcome::Invalidated);
    let service = service(cache, Arc::new(MockProvider::new("primary")));

    let first = service.verify_detailed("login", "+15551234567", "1").await;
    assert!(matches!(first, Err(DomainError::Code(CodeError::VerifyTooManyTimes))));
    let second = service.verify_detailed("login", "+15551234567", "1").await;
    assert!(matches!(second, Err(DomainError::Code(CodeError::Invalidated))));
}

#[tokio::test]
async fn test_verify_unknown_state_is_error() {
    let cache = Arc::new(MockCodeCache::new());
    cache.push_verify(VerifyCodeOutcome::Unknown);
    let service = service(cache, Arc::new(MockProvider::new("primary")));

    let result = service.verify("login", "+15551234567", "123456").await;
    assert!(matches!(result, Err(DomainError::Code(CodeError::Unknown))));
}
