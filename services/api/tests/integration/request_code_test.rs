use chrono::{Duration, Utc};

use folio_api::domain::types::{ClientMetadata, Locale, ProfileUpdate};
use folio_api::error::ApiError;
use folio_api::usecase::login_code::RequestCodeInput;

use crate::helpers::{MockNotifier, MockTokenRepo, MockUserRepo, issuer, test_token, test_user};

fn input(email: &str) -> RequestCodeInput {
    RequestCodeInput {
        email: email.to_owned(),
        profile: ProfileUpdate::default(),
        client: ClientMetadata::default(),
        refresh_url: None,
    }
}

fn with_name(email: &str, first: &str, last: &str) -> RequestCodeInput {
    RequestCodeInput {
        profile: ProfileUpdate {
            first_name: Some(first.to_owned()),
            last_name: Some(last.to_owned()),
            preferred_language: None,
        },
        ..input(email)
    }
}

#[tokio::test]
async fn should_create_account_and_send_code_for_new_named_user() {
    let users = MockUserRepo::empty();
    let tokens = MockTokenRepo::empty();
    let notifier = MockNotifier::default();
    let uc = issuer(users.clone(), tokens.clone(), notifier.clone());

    let output = uc
        .execute(with_name("new@example.com", "Jan", "Kowalski"))
        .await
        .unwrap();

    assert!(output.code_sent);
    assert!(output.account_created);
    assert!(!output.resent_existing_token);
    assert_eq!(output.user.email, "new@example.com");
    assert_eq!(users.users.lock().unwrap().len(), 1);

    let codes = tokens.codes_handle();
    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 1, "expected exactly one login code");
    assert_eq!(codes[0].code.len(), 6);
    assert!(codes[0].code.chars().all(|c| c.is_ascii_digit()));
    assert!(codes[0].expires_at > Utc::now() + Duration::hours(23));

    let sent = notifier.login_codes.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].code, codes[0].code);
    assert_eq!(sent[0].to, "new@example.com");
    assert!(!sent[0].reminder);
    assert_eq!(notifier.admin_notices.lock().unwrap().len(), 1);
    assert!(notifier.admin_notices.lock().unwrap()[0].new_account);
}

#[tokio::test]
async fn should_require_profile_for_unknown_email() {
    let uc = issuer(
        MockUserRepo::empty(),
        MockTokenRepo::empty(),
        MockNotifier::default(),
    );

    let result = uc.execute(input("nobody@example.com")).await;

    assert!(
        matches!(result, Err(ApiError::ProfileRequired)),
        "expected ProfileRequired, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_both_names_for_unknown_email() {
    let uc = issuer(
        MockUserRepo::empty(),
        MockTokenRepo::empty(),
        MockNotifier::default(),
    );

    let result = uc.execute(with_name("nobody@example.com", "Jan", "  ")).await;

    assert!(matches!(result, Err(ApiError::ProfileRequired)));
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let uc = issuer(
        MockUserRepo::empty(),
        MockTokenRepo::empty(),
        MockNotifier::default(),
    );

    let result = uc.execute(input("not-an-email")).await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn should_resolve_mixed_case_email_to_existing_account() {
    let user = test_user();
    let users = MockUserRepo::new(vec![user.clone()]);
    let uc = issuer(users.clone(), MockTokenRepo::empty(), MockNotifier::default());

    let output = uc.execute(input("  USER@Example.COM ")).await.unwrap();

    assert_eq!(output.user.id, user.id);
    assert!(!output.account_created);
    assert_eq!(users.users.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_resend_existing_valid_code_without_minting() {
    let user = test_user();
    let existing = test_token(user.id, "424242");
    let tokens = MockTokenRepo::new(vec![existing.clone()]);
    let notifier = MockNotifier::default();
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        notifier.clone(),
    );

    let output = uc.execute(input(&user.email)).await.unwrap();

    assert!(!output.code_sent);
    assert!(output.existing_token_valid);
    assert!(output.resent_existing_token);
    assert_eq!(output.valid_until, existing.expires_at);
    assert_eq!(tokens.codes_handle().lock().unwrap().len(), 1);

    let sent = notifier.login_codes.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].code, "424242");
    assert!(sent[0].reminder);
}

#[tokio::test]
async fn should_not_mint_on_quick_second_request() {
    let user = test_user();
    let tokens = MockTokenRepo::empty();
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        MockNotifier::default(),
    );

    let first = uc.execute(input(&user.email)).await.unwrap();
    let second = uc.execute(input(&user.email)).await.unwrap();

    assert!(first.code_sent);
    assert!(!second.code_sent);
    assert!(second.resent_existing_token);
    assert_eq!(tokens.codes_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_revoke_expired_code_and_mint_new_one() {
    let user = test_user();
    let mut stale = test_token(user.id, "111111");
    stale.expires_at = Utc::now() - Duration::minutes(1);
    let tokens = MockTokenRepo::new(vec![stale.clone()]);
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        MockNotifier::default(),
    );

    let output = uc.execute(input(&user.email)).await.unwrap();

    assert!(output.code_sent);
    let codes = tokens.codes_handle();
    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 2);
    assert!(codes.iter().find(|t| t.id == stale.id).unwrap().revoked);
    let active: Vec<_> = codes.iter().filter(|t| t.is_active()).collect();
    assert_eq!(active.len(), 1, "exactly one active code after issuance");
    assert_ne!(active[0].code, "111111");
}

#[tokio::test]
async fn should_keep_single_active_code_under_concurrent_requests() {
    let user = test_user();
    let tokens = MockTokenRepo::empty();
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        MockNotifier::default(),
    );

    let (a, b) = tokio::join!(uc.execute(input(&user.email)), uc.execute(input(&user.email)));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(
        [a.code_sent, b.code_sent].iter().filter(|sent| **sent).count(),
        1
    );
    let codes = tokens.codes_handle();
    let active = codes.lock().unwrap().iter().filter(|t| t.is_active()).count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn should_fall_back_to_long_code_when_short_codes_collide() {
    let user = test_user();
    let tokens = MockTokenRepo {
        short_codes_taken: true,
        ..MockTokenRepo::empty()
    };
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        MockNotifier::default(),
    );

    uc.execute(input(&user.email)).await.unwrap();

    let codes = tokens.codes_handle();
    assert_eq!(codes.lock().unwrap()[0].code.len(), 8);
}

#[tokio::test]
async fn should_retry_insert_after_unique_violation() {
    let user = test_user();
    let tokens = MockTokenRepo::empty();
    *tokens.insert_collisions.lock().unwrap() = 2;
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens.clone(),
        MockNotifier::default(),
    );

    let output = uc.execute(input(&user.email)).await.unwrap();

    assert!(output.code_sent);
    assert_eq!(tokens.codes_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_fail_when_every_insert_collides() {
    let user = test_user();
    let tokens = MockTokenRepo::empty();
    *tokens.insert_collisions.lock().unwrap() = 3;
    let notifier = MockNotifier::default();
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        tokens,
        notifier.clone(),
    );

    let result = uc.execute(input(&user.email)).await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert!(notifier.login_codes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_propagate_login_code_delivery_failure() {
    let user = test_user();
    let notifier = MockNotifier {
        fail_login_code: true,
        ..Default::default()
    };
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        MockTokenRepo::empty(),
        notifier,
    );

    let result = uc.execute(input(&user.email)).await;

    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );
}

#[tokio::test]
async fn should_swallow_admin_notice_failure() {
    let user = test_user();
    let notifier = MockNotifier {
        fail_admin_notice: true,
        ..Default::default()
    };
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        MockTokenRepo::empty(),
        notifier.clone(),
    );

    let output = uc.execute(input(&user.email)).await.unwrap();

    assert!(output.code_sent);
    assert_eq!(notifier.login_codes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_update_changed_profile_fields() {
    let user = test_user();
    let users = MockUserRepo::new(vec![user.clone()]);
    let uc = issuer(users.clone(), MockTokenRepo::empty(), MockNotifier::default());

    let mut request = with_name(&user.email, "Anna", "Kowalska");
    request.profile.preferred_language = Some("en".to_owned());
    let output = uc.execute(request).await.unwrap();

    assert_eq!(output.user.first_name.as_deref(), Some("Anna"));
    assert_eq!(output.user.last_name.as_deref(), Some("Kowalska"));
    assert_eq!(output.user.preferred_language.as_deref(), Some("en"));
}

#[tokio::test]
async fn should_pick_email_language_from_request_then_profile() {
    let mut user = test_user();
    user.preferred_language = Some("en".to_owned());
    let notifier = MockNotifier::default();
    let uc = issuer(
        MockUserRepo::new(vec![user.clone()]),
        MockTokenRepo::empty(),
        notifier.clone(),
    );

    uc.execute(input(&user.email)).await.unwrap();
    let mut request = input(&user.email);
    request.client.language = Some("pl-PL".to_owned());
    uc.execute(request).await.unwrap();

    let sent = notifier.login_codes.lock().unwrap();
    assert_eq!(sent[0].locale, Locale::En);
    assert_eq!(sent[1].locale, Locale::Pl);
}
