use folio_api::domain::types::{ClientMetadata, ProfileUpdate};
use folio_api::error::ApiError;
use folio_api::usecase::login_code::RequestCodeInput;
use folio_api::usecase::user::{SignupInput, SignupUseCase};

use crate::helpers::{MockNotifier, MockTokenRepo, MockUserRepo, issuer, test_user};

fn input(email: &str) -> SignupInput {
    SignupInput {
        email: email.to_owned(),
        profile: ProfileUpdate {
            first_name: Some(" Jan ".to_owned()),
            last_name: None,
            preferred_language: Some("EN".to_owned()),
        },
        client: ClientMetadata::default(),
        refresh_url: Some("https://example.com/login".to_owned()),
    }
}

#[tokio::test]
async fn should_create_user_and_send_first_code() {
    let users = MockUserRepo::empty();
    let tokens = MockTokenRepo::empty();
    let notifier = MockNotifier::default();
    let uc = SignupUseCase {
        issuer: issuer(users.clone(), tokens.clone(), notifier.clone()),
    };

    let output = uc.execute(input("Fresh@Example.com")).await.unwrap();

    assert!(output.code_sent);
    assert!(output.account_created);
    assert_eq!(output.user.email, "fresh@example.com");
    assert_eq!(output.user.first_name.as_deref(), Some("Jan"));
    assert_eq!(output.user.last_name, None);
    assert_eq!(output.user.preferred_language.as_deref(), Some("en"));
    assert_eq!(users.users.lock().unwrap().len(), 1);
    assert_eq!(tokens.codes_handle().lock().unwrap().len(), 1);

    let sent = notifier.login_codes.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].refresh_url.as_deref(),
        Some("https://example.com/login")
    );
}

#[tokio::test]
async fn should_conflict_when_email_taken() {
    let user = test_user();
    let tokens = MockTokenRepo::empty();
    let uc = SignupUseCase {
        issuer: issuer(
            MockUserRepo::new(vec![user.clone()]),
            tokens.clone(),
            MockNotifier::default(),
        ),
    };

    let result = uc.execute(input("USER@example.com")).await;

    assert!(
        matches!(result, Err(ApiError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert!(tokens.codes_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_invalid_email() {
    let uc = SignupUseCase {
        issuer: issuer(
            MockUserRepo::empty(),
            MockTokenRepo::empty(),
            MockNotifier::default(),
        ),
    };

    let result = uc.execute(input("fresh@")).await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn should_keep_account_when_first_code_fails_and_recover_via_request_code() {
    let users = MockUserRepo::empty();
    let tokens = MockTokenRepo::empty();
    let failing = MockNotifier {
        fail_login_code: true,
        ..Default::default()
    };
    let uc = SignupUseCase {
        issuer: issuer(users.clone(), tokens.clone(), failing),
    };

    let first = uc.execute(input("fresh@example.com")).await;
    assert!(matches!(first, Err(ApiError::Internal(_))), "got {first:?}");
    assert_eq!(users.users.lock().unwrap().len(), 1);

    let retry = uc.execute(input("fresh@example.com")).await;
    assert!(matches!(retry, Err(ApiError::UserAlreadyExists)), "got {retry:?}");

    let working = MockNotifier::default();
    let output = issuer(users, tokens, working.clone())
        .execute(RequestCodeInput {
            email: "fresh@example.com".to_owned(),
            profile: ProfileUpdate::default(),
            client: ClientMetadata::default(),
            refresh_url: None,
        })
        .await
        .unwrap();

    assert!(!output.account_created);
    assert_eq!(working.login_codes.lock().unwrap().len(), 1);
}
