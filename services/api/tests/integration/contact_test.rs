use folio_api::domain::types::{ClientMetadata, Locale};
use folio_api::error::ApiError;
use folio_api::usecase::contact::{ContactInput, SendContactUseCase};

use crate::helpers::MockNotifier;

fn input() -> ContactInput {
    ContactInput {
        name: " Ewa ".to_owned(),
        email: "Ewa@Example.com".to_owned(),
        message: "Chętnie porozmawiam o projekcie.".to_owned(),
        subject: Some("  ".to_owned()),
        phone: Some("+48 600 000 000".to_owned()),
        client: ClientMetadata {
            language: Some("en-US".to_owned()),
            ..Default::default()
        },
    }
}

fn usecase(notifier: MockNotifier) -> SendContactUseCase<MockNotifier> {
    SendContactUseCase {
        notifier,
        default_locale: Locale::Pl,
    }
}

#[tokio::test]
async fn should_notify_owner_and_acknowledge_sender() {
    let notifier = MockNotifier::default();

    usecase(notifier.clone()).execute(input()).await.unwrap();

    let notifications = notifier.contact_notifications.lock().unwrap();
    assert_eq!(notifications.len(), 1);
    let sent = &notifications[0];
    assert_eq!(sent.name, "Ewa");
    assert_eq!(sent.email, "ewa@example.com");
    assert_eq!(sent.subject, None);
    assert_eq!(sent.locale, Locale::En);
    assert_eq!(notifier.acknowledgements.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_propagate_owner_notification_failure() {
    let notifier = MockNotifier {
        fail_contact_notification: true,
        ..Default::default()
    };

    let result = usecase(notifier.clone()).execute(input()).await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert!(notifier.acknowledgements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_swallow_acknowledgement_failure() {
    let notifier = MockNotifier {
        fail_acknowledgement: true,
        ..Default::default()
    };

    let result = usecase(notifier.clone()).execute(input()).await;

    assert!(result.is_ok());
    assert_eq!(notifier.contact_notifications.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_blank_fields() {
    let blank_name = ContactInput {
        name: "  ".to_owned(),
        ..input()
    };
    let blank_message = ContactInput {
        message: "\n".to_owned(),
        ..input()
    };
    let bad_email = ContactInput {
        email: "ewa".to_owned(),
        ..input()
    };

    for request in [blank_name, blank_message, bad_email] {
        let result = usecase(MockNotifier::default()).execute(request).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}

#[tokio::test]
async fn should_reject_oversized_message() {
    let request = ContactInput {
        message: "x".repeat(5001),
        ..input()
    };

    let result = usecase(MockNotifier::default()).execute(request).await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}
