use crate::domain::repository::NotificationPort;
use crate::domain::types::{ClientMetadata, ContactMessage, Locale, normalize_email};
use crate::error::ApiError;

const MAX_NAME_LEN: usize = 200;
const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
    pub phone: Option<String>,
    pub client: ClientMetadata,
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Relays a contact form to the site owner and thanks the sender.
pub struct SendContactUseCase<N: NotificationPort> {
    pub notifier: N,
    pub default_locale: Locale,
}

impl<N: NotificationPort> SendContactUseCase<N> {
    pub async fn execute(&self, input: ContactInput) -> Result<(), ApiError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Podaj imię i nazwisko."));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ApiError::validation("Imię i nazwisko jest zbyt długie."));
        }
        let email = normalize_email(&input.email)?;
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ApiError::validation("Wiadomość nie może być pusta."));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(ApiError::validation("Wiadomość jest zbyt długa."));
        }
        let subject = optional(input.subject);
        if subject
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SUBJECT_LEN)
        {
            return Err(ApiError::validation("Temat jest zbyt długi."));
        }

        let contact = ContactMessage {
            name: name.to_owned(),
            email,
            subject,
            message: message.to_owned(),
            phone: optional(input.phone),
            locale: Locale::resolve(input.client.language.as_deref(), None, self.default_locale),
            client: input.client,
        };

        self.notifier.send_contact_notification(&contact).await?;
        if let Err(e) = self.notifier.send_contact_acknowledgement(&contact).await {
            tracing::warn!(error = ?e, to = %contact.email, "contact acknowledgement failed");
        }
        Ok(())
    }
}
