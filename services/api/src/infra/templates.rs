//! Bilingual email bodies. Plain `format!` renderers; every user-supplied
//! value goes through [`escape_html`] before landing in HTML.

use chrono::{DateTime, Utc};

use crate::domain::types::{
    AdminLoginNotice, ClientMetadata, ContactMessage, Locale, LoginCodeEmail,
};

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn layout(title: &str, body: &str, site_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #222; }}
        .container {{ max-width: 560px; margin: 0 auto; padding: 24px; }}
        .code {{ font-size: 32px; letter-spacing: 6px; font-weight: bold; padding: 12px 0; }}
        .footer {{ font-size: 12px; color: #777; padding-top: 24px; }}
        td {{ padding: 2px 12px 2px 0; vertical-align: top; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>{title}</h2>
        {body}
        <div class="footer">{site}</div>
    </div>
</body>
</html>"#,
        title = escape_html(title),
        body = body,
        site = escape_html(site_name),
    )
}

// ── Login code ───────────────────────────────────────────────────────────────

pub fn login_code(email: &LoginCodeEmail, site_name: &str) -> RenderedEmail {
    let expires = format_time(email.expires_at);
    let (subject, greeting, intro, valid, link_label, ignore) = match email.locale {
        Locale::Pl => (
            if email.reminder {
                format!("{site_name}: przypomnienie kodu logowania")
            } else {
                format!("{site_name}: Twój kod logowania")
            },
            match &email.recipient_name {
                Some(name) => format!("Cześć {name},"),
                None => "Cześć,".to_owned(),
            },
            if email.reminder {
                "Twój poprzedni kod logowania jest nadal ważny:"
            } else {
                "Oto Twój jednorazowy kod logowania:"
            },
            format!("Kod jest ważny do {expires}."),
            "Wróć do logowania",
            "Jeśli to nie Ty prosiłeś o kod, zignoruj tę wiadomość.",
        ),
        Locale::En => (
            if email.reminder {
                format!("{site_name}: your login code reminder")
            } else {
                format!("{site_name}: your login code")
            },
            match &email.recipient_name {
                Some(name) => format!("Hi {name},"),
                None => "Hi,".to_owned(),
            },
            if email.reminder {
                "Your previous login code is still valid:"
            } else {
                "Here is your one-time login code:"
            },
            format!("The code is valid until {expires}."),
            "Back to sign-in",
            "If you did not request this code, you can ignore this email.",
        ),
    };

    let link_html = email
        .refresh_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<p><a href="{}">{}</a></p>"#,
                escape_html(url),
                link_label
            )
        })
        .unwrap_or_default();
    let link_text = email
        .refresh_url
        .as_deref()
        .map(|url| format!("{link_label}: {url}\n"))
        .unwrap_or_default();

    let body = format!(
        r#"<p>{greeting}</p>
        <p>{intro}</p>
        <div class="code">{code}</div>
        <p>{valid}</p>
        {link_html}
        <p>{ignore}</p>"#,
        greeting = escape_html(&greeting),
        code = escape_html(&email.code),
    );
    let text = format!(
        "{greeting}\n\n{intro}\n\n    {code}\n\n{valid}\n{link_text}\n{ignore}\n",
        code = email.code,
    );

    RenderedEmail {
        html: layout(&subject, &body, site_name),
        subject,
        text,
    }
}

// ── Admin audit notice ───────────────────────────────────────────────────────

fn client_rows(client: &ClientMetadata, locale: Locale) -> Vec<(&'static str, String)> {
    let unknown = match locale {
        Locale::Pl => "nieznane",
        Locale::En => "unknown",
    };
    let value = |v: &Option<String>| v.clone().unwrap_or_else(|| unknown.to_owned());
    match locale {
        Locale::Pl => vec![
            ("Urządzenie", value(&client.device)),
            ("Przeglądarka", value(&client.browser)),
            ("User-Agent", value(&client.user_agent)),
            ("IP", value(&client.ip)),
            ("Język", value(&client.language)),
        ],
        Locale::En => vec![
            ("Device", value(&client.device)),
            ("Browser", value(&client.browser)),
            ("User-Agent", value(&client.user_agent)),
            ("IP", value(&client.ip)),
            ("Language", value(&client.language)),
        ],
    }
}

fn render_rows(rows: &[(&str, String)]) -> (String, String) {
    let html = rows
        .iter()
        .map(|(k, v)| {
            format!(
                "<tr><td><b>{}</b></td><td>{}</td></tr>",
                escape_html(k),
                escape_html(v)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = rows
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n");
    (format!("<table>{html}</table>"), text)
}

pub fn admin_login_notice(
    notice: &AdminLoginNotice,
    site_name: &str,
    locale: Locale,
) -> RenderedEmail {
    let kind = match (locale, notice.reminder) {
        (Locale::Pl, true) => "przypomnienie istniejącego kodu",
        (Locale::Pl, false) => "nowy kod",
        (Locale::En, true) => "reminder of existing code",
        (Locale::En, false) => "new code",
    };
    let subject = match locale {
        Locale::Pl => format!("[{site_name}] Prośba o kod logowania: {}", notice.email),
        Locale::En => format!("[{site_name}] Login code requested: {}", notice.email),
    };

    let unknown = match locale {
        Locale::Pl => "brak",
        Locale::En => "none",
    };
    let yes_no = |b: bool| match (locale, b) {
        (Locale::Pl, true) => "tak",
        (Locale::Pl, false) => "nie",
        (Locale::En, true) => "yes",
        (Locale::En, false) => "no",
    };
    let mut rows: Vec<(&str, String)> = match locale {
        Locale::Pl => vec![
            ("E-mail", notice.email.clone()),
            ("Imię i nazwisko", notice.user_name.clone().unwrap_or_else(|| unknown.to_owned())),
            ("Rodzaj", kind.to_owned()),
            ("Nowe konto", yes_no(notice.new_account).to_owned()),
            ("Ważny do", format_time(notice.expires_at)),
        ],
        Locale::En => vec![
            ("Email", notice.email.clone()),
            ("Name", notice.user_name.clone().unwrap_or_else(|| unknown.to_owned())),
            ("Kind", kind.to_owned()),
            ("New account", yes_no(notice.new_account).to_owned()),
            ("Valid until", format_time(notice.expires_at)),
        ],
    };
    rows.extend(client_rows(&notice.client, locale));
    let (table, text) = render_rows(&rows);

    RenderedEmail {
        html: layout(&subject, &table, site_name),
        subject,
        text,
    }
}

// ── Contact form ─────────────────────────────────────────────────────────────

pub fn contact_notification(
    message: &ContactMessage,
    site_name: &str,
    locale: Locale,
) -> RenderedEmail {
    let topic = message.subject.as_deref().unwrap_or("-");
    let subject = match locale {
        Locale::Pl => format!("[{site_name}] Wiadomość od {}: {topic}", message.name),
        Locale::En => format!("[{site_name}] Message from {}: {topic}", message.name),
    };
    let none = "-".to_owned();
    let mut rows: Vec<(&str, String)> = match locale {
        Locale::Pl => vec![
            ("Od", message.name.clone()),
            ("E-mail", message.email.clone()),
            ("Telefon", message.phone.clone().unwrap_or_else(|| none.clone())),
            ("Temat", topic.to_owned()),
            ("Język", message.locale.as_str().to_owned()),
        ],
        Locale::En => vec![
            ("From", message.name.clone()),
            ("Email", message.email.clone()),
            ("Phone", message.phone.clone().unwrap_or_else(|| none.clone())),
            ("Subject", topic.to_owned()),
            ("Language", message.locale.as_str().to_owned()),
        ],
    };
    rows.extend(client_rows(&message.client, locale));
    let (table, rows_text) = render_rows(&rows);

    let body = format!(
        "{table}\n<hr>\n<p style=\"white-space: pre-wrap\">{}</p>",
        escape_html(&message.message)
    );
    let text = format!("{rows_text}\n\n{}\n", message.message);

    RenderedEmail {
        html: layout(&subject, &body, site_name),
        subject,
        text,
    }
}

pub fn contact_acknowledgement(message: &ContactMessage, site_name: &str) -> RenderedEmail {
    let (subject, greeting, thanks, copy) = match message.locale {
        Locale::Pl => (
            format!("{site_name}: dziękuję za wiadomość"),
            format!("Cześć {},", message.name),
            "Dziękuję za kontakt. Odpowiem najszybciej, jak to możliwe.",
            "Kopia Twojej wiadomości:",
        ),
        Locale::En => (
            format!("{site_name}: thanks for your message"),
            format!("Hi {},", message.name),
            "Thank you for getting in touch. I will reply as soon as I can.",
            "A copy of your message:",
        ),
    };

    let body = format!(
        "<p>{}</p>\n<p>{thanks}</p>\n<p>{copy}</p>\n\
         <blockquote style=\"white-space: pre-wrap\">{}</blockquote>",
        escape_html(&greeting),
        escape_html(&message.message),
    );
    let text = format!("{greeting}\n\n{thanks}\n\n{copy}\n\n{}\n", message.message);

    RenderedEmail {
        html: layout(&subject, &body, site_name),
        subject,
        text,
    }
}
