use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::Config;
use crate::model::attendance::ShiftKind;
use crate::model::profile::Profile;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    description: Option<String>,
}

struct Telegram {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

/// Posts event messages to a Telegram chat. Delivery never blocks or fails
/// the operation that triggered it.
#[derive(Clone, Default)]
pub struct Notifier {
    telegram: Option<Arc<Telegram>>,
}

impl Notifier {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Self {
                telegram: Some(Arc::new(Telegram {
                    client: reqwest::Client::new(),
                    bot_token: token.clone(),
                    chat_id: chat_id.clone(),
                })),
            },
            _ => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.telegram.is_some()
    }

    pub async fn send(&self, message: &str) -> Result<()> {
        let Some(telegram) = &self.telegram else {
            return Ok(());
        };

        let response = telegram
            .client
            .post(format!("{}/bot{}/sendMessage", TELEGRAM_API, telegram.bot_token))
            .json(&SendMessage {
                chat_id: &telegram.chat_id,
                text: message,
                parse_mode: "HTML",
            })
            .send()
            .await?;

        let status = response.status();
        let reply: TelegramReply = response.json().await?;
        if !status.is_success() || !reply.ok {
            return Err(anyhow!(
                "telegram rejected message ({}): {}",
                status,
                reply.description.unwrap_or_default()
            ));
        }
        Ok(())
    }

    /// Fire-and-forget delivery on the current runtime.
    pub fn notify(&self, message: String) {
        if !self.is_enabled() {
            debug!("Notifier disabled, dropping message");
            return;
        }
        let notifier = self.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = notifier.send(&message).await {
                error!(error = %e, "Failed to deliver notification");
            }
        });
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn check_in_message(profile: &Profile, date: NaiveDate, shift: ShiftKind) -> String {
    format!(
        "🏢 New check-in\n👤 Name: {}\n📧 Email: {}\n📅 Date: {}\n⏰ Shift: {}\n💰 Rate: {} per day",
        escape_html(&profile.name),
        escape_html(&profile.email),
        date.format("%-d %B %Y"),
        shift.label(),
        profile.rate
    )
}

pub fn withdrawal_message(
    profile: &Profile,
    amount: i64,
    available: i64,
    at: DateTime<Utc>,
) -> String {
    format!(
        "💰 New withdrawal\n👤 Name: {}\n📧 Email: {}\n💵 Amount: {}\n📅 Date: {}\n💰 Remaining balance: {}",
        escape_html(&profile.name),
        escape_html(&profile.email),
        amount,
        at.format("%-d %B %Y"),
        available
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            user_id: 7,
            name: "Somchai".into(),
            age: 27,
            rate: 300,
            fullday_rate: None,
            email: "somchai@example.com".into(),
            is_admin: false,
        }
    }

    #[test]
    fn check_in_message_names_person_day_and_shift() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let text = check_in_message(&profile(), date, ShiftKind::Evening);
        assert!(text.contains("Somchai"));
        assert!(text.contains("9 March 2026"));
        assert!(text.contains(ShiftKind::Evening.label()));
        assert!(text.contains("300 per day"));
    }

    #[test]
    fn withdrawal_message_reports_remaining_balance() {
        let text = withdrawal_message(&profile(), 500, 1240, Utc::now());
        assert!(text.contains("Amount: 500"));
        assert!(text.contains("Remaining balance: 1240"));
    }

    #[test]
    fn user_text_is_escaped_for_html_mode() {
        let mut person = profile();
        person.name = "A&B <3".into();
        person.email = "a>b@example.com".into();
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

        let text = check_in_message(&person, date, ShiftKind::Morning);
        assert!(text.contains("A&amp;B &lt;3"));
        assert!(text.contains("a&gt;b@example.com"));
        assert!(!text.contains('<'));

        let text = withdrawal_message(&person, 100, 200, Utc::now());
        assert!(text.contains("A&amp;B &lt;3"));
    }

    #[actix_web::test]
    async fn disabled_notifier_sends_nothing() {
        let notifier = Notifier::disabled();
        assert!(!notifier.is_enabled());
        assert!(notifier.send("hello").await.is_ok());
        notifier.notify("hello".to_string());
    }

    #[test]
    fn needs_both_token_and_chat() {
        use crate::payroll::accrual::AccrualModel;
        let mut config = Config::for_tests(AccrualModel::FulldayPremium);
        config.telegram_bot_token = Some("token".into());
        assert!(!Notifier::from_config(&config).is_enabled());
        config.telegram_chat_id = Some("-100".into());
        assert!(Notifier::from_config(&config).is_enabled());
    }
}
