// ============================================================================
// NOTIFIER : envoi des emails (invitation, mot de passe temporaire)
// ============================================================================
//
// Description:
//   Trait injecté dans les routes (web::Data<dyn Notifier>).
//   - MailApiNotifier : API HTTP d'emails transactionnels (format Brevo)
//   - LogNotifier : quand MAIL_API_KEY n'est pas configuré
//
// Points d'attention:
//   - Un échec d'envoi n'annule jamais la création du compte, l'appelant
//     renvoie emailSent = false
//   - Le token et le mot de passe temporaire ne sont jamais loggés
//     (sauf LogNotifier en développement)
//
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail API rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("mail delivery is not configured")]
    Disabled,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Envoie le lien pour définir le mot de passe
    async fn send_invitation(&self, to_email: &str, to_name: &str, link: &str)
        -> Result<(), NotifierError>;

    /// Envoie le mot de passe temporaire d'un agent
    async fn send_temporary_password(
        &self,
        to_email: &str,
        to_name: &str,
        password: &str,
    ) -> Result<(), NotifierError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

pub struct MailApiNotifier {
    client: reqwest::Client,
    config: MailConfig,
}

impl MailApiNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        text: String,
    ) -> Result<(), NotifierError> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: to_email.to_string(),
                name: Some(to_name.to_string()),
            }],
            subject: subject.to_string(),
            text_content: text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(recipient = %to_email, subject, "email sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifierError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for MailApiNotifier {
    async fn send_invitation(
        &self,
        to_email: &str,
        to_name: &str,
        link: &str,
    ) -> Result<(), NotifierError> {
        let text = format!(
            "Hola {},\n\nSe creó tu cuenta en el sistema de la inmobiliaria.\n\
             Para definir tu contraseña ingresá al siguiente enlace (válido por 24 horas):\n\n{}\n",
            to_name, link
        );
        self.send_email(to_email, to_name, "Definí tu contraseña", text)
            .await
    }

    async fn send_temporary_password(
        &self,
        to_email: &str,
        to_name: &str,
        password: &str,
    ) -> Result<(), NotifierError> {
        let text = format!(
            "Hola {},\n\nSe creó tu cuenta de agente.\n\
             Tu contraseña temporal es: {}\n\nTe recomendamos cambiarla al ingresar.\n",
            to_name, password
        );
        self.send_email(to_email, to_name, "Tu cuenta de agente", text)
            .await
    }
}

/// Utilisé quand l'API d'emails n'est pas configurée: rien n'est envoyé.
/// En développement, le secret est écrit dans les logs pour pouvoir tester.
pub struct LogNotifier {
    reveal_secrets: bool,
}

impl LogNotifier {
    pub fn new(reveal_secrets: bool) -> Self {
        Self { reveal_secrets }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_invitation(
        &self,
        to_email: &str,
        _to_name: &str,
        link: &str,
    ) -> Result<(), NotifierError> {
        if self.reveal_secrets {
            tracing::warn!(recipient = %to_email, %link, "mail disabled, invitation link not delivered");
        } else {
            tracing::warn!(recipient = %to_email, "mail disabled, invitation not delivered");
        }
        Err(NotifierError::Disabled)
    }

    async fn send_temporary_password(
        &self,
        to_email: &str,
        _to_name: &str,
        password: &str,
    ) -> Result<(), NotifierError> {
        if self.reveal_secrets {
            tracing::warn!(recipient = %to_email, %password, "mail disabled, temporary password not delivered");
        } else {
            tracing::warn!(recipient = %to_email, "mail disabled, temporary password not delivered");
        }
        Err(NotifierError::Disabled)
    }
}
