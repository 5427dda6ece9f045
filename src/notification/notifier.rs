use tracing::warn;

use super::{
    email::{EmailError, Mailer},
    models::ChannelStatus,
    whatsapp,
};
use crate::config::Config;

/// Best-effort delivery over whichever channels are configured. Failures are
/// logged and folded into a [`ChannelStatus`]; nothing here returns an error.
#[derive(Clone, Copy)]
pub struct Notifier<'a> {
    http: &'a reqwest::Client,
    config: &'a Config,
}

impl<'a> Notifier<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { http, config }
    }

    fn mailer(&self) -> Option<Result<Mailer, EmailError>> {
        self.config.smtp.as_ref().map(Mailer::new)
    }

    pub async fn email_sales(&self, subject: &str, html: String) -> ChannelStatus {
        let Some(mailer) = self.mailer() else {
            return ChannelStatus::Skipped;
        };

        let result = match mailer {
            Ok(mailer) => mailer.send_to_sales(subject, html).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(error = %e, subject, "sales email failed");
        }
        ChannelStatus::from_result(result)
    }

    pub async fn email_customer(
        &self,
        to: &str,
        name: Option<&str>,
        subject: &str,
        html: String,
    ) -> ChannelStatus {
        let Some(mailer) = self.mailer() else {
            return ChannelStatus::Skipped;
        };

        let result = match mailer {
            Ok(mailer) => mailer.send_html(to, name, subject, html).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(error = %e, to, subject, "customer email failed");
        }
        ChannelStatus::from_result(result)
    }

    pub async fn whatsapp_sales(&self, text: &str) -> ChannelStatus {
        let Some(config) = &self.config.whatsapp else {
            return ChannelStatus::Skipped;
        };

        let result = whatsapp::send_text(self.http, config, &config.notify_to, text).await;

        if let Err(e) = &result {
            warn!(error = %e, "whatsapp alert failed");
        }
        ChannelStatus::from_result(result)
    }
}
