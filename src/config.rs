use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
    pub cors_origin: Option<String>,
    pub postal_api_base: String,
    pub postal_timeout: Duration,
    pub geocoding: GeocodingConfig,
    pub ticket: Option<TicketConfig>,
    pub erp: Option<ErpConfig>,
    pub smtp: Option<SmtpConfig>,
    pub whatsapp: Option<WhatsappConfig>,
    pub shipping: Option<ShippingConfig>,
    pub media: MediaConfig,
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub google_api_key: Option<String>,
    pub google_base: String,
    pub nominatim_base: String,
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TicketConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ErpConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub sales_to: String,
}

#[derive(Debug, Clone)]
pub struct WhatsappConfig {
    pub provider: WhatsappProvider,
    /// Sales team number that receives lead alerts, E.164 without the `whatsapp:` prefix.
    pub notify_to: String,
}

#[derive(Debug, Clone)]
pub enum WhatsappProvider {
    Twilio {
        account_sid: String,
        auth_token: String,
        from: String,
        api_base: String,
    },
    Meta {
        token: String,
        phone_number_id: String,
        graph_base: String,
    },
}

#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Provider tag an order must carry for a shipment to be booked.
    pub provider: String,
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub pickup_location: String,
}

#[derive(Debug, Clone)]
pub enum MediaConfig {
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: String,
        api_base: String,
    },
    Local {
        dir: PathBuf,
        public_base: String,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_addr: "127.0.0.1".to_owned(),
            database_url: "postgres://localhost/fastag".to_owned(),
            jwt_secret: "development-secret".to_owned(),
            admin_username: "admin".to_owned(),
            admin_password_hash: None,
            cors_origin: None,
            postal_api_base: "https://api.postalpincode.in".to_owned(),
            postal_timeout: Duration::from_secs(7),
            geocoding: GeocodingConfig::default(),
            ticket: None,
            erp: None,
            smtp: None,
            whatsapp: None,
            shipping: None,
            media: MediaConfig::Local {
                dir: PathBuf::from("./media"),
                public_base: "/media".to_owned(),
            },
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_base: "https://maps.googleapis.com".to_owned(),
            nominatim_base: "https://nominatim.openstreetmap.org".to_owned(),
            user_agent: "fastag-shop/0.1 (support@fastag.example)".to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let geocoding = GeocodingConfig {
            google_api_key: optional("GOOGLE_MAPS_API_KEY"),
            google_base: try_load("GOOGLE_MAPS_BASE", &defaults.geocoding.google_base)?,
            nominatim_base: try_load("NOMINATIM_BASE", &defaults.geocoding.nominatim_base)?,
            user_agent: try_load("NOMINATIM_USER_AGENT", &defaults.geocoding.user_agent)?,
            timeout: defaults.geocoding.timeout,
        };

        let ticket = match (optional("TICKET_API_URL"), optional("TICKET_API_KEY")) {
            (Some(url), Some(api_key)) => Some(TicketConfig { url, api_key }),
            _ => None,
        };

        let erp = match (
            optional("ERP_URL"),
            optional("ERP_API_KEY"),
            optional("ERP_API_SECRET"),
        ) {
            (Some(url), Some(api_key), Some(api_secret)) => Some(ErpConfig {
                url,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let smtp = match optional("SMTP_HOST") {
            Some(host) => {
                let username = required("SMTP_USERNAME")?;
                Some(SmtpConfig {
                    host,
                    port: try_load("SMTP_PORT", "587")?,
                    password: required("SMTP_PASSWORD")?,
                    from: optional("SMTP_FROM").unwrap_or_else(|| username.clone()),
                    sales_to: optional("SALES_EMAIL").unwrap_or_else(|| username.clone()),
                    username,
                })
            }
            None => None,
        };

        Ok(Self {
            port: try_load("PORT", "3000")?,
            bind_addr: try_load("BIND_ADDR", &defaults.bind_addr)?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            admin_username: try_load("ADMIN_USERNAME", &defaults.admin_username)?,
            admin_password_hash: optional("ADMIN_PASSWORD_HASH"),
            cors_origin: optional("CORS_ORIGIN"),
            postal_api_base: try_load("POSTAL_API_BASE", &defaults.postal_api_base)?,
            postal_timeout: Duration::from_secs(try_load("POSTAL_TIMEOUT_SECS", "7")?),
            geocoding,
            ticket,
            erp,
            smtp,
            whatsapp: load_whatsapp()?,
            shipping: load_shipping()?,
            media: load_media()?,
        })
    }
}

fn load_whatsapp() -> Result<Option<WhatsappConfig>, ConfigError> {
    let Some(provider) = optional("WHATSAPP_PROVIDER") else {
        return Ok(None);
    };

    let provider = match provider.to_lowercase().as_str() {
        "twilio" => WhatsappProvider::Twilio {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            from: required("TWILIO_WHATSAPP_FROM")?,
            api_base: try_load("TWILIO_API_BASE", "https://api.twilio.com")?,
        },
        "meta" => WhatsappProvider::Meta {
            token: required("META_WHATSAPP_TOKEN")?,
            phone_number_id: required("META_PHONE_NUMBER_ID")?,
            graph_base: try_load("META_GRAPH_BASE", "https://graph.facebook.com/v19.0")?,
        },
        other => {
            return Err(ConfigError::Invalid {
                key: "WHATSAPP_PROVIDER",
                reason: format!("unknown provider {other}, expected twilio or meta"),
            });
        }
    };

    Ok(Some(WhatsappConfig {
        provider,
        notify_to: required("WHATSAPP_NOTIFY_TO")?,
    }))
}

fn load_shipping() -> Result<Option<ShippingConfig>, ConfigError> {
    let Some(provider) = optional("SHIPPING_PROVIDER") else {
        return Ok(None);
    };

    Ok(Some(ShippingConfig {
        provider: provider.to_lowercase(),
        base_url: try_load("SHIPPING_API_BASE", "https://apiv2.shiprocket.in")?,
        email: required("SHIPPING_EMAIL")?,
        password: required("SHIPPING_PASSWORD")?,
        pickup_location: try_load("SHIPPING_PICKUP_LOCATION", "Primary")?,
    }))
}

fn load_media() -> Result<MediaConfig, ConfigError> {
    let store: String = try_load("MEDIA_STORE", "local")?;

    match store.to_lowercase().as_str() {
        "cloudinary" => Ok(MediaConfig::Cloudinary {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            api_base: try_load("CLOUDINARY_API_BASE", "https://api.cloudinary.com")?,
        }),
        "local" => Ok(MediaConfig::Local {
            dir: PathBuf::from(try_load::<String>("MEDIA_DIR", "./media")?),
            public_base: try_load("MEDIA_PUBLIC_BASE", "/media")?,
        }),
        other => Err(ConfigError::Invalid {
            key: "MEDIA_STORE",
            reason: format!("unknown media store {other}, expected cloudinary or local"),
        }),
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn optional(key: &'static str) -> Option<String> {
    let value = var(key);
    if value.is_none() {
        info!("{key} not set, integration disabled");
    }
    value
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    var(key).ok_or(ConfigError::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_owned()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}
