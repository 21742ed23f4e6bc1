use serde::Deserialize;
use tracing::warn;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub qr_ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub seed: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("JWT_SECRET not set, falling back to the development secret");
                DEV_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            access_ttl_minutes: positive_or(std::env::var("JWT_ACCESS_TTL_MINUTES").ok(), 24 * 60),
            qr_ttl_seconds: positive_or(std::env::var("JWT_QR_TTL_SECONDS").ok(), 60),
        };

        let seed = std::env::var("APP_SEED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt,
            seed,
        })
    }
}

fn positive_or(raw: Option<String>, default: i64) -> i64 {
    raw.and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_or_falls_back_on_garbage() {
        assert_eq!(positive_or(None, 60), 60);
        assert_eq!(positive_or(Some("abc".into()), 60), 60);
        assert_eq!(positive_or(Some("-5".into()), 60), 60);
        assert_eq!(positive_or(Some("0".into()), 60), 60);
    }

    #[test]
    fn positive_or_accepts_valid_values() {
        assert_eq!(positive_or(Some("1440".into()), 60), 1440);
    }
}
