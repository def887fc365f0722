use std::env;

/// Upper bound for `JWT_TTL_HOURS`, one year.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 366;
const DEFAULT_JWT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            port,
            database_url,
            host,
        })
    }
}

/// Token lifetime in hours, `JWT_TTL_HOURS` or 24. Read at token issue time.
pub fn jwt_ttl_hours() -> i64 {
    parse_ttl_hours(env::var("JWT_TTL_HOURS").ok().as_deref())
}

fn parse_ttl_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|h| h.trim().parse::<i64>().ok())
        .filter(|h| (1..=MAX_JWT_TTL_HOURS).contains(h))
        .unwrap_or(DEFAULT_JWT_TTL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_falls_back_to_a_day_when_missing_or_out_of_range() {
        assert_eq!(parse_ttl_hours(None), 24);
        assert_eq!(parse_ttl_hours(Some("abc")), 24);
        assert_eq!(parse_ttl_hours(Some("0")), 24);
        assert_eq!(parse_ttl_hours(Some("9223372036854775807")), 24);
        assert_eq!(parse_ttl_hours(Some("8")), 8);
        assert_eq!(parse_ttl_hours(Some("8784")), MAX_JWT_TTL_HOURS);
    }
}
