use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Supabase
    pub supabase_url: String,
    pub supabase_key: String,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Supabase project URL and service role key
            supabase_url: std::env::var("SUPABASE_URL")
                .context("SUPABASE_URL not set")?
                .trim_end_matches('/')
                .to_string(),
            supabase_key: std::env::var("SUPABASE_KEY")
                .context("SUPABASE_KEY not set")?,

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }
}
