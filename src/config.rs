use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Enables the /dev seeding routes
    pub dev_mode: bool,
    pub orders_page_url: String,
    pub home_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("COD_CHECKOUT_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "cod_checkout.db".to_string()),
            dev_mode,
            orders_page_url: env::var("ORDERS_PAGE_URL").unwrap_or_else(|_| "/account".to_string()),
            home_url: env::var("HOME_URL").unwrap_or_else(|_| "/".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
