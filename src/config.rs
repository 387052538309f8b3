#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub jwt_secret: String,
    pub jwt_duration_days: i64,
    pub rsa_key_bits: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub is_development: bool,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());

        let is_development = std::env::var("DEVELOPMENT")
            .map(|v| v.eq("true"))
            .unwrap_or(false);

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if is_development => "dev_key_please_change_in_production".to_string(),
            Err(_) => panic!("Missing JWT_SECRET in env"),
        };

        let jwt_duration_days = std::env::var("JWT_DURATION_DAYS").map_or(7, |t| {
            t.parse::<i64>()
                .expect("JWT_DURATION_DAYS must be number")
        });

        let rsa_key_bits = std::env::var("RSA_KEY_BITS").map_or(2048, |t| {
            t.parse::<usize>().expect("RSA_KEY_BITS must be number")
        });

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or("http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let port = std::env::var("PORT")
            .map_or(5000, |t| t.parse::<u16>().expect("PORT must be number"));

        let seed_demo_data = std::env::var("SEED_DEMO_DATA")
            .map(|v| v.eq("true"))
            .unwrap_or(is_development);

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            jwt_secret,
            jwt_duration_days,
            rsa_key_bits,
            cors_origins,
            port,
            is_development,
            seed_demo_data,
        }
    }
}
