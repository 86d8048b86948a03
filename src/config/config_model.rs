#[derive(Debug, Clone, PartialEq)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub url: String,
    pub run_migrations: bool,
}
