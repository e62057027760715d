use std::sync::Arc;

use admin_service::config::Config;
use admin_service::config::SeedConfig;
use admin_service::domain::principal::models::EmailAddress;
use admin_service::domain::principal::models::SeedPrincipalCommand;
use admin_service::domain::principal::models::Username;
use admin_service::domain::principal::service::SessionService;
use admin_service::inbound::http::router::create_router;
use admin_service::inbound::http::router::SessionSettings;
use admin_service::outbound::repositories::PostgresPrincipalRepository;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "admin-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        session_mode = ?config.session.mode,
        issuer = %config.jwt.issuer,
        audience = %config.jwt.audience,
        access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
        refresh_token_ttl_days = config.jwt.refresh_token_ttl_days,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.jwt.auth_settings())?);

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let principal_repository = Arc::new(PostgresPrincipalRepository::new(pg_pool));
    let session_service = Arc::new(SessionService::new(
        principal_repository,
        Arc::clone(&authenticator),
        config.session.mode,
    ));

    if let Some(seed) = &config.seed {
        session_service.seed_principal(seed_command(seed)?).await?;
    }

    let session = SessionSettings::new(&config.session, authenticator.refresh_token_ttl());
    let http_application = create_router(session_service, authenticator, session);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application).await?;

    Ok(())
}

fn seed_command(seed: &SeedConfig) -> Result<SeedPrincipalCommand, anyhow::Error> {
    Ok(SeedPrincipalCommand {
        id: None,
        username: Username::new(seed.admin_username.clone())?,
        email: EmailAddress::new(seed.admin_email.clone())?,
        full_name: seed.admin_full_name.clone(),
        password: seed.admin_password.clone(),
        role: seed.admin_role.clone(),
    })
}
