use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web::Data};
use std::sync::Arc;
use studenthub::config::{Config, DEFAULT_LOG_FILTER, INSECURE_JWT_SECRET};
use studenthub::mail::{Mailer, SmtpMailer};
use studenthub::media::{CloudinaryHost, ImageHost};
use studenthub::openapi::ApiDoc;
use studenthub::store::{MongoPostStore, MongoUserStore, PostStore, UserStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// StudentHub backend entry point
///
/// Loads `.env`, reads [`Config`] from the environment, connects to MongoDB
/// and serves:
/// - the REST API (`/health`, `/auth/*`, `/posts/*`)
/// - Swagger UI at `/swagger-ui/`
/// - the OpenAPI document at `/api-docs/openapi.json`
///
/// actix-web stops accepting connections and drains workers on SIGINT or
/// SIGTERM.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::io::Error::other(e)
    })?;
    if config.auth.jwt_secret == INSECURE_JWT_SECRET {
        tracing::warn!("JWT_SECRET is not set; tokens are signed with the development default");
    }

    let client = mongodb::Client::with_uri_str(&config.database.uri)
        .await
        .map_err(std::io::Error::other)?;
    let db = client.database(&config.database.name);
    tracing::info!(database = %config.database.name, "Connected to MongoDB");

    let user_store = MongoUserStore::new(&db);
    if let Err(e) = user_store.ensure_indexes().await {
        tracing::warn!(error = %e, "Could not create the unique e-mail index");
    }

    let users: Arc<dyn UserStore> = Arc::new(user_store);
    let posts: Arc<dyn PostStore> = Arc::new(MongoPostStore::new(&db));
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.mail).map_err(std::io::Error::other)?);
    let images: Arc<dyn ImageHost> = Arc::new(CloudinaryHost::new(&config.cloudinary));

    let auth = Data::new(config.auth.clone());
    let users = Data::from(users);
    let posts = Data::from(posts);
    let mailer = Data::from(mailer);
    let images = Data::from(images);
    let origins = config.server.cors_origins.clone();

    tracing::info!(host = %config.server.host, port = config.server.port, "Starting StudentHub API");

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(NormalizePath::new(TrailingSlash::MergeOnly))
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(auth.clone())
            .app_data(users.clone())
            .app_data(posts.clone())
            .app_data(mailer.clone())
            .app_data(images.clone())
            .configure(studenthub::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
