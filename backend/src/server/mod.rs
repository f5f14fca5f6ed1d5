//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ProviderSettings, ServerConfig};

use state_builders::build_http_state;

use actix_cors::Cors;
use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::inbound::http::activity::{list_activity, run_seed};
use backend::inbound::http::assignment::{
    assign, bulk_assign, list_transfers, transfer, unassign,
};
use backend::inbound::http::auth::{login, logout, register};
use backend::inbound::http::avatar::finalize_avatar;
use backend::inbound::http::cases::{change_status, create_case, get_case, list_cases};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::invites::{create_invite, list_invites, revoke_invite};
use backend::inbound::http::legal::{get_document, list_versions, publish_document};
use backend::inbound::http::messages::{list_messages, mark_read, post_message};
use backend::inbound::http::notifications::{
    list_notifications, mark_all_read, mark_read as mark_notification_read,
};
use backend::inbound::http::payments::{create_payment, list_payments};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::templates::{
    create_template, delete_template, get_template, list_templates, render_template,
    update_template,
};
use backend::inbound::http::users::{list_users, me, update_status};
use backend::inbound::http::webhooks::{email_webhook, payment_webhook};
use backend::middleware::rate_limit::RateLimit;
use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    cors_origin: Option<String>,
    rate_limit: RateLimit,
}

fn build_cors(origin: Option<&str>) -> Cors {
    match origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        cors_origin,
        rate_limit,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(8)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(list_users)
        .service(update_status)
        .service(finalize_avatar)
        .service(create_case)
        .service(list_cases)
        .service(bulk_assign)
        .service(get_case)
        .service(change_status)
        .service(assign)
        .service(transfer)
        .service(unassign)
        .service(list_transfers)
        .service(post_message)
        .service(list_messages)
        .service(mark_read)
        .service(list_notifications)
        .service(mark_notification_read)
        .service(mark_all_read)
        .service(create_payment)
        .service(list_payments)
        .service(create_invite)
        .service(list_invites)
        .service(revoke_invite)
        .service(create_template)
        .service(list_templates)
        .service(get_template)
        .service(update_template)
        .service(delete_template)
        .service(render_template)
        .service(get_document)
        .service(publish_document)
        .service(list_versions)
        .service(list_activity)
        .service(run_seed);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(rate_limit)
        .wrap(Trace)
        .wrap(build_cors(cors_origin.as_deref()))
        .service(api)
        // Webhooks authenticate with shared secrets, never the session.
        .service(payment_webhook)
        .service(email_webhook)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let rate_limit = RateLimit::new(config.rate_limit);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        cors_origin,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            cors_origin: cors_origin.clone(),
            rate_limit: rate_limit.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
