use actix_web::{HttpResponse, Responder, get, web};
use sqlx::PgPool;
use std::sync::Arc;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

pub use config::Config;
pub use database::repositories::{
    CompanyRepository, CustomerRepository, PasswordResetTokenRepository, PersonnelRepository,
    SessionRepository, TeamRepository, UserRepository, VisitRepository,
};
pub use services::{
    AuthService, CustomerDirectory, DirectionsProvider, Geocoder, GoogleDirectionsClient,
    GoogleGeocoder, LocalIdentityProvider, PersonnelProvisioning, RoutePlanner, SessionDirectory,
    TeamDirectory, VisitLifecycle,
};

use handlers::{auth, customers, dashboard, personnel, routes, teams, visits};

pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub identity: Arc<LocalIdentityProvider>,
    pub sessions: Arc<dyn SessionDirectory>,
    pub teams: TeamDirectory,
    pub customers: CustomerDirectory,
    pub team_repository: TeamRepository,
    pub customer_repository: CustomerRepository,
    pub personnel_repository: PersonnelRepository,
    pub visit_repository: VisitRepository,
    pub lifecycle: VisitLifecycle,
    pub route_planner: RoutePlanner,
    pub provisioning: PersonnelProvisioning,
}

impl AppState {
    /// Wires the Postgres repositories and the Google clients.
    pub fn new(config: Config, pool: PgPool) -> Self {
        let company_repository = CompanyRepository::new(pool.clone());
        let personnel_repository = PersonnelRepository::new(pool.clone());
        let visit_repository = VisitRepository::new(pool.clone());
        let team_repository = TeamRepository::new(pool.clone());
        let customer_repository = CustomerRepository::new(pool.clone());

        let identity = Arc::new(LocalIdentityProvider::new(
            UserRepository::new(pool.clone()),
            PasswordResetTokenRepository::new(pool),
            config.clone(),
        ));

        let sessions: Arc<dyn SessionDirectory> = Arc::new(SessionRepository::new(
            company_repository.clone(),
            personnel_repository.clone(),
        ));
        let auth_service = AuthService::new(
            config.clone(),
            identity.clone(),
            company_repository,
            sessions.clone(),
        );

        let teams = TeamDirectory::new(Arc::new(team_repository.clone()));
        let customers = CustomerDirectory::new(
            Arc::new(customer_repository.clone()),
            teams.clone(),
            Arc::new(GoogleGeocoder::new(&config)),
        );

        Self {
            auth_service,
            lifecycle: VisitLifecycle::new(Arc::new(visit_repository.clone())),
            provisioning: PersonnelProvisioning::new(
                identity.clone(),
                Arc::new(personnel_repository.clone()),
            ),
            route_planner: RoutePlanner::new(Arc::new(GoogleDirectionsClient::new(&config))),
            identity,
            sessions,
            teams,
            customers,
            team_repository,
            customer_repository,
            personnel_repository,
            visit_repository,
            config,
        }
    }
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("FieldRoute API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

/// Registers every route; shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello).service(health).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me))
                    .route("/forgot-password", web::post().to(auth::forgot_password))
                    .route("/reset-password", web::post().to(auth::reset_password)),
            )
            .service(
                web::scope("/teams")
                    .route("", web::get().to(teams::get_teams))
                    .route("", web::post().to(teams::create_team))
                    .route("/{id}", web::get().to(teams::get_team))
                    .route("/{id}", web::put().to(teams::update_team))
                    .route("/{id}", web::delete().to(teams::delete_team)),
            )
            .service(
                web::scope("/customers")
                    .route("", web::get().to(customers::get_customers))
                    .route("", web::post().to(customers::create_customer))
                    .route("/{id}", web::get().to(customers::get_customer))
                    .route("/{id}", web::put().to(customers::update_customer))
                    .route("/{id}", web::delete().to(customers::delete_customer)),
            )
            .service(
                web::scope("/personnel")
                    .route("", web::get().to(personnel::get_personnel_list))
                    .route("", web::post().to(personnel::create_personnel))
                    .route("/{id}", web::get().to(personnel::get_personnel))
                    .route("/{id}", web::put().to(personnel::update_personnel))
                    .route("/{id}", web::delete().to(personnel::delete_personnel)),
            )
            .service(
                web::scope("/visits")
                    .route("", web::get().to(visits::get_visits))
                    .route("", web::post().to(visits::create_visit))
                    .route("/today", web::get().to(visits::get_today))
                    .route("/{id}", web::get().to(visits::get_visit))
                    .route("/{id}", web::put().to(visits::reschedule_visit))
                    .route("/{id}", web::delete().to(visits::delete_visit))
                    .route("/{id}/check-in", web::post().to(visits::check_in))
                    .route("/{id}/note", web::put().to(visits::set_note))
                    .route("/{id}/complete", web::post().to(visits::complete_visit))
                    .route("/{id}/cancel", web::post().to(visits::cancel_visit))
                    .route("/{id}/override", web::put().to(visits::override_visit)),
            )
            .service(
                web::scope("/routes").route("/optimize", web::post().to(routes::optimize_route)),
            )
            .route("/dashboard", web::get().to(dashboard::get_dashboard)),
    );
}
