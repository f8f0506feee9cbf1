use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::media_client::MediaClient;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    change_password, current_user, health_check, login, logout, refresh_access_token, register,
    update_account, update_avatar, update_cover_image,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
    media_client: MediaClient,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let media_client_data = web::Data::new(media_client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(media_client_data.clone())
            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1/users")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh-token", web::post().to(refresh_access_token))
                    // Routes below require a valid access token
                    .service(
                        web::scope("")
                            .wrap(JwtMiddleware::new(jwt_config.clone()))
                            .route("/logout", web::post().to(logout))
                            .route("/change-password", web::post().to(change_password))
                            .route("/current-user", web::get().to(current_user))
                            .route("/account", web::patch().to(update_account))
                            .route("/avatar", web::patch().to(update_avatar))
                            .route("/cover-image", web::patch().to(update_cover_image)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
