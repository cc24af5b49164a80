use actix_files as fs;
use actix_web::{error, web, HttpResponse};
use std::path::{Path, PathBuf};

use crate::hub::GetStats;
use crate::models::AppState;

/// Where the landing page and assets are served from.
#[derive(Debug, Clone)]
pub struct StaticDir(pub PathBuf);

/// HTTP handler for the index page
pub async fn index(dir: web::Data<StaticDir>) -> actix_web::Result<fs::NamedFile> {
    Ok(fs::NamedFile::open_async(dir.0.join("index.html")).await?)
}

/// Connected clients, waiting clients and live games as JSON.
pub async fn stats(state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let stats = state
        .hub
        .send(GetStats)
        .await
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: &Path) {
    cfg.app_data(web::Data::new(StaticDir(static_dir.to_path_buf())))
        .service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(web::resource("/stats").route(web::get().to(stats)))
        .service(web::resource("/").route(web::get().to(index)))
        .service(fs::Files::new("/static", static_dir));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Hub;
    use crate::identity::AnonymousIdentity;
    use crate::storage::MemoryStore;
    use actix::Actor;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState {
            hub: Hub::new(Arc::new(MemoryStore::new())).start(),
            identity: Arc::new(AnonymousIdentity),
        }
    }

    #[actix_rt::test]
    async fn ws_requires_an_upgrade() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(|cfg| configure_routes(cfg, Path::new("./no-such-dir"))),
        )
        .await;
        let req = test::TestRequest::get().uri("/ws").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn missing_index_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(|cfg| configure_routes(cfg, Path::new("./no-such-dir"))),
        )
        .await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn stats_of_an_idle_hub_are_zero() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(|cfg| configure_routes(cfg, Path::new("./no-such-dir"))),
        )
        .await;
        let req = test::TestRequest::get().uri("/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"clients": 0, "waiting": 0, "games": 0}));
    }
}
