mod backup;
mod config;
mod error;
mod publish;
mod services;
mod state;
mod store;

use crate::backup::reconcile::StartupReconciler;
use crate::config::Config;
use crate::publish::git::GitPublisher;
use crate::publish::PublishWorkflow;
use crate::state::AppState;
use crate::store::SqliteCourseStore;
use actix_files::Files;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::fs;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::load().map_err(io::Error::other)?;
    fs::create_dir_all(&config.uploads_dir)?;

    // The store must be open and reconciled before the server accepts requests.
    let store = Arc::new(SqliteCourseStore::open(&config.database_path).map_err(io::Error::other)?);
    StartupReconciler::new(store.clone(), config.backup_file.clone()).run_at_startup();

    let git = GitPublisher::new(vec![config.backup_file.clone()], config.publish.step_timeout);
    let workflow = PublishWorkflow::new(
        store.clone(),
        config.backup_file.clone(),
        config.project_root.clone(),
        config.publish.clone(),
        Arc::new(git),
    );
    let state = AppState::new(store.clone(), Arc::new(workflow), config.uploads_dir.clone());
    let uploads_dir = config.uploads_dir.clone();

    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(Files::new("/uploads", uploads_dir.clone()))
            .service(services::publish::configure_routes())
            .configure(services::courses::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    // Worker copies of the store may still be alive; closing goes through the shared handle.
    store.close().map_err(io::Error::other)?;
    info!("Course store closed");
    Ok(())
}
