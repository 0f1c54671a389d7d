pub mod catalogue;
pub mod notfound;
pub mod ssh;
pub mod vm;

use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ssh")
            .route("/execute", web::post().to(ssh::execute_handler)), // run a catalogue command on a batch of hosts
    )
    .service(
        web::scope("/commands")
            .route("", web::get().to(catalogue::get_all_commands))
            .route("/reload", web::post().to(catalogue::reload_commands)),
    )
    .service(
        web::scope("/vms")
            .route("", web::get().to(vm::get_vms))
            .route("/start", web::post().to(vm::start_vms)),
    );
}
