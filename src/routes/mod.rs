pub mod categories;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::register)
            .service(users::login)
            // Registered ahead of `/{id}` so they are matched first.
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(users::me)),
            )
            .service(
                web::resource("/change_password")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(users::change_password)),
            )
            .service(users::list_users)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/categories")
            .service(categories::get_categories)
            .service(categories::create_category)
            .service(categories::get_category)
            .service(categories::update_category)
            .service(categories::delete_category),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::add_time_log)
            .service(tasks::update_time_log)
            .service(tasks::delete_time_log),
    );
}
