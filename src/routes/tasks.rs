use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskDetails, TaskInput, TaskUpdate, TimeLogInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use futures::future::try_join_all;
use validator::Validate;

/// Loads a task the caller owns. Tasks owned by someone else are reported as
/// missing so their existence is not disclosed.
async fn owned_task(state: &AppState, task_id: i32, user_id: i32) -> Result<Task, AppError> {
    match state.store.find_task(task_id).await? {
        Some(task) if task.is_owned_by(user_id) => Ok(task),
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

async fn with_details(state: &AppState, task: Task) -> Result<TaskDetails, AppError> {
    let categories = state.store.task_categories(task.id).await?;
    let time_logs = state.store.time_logs_for_task(task.id).await?;
    Ok(TaskDetails {
        task,
        categories,
        time_logs,
    })
}

/// Retrieves every task owned by the authenticated user, with categories and
/// time logs attached.
///
/// ## Responses:
/// - `200 OK`: A JSON array of tasks.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.store.list_tasks_for_user(current_user.id()).await?;
    let details = try_join_all(tasks.into_iter().map(|task| with_details(&state, task))).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): at most 1000 characters.
/// - `due_date`, `scheduled_datetime` (optional): RFC 3339 or naive UTC timestamps.
/// - `priority` (optional): `"high"`, `"medium"` or `"low"`. Defaults to medium.
/// - `category_ids` (optional): categories to link.
///
/// ## Responses:
/// - `201 Created`: The new task.
/// - `401 Unauthorized`: Missing or invalid bearer token.
/// - `422 Unprocessable Entity`: Validation failed.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let (new_task, category_ids) = task_data.into_inner().into_parts();
    let task = state.store.create_task(current_user.id(), new_task).await?;
    if !category_ids.is_empty() {
        state.store.set_task_categories(task.id, &category_ids).await?;
    }

    log::debug!("User {} created task {}", current_user.id(), task.id);
    Ok(HttpResponse::Created().json(with_details(&state, task).await?))
}

#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), current_user.id()).await?;
    Ok(HttpResponse::Ok().json(with_details(&state, task).await?))
}

/// Partially updates a task the caller owns. `category_ids`, when present,
/// replaces the linked categories.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = owned_task(&state, task_id.into_inner(), current_user.id()).await?;

    let (changes, category_ids) = task_data.into_inner().into_parts();
    let updated = state
        .store
        .update_task(task.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    if let Some(category_ids) = category_ids {
        state.store.set_task_categories(updated.id, &category_ids).await?;
    }

    Ok(HttpResponse::Ok().json(with_details(&state, updated).await?))
}

/// Deletes a task the caller owns, along with its time logs.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), current_user.id()).await?;
    if !state.store.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Records time spent on a task. A missing `end_time` means "until now".
#[post("/{id}/time_logs")]
pub async fn add_time_log(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
    log_data: web::Json<TimeLogInput>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), current_user.id()).await?;
    let new_log = log_data
        .into_inner()
        .resolve(Utc::now())
        .ok_or_else(reversed_range)?;

    let log = state.store.create_time_log(task.id, new_log).await?;
    Ok(HttpResponse::Created().json(log))
}

#[put("/{id}/time_logs/{log_id}")]
pub async fn update_time_log(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    path: web::Path<(i32, i32)>,
    log_data: web::Json<TimeLogInput>,
) -> Result<impl Responder, AppError> {
    let (task_id, log_id) = path.into_inner();
    let task = owned_task(&state, task_id, current_user.id()).await?;
    let new_log = log_data
        .into_inner()
        .resolve(Utc::now())
        .ok_or_else(reversed_range)?;

    match state.store.update_time_log(task.id, log_id, new_log).await? {
        Some(log) => Ok(HttpResponse::Ok().json(log)),
        None => Err(AppError::NotFound("Time log not found".into())),
    }
}

#[delete("/{id}/time_logs/{log_id}")]
pub async fn delete_time_log(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, AppError> {
    let (task_id, log_id) = path.into_inner();
    let task = owned_task(&state, task_id, current_user.id()).await?;
    if !state.store.delete_time_log(task.id, log_id).await? {
        return Err(AppError::NotFound("Time log not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

fn reversed_range() -> AppError {
    AppError::BadRequest("end_time must not be earlier than start_time".into())
}
