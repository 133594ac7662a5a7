use crate::{error::AppError, models::CategoryInput, state::AppState};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

#[post("")]
pub async fn create_category(
    state: web::Data<AppState>,
    category_data: web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    category_data.validate()?;
    let category = state.store.create_category(&category_data.name).await?;
    Ok(HttpResponse::Created().json(category))
}

#[get("")]
pub async fn get_categories(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let categories = state.store.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/{id}")]
pub async fn get_category(
    state: web::Data<AppState>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    match state.store.find_category(category_id.into_inner()).await? {
        Some(category) => Ok(HttpResponse::Ok().json(category)),
        None => Err(AppError::NotFound("Category not found".into())),
    }
}

#[put("/{id}")]
pub async fn update_category(
    state: web::Data<AppState>,
    category_id: web::Path<i32>,
    category_data: web::Json<CategoryInput>,
) -> Result<impl Responder, AppError> {
    category_data.validate()?;

    match state
        .store
        .update_category(category_id.into_inner(), &category_data.name)
        .await?
    {
        Some(category) => Ok(HttpResponse::Ok().json(category)),
        None => Err(AppError::NotFound("Category not found".into())),
    }
}

/// Removing a category also unlinks it from every task.
#[delete("/{id}")]
pub async fn delete_category(
    state: web::Data<AppState>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !state.store.delete_category(category_id.into_inner()).await? {
        return Err(AppError::NotFound("Category not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
