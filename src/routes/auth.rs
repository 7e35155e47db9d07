use axum::{extract::State, Json};

use crate::{
    error::{AppError, Result},
    models::{AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, UserRole},
    queries::user_queries,
    utils::jwt,
    AppState,
};

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_registration(&payload)?;

    if user_queries::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Bu kullanıcı adı zaten kullanılıyor".to_string(),
        ));
    }

    if user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Bu e-posta adresi ile bir kullanıcı zaten mevcut".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    // Empty phone numbers are stored as NULL so the unique constraint
    // does not collide on ""
    let phone = payload.phone_number.as_deref().filter(|p| !p.is_empty());

    let user = user_queries::create_user(
        &state.db,
        &payload.username,
        &payload.email,
        &password_hash,
        &payload.first_name,
        &payload.last_name,
        // Public registration only ever creates customers; staff accounts
        // are provisioned out of band
        UserRole::Customer,
        phone,
    )
    .await?;

    Ok(Json(AuthResponse {
        access: jwt::generate_access_token(&state.auth, user.id, &user.email, user.role)?,
        refresh: jwt::generate_refresh_token(&state.auth, user.id, &user.email, user.role)?,
    }))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = user_queries::find_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Kullanıcı adı veya şifre hatalı".to_string()))?;

    let is_valid = bcrypt::verify(&payload.password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::Unauthorized(
            "Kullanıcı adı veya şifre hatalı".to_string(),
        ));
    }

    Ok(Json(AuthResponse {
        access: jwt::generate_access_token(&state.auth, user.id, &user.email, user.role)?,
        refresh: jwt::generate_refresh_token(&state.auth, user.id, &user.email, user.role)?,
    }))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let claims = jwt::verify_refresh_token(&state.auth, &payload.refresh)?;

    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Geçersiz token".to_string()))?;

    // The account must still exist; role changes take effect on refresh
    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Kullanıcı bulunamadı".to_string()))?;

    Ok(Json(RefreshResponse {
        access: jwt::generate_access_token(&state.auth, user.id, &user.email, user.role)?,
    }))
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("Geçersiz e-posta adresi".to_string()));
    }

    if payload.username.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Kullanıcı adı boş olamaz".to_string(),
        ));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Şifre en az 8 karakter olmalıdır".to_string(),
        ));
    }

    Ok(())
}
