use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::UserRole, utils::jwt, AppState};

fn claims_from_request(state: &AppState, req: &Request) -> Result<jwt::Claims, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Kimlik doğrulama gerekli".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Geçersiz token biçimi".to_string()))?;

    jwt::verify_access_token(&state.auth, token)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_request(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_request(&state, &req)?;

    if claims.role != UserRole::Admin {
        return Err(AppError::Forbidden("Yönetici yetkisi gerekli".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Sellers share the back-office surface for assignment management.
pub async fn staff_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_request(&state, &req)?;

    if claims.role == UserRole::Customer {
        return Err(AppError::Forbidden("Personel yetkisi gerekli".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
