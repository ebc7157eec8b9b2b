use axum::Extension;

use crate::auth::AuthContext;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /auth/whoami - the decoded caller context
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> ApiResult<AuthContext> {
    Ok(ApiResponse::success(ctx))
}
