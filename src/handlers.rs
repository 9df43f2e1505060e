// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::{Auction, Category};
use crate::auth::AuthUser;
use crate::bidding::commands::{self, PlaceBidCommand};
use crate::error::ApiError;
use crate::notify;
use crate::query;
use crate::query::handlers::AuctionFilter;
use crate::state::AppState;
use crate::uploads;
use crate::users::{self, LoginRequest, RegisterRequest, User, UserUpdate};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::info;
// endregion: --- Imports

// region:    --- Router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/auctions", get(list_auctions).post(create_auction))
        .route("/auctions/:id", get(auction_detail))
        .route("/auctions/:id/image", post(upload_auction_image))
        .route("/bid", post(place_bid))
        .route("/categories", get(list_categories))
        .route("/dashboard/seller", get(seller_dashboard))
        .route("/dashboard/buyer", get(buyer_dashboard))
        .route("/dashboard/admin", get(admin_dashboard))
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", post(mark_notification_read))
        .route("/admin/auctions/:id/approve", post(approve_auction))
        .route("/admin/auctions/:id/cancel", post(cancel_auction))
        .route("/admin/close-ended", post(close_ended_auctions))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", patch(update_user))
        .route("/admin/categories", post(create_category))
        .with_state(state)
}

fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role.can_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("admin access required"))
    }
}

fn require_seller(user: &User) -> Result<(), ApiError> {
    if user.role.can_sell() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "you need seller privileges to create auctions",
        ))
    }
}
// endregion: --- Router

// region:    --- Auth Handlers
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = users::register(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = users::login(&state.db, &state.config.jwt_secret, req).await?;
    Ok(Json(LoginResponse { token, user }))
}
// endregion: --- Auth Handlers

// region:    --- Browse Handlers
pub async fn list_auctions(
    State(state): State<AppState>,
    Query(filter): Query<AuctionFilter>,
) -> Result<Json<query::handlers::AuctionPage>, ApiError> {
    let page = query::handlers::list_auctions(&state.db, filter).await?;
    Ok(Json(page))
}

pub async fn auction_detail(
    State(state): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<query::handlers::AuctionDetail>, ApiError> {
    let detail = query::handlers::get_auction_detail(&state.db, auction_id)
        .await?
        .ok_or(ApiError::NotFound("auction"))?;
    Ok(Json(detail))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(query::handlers::list_categories(&state.db).await?))
}
// endregion: --- Browse Handlers

// region:    --- Command Handlers
pub async fn create_auction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(draft): Json<lifecycle::AuctionDraft>,
) -> Result<(StatusCode, Json<Auction>), ApiError> {
    require_seller(&user)?;
    let auction = lifecycle::submit(&state.db, draft, &user).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// Attaches a product image to one of the caller's listings. The file
/// arrives as the `image` field of a multipart form.
pub async fn upload_auction_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(auction_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Auction>, ApiError> {
    let auction = query::handlers::get_auction(&state.db, auction_id)
        .await?
        .ok_or(ApiError::NotFound("auction"))?;
    if auction.seller_id != user.id && !user.role.can_admin() {
        return Err(ApiError::Forbidden(
            "only the seller can attach an image to this auction",
        ));
    }

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::Upload("missing filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        stored = Some(uploads::save_image(&state.config.upload_dir, &filename, &bytes).await?);
        break;
    }
    let filename = stored.ok_or_else(|| ApiError::Upload("no image field in request".to_string()))?;

    let auction = lifecycle::attach_image(&state.db, auction_id, filename).await?;
    Ok(Json(auction))
}

pub async fn place_bid(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    info!("{:<12} --> Bid request: {:?}", "Handler", cmd);
    let bid = commands::place_bid(&state.db, cmd, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Bid of {} placed successfully!", notify::fmt_usd(bid.amount)),
            "bid": bid,
        })),
    ))
}
// endregion: --- Command Handlers

// region:    --- Dashboard Handlers
pub async fn seller_dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Auction>>, ApiError> {
    require_seller(&user)?;
    Ok(Json(
        query::handlers::seller_auctions(&state.db, user.id).await?,
    ))
}

pub async fn buyer_dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<query::handlers::BuyerDashboard>, ApiError> {
    Ok(Json(
        query::handlers::buyer_dashboard(&state.db, user.id).await?,
    ))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<query::handlers::AdminStats>, ApiError> {
    require_admin(&user)?;
    Ok(Json(query::handlers::admin_stats(&state.db).await?))
}
// endregion: --- Dashboard Handlers

// region:    --- Notification Handlers
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<notify::Notification>>, ApiError> {
    Ok(Json(
        query::handlers::list_notifications(&state.db, user.id).await?,
    ))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !notify::mark_read(&state.db, notification_id, user.id).await? {
        return Err(ApiError::NotFound("notification"));
    }
    Ok(Json(json!({"message": "Notification marked as read"})))
}
// endregion: --- Notification Handlers

// region:    --- Admin Handlers
pub async fn approve_auction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(auction_id): Path<i64>,
) -> Result<Json<Auction>, ApiError> {
    require_admin(&user)?;
    Ok(Json(lifecycle::approve(&state.db, auction_id).await?))
}

pub async fn cancel_auction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(auction_id): Path<i64>,
) -> Result<Json<Auction>, ApiError> {
    require_admin(&user)?;
    Ok(Json(lifecycle::cancel(&state.db, auction_id).await?))
}

pub async fn close_ended_auctions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&user)?;
    let closed = lifecycle::close_ended(&state.db).await?;
    Ok(Json(json!({
        "message": format!("Closed {closed} ended auctions."),
        "closed": closed,
    })))
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    require_admin(&user)?;
    Ok(Json(query::handlers::list_users(&state.db).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    require_admin(&user)?;
    Ok(Json(users::update_user(&state.db, user_id, update).await?))
}

#[derive(Debug, serde::Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_admin(&user)?;
    let name_len = req.name.chars().count();
    if !(2..=100).contains(&name_len) {
        return Err(ApiError::Validation(
            "category name must be between 2 and 100 characters".to_string(),
        ));
    }

    let category = state
        .db
        .transaction(move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Category>(
                    "INSERT INTO categories (name, description)
                     VALUES ($1, $2)
                     RETURNING id, name, description",
                )
                .bind(&req.name)
                .bind(&req.description)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}
// endregion: --- Admin Handlers
