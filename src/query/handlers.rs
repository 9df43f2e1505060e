// region:    --- Imports
use super::queries;
use crate::auction::model::{Auction, Bid, Category};
use crate::database::DatabaseManager;
use crate::notify::Notification;
use crate::users::User;
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use tracing::info;
// endregion: --- Imports

// region:    --- Read Models
pub const PER_PAGE: i64 = 12;
const DETAIL_BID_LIMIT: i64 = 10;

/// Browse filter: `status` buckets listings the way the storefront does.
/// "active" means open for bidding right now; "ended" means past the end
/// time or completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Ended,
    All,
}

impl StatusFilter {
    /// No filter means the active storefront view; any explicit value other
    /// than "active"/"ended" falls through to the unfiltered listing.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            None | Some("active") => StatusFilter::Active,
            Some("ended") => StatusFilter::Ended,
            Some(_) => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuctionFilter {
    pub search: Option<String>,
    /// Kept as a string so an empty form value ("all categories") parses.
    pub category: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
}

impl AuctionFilter {
    /// Empty or malformed category values mean "all categories".
    fn category_id(&self) -> Option<i64> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .and_then(|c| c.parse().ok())
    }
}

#[derive(Debug, Serialize)]
pub struct AuctionPage {
    pub auctions: Vec<Auction>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    pub auction: Auction,
    pub bids: Vec<Bid>,
    pub bid_count: i64,
}

#[derive(Debug, Serialize)]
pub struct BuyerDashboard {
    pub bids: Vec<Bid>,
    pub won_auctions: Vec<Auction>,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_auctions: i64,
    pub active_auctions: i64,
    pub pending_auctions: Vec<Auction>,
}
// endregion: --- Read Models

// region:    --- Query Handlers

pub async fn get_auction(
    db: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<Auction>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                .bind(auction_id)
                .fetch_optional(&mut **tx)
                .await
        })
    })
    .await
}

/// Filtered, paginated browse listing.
pub async fn list_auctions(
    db: &DatabaseManager,
    filter: AuctionFilter,
) -> Result<AuctionPage, SqlxError> {
    let page = filter.page.unwrap_or(1).max(1);
    let offset = (page - 1) * PER_PAGE;
    let status = StatusFilter::parse(filter.status.as_deref());
    let category = filter.category_id();
    let search = filter.search.filter(|s| !s.is_empty());
    info!(
        "{:<12} --> Browse auctions status={:?} page={}",
        "Query", status, page
    );

    db.transaction(move |tx| {
        Box::pin(async move {
            let (list_sql, count_sql) = match status {
                StatusFilter::Active => {
                    (queries::LIST_ACTIVE_AUCTIONS, queries::COUNT_ACTIVE_AUCTIONS)
                }
                StatusFilter::Ended => {
                    (queries::LIST_ENDED_AUCTIONS, queries::COUNT_ENDED_AUCTIONS)
                }
                StatusFilter::All => (queries::LIST_ALL_AUCTIONS, queries::COUNT_ALL_AUCTIONS),
            };
            let auctions = sqlx::query_as::<_, Auction>(list_sql)
                .bind(search.as_deref())
                .bind(category)
                .bind(PER_PAGE)
                .bind(offset)
                .fetch_all(&mut **tx)
                .await?;
            let total: i64 = sqlx::query_scalar(count_sql)
                .bind(search.as_deref())
                .bind(category)
                .fetch_one(&mut **tx)
                .await?;
            Ok(AuctionPage {
                auctions,
                page,
                per_page: PER_PAGE,
                total,
            })
        })
    })
    .await
}

/// Detail page: the auction, its recent bids and the bid count.
pub async fn get_auction_detail(
    db: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<AuctionDetail>, SqlxError> {
    info!("{:<12} --> Auction detail id: {}", "Query", auction_id);
    db.transaction(|tx| {
        Box::pin(async move {
            let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                .bind(auction_id)
                .fetch_optional(&mut **tx)
                .await?;
            let Some(auction) = auction else {
                return Ok(None);
            };
            let bids = sqlx::query_as::<_, Bid>(queries::GET_RECENT_BIDS)
                .bind(auction_id)
                .bind(DETAIL_BID_LIMIT)
                .fetch_all(&mut **tx)
                .await?;
            let bid_count: i64 = sqlx::query_scalar(queries::COUNT_BIDS)
                .bind(auction_id)
                .fetch_one(&mut **tx)
                .await?;
            Ok(Some(AuctionDetail {
                auction,
                bids,
                bid_count,
            }))
        })
    })
    .await
}

/// Seller dashboard: own listings, newest first.
pub async fn seller_auctions(
    db: &DatabaseManager,
    seller_id: i64,
) -> Result<Vec<Auction>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Auction>(queries::SELLER_AUCTIONS)
                .bind(seller_id)
                .fetch_all(&mut **tx)
                .await
        })
    })
    .await
}

/// Buyer dashboard: recent bids plus auctions won.
pub async fn buyer_dashboard(
    db: &DatabaseManager,
    user_id: i64,
) -> Result<BuyerDashboard, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            let bids = sqlx::query_as::<_, Bid>(queries::BUYER_BIDS)
                .bind(user_id)
                .fetch_all(&mut **tx)
                .await?;
            let won_auctions = sqlx::query_as::<_, Auction>(queries::WON_AUCTIONS)
                .bind(user_id)
                .fetch_all(&mut **tx)
                .await?;
            Ok(BuyerDashboard { bids, won_auctions })
        })
    })
    .await
}

/// Admin dashboard: totals and the approval queue.
pub async fn admin_stats(db: &DatabaseManager) -> Result<AdminStats, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            let total_users: i64 = sqlx::query_scalar(queries::COUNT_USERS)
                .fetch_one(&mut **tx)
                .await?;
            let total_auctions: i64 = sqlx::query_scalar(queries::COUNT_AUCTIONS)
                .fetch_one(&mut **tx)
                .await?;
            let active_auctions: i64 = sqlx::query_scalar(queries::COUNT_ACTIVE_STATUS)
                .fetch_one(&mut **tx)
                .await?;
            let pending_auctions = sqlx::query_as::<_, Auction>(queries::PENDING_AUCTIONS)
                .fetch_all(&mut **tx)
                .await?;
            Ok(AdminStats {
                total_users,
                total_auctions,
                active_auctions,
                pending_auctions,
            })
        })
    })
    .await
}

pub async fn get_user_by_id(db: &DatabaseManager, user_id: i64) -> Result<Option<User>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, User>(queries::GET_USER_BY_ID)
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await
        })
    })
    .await
}

pub async fn get_user_by_email(
    db: &DatabaseManager,
    email: &str,
) -> Result<Option<User>, SqlxError> {
    let email = email.to_string();
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, User>(queries::GET_USER_BY_EMAIL)
                .bind(&email)
                .fetch_optional(&mut **tx)
                .await
        })
    })
    .await
}

pub async fn get_user_by_username(
    db: &DatabaseManager,
    username: &str,
) -> Result<Option<User>, SqlxError> {
    let username = username.to_string();
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, User>(queries::GET_USER_BY_USERNAME)
                .bind(&username)
                .fetch_optional(&mut **tx)
                .await
        })
    })
    .await
}

pub async fn list_users(db: &DatabaseManager) -> Result<Vec<User>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, User>(queries::LIST_USERS)
                .fetch_all(&mut **tx)
                .await
        })
    })
    .await
}

pub async fn list_categories(db: &DatabaseManager) -> Result<Vec<Category>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Category>(queries::LIST_CATEGORIES)
                .fetch_all(&mut **tx)
                .await
        })
    })
    .await
}

pub async fn list_notifications(
    db: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Notification>, SqlxError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Notification>(queries::LIST_NOTIFICATIONS)
                .bind(user_id)
                .fetch_all(&mut **tx)
                .await
        })
    })
    .await
}

// endregion: --- Query Handlers

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_defaults_to_active() {
        assert_eq!(StatusFilter::parse(None), StatusFilter::Active);
        assert_eq!(StatusFilter::parse(Some("active")), StatusFilter::Active);
        assert_eq!(StatusFilter::parse(Some("ended")), StatusFilter::Ended);
        assert_eq!(StatusFilter::parse(Some("all")), StatusFilter::All);
    }

    #[test]
    fn unknown_status_values_show_everything() {
        assert_eq!(StatusFilter::parse(Some("bogus")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("")), StatusFilter::All);
    }

    #[test]
    fn empty_category_means_all_categories() {
        let filter = |category: Option<&str>| AuctionFilter {
            category: category.map(str::to_string),
            ..AuctionFilter::default()
        };
        assert_eq!(filter(None).category_id(), None);
        assert_eq!(filter(Some("")).category_id(), None);
        assert_eq!(filter(Some("not-a-number")).category_id(), None);
        assert_eq!(filter(Some("3")).category_id(), Some(3));
    }
}
