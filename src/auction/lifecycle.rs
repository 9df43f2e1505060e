// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid, Category};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::notify;
use crate::query::queries;
use crate::users::{User, UserRole};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
// endregion: --- Imports

// region:    --- Types
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionDraft {
    pub title: String,
    pub description: String,
    /// Integer cents.
    pub starting_bid: i64,
    pub category_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("auction not found")]
    NotFound,
    #[error("only pending auctions can be approved")]
    NotPending,
    #[error("this auction is already finished")]
    AlreadyFinished,
}
// endregion: --- Types

// region:    --- Rules
/// Admin listings go live immediately; everyone else waits for approval.
pub fn initial_status(creator_role: UserRole) -> AuctionStatus {
    if creator_role == UserRole::Admin {
        AuctionStatus::Active
    } else {
        AuctionStatus::Pending
    }
}

/// Listing-form rules: title 5-200 characters, description at least 20,
/// a positive starting bid, and a window that ends after it starts.
pub fn validate_draft(draft: &AuctionDraft) -> Result<(), String> {
    let title_len = draft.title.chars().count();
    if !(5..=200).contains(&title_len) {
        return Err("title must be between 5 and 200 characters".to_string());
    }
    if draft.description.chars().count() < 20 {
        return Err("description must be at least 20 characters".to_string());
    }
    if draft.starting_bid < 1 {
        return Err("starting bid must be at least one cent".to_string());
    }
    if draft.end_time <= draft.start_time {
        return Err("end time must be after start time".to_string());
    }
    Ok(())
}

/// Closing-batch candidate: active and past its end time. Pending,
/// cancelled and completed auctions are never touched by the batch.
pub fn ready_to_close(auction: &Auction, now: DateTime<Utc>) -> bool {
    auction.status == AuctionStatus::Active && auction.end_time <= now
}

/// Highest amount wins; the earlier bid wins a tie. Amounts are strictly
/// increasing when placed through the validator, so ties only arise from
/// hand-edited data.
pub fn pick_winner(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().max_by(|a, b| {
        a.amount
            .cmp(&b.amount)
            .then_with(|| b.placed_at.cmp(&a.placed_at))
            .then_with(|| b.id.cmp(&a.id))
    })
}
// endregion: --- Rules

// region:    --- Lifecycle Engine

/// Creates a listing. `current_bid` starts at the starting bid so the
/// highest-bid invariant holds before any bid exists.
pub async fn submit(
    db: &DatabaseManager,
    draft: AuctionDraft,
    creator: &User,
) -> Result<Auction, ApiError> {
    validate_draft(&draft).map_err(ApiError::Validation)?;
    let status = initial_status(creator.role);
    let seller_id = creator.id;
    info!(
        "{:<12} --> Submit \"{}\" by user {} as {:?}",
        "Lifecycle", draft.title, seller_id, status
    );

    db.transaction(move |tx| {
        Box::pin(async move {
            if let Some(category_id) = draft.category_id {
                sqlx::query_as::<_, Category>(queries::GET_CATEGORY)
                    .bind(category_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ApiError::NotFound("category"))?;
            }
            let auction = sqlx::query_as::<_, Auction>(
                "INSERT INTO auctions (title, description, starting_bid, current_bid,
                                       start_time, end_time, status, seller_id, category_id)
                 VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8)
                 RETURNING *",
            )
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.starting_bid)
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(status)
            .bind(seller_id)
            .bind(draft.category_id)
            .fetch_one(&mut **tx)
            .await?;
            Ok(auction)
        })
    })
    .await
}

/// Admin approval: pending -> active, with a note to the seller.
pub async fn approve(db: &DatabaseManager, auction_id: i64) -> Result<Auction, ApiError> {
    db.transaction(|tx| {
        Box::pin(async move {
            let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                .bind(auction_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(LifecycleError::NotFound)?;
            if auction.status != AuctionStatus::Pending {
                return Err(LifecycleError::NotPending.into());
            }

            let auction = sqlx::query_as::<_, Auction>(
                "UPDATE auctions SET status = 'active' WHERE id = $1 RETURNING *",
            )
            .bind(auction_id)
            .fetch_one(&mut **tx)
            .await?;

            notify::notify(
                tx,
                auction.seller_id,
                &format!(
                    "Your auction \"{}\" has been approved and is now live!",
                    auction.title
                ),
            )
            .await?;

            info!("{:<12} --> Approved auction {}", "Lifecycle", auction_id);
            Ok(auction)
        })
    })
    .await
}

/// Admin cancellation: pending or active -> cancelled.
pub async fn cancel(db: &DatabaseManager, auction_id: i64) -> Result<Auction, ApiError> {
    db.transaction(|tx| {
        Box::pin(async move {
            let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                .bind(auction_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(LifecycleError::NotFound)?;
            if matches!(
                auction.status,
                AuctionStatus::Completed | AuctionStatus::Cancelled
            ) {
                return Err(LifecycleError::AlreadyFinished.into());
            }

            let auction = sqlx::query_as::<_, Auction>(
                "UPDATE auctions SET status = 'cancelled' WHERE id = $1 RETURNING *",
            )
            .bind(auction_id)
            .fetch_one(&mut **tx)
            .await?;

            notify::notify(
                tx,
                auction.seller_id,
                &format!("Your auction \"{}\" has been cancelled.", auction.title),
            )
            .await?;

            info!("{:<12} --> Cancelled auction {}", "Lifecycle", auction_id);
            Ok(auction)
        })
    })
    .await
}

/// Closes every active auction whose end time has passed and returns how
/// many were closed. On-demand only; until this runs an ended auction stays
/// `active` in storage. Auctions without bids complete without a winner.
pub async fn close_ended(db: &DatabaseManager) -> Result<u64, ApiError> {
    db.transaction(|tx| {
        Box::pin(async move {
            let now = Utc::now();
            let ended = sqlx::query_as::<_, Auction>(queries::ENDED_ACTIVE_AUCTIONS)
                .fetch_all(&mut **tx)
                .await?;

            let mut closed = 0u64;
            for auction in ended {
                if !ready_to_close(&auction, now) {
                    continue;
                }
                let bids = sqlx::query_as::<_, Bid>(queries::GET_BIDS_BEST_FIRST)
                    .bind(auction.id)
                    .fetch_all(&mut **tx)
                    .await?;

                if let Some(winning) = pick_winner(&bids) {
                    sqlx::query("UPDATE auctions SET winner_id = $1, current_bid = $2 WHERE id = $3")
                        .bind(winning.bidder_id)
                        .bind(winning.amount)
                        .bind(auction.id)
                        .execute(&mut **tx)
                        .await?;

                    let winner_name: String =
                        sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
                            .bind(winning.bidder_id)
                            .fetch_one(&mut **tx)
                            .await?;

                    notify::notify(
                        tx,
                        winning.bidder_id,
                        &format!(
                            "Congratulations! You won the auction for \"{}\" with a bid of {}",
                            auction.title,
                            notify::fmt_usd(winning.amount)
                        ),
                    )
                    .await?;
                    notify::notify(
                        tx,
                        auction.seller_id,
                        &format!(
                            "Your auction \"{}\" has ended. Winner: {} - {}",
                            auction.title,
                            winner_name,
                            notify::fmt_usd(winning.amount)
                        ),
                    )
                    .await?;
                }

                sqlx::query("UPDATE auctions SET status = 'completed' WHERE id = $1")
                    .bind(auction.id)
                    .execute(&mut **tx)
                    .await?;
                closed += 1;
            }

            info!("{:<12} --> Closed {} ended auctions", "Lifecycle", closed);
            Ok(closed)
        })
    })
    .await
}

/// Records an uploaded image filename on the listing.
pub async fn attach_image(
    db: &DatabaseManager,
    auction_id: i64,
    filename: String,
) -> Result<Auction, ApiError> {
    db.transaction(move |tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Auction>(
                "UPDATE auctions SET image_filename = $1 WHERE id = $2 RETURNING *",
            )
            .bind(&filename)
            .bind(auction_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(ApiError::NotFound("auction"))
        })
    })
    .await
}

// endregion: --- Lifecycle Engine

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> AuctionDraft {
        let now = Utc::now();
        AuctionDraft {
            title: "Mid-century desk lamp".to_string(),
            description: "Brass desk lamp from the sixties, rewired.".to_string(),
            starting_bid: 2500,
            category_id: None,
            start_time: now,
            end_time: now + Duration::days(3),
        }
    }

    fn auction(status: AuctionStatus, end_time: DateTime<Utc>) -> Auction {
        Auction {
            id: 1,
            title: "Walnut chess set".to_string(),
            description: "Hand-carved walnut chess set with board.".to_string(),
            starting_bid: 1000,
            current_bid: 1000,
            image_filename: None,
            start_time: end_time - Duration::days(3),
            end_time,
            created_at: end_time - Duration::days(3),
            status,
            seller_id: 1,
            category_id: None,
            winner_id: None,
        }
    }

    fn bid(id: i64, amount: i64, placed_at: DateTime<Utc>) -> Bid {
        Bid {
            id,
            amount,
            placed_at,
            auction_id: 1,
            bidder_id: id + 100,
        }
    }

    #[test]
    fn admins_skip_the_approval_queue() {
        assert_eq!(initial_status(UserRole::Admin), AuctionStatus::Active);
        assert_eq!(initial_status(UserRole::Seller), AuctionStatus::Pending);
        assert_eq!(initial_status(UserRole::Buyer), AuctionStatus::Pending);
    }

    #[test]
    fn draft_validation_accepts_reasonable_listing() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn draft_validation_rejects_bad_fields() {
        let mut d = draft();
        d.title = "Lamp".to_string();
        assert!(validate_draft(&d).is_err());

        let mut d = draft();
        d.description = "Short.".to_string();
        assert!(validate_draft(&d).is_err());

        let mut d = draft();
        d.starting_bid = 0;
        assert!(validate_draft(&d).is_err());

        let mut d = draft();
        d.end_time = d.start_time - Duration::hours(1);
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn closing_only_picks_up_active_auctions_past_their_end() {
        let now = Utc::now();
        let ended = now - Duration::hours(1);
        let running = now + Duration::hours(1);

        assert!(ready_to_close(&auction(AuctionStatus::Active, ended), now));
        assert!(!ready_to_close(&auction(AuctionStatus::Active, running), now));

        // Other statuses never qualify, ended or not.
        for status in [
            AuctionStatus::Pending,
            AuctionStatus::Completed,
            AuctionStatus::Cancelled,
        ] {
            assert!(!ready_to_close(&auction(status, ended), now));
            assert!(!ready_to_close(&auction(status, running), now));
        }
    }

    #[test]
    fn closing_treats_end_time_as_inclusive() {
        let now = Utc::now();
        assert!(ready_to_close(&auction(AuctionStatus::Active, now), now));
    }

    #[test]
    fn no_bids_means_no_winner() {
        assert!(pick_winner(&[]).is_none());
    }

    #[test]
    fn highest_amount_wins() {
        let now = Utc::now();
        let bids = vec![
            bid(1, 1001, now - Duration::minutes(30)),
            bid(2, 1500, now - Duration::minutes(20)),
            bid(3, 1200, now - Duration::minutes(10)),
        ];
        assert_eq!(pick_winner(&bids).map(|b| b.id), Some(2));
    }

    #[test]
    fn earlier_bid_wins_amount_tie() {
        let now = Utc::now();
        let bids = vec![
            bid(1, 1500, now - Duration::minutes(5)),
            bid(2, 1500, now - Duration::minutes(30)),
        ];
        assert_eq!(pick_winner(&bids).map(|b| b.id), Some(2));
    }
}
