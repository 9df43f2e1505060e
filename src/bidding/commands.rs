// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::notify;
use crate::query::queries;
use crate::users::User;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
// endregion: --- Imports

// region:    --- Command
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    /// Integer cents.
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BidError {
    #[error("invalid auction")]
    InvalidAuction,
    #[error("this auction is no longer active")]
    AuctionNotActive,
    #[error("you cannot bid on your own auction")]
    SelfBid,
    #[error("bid must be higher than the current bid of {minimum} cents")]
    BidTooLow { minimum: i64 },
}
// endregion: --- Command

// region:    --- Validation
/// Decides whether a prospective bid is acceptable against a snapshot of the
/// auction. `current_bid` starts at the starting bid, so a single strict
/// comparison covers both the no-bids and the outbid case.
pub fn check_bid(
    auction: &Auction,
    bidder_id: i64,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<(), BidError> {
    if !auction.is_open_for_bidding(now) {
        return Err(BidError::AuctionNotActive);
    }
    if auction.seller_id == bidder_id {
        return Err(BidError::SelfBid);
    }
    if amount <= auction.current_bid {
        return Err(BidError::BidTooLow {
            minimum: auction.current_bid,
        });
    }
    Ok(())
}

/// Explains a conditional update that matched no rows: either the auction
/// left the active state under us, or a concurrent bid moved the price first.
fn raced_bid_error(auction: &Auction) -> BidError {
    if auction.status != AuctionStatus::Active {
        BidError::AuctionNotActive
    } else {
        BidError::BidTooLow {
            minimum: auction.current_bid,
        }
    }
}
// endregion: --- Validation

// region:    --- Placement
/// Validates and places a bid in one transaction. The write is guarded by a
/// conditional update on `current_bid`, so a concurrent higher bid makes the
/// update match zero rows and this bid is rejected instead of clobbering it.
pub async fn place_bid(
    db: &DatabaseManager,
    cmd: PlaceBidCommand,
    bidder: &User,
) -> Result<Bid, ApiError> {
    info!(
        "{:<12} --> Bid of {} on auction {} by user {}",
        "Command", cmd.amount, cmd.auction_id, bidder.id
    );
    let bidder_id = bidder.id;

    db.transaction(move |tx| {
        Box::pin(async move {
            let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                .bind(cmd.auction_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(BidError::InvalidAuction)?;

            check_bid(&auction, bidder_id, cmd.amount, Utc::now())?;

            let raised = sqlx::query_scalar::<_, i64>(
                "UPDATE auctions SET current_bid = $1
                 WHERE id = $2 AND status = 'active' AND current_bid < $1
                 RETURNING current_bid",
            )
            .bind(cmd.amount)
            .bind(cmd.auction_id)
            .fetch_optional(&mut **tx)
            .await?;

            if raised.is_none() {
                // Lost a race; re-read the row to report why.
                let current = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                    .bind(cmd.auction_id)
                    .fetch_one(&mut **tx)
                    .await?;
                return Err(raced_bid_error(&current).into());
            }

            let bid = sqlx::query_as::<_, Bid>(
                "INSERT INTO bids (amount, auction_id, bidder_id)
                 VALUES ($1, $2, $3)
                 RETURNING *",
            )
            .bind(cmd.amount)
            .bind(cmd.auction_id)
            .bind(bidder_id)
            .fetch_one(&mut **tx)
            .await?;

            notify::notify(
                tx,
                auction.seller_id,
                &format!(
                    "New bid of {} on your auction \"{}\"",
                    notify::fmt_usd(cmd.amount),
                    auction.title
                ),
            )
            .await?;

            Ok(bid)
        })
    })
    .await
}
// endregion: --- Placement

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::AuctionStatus;
    use chrono::Duration;

    const SELLER: i64 = 1;
    const BUYER: i64 = 2;

    fn open_auction(now: DateTime<Utc>) -> Auction {
        Auction {
            id: 10,
            title: "Signed first edition".to_string(),
            description: "A signed first edition in good condition.".to_string(),
            starting_bid: 1000,
            current_bid: 1000,
            image_filename: None,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            created_at: now - Duration::hours(2),
            status: AuctionStatus::Active,
            seller_id: SELLER,
            category_id: Some(1),
            winner_id: None,
        }
    }

    #[test]
    fn bid_equal_to_starting_bid_is_rejected() {
        let now = Utc::now();
        let auction = open_auction(now);
        assert_eq!(
            check_bid(&auction, BUYER, 1000, now),
            Err(BidError::BidTooLow { minimum: 1000 })
        );
    }

    #[test]
    fn one_cent_over_is_accepted_then_old_price_rejected() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        assert_eq!(check_bid(&auction, BUYER, 1001, now), Ok(()));

        // Accepted bids raise current_bid, so the old price no longer clears.
        auction.current_bid = 1001;
        assert_eq!(
            check_bid(&auction, BUYER, 1000, now),
            Err(BidError::BidTooLow { minimum: 1001 })
        );
        assert_eq!(check_bid(&auction, BUYER, 1002, now), Ok(()));
    }

    #[test]
    fn seller_cannot_bid_on_own_auction() {
        let now = Utc::now();
        let auction = open_auction(now);
        assert_eq!(
            check_bid(&auction, SELLER, 99_999, now),
            Err(BidError::SelfBid)
        );
    }

    #[test]
    fn pending_auction_rejects_bids() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.status = AuctionStatus::Pending;
        assert_eq!(
            check_bid(&auction, BUYER, 2000, now),
            Err(BidError::AuctionNotActive)
        );
    }

    #[test]
    fn active_auction_outside_window_rejects_bids() {
        let now = Utc::now();
        let mut before = open_auction(now);
        before.start_time = now + Duration::minutes(5);
        assert_eq!(
            check_bid(&before, BUYER, 2000, now),
            Err(BidError::AuctionNotActive)
        );

        let mut after = open_auction(now);
        after.end_time = now - Duration::minutes(5);
        assert_eq!(
            check_bid(&after, BUYER, 2000, now),
            Err(BidError::AuctionNotActive)
        );
    }

    #[test]
    fn losing_a_race_to_a_higher_bid_reports_the_new_price() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.current_bid = 1500;
        assert_eq!(
            raced_bid_error(&auction),
            BidError::BidTooLow { minimum: 1500 }
        );
    }

    #[test]
    fn losing_a_race_to_cancellation_reports_not_active() {
        let now = Utc::now();
        for status in [
            AuctionStatus::Cancelled,
            AuctionStatus::Completed,
            AuctionStatus::Pending,
        ] {
            let mut auction = open_auction(now);
            auction.status = status;
            assert_eq!(raced_bid_error(&auction), BidError::AuctionNotActive);
        }
    }

    #[test]
    fn accepted_bids_are_strictly_increasing() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        let mut last_accepted = auction.current_bid;
        for amount in [1001, 1002, 1500, 1500, 1499, 2000] {
            if check_bid(&auction, BUYER, amount, now).is_ok() {
                assert!(amount > last_accepted);
                auction.current_bid = amount;
                last_accepted = amount;
            }
        }
        assert_eq!(last_accepted, 2000);
    }
}
