use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auction lifecycle status. `pending` listings wait for admin approval,
/// `active` listings accept bids inside their time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

// All money amounts are integer cents.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_bid: i64,
    pub current_bid: i64,
    pub image_filename: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: AuctionStatus,
    pub seller_id: i64,
    pub category_id: Option<i64>,
    pub winner_id: Option<i64>,
}

impl Auction {
    /// Open for bidding: active status and inside the start/end window.
    pub fn is_open_for_bidding(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.start_time <= now && now <= self.end_time
    }

    /// Past its end time or already completed. Note an auction past its end
    /// time stays `active` in storage until `close_ended` runs.
    pub fn is_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time || self.status == AuctionStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub amount: i64,
    pub placed_at: DateTime<Utc>,
    pub auction_id: i64,
    pub bidder_id: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn auction(status: AuctionStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Auction {
        Auction {
            id: 1,
            title: "Vintage camera".to_string(),
            description: "A well-kept vintage rangefinder camera.".to_string(),
            starting_bid: 1000,
            current_bid: 1000,
            image_filename: None,
            start_time: start,
            end_time: end,
            created_at: start,
            status,
            seller_id: 1,
            category_id: None,
            winner_id: None,
        }
    }

    #[test]
    fn active_inside_window_is_open() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::Active,
            now - Duration::hours(1),
            now + Duration::hours(1),
        );
        assert!(a.is_open_for_bidding(now));
        assert!(!a.is_ended(now));
    }

    #[test]
    fn pending_inside_window_is_not_open() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::Pending,
            now - Duration::hours(1),
            now + Duration::hours(1),
        );
        assert!(!a.is_open_for_bidding(now));
    }

    #[test]
    fn active_past_end_time_is_ended_but_not_open() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::Active,
            now - Duration::hours(2),
            now - Duration::hours(1),
        );
        assert!(!a.is_open_for_bidding(now));
        assert!(a.is_ended(now));
    }

    #[test]
    fn active_before_start_time_is_not_open() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::Active,
            now + Duration::hours(1),
            now + Duration::hours(2),
        );
        assert!(!a.is_open_for_bidding(now));
    }
}
