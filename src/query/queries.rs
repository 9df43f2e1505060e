/// Auction lookup
pub const GET_AUCTION: &str = "SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id FROM auctions WHERE id = $1";

/// Browse: active listings inside their window, optional search / category
pub const LIST_ACTIVE_AUCTIONS: &str = r#"
    SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id
    FROM auctions
    WHERE status = 'active' AND start_time <= NOW() AND end_time > NOW()
      AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
    ORDER BY end_time ASC
    LIMIT $3 OFFSET $4
"#;

pub const COUNT_ACTIVE_AUCTIONS: &str = r#"
    SELECT COUNT(*)
    FROM auctions
    WHERE status = 'active' AND start_time <= NOW() AND end_time > NOW()
      AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
"#;

/// Browse: listings past their end time or already completed
pub const LIST_ENDED_AUCTIONS: &str = r#"
    SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id
    FROM auctions
    WHERE (end_time <= NOW() OR status = 'completed')
      AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
    ORDER BY end_time ASC
    LIMIT $3 OFFSET $4
"#;

pub const COUNT_ENDED_AUCTIONS: &str = r#"
    SELECT COUNT(*)
    FROM auctions
    WHERE (end_time <= NOW() OR status = 'completed')
      AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
"#;

/// Browse: everything
pub const LIST_ALL_AUCTIONS: &str = r#"
    SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id
    FROM auctions
    WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
    ORDER BY end_time ASC
    LIMIT $3 OFFSET $4
"#;

pub const COUNT_ALL_AUCTIONS: &str = r#"
    SELECT COUNT(*)
    FROM auctions
    WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::bigint IS NULL OR category_id = $2)
"#;

/// Recent bids shown on the detail page
pub const GET_RECENT_BIDS: &str = r#"
    SELECT id, amount, placed_at, auction_id, bidder_id
    FROM bids
    WHERE auction_id = $1
    ORDER BY placed_at DESC
    LIMIT $2
"#;

/// All bids, best first; used to pick a winner at closing
pub const GET_BIDS_BEST_FIRST: &str = r#"
    SELECT id, amount, placed_at, auction_id, bidder_id
    FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, placed_at ASC
"#;

pub const COUNT_BIDS: &str = "SELECT COUNT(*) FROM bids WHERE auction_id = $1";

/// Seller dashboard
pub const SELLER_AUCTIONS: &str = "SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id FROM auctions WHERE seller_id = $1 ORDER BY created_at DESC";

/// Buyer dashboard
pub const BUYER_BIDS: &str = r#"
    SELECT id, amount, placed_at, auction_id, bidder_id
    FROM bids
    WHERE bidder_id = $1
    ORDER BY placed_at DESC
    LIMIT 10
"#;

pub const WON_AUCTIONS: &str = "SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id FROM auctions WHERE winner_id = $1 ORDER BY end_time DESC";

/// Admin dashboard
pub const PENDING_AUCTIONS: &str = "SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id FROM auctions WHERE status = 'pending' ORDER BY created_at ASC";

pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

pub const COUNT_AUCTIONS: &str = "SELECT COUNT(*) FROM auctions";

pub const COUNT_ACTIVE_STATUS: &str = "SELECT COUNT(*) FROM auctions WHERE status = 'active'";

/// Closing batch input
pub const ENDED_ACTIVE_AUCTIONS: &str = "SELECT id, title, description, starting_bid, current_bid, image_filename, start_time, end_time, created_at, status, seller_id, category_id, winner_id FROM auctions WHERE status = 'active' AND end_time <= NOW() ORDER BY end_time ASC";

/// Users
pub const GET_USER_BY_ID: &str = "SELECT id, username, email, password_hash, role, is_active, created_at FROM users WHERE id = $1";

pub const GET_USER_BY_EMAIL: &str = "SELECT id, username, email, password_hash, role, is_active, created_at FROM users WHERE email = $1";

pub const GET_USER_BY_USERNAME: &str = "SELECT id, username, email, password_hash, role, is_active, created_at FROM users WHERE username = $1";

pub const LIST_USERS: &str = "SELECT id, username, email, password_hash, role, is_active, created_at FROM users ORDER BY created_at DESC";

/// Categories
pub const LIST_CATEGORIES: &str = "SELECT id, name, description FROM categories ORDER BY name ASC";

pub const GET_CATEGORY: &str = "SELECT id, name, description FROM categories WHERE id = $1";

/// Notifications, newest first
pub const LIST_NOTIFICATIONS: &str = r#"
    SELECT id, message, is_read, created_at, user_id
    FROM notifications
    WHERE user_id = $1
    ORDER BY created_at DESC
"#;
