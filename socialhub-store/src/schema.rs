/// SQL schema for the local cache.
///
/// Timestamps are Unix epoch milliseconds. Post and comment owners are plain
/// integer columns rather than foreign keys because remote rows routinely
/// arrive before the user they reference.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT,
    avatar_url TEXT,
    bio TEXT,
    followers_count INTEGER NOT NULL DEFAULT 0,
    following_count INTEGER NOT NULL DEFAULT 0,
    posts_count INTEGER NOT NULL DEFAULT 0
);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    like_count INTEGER NOT NULL DEFAULT 0,
    dislike_count INTEGER NOT NULL DEFAULT 0,
    comment_count INTEGER NOT NULL DEFAULT 0,
    is_draft INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY,
    post_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
CREATE INDEX IF NOT EXISTS idx_comments_user_id ON comments(user_id);
CREATE INDEX IF NOT EXISTS idx_comments_created_at ON comments(created_at);

-- Likes table (one row per post/user pair)
CREATE TABLE IF NOT EXISTS likes (
    post_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (post_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_likes_created_at ON likes(created_at);

-- Search history (informational only)
CREATE TABLE IF NOT EXISTS search_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL UNIQUE,
    searched_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_history_searched_at ON search_history(searched_at DESC);
"#;

/// Demo users and posts for local development
pub const DEMO_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, username, name, email, avatar_url, bio, followers_count, following_count, posts_count) VALUES
    (1001, 'ann', 'Ann Lee', 'ann@example.com', 'https://i.pravatar.cc/150?u=ann', 'Lisbon, Portugal', 12, 8, 2),
    (1002, 'bo_dev', 'Bo Chen', NULL, 'https://i.pravatar.cc/150?u=bo_dev', NULL, 3, 5, 1);

INSERT OR IGNORE INTO posts (id, user_id, content, created_at, updated_at, like_count, dislike_count, comment_count, is_draft) VALUES
    (5001, 1001, 'First post from the local cache', 1700000000000, NULL, 4, 0, 0, 0),
    (5002, 1001, 'Second thoughts', 1700000600000, NULL, 1, 1, 0, 0),
    (5003, 1002, 'Hello from Bo', 1700001200000, NULL, 0, 0, 0, 0);
"#;
