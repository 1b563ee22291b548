mod comment_repository;
mod like_repository;
mod post_repository;
mod search_history_repository;
mod user_repository;

pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;
pub use search_history_repository::SearchHistoryRepository;
pub use user_repository::UserRepository;
