//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod ad_repo;
pub mod ad_result_repo;
pub mod analysis_repo;
pub mod analysis_session_repo;
pub mod recommendation_repo;
pub mod selection_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use ad_repo::AdRepo;
pub use ad_result_repo::AdResultRepo;
pub use analysis_repo::AnalysisRepo;
pub use analysis_session_repo::AnalysisSessionRepo;
pub use recommendation_repo::RecommendationRepo;
pub use selection_repo::SelectionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
