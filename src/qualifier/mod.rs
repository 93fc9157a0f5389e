pub mod codec;
pub mod ortholog;
pub mod rank;
pub mod similarity;
pub mod synonym;

pub use codec::{decode, encode};
pub use rank::{compare, rank_of, sort_by_rank};
pub use similarity::{contains_match, matches};
