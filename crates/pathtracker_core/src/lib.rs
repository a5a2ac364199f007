//! Loot and XP bookkeeping for tabletop campaigns.
//!
//! Input lines are tokenized by [`command::parse_line`], validated into an
//! [`action::Action`] and applied to a [`campaign::Campaign`] by
//! [`engine::dispatch`]. [`session::Session`] ties those steps to a
//! [`store::CampaignStore`].

pub mod action;
pub mod campaign;
pub mod command;
pub mod engine;
mod error;
pub mod numeric;
pub mod session;
pub mod store;

pub use action::{Action, Issue, MAX_QUANTITY, Rejection, ResolveError};
pub use campaign::{
    Award, Campaign, CampaignName, Liquidation, LootItem, LootOverflow, XpReward,
};
pub use command::{Flag, ParseError, RawCommand, parse_line};
pub use engine::{Outcome, Report, dispatch};
pub use error::{CoreError, CoreErrorCode};
pub use session::{Session, Step};
pub use store::{Bootstrap, CampaignStore, JsonFileStore, MemoryStore};
