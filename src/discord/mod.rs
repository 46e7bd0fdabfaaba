pub mod client;
pub mod types;

pub use client::{is_snowflake, DiscordClient, DiscordError};
pub use types::{DiscordUser, GuildMember, TokenResponse};

use async_trait::async_trait;

/// Resolves a guild member id to a display name. Backed by the live guild
/// API in production; faked in tests. An unknown member resolves to "".
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn display_name(&self, member_id: &str) -> String;
}
