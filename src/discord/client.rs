use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::DiscordConfig;
use crate::discord::types::{DiscordUser, GuildMember, TokenResponse};
use crate::discord::MemberDirectory;

/// Errors from the identity provider
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    #[error("profile fetch failed ({status}): {body}")]
    ProfileFetch { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Client for the OAuth and guild-member endpoints of the identity provider.
///
/// All calls share one `reqwest::Client` carrying the configured timeout;
/// there are no retries, a failed call fails the enclosing operation.
pub struct DiscordClient {
    http: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Authorization URL the login endpoint redirects to. The scope is
    /// fixed; no OAuth state parameter is used.
    pub fn authorize_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "identify guilds.members.read")
            .finish();
        format!("{}/oauth2/authorize?{}", self.config.api_base, query)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, DiscordError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/oauth2/token", self.config.api_base))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscordError::TokenExchange {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Profile of the authenticated user.
    pub async fn fetch_user(&self, access_token: &str) -> Result<DiscordUser, DiscordError> {
        self.get_json(format!("{}/users/@me", self.config.api_base), access_token)
            .await
    }

    /// Guild membership (nickname and roles) of the authenticated user.
    /// Requires the guilds.members.read scope.
    pub async fn fetch_member(&self, access_token: &str) -> Result<GuildMember, DiscordError> {
        self.get_json(
            format!(
                "{}/users/@me/guilds/{}/member",
                self.config.api_base, self.config.guild_id
            ),
            access_token,
        )
        .await
    }

    /// Resolve a guild member's display name via the bot token:
    /// nickname, else global display name, else account name, else "".
    /// Upstream failures degrade to "" rather than erroring.
    pub async fn member_display_name(&self, member_id: &str) -> String {
        if !is_snowflake(member_id) {
            return String::new();
        }

        let url = format!(
            "{}/v10/guilds/{}/members/{}",
            self.config.api_base, self.config.guild_id, member_id
        );

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bot {}", self.config.bot_token))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("member lookup failed for {}: {}", member_id, e);
                return String::new();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "member lookup for {} returned {}",
                member_id,
                response.status()
            );
            return String::new();
        }

        match response.json::<GuildMember>().await {
            Ok(member) => member
                .nick
                .or_else(|| member.user.as_ref().and_then(|u| u.global_name.clone()))
                .or_else(|| member.user.as_ref().map(|u| u.username.clone()))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("member lookup decode failed for {}: {}", member_id, e);
                String::new()
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        access_token: &str,
    ) -> Result<T, DiscordError> {
        let response = self.http.get(url).bearer_auth(access_token).send().await?;

        if !response.status().is_success() {
            return Err(DiscordError::ProfileFetch {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MemberDirectory for DiscordClient {
    async fn display_name(&self, member_id: &str) -> String {
        self.member_display_name(member_id).await
    }
}

/// Member ids are 15-20 digit numeric identifiers. Anything else fails
/// closed without ever querying upstream.
pub fn is_snowflake(value: &str) -> bool {
    (15..=20).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscordConfig;

    fn test_config() -> DiscordConfig {
        DiscordConfig {
            client_id: "1111".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://portal.example/api/callback".to_string(),
            guild_id: "123456789012345678".to_string(),
            bot_token: "bot-token".to_string(),
            api_base: "https://discord.com/api".to_string(),
        }
    }

    #[test]
    fn validates_snowflake_shape() {
        assert!(is_snowflake("123456789012345678"));
        assert!(is_snowflake("123456789012345"));
        assert!(is_snowflake("12345678901234567890"));
        assert!(!is_snowflake("12345678901234"));
        assert!(!is_snowflake("123456789012345678901"));
        assert!(!is_snowflake("12345678901234567x"));
        assert!(!is_snowflake(""));
        assert!(!is_snowflake("<@123456789012345678>"));
    }

    #[test]
    fn authorize_url_carries_fixed_scope() {
        let client = DiscordClient::new(test_config(), reqwest::Client::new());
        let url = client.authorize_url();
        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(url.contains("client_id=1111"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("identify"));
        assert!(url.contains("guilds.members.read"));
    }
}
