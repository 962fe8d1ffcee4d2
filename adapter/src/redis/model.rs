use crate::redis::{RedisKey, RedisValue};
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use shared::error::AppError;
use std::str::FromStr;

/// トークン文字列をそのままキーにする
pub struct AuthorizationKey(String);

/// トークンに紐づくユーザー ID
pub struct AuthorizedUserId(UserId);

pub fn from(event: CreateToken) -> (AuthorizationKey, AuthorizedUserId) {
    (
        AuthorizationKey(uuid::Uuid::new_v4().simple().to_string()),
        AuthorizedUserId(event.user_id),
    )
}

impl AuthorizedUserId {
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

impl From<AuthorizationKey> for AccessToken {
    fn from(key: AuthorizationKey) -> Self {
        Self(key.0)
    }
}

impl From<AccessToken> for AuthorizationKey {
    fn from(token: AccessToken) -> Self {
        Self(token.0)
    }
}

impl From<&AccessToken> for AuthorizationKey {
    fn from(token: &AccessToken) -> Self {
        Self(token.0.to_string())
    }
}

impl RedisKey for AuthorizationKey {
    type Value = AuthorizedUserId;

    fn inner(&self) -> String {
        self.0.to_string()
    }
}

impl RedisValue for AuthorizedUserId {
    fn inner(&self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<String> for AuthorizedUserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let user_id = UserId::from_str(&value).map_err(|e| {
            AppError::ConversionEntityError(format!("invalid user id in token store: {e}"))
        })?;
        Ok(Self(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_key_round_trips_as_access_token() {
        let user_id = UserId::new();
        let (key, value) = from(CreateToken::new(user_id));

        assert_eq!(value.inner(), user_id.to_string());

        // 発行したキーはそのままクライアントへ渡すトークンになり、
        // 受け取ったトークンから再び同じキーへ戻せる
        let issued = key.inner();
        let token: AccessToken = key.into();
        assert_eq!(token.0, issued);

        let key: AuthorizationKey = (&token).into();
        assert_eq!(key.inner(), issued);
    }

    #[test]
    fn stored_value_parses_back_to_user_id() {
        let user_id = UserId::new();
        let value = AuthorizedUserId::try_from(user_id.to_string()).unwrap();
        assert_eq!(value.into_inner(), user_id);
    }

    #[test]
    fn broken_stored_value_is_rejected() {
        let res = AuthorizedUserId::try_from("not-a-uuid".to_string());
        assert!(matches!(res, Err(AppError::ConversionEntityError(_))));
    }
}
