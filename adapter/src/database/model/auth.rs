use kernel::model::{auth::AccessToken, id::UserId};
use shared::error::AppError;

use crate::redis::model::{RedisKey, RedisValue};

pub struct AuthorizationKey(String);

pub struct AuthorizedUserId(UserId);

impl AuthorizationKey {
    // アクセストークンはランダムな UUID をハイフン無しで用いる
    pub fn gen() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl From<AuthorizationKey> for AccessToken {
    fn from(key: AuthorizationKey) -> Self {
        AccessToken(key.0)
    }
}

impl From<&AccessToken> for AuthorizationKey {
    fn from(token: &AccessToken) -> Self {
        Self(token.0.clone())
    }
}

impl RedisKey for AuthorizationKey {
    type Value = AuthorizedUserId;

    fn inner(&self) -> String {
        self.0.clone()
    }
}

impl AuthorizedUserId {
    pub fn new(user_id: UserId) -> Self {
        Self(user_id)
    }

    pub fn into_inner(self) -> UserId {
        self.0
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
        Ok(Self(value.parse::<UserId>()?))
    }
}
