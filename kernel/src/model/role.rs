use strum::{AsRefStr, EnumString};

// 一覧系の操作に明示的に渡す権限。Staff は全利用者の貸出・決済を参照できる
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Staff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_string() {
        assert_eq!("STAFF".parse::<Role>().unwrap(), Role::Staff);
        assert_eq!(Role::User.as_ref(), "USER");
    }
}
