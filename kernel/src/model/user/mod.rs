use super::{id::UserId, role::Role};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// 貸出レコードに埋め込む借り手情報
#[derive(Debug, Clone)]
pub struct Borrower {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
