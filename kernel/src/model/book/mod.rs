use rust_decimal::Decimal;
use strum::{AsRefStr, EnumString};

use super::id::BookId;

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
pub enum CoverType {
    #[strum(serialize = "HARD")]
    Hardcover,
    #[strum(serialize = "SOFT")]
    Softcover,
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    // 貸出可能な在庫数。貸出と返却の操作でのみ増減する
    pub inventory: i32,
    pub daily_fee: Decimal,
}

// ページネーションの範囲を指定するための設定値を格納する型
#[derive(Debug)]
pub struct BookListOptions {
    pub limit: i64,
    pub offset: i64,
}

// 貸出レコードに埋め込む蔵書情報
#[derive(Debug, Clone)]
pub struct BorrowedBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub daily_fee: Decimal,
}
