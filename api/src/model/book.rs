use garde::Validate;
use kernel::model::{
    book::{event::CreateBook, Book, BookListOptions, CoverType},
    id::BookId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum BookCover {
    #[serde(rename = "HARD")]
    Hardcover,
    #[serde(rename = "SOFT")]
    Softcover,
}

impl From<BookCover> for CoverType {
    fn from(value: BookCover) -> Self {
        match value {
            BookCover::Hardcover => CoverType::Hardcover,
            BookCover::Softcover => CoverType::Softcover,
        }
    }
}

impl From<CoverType> for BookCover {
    fn from(value: CoverType) -> Self {
        match value {
            CoverType::Hardcover => BookCover::Hardcover,
            CoverType::Softcover => BookCover::Softcover,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateBookRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub author: String,
    #[garde(skip)]
    pub cover: BookCover,
    #[garde(range(min = 0))]
    pub inventory: i32,
    #[garde(skip)]
    pub daily_fee: Decimal,
}

impl From<CreateBookRequest> for CreateBook {
    fn from(value: CreateBookRequest) -> Self {
        let CreateBookRequest {
            title,
            author,
            cover,
            inventory,
            daily_fee,
        } = value;
        CreateBook {
            title,
            author,
            cover: cover.into(),
            inventory,
            daily_fee,
        }
    }
}

const DEFAULT_LIMIT: i64 = 20;
const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Deserialize, Validate)]
pub struct BookListQuery {
    #[garde(range(min = 0))]
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

impl From<BookListQuery> for BookListOptions {
    fn from(value: BookListQuery) -> Self {
        let BookListQuery { limit, offset } = value;
        BookListOptions { limit, offset }
    }
}

#[derive(Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover: BookCover,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        let Book {
            id,
            title,
            author,
            cover,
            inventory,
            daily_fee,
        } = value;
        BookResponse {
            id,
            title,
            author,
            cover: cover.into(),
            inventory,
            daily_fee,
        }
    }
}
