use kernel::model::{
    book::{Book, CoverType},
    id::BookId,
};
use rust_decimal::Decimal;
use shared::error::AppError;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct BookRow {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub cover: String,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(value: BookRow) -> Result<Self, Self::Error> {
        let BookRow {
            book_id,
            title,
            author,
            cover,
            inventory,
            daily_fee,
        } = value;
        let cover = cover
            .parse::<CoverType>()
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        Ok(Book {
            id: BookId::from(book_id),
            title,
            author,
            cover,
            inventory,
            daily_fee,
        })
    }
}
