use rust_decimal::Decimal;

use super::CoverType;

#[derive(Debug)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}
