use axum::{
    extract::{Path, Query, State},
    Json,
};
use garde::Validate;
use kernel::model::id::BookId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::book::{BookListQuery, BookResponse, CreateBookRequest},
};

// 蔵書の登録はスタッフのみ。閲覧は認証不要
pub async fn register_book(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<Json<BookResponse>> {
    if !user.is_staff() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;
    let book = registry.book_repository().create(req.into()).await?;
    Ok(Json(book.into()))
}

pub async fn show_book_list(
    State(registry): State<AppRegistry>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    query.validate(&())?;
    let books = registry.book_repository().find_all(query.into()).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn show_book(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<Json<BookResponse>> {
    let book = registry
        .book_repository()
        .find_by_id(book_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("指定された蔵書が見つかりませんでした".into()))?;
    Ok(Json(book.into()))
}
