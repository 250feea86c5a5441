use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        book::{event::CreateBook, Book, BookListOptions},
        id::BookId,
    },
    repository::book::BookRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::book::BookRow, ConnectionPool};

#[derive(new)]
pub struct BookRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookRepository for BookRepositoryImpl {
    async fn create(&self, event: CreateBook) -> AppResult<Book> {
        let book_id = BookId::new();
        let row = sqlx::query_as::<_, BookRow>(
            r#"
                INSERT INTO books (book_id, title, author, cover, inventory, daily_fee)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING book_id, title, author, cover, inventory, daily_fee
            "#,
        )
        .bind(book_id.raw())
        .bind(&event.title)
        .bind(&event.author)
        .bind(event.cover.as_ref())
        .bind(event.inventory)
        .bind(event.daily_fee)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        row.try_into()
    }

    async fn find_all(&self, options: BookListOptions) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
                SELECT book_id, title, author, cover, inventory, daily_fee
                FROM books
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
            "#,
        )
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
                SELECT book_id, title, author, cover, inventory, daily_fee
                FROM books
                WHERE book_id = $1
            "#,
        )
        .bind(book_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        row.map(Book::try_from).transpose()
    }
}
