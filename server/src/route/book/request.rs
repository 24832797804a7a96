use application::transfer::{CreateBookDto, GetBookPageDto, UpdateBookDto};
use kernel::prelude::entity::{PageNumber, PageSize};
use serde::Deserialize;
use uuid::Uuid;

// I want to use primitive type(i32) in these fields, but default attribute not
// supported for literals(https://github.com/serde-rs/serde/issues/368)
#[derive(Debug, Deserialize)]
pub struct GetBookPageRequest {
    #[serde(default)]
    page: PageNumber,
    #[serde(default, rename = "pageSize")]
    page_size: PageSize,
}

impl From<GetBookPageRequest> for GetBookPageDto {
    fn from(value: GetBookPageRequest) -> Self {
        Self {
            page: value.page,
            page_size: value.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    title: String,
    author_name: String,
    publication_year: i32,
}

impl From<CreateBookRequest> for CreateBookDto {
    fn from(value: CreateBookRequest) -> Self {
        Self {
            title: value.title,
            author_name: value.author_name,
            publication_year: value.publication_year,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    title: String,
    author_name: String,
    publication_year: i32,
}

impl UpdateBookRequest {
    pub fn into_dto(self, id: Uuid) -> UpdateBookDto {
        UpdateBookDto {
            id,
            title: self.title,
            author_name: self.author_name,
            publication_year: self.publication_year,
        }
    }
}
