mod favorite_dto;

pub use favorite_dto::{AddFavoriteDto, FavoriteResponseDto};
